//! Common Auth - autenticação e controle de acesso do sistema hospitalar
//!
//! - [`password`]: hash Argon2id das senhas
//! - [`token`]: sessões assinadas (JWT HS256) com validade configurável
//! - [`access`]: verificações de capacidade usadas por toda operação que altera dados
//! - [`gate`]: decisão de redirecionamento para navegação em áreas protegidas

pub mod access;
pub mod error;
pub mod gate;
pub mod password;
pub mod token;

pub use access::{AccessDenied, Principal};
pub use error::AuthError;
pub use token::{Claims, TokenIssuer};
