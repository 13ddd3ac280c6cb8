//! Erros de autenticação

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Falha ao gerar hash da senha: {0}")]
    Hash(String),

    #[error("Token de sessão inválido")]
    InvalidToken,

    #[error("Token de sessão expirado")]
    TokenExpired,

    #[error("Falha ao assinar token: {0}")]
    Signing(String),
}
