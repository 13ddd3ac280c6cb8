//! Consultas ao banco de dados, uma submódulo por tabela
//!
//! As funções recebem o pool e devolvem [`DbResult`](crate::error::DbResult).
//! Regras de negócio ficam nos serviços da aplicação; aqui só há SQL.

pub mod accounts;
pub mod appointments;
pub mod doctors;
pub mod payments;
