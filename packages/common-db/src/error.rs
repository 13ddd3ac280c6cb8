//! Definições de erro para a biblioteca common-db
//!
//! Este módulo define os tipos de erro usados pela camada de persistência

use thiserror::Error;

/// Erros específicos para operações de banco de dados
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Erro de conexão com banco de dados: {0}")]
    ConnectionError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("Entidade não encontrada: {0}")]
    NotFound(String),

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Registro referenciado por outras entidades: {0}")]
    ForeignKeyViolation(String),

    #[error("Dados inválidos armazenados: {0}")]
    InvalidData(String),

    #[error("Erro interno: {0}")]
    InternalError(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Códigos estendidos do SQLite para falhas de chave estrangeira
/// (`SQLITE_CONSTRAINT_FOREIGNKEY` e `SQLITE_CONSTRAINT_TRIGGER`)
const SQLITE_FOREIGN_KEY_CODES: [&str; 2] = ["787", "1811"];

fn is_foreign_key_failure(dbe: &dyn sqlx::error::DatabaseError) -> bool {
    dbe.is_foreign_key_violation()
        || dbe
            .code()
            .map_or(false, |code| SQLITE_FOREIGN_KEY_CODES.contains(&&*code))
        || dbe.message().contains("FOREIGN KEY constraint failed")
}

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::NotFound("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                if dbe.is_unique_violation() {
                    return DbError::ConstraintViolation(dbe.message().to_string());
                }
                if is_foreign_key_failure(&*dbe) {
                    return DbError::ForeignKeyViolation(dbe.message().to_string());
                }
                DbError::QueryError(dbe.message().to_string())
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::TypeNotFound { type_name } => {
                DbError::QueryError(format!("Tipo não encontrado: {}", type_name))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::InvalidData(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => DbError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => DbError::ConnectionError(conf_err.to_string()),
            sqlx::Error::PoolClosed => {
                DbError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                DbError::InternalError("Worker do banco de dados falhou".to_string())
            }
            _ => DbError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}
