//! Erros da API com mapeamento para status HTTP
//!
//! Toda falha vira `{ "success": false, "error": "<mensagem>" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use common_auth::{AccessDenied, AuthError};
use common_db::error::DbError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Entrada ausente ou malformada
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Horário já reservado, email duplicado, transição inválida
    #[error("{0}")]
    Conflict(String),

    #[error("Erro interno: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(detail, "Erro interno na API");
                "Ocorreu um erro interno".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => ApiError::NotFound(msg),
            DbError::ConstraintViolation(_) => {
                ApiError::Conflict("Registro duplicado".to_string())
            }
            DbError::ForeignKeyViolation(_) => {
                ApiError::Conflict("Registro referenciado por outras entidades".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Hash(_) | AuthError::Signing(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        ApiError::Forbidden(err.0)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(format!("Dados inválidos: {}", errors))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
        ];
        for (error, status) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "x");
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let response = ApiError::Internal("disk I/O error at /var/db".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Ocorreu um erro interno");
    }

    #[test]
    fn test_db_error_conversion() {
        assert!(matches!(
            ApiError::from(DbError::ConstraintViolation("UNIQUE".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(DbError::QueryError("syntax".into())),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::TokenExpired),
            ApiError::Unauthorized(_)
        ));
    }
}
