//! Extratores: sessão autenticada, corpo/consulta validados e ids de rota

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use common_auth::Principal;

use crate::error::ApiError;
use crate::state::AppState;

/// Token do cabeçalho `Authorization: Bearer`. O cookie de sessão vale só
/// para a navegação (`gate`), nunca para a API.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Sessão obrigatória. Rejeita com 401 quando ausente ou inválida.
pub struct Session(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Autenticação necessária".to_string()))?;
        let claims = state.tokens.verify(token)?;
        Ok(Session(claims.into()))
    }
}

/// Sessão opcional: sem token, ou com token vencido ou inválido, o acesso é anônimo
pub struct MaybeSession(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = bearer_token(&parts.headers)
            .and_then(|token| state.tokens.verify(token).ok())
            .map(Principal::from);
        Ok(MaybeSession(principal))
    }
}

/// Identificador da rota (`/:id`) já convertido para UUID
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Uuid::parse_str(&raw)
            .map(PathId)
            .map_err(|_| ApiError::Validation(format!("Identificador inválido: {}", raw)))
    }
}

/// Corpo JSON desserializado e validado
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: Send + 'static,
    Json<T>: FromRequest<S, B, Rejection = axum::extract::rejection::JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string desserializada e validada
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}
