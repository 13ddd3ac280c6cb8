//! `POST /api/auth/register`, `POST /api/auth/login`, `GET /api/auth/me`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use common_auth::password::{hash_password, verify_password};
use common_db::error::DbError;
use common_db::models::{Account, Role};
use common_db::store::accounts::{self, NewAccount};

use crate::error::{ApiError, ApiResult};
use crate::extract::{MaybeSession, Session, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Email ou senha inválidos";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter ao menos 6 caracteres"))]
    pub password: String,
    #[validate(custom(function = "not_blank", message = "Nome é obrigatório"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "Sobrenome é obrigatório"))]
    pub last_name: String,
    /// Só administradores podem criar outro administrador
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email é obrigatório"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: Account,
    pub token: String,
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let role = body.role.unwrap_or(Role::Patient);
    if role == Role::Admin && !session.as_ref().is_some_and(|s| s.is_admin()) {
        return Err(ApiError::Forbidden(
            "Somente administradores podem criar administradores".to_string(),
        ));
    }

    if accounts::find_by_email(&state.pool, &body.email).await?.is_some() {
        return Err(ApiError::Conflict("Email já cadastrado".to_string()));
    }

    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let account = accounts::insert(
        &state.pool,
        NewAccount {
            email: body.email,
            password_hash,
            first_name: body.first_name.trim().to_string(),
            last_name: body.last_name.trim().to_string(),
            role,
        },
    )
    .await
    .map_err(|e| match e {
        DbError::ConstraintViolation(_) => ApiError::Conflict("Email já cadastrado".to_string()),
        other => other.into(),
    })?;

    let token = state.tokens.issue(&account)?;
    info!(account_id = %account.id, role = %account.role, "Conta criada");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: account,
            token,
            message: "Cadastro realizado com sucesso".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let Some(account) = accounts::find_by_email(&state.pool, &body.email).await? else {
        warn!("Login recusado: email desconhecido");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    let password = body.password;
    let stored_hash = account.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;
    if !valid {
        warn!(account_id = %account.id, "Login recusado: senha incorreta");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(&account)?;
    info!(account_id = %account.id, "Login realizado");

    Ok(Json(AuthResponse {
        success: true,
        user: account,
        token,
        message: "Login realizado com sucesso".to_string(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Session(principal): Session,
) -> ApiResult<Json<ApiResponse<Account>>> {
    let account = accounts::find_by_id(&state.pool, principal.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Conta da sessão não existe mais".to_string()))?;
    Ok(Json(ApiResponse::data(account)))
}
