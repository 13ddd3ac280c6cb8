//! Pagamentos: listagem, registro, consulta e transições de status

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use common_db::models::{PaymentMethod, PaymentStatus, PaymentView};
use common_db::store::appointments;
use common_db::store::payments::{self, PaymentFilter};

use crate::error::{ApiError, ApiResult};
use crate::extract::{PathId, Session, ValidatedJson, ValidatedQuery};
use crate::response::ApiResponse;
use crate::services::billing;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub appointment_id: Uuid,
    #[validate(range(min = 0.01, message = "Valor do pagamento deve ser positivo"))]
    pub amount: f64,
    pub payment_method: PaymentMethod,
}

async fn load_view(pool: &SqlitePool, id: Uuid) -> ApiResult<PaymentView> {
    payments::find_view_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pagamento não encontrado".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    Session(principal): Session,
    ValidatedQuery(query): ValidatedQuery<PaymentQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PaymentView>>>> {
    let filter = PaymentFilter {
        patient_id: principal.scope_patient(query.patient_id)?,
        status: query.status,
    };
    let items = payments::list(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::data(items)))
}

pub async fn create(
    State(state): State<AppState>,
    Session(principal): Session,
    ValidatedJson(body): ValidatedJson<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PaymentView>>)> {
    let appointment = appointments::find_by_id(&state.pool, body.appointment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agendamento não encontrado".to_string()))?;
    principal.ensure_owner_or_admin(appointment.patient_id)?;

    let payment =
        billing::record_payment(&state.pool, &appointment, body.amount, body.payment_method)
            .await?;
    let view = load_view(&state.pool, payment.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(view).with_message("Pagamento registrado com sucesso")),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<PaymentView>>> {
    let view = load_view(&state.pool, id).await?;
    principal.ensure_owner_or_admin(view.appointment.patient_id)?;
    Ok(Json(ApiResponse::data(view)))
}

/// `POST /api/payments/:id` e `POST /api/payments/:id/pay`
pub async fn pay(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<PaymentView>>> {
    let view = load_view(&state.pool, id).await?;
    principal.ensure_owner_or_admin(view.appointment.patient_id)?;

    billing::settle(&state.pool, id).await?;
    let view = load_view(&state.pool, id).await?;
    Ok(Json(
        ApiResponse::data(view).with_message("Pagamento confirmado"),
    ))
}

pub async fn refund(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<PaymentView>>> {
    principal.require_admin()?;

    billing::refund(&state.pool, id).await?;
    let view = load_view(&state.pool, id).await?;
    Ok(Json(ApiResponse::data(view).with_message("Pagamento estornado")))
}

pub async fn fail(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<PaymentView>>> {
    principal.require_admin()?;

    billing::mark_failed(&state.pool, id).await?;
    let view = load_view(&state.pool, id).await?;
    Ok(Json(
        ApiResponse::data(view).with_message("Pagamento marcado como falho"),
    ))
}
