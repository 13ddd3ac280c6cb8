//! Agendamentos: listagem, reserva, consulta, mudança de status e cancelamento

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use common_auth::Principal;
use common_db::models::{AppointmentStatus, AppointmentView, PageRequest, Role};
use common_db::store::accounts;
use common_db::store::appointments::{self, AppointmentFilter};

use crate::error::{ApiError, ApiResult};
use crate::extract::{PathId, Session, ValidatedJson, ValidatedQuery};
use crate::response::ApiResponse;
use crate::services::booking::{self, BookingRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Dia UTC no formato `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    /// Obrigatório para administradores; pacientes reservam para si
    pub patient_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Horário é obrigatório"))]
    pub time: String,
    #[validate(length(min = 1, message = "Motivo da consulta é obrigatório"))]
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAppointmentRequest {
    pub status: AppointmentStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

pub(crate) async fn load_view(pool: &SqlitePool, id: Uuid) -> ApiResult<AppointmentView> {
    appointments::find_view_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agendamento não encontrado".to_string()))
}

/// Paciente para quem a reserva é feita
async fn resolve_patient(
    pool: &SqlitePool,
    principal: &Principal,
    requested: Option<Uuid>,
) -> ApiResult<Uuid> {
    if !principal.is_admin() {
        return Ok(principal
            .scope_patient(requested)?
            .unwrap_or(principal.account_id));
    }

    let patient_id = requested.ok_or_else(|| {
        ApiError::Validation("patientId é obrigatório para reservas feitas pelo administrador".to_string())
    })?;
    match accounts::find_by_id(pool, patient_id).await? {
        Some(account) if account.role == Role::Patient => Ok(account.id),
        _ => Err(ApiError::NotFound("Paciente não encontrado".to_string())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Session(principal): Session,
    ValidatedQuery(query): ValidatedQuery<AppointmentQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AppointmentView>>>> {
    let filter = AppointmentFilter {
        patient_id: principal.scope_patient(query.patient_id)?,
        doctor_id: query.doctor_id,
        status: query.status,
        date: query.date,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    };

    let result = appointments::list(&state.pool, &filter, page).await?;
    Ok(Json(ApiResponse::page(result)))
}

pub async fn create(
    State(state): State<AppState>,
    Session(principal): Session,
    ValidatedJson(body): ValidatedJson<BookAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AppointmentView>>)> {
    let patient_id = resolve_patient(&state.pool, &principal, body.patient_id).await?;

    let appointment = booking::book(
        &state.pool,
        BookingRequest {
            patient_id,
            doctor_id: body.doctor_id,
            date: body.date,
            time: body.time,
            reason: body.reason,
            notes: body.notes,
        },
    )
    .await?;

    let view = load_view(&state.pool, appointment.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(view).with_message("Consulta agendada com sucesso")),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<AppointmentView>>> {
    let view = load_view(&state.pool, id).await?;
    principal.ensure_owner_or_admin(view.appointment.patient_id)?;
    Ok(Json(ApiResponse::data(view)))
}

pub async fn update(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateAppointmentRequest>,
) -> ApiResult<Json<ApiResponse<AppointmentView>>> {
    principal.require_admin()?;

    booking::change_status(&state.pool, id, body.status, body.notes.as_deref()).await?;
    let view = load_view(&state.pool, id).await?;
    Ok(Json(
        ApiResponse::data(view).with_message("Agendamento atualizado com sucesso"),
    ))
}

/// `DELETE /api/appointments/:id`: cancela, mantendo o registro
pub async fn cancel(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<AppointmentView>>> {
    let current = appointments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agendamento não encontrado".to_string()))?;
    principal.ensure_owner_or_admin(current.patient_id)?;

    booking::cancel(&state.pool, id).await?;
    let view = load_view(&state.pool, id).await?;
    Ok(Json(
        ApiResponse::data(view).with_message("Consulta cancelada com sucesso"),
    ))
}
