//! Rotas administrativas: painel, pacientes e remoção definitiva

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use common_db::models::PatientOverview;
use common_db::store::accounts;

use crate::error::ApiResult;
use crate::extract::{PathId, Session};
use crate::response::{ApiMessage, ApiResponse};
use crate::services::booking;
use crate::services::stats::{self, Dashboard};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

pub async fn stats(
    State(state): State<AppState>,
    Session(principal): Session,
) -> ApiResult<Json<StatsResponse>> {
    principal.require_admin()?;

    let dashboard = stats::dashboard(&state.pool, Utc::now().date_naive()).await?;
    Ok(Json(StatsResponse {
        success: true,
        dashboard,
    }))
}

pub async fn patients(
    State(state): State<AppState>,
    Session(principal): Session,
) -> ApiResult<Json<ApiResponse<Vec<PatientOverview>>>> {
    principal.require_admin()?;

    let patients = accounts::list_patients(&state.pool).await?;
    Ok(Json(ApiResponse::data(patients)))
}

/// `DELETE /api/admin/appointments/:id`: remove o agendamento e seus pagamentos
pub async fn purge_appointment(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiMessage>> {
    principal.require_admin()?;

    booking::purge(&state.pool, id).await?;
    Ok(Json(ApiMessage::new("Agendamento removido definitivamente")))
}
