//! Diretório de médicos: leitura pública, escrita restrita a administradores

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};

use common_db::error::DbError;
use common_db::models::{Doctor, PageRequest, SlotTime};
use common_db::store::doctors::{self, DoctorFilter, DoctorPatch, NewDoctor};

use crate::error::{ApiError, ApiResult};
use crate::extract::{MaybeSession, PathId, Session, ValidatedJson, ValidatedQuery};
use crate::response::{ApiMessage, ApiResponse};
use crate::state::AppState;

fn validate_slots(slots: &[String]) -> Result<(), ValidationError> {
    if slots.iter().all(|s| SlotTime::parse(s).is_some()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("slot");
        error.message = Some("Horários devem estar no formato h:mm AM/PM ou HH:MM".into());
        Err(error)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQuery {
    pub specialty: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    #[validate(length(min = 1, message = "Especialidade é obrigatória"))]
    pub specialty: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub experience: i64,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub rating: f64,
    #[validate(length(min = 1, message = "Local é obrigatório"))]
    pub location: String,
    #[validate(range(min = 0.0, message = "Valor da consulta não pode ser negativo"))]
    pub consultation_fee: f64,
    #[serde(default)]
    pub availability: String,
    #[validate(custom = "validate_slots")]
    #[serde(default)]
    pub available_slots: Vec<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Option<String>,
    pub about: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub reviews: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub specialty: Option<String>,
    #[validate(range(min = 0))]
    pub experience: Option<i64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub consultation_fee: Option<f64>,
    pub availability: Option<String>,
    #[validate(custom = "validate_slots")]
    pub available_slots: Option<Vec<String>>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Option<String>,
    pub about: Option<String>,
    #[validate(range(min = 0))]
    pub reviews: Option<i64>,
    pub is_active: Option<bool>,
}

fn duplicate_email(err: DbError) -> ApiError {
    match err {
        DbError::ConstraintViolation(_) => {
            ApiError::Conflict("Já existe um médico com este email".to_string())
        }
        other => other.into(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    ValidatedQuery(query): ValidatedQuery<DoctorQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Doctor>>>> {
    let is_admin = session.as_ref().is_some_and(|s| s.is_admin());
    let filter = DoctorFilter {
        specialty: query.specialty.filter(|s| !s.trim().is_empty()),
        location: query.location.filter(|s| !s.trim().is_empty()),
        include_inactive: query.include_inactive && is_admin,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    };

    let result = doctors::list(&state.pool, &filter, page).await?;
    Ok(Json(ApiResponse::page(result)))
}

pub async fn create(
    State(state): State<AppState>,
    Session(principal): Session,
    ValidatedJson(body): ValidatedJson<CreateDoctorRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Doctor>>)> {
    principal.require_admin()?;

    let doctor = doctors::insert(
        &state.pool,
        NewDoctor {
            name: body.name,
            specialty: body.specialty,
            experience: body.experience,
            rating: body.rating,
            location: body.location,
            consultation_fee: body.consultation_fee,
            availability: body.availability,
            available_slots: body.available_slots,
            email: body.email,
            phone: body.phone,
            education: body.education,
            about: body.about,
            reviews: body.reviews,
            is_active: body.is_active,
        },
    )
    .await
    .map_err(duplicate_email)?;

    info!(doctor_id = %doctor.id, name = %doctor.name, "Médico cadastrado");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(doctor).with_message("Médico cadastrado com sucesso")),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<Json<ApiResponse<Doctor>>> {
    let doctor = doctors::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Médico não encontrado".to_string()))?;
    Ok(Json(ApiResponse::data(doctor)))
}

pub async fn update(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateDoctorRequest>,
) -> ApiResult<Json<ApiResponse<Doctor>>> {
    principal.require_admin()?;

    let patch = DoctorPatch {
        name: body.name,
        specialty: body.specialty,
        experience: body.experience,
        rating: body.rating,
        location: body.location,
        consultation_fee: body.consultation_fee,
        availability: body.availability,
        available_slots: body.available_slots,
        email: body.email,
        phone: body.phone,
        education: body.education,
        about: body.about,
        reviews: body.reviews,
        is_active: body.is_active,
    };

    let doctor = doctors::update(&state.pool, id, patch)
        .await
        .map_err(duplicate_email)?
        .ok_or_else(|| ApiError::NotFound("Médico não encontrado".to_string()))?;

    info!(doctor_id = %id, "Médico atualizado");
    Ok(Json(
        ApiResponse::data(doctor).with_message("Médico atualizado com sucesso"),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Session(principal): Session,
    PathId(id): PathId,
) -> ApiResult<Json<ApiMessage>> {
    principal.require_admin()?;

    let removed = doctors::delete(&state.pool, id).await.map_err(|e| match e {
        DbError::ForeignKeyViolation(_) => ApiError::Conflict(
            "Médico possui agendamentos; desative-o em vez de excluir".to_string(),
        ),
        other => other.into(),
    })?;
    if !removed {
        return Err(ApiError::NotFound("Médico não encontrado".to_string()));
    }

    info!(doctor_id = %id, "Médico removido");
    Ok(Json(ApiMessage::new("Médico removido com sucesso")))
}
