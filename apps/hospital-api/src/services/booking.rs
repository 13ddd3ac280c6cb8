//! Reserva, cancelamento e mudança de status de agendamentos
//!
//! Nenhum médico fica com dois agendamentos ativos no mesmo dia e horário.
//! A checagem não é feita por leitura prévia: a escrita é que falha, via o
//! índice único parcial do banco, e a falha vira `409 Conflict`. Duas
//! reservas concorrentes para o mesmo horário resultam em exatamente um
//! sucesso.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use common_db::error::DbError;
use common_db::models::{Appointment, AppointmentStatus, SlotTime};
use common_db::store::{appointments, doctors};

use crate::error::{ApiError, ApiResult};

const SLOT_TAKEN: &str = "Este horário já está reservado para o médico";

/// Pedido de reserva já com o paciente resolvido
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub notes: Option<String>,
}

/// Reserva um horário. O valor da consulta é copiado do médico no momento
/// da reserva e não acompanha alterações posteriores.
pub async fn book(pool: &SqlitePool, request: BookingRequest) -> ApiResult<Appointment> {
    let doctor = doctors::find_by_id(pool, request.doctor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Médico não encontrado".to_string()))?;

    if !doctor.is_active {
        return Err(ApiError::Validation(
            "Médico não está aceitando agendamentos".to_string(),
        ));
    }

    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::Validation("Motivo da consulta é obrigatório".to_string()));
    }

    let requested = SlotTime::parse(&request.time)
        .ok_or_else(|| ApiError::Validation(format!("Horário inválido: {}", request.time)))?;
    let slot = doctor.resolve_slot(requested).ok_or_else(|| {
        ApiError::Validation(format!(
            "Horário {} não está na agenda do médico",
            request.time.trim()
        ))
    })?;

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: request.patient_id,
        doctor_id: doctor.id,
        date: request.date,
        time: slot.label,
        slot_minutes: slot.minutes,
        consultation_fee: doctor.consultation_fee,
        reason: reason.to_string(),
        notes: request.notes.filter(|n| !n.trim().is_empty()),
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };

    match appointments::insert(pool, &appointment).await {
        Ok(()) => {}
        Err(DbError::ConstraintViolation(_)) => {
            warn!(
                doctor_id = %doctor.id,
                date = %appointment.date,
                time = %appointment.time,
                "Reserva recusada: horário ocupado"
            );
            return Err(ApiError::Conflict(SLOT_TAKEN.to_string()));
        }
        Err(DbError::ForeignKeyViolation(_)) => {
            return Err(ApiError::NotFound("Paciente ou médico não encontrado".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        appointment_id = %appointment.id,
        doctor_id = %doctor.id,
        patient_id = %appointment.patient_id,
        date = %appointment.date,
        time = %appointment.time,
        "Consulta agendada"
    );
    Ok(appointment)
}

/// Cancela um agendamento: apenas muda o status, o registro permanece.
/// Só agendamentos ainda `scheduled` podem ser cancelados.
pub async fn cancel(pool: &SqlitePool, id: Uuid) -> ApiResult<Appointment> {
    let moved = appointments::transition_status(
        pool,
        id,
        AppointmentStatus::Scheduled,
        AppointmentStatus::Cancelled,
    )
    .await?;

    let appointment = appointments::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agendamento não encontrado".to_string()))?;

    if !moved {
        return Err(ApiError::Conflict(format!(
            "Não é possível cancelar um agendamento com status {}",
            appointment.status
        )));
    }

    info!(appointment_id = %id, "Consulta cancelada");
    Ok(appointment)
}

/// Define o status (uso administrativo). Reativar um agendamento cujo
/// horário já foi tomado resulta em conflito.
pub async fn change_status(
    pool: &SqlitePool,
    id: Uuid,
    status: AppointmentStatus,
    notes: Option<&str>,
) -> ApiResult<Appointment> {
    let updated = match appointments::set_status(pool, id, status, notes).await {
        Ok(updated) => updated,
        Err(DbError::ConstraintViolation(_)) => {
            return Err(ApiError::Conflict(SLOT_TAKEN.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let appointment =
        updated.ok_or_else(|| ApiError::NotFound("Agendamento não encontrado".to_string()))?;
    info!(appointment_id = %id, status = %status, "Status do agendamento alterado");
    Ok(appointment)
}

/// Remoção definitiva, junto com os pagamentos vinculados
pub async fn purge(pool: &SqlitePool, id: Uuid) -> ApiResult<()> {
    if !appointments::delete(pool, id).await? {
        return Err(ApiError::NotFound("Agendamento não encontrado".to_string()));
    }
    info!(appointment_id = %id, "Agendamento removido definitivamente");
    Ok(())
}
