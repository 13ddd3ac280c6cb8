//! Livro de agendamentos
//!
//! A invariante de horário (um agendamento ativo por médico, dia e horário)
//! é garantida pelo índice único parcial `idx_appointments_active_slot`:
//! `insert` e `set_status` falham com [`DbError::ConstraintViolation`] quando
//! a escrita ocuparia um horário já tomado.
//!
//! [`DbError::ConstraintViolation`]: crate::error::DbError::ConstraintViolation

use chrono::{Days, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{Appointment, AppointmentStatus, AppointmentView, Page, PageRequest, Pagination};

const VIEW_SELECT: &str = "SELECT a.id, a.patient_id, a.doctor_id, a.date, a.time, a.slot_minutes,
        a.consultation_fee, a.reason, a.notes, a.status, a.created_at, a.updated_at,
        p.first_name AS patient_first_name, p.last_name AS patient_last_name,
        p.email AS patient_email, d.name AS doctor_name, d.specialty AS doctor_specialty,
        d.location AS doctor_location
    FROM appointments a
    JOIN accounts p ON p.id = a.patient_id
    JOIN doctors d ON d.id = a.doctor_id";

/// Filtros da listagem de agendamentos
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Dia UTC: casa com `date <= x < date + 1`
    pub date: Option<NaiveDate>,
}

pub async fn insert(pool: &SqlitePool, appointment: &Appointment) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, time, slot_minutes,
            consultation_fee, reason, notes, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(appointment.id)
    .bind(appointment.patient_id)
    .bind(appointment.doctor_id)
    .bind(appointment.date)
    .bind(&appointment.time)
    .bind(appointment.slot_minutes)
    .bind(appointment.consultation_fee)
    .bind(&appointment.reason)
    .bind(&appointment.notes)
    .bind(appointment.status.as_str())
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(appointment)
}

pub async fn find_view_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<AppointmentView>> {
    let mut query = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    query.push(" WHERE a.id = ").push_bind(id);
    let view = query
        .build_query_as::<AppointmentView>()
        .fetch_optional(pool)
        .await?;
    Ok(view)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &AppointmentFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(patient_id) = filter.patient_id {
        qb.push(" AND a.patient_id = ").push_bind(patient_id);
    }
    if let Some(doctor_id) = filter.doctor_id {
        qb.push(" AND a.doctor_id = ").push_bind(doctor_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(date) = filter.date {
        qb.push(" AND a.date >= ").push_bind(date);
        if let Some(next_day) = date.checked_add_days(Days::new(1)) {
            qb.push(" AND a.date < ").push_bind(next_day);
        }
    }
}

/// Lista agendamentos do mais recente para o mais antigo (dia, depois horário)
pub async fn list(
    pool: &SqlitePool,
    filter: &AppointmentFilter,
    page: PageRequest,
) -> DbResult<Page<AppointmentView>> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM appointments a");
    push_filters(&mut count_query, filter);
    let (total,) = count_query.build_query_as::<(i64,)>().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY a.date DESC, a.slot_minutes DESC, a.created_at DESC, a.id DESC LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(page.offset());

    let items = query
        .build_query_as::<AppointmentView>()
        .fetch_all(pool)
        .await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, total),
    })
}

/// Define o status sem verificar o estado anterior; `notes` é opcional
pub async fn set_status(
    pool: &SqlitePool,
    id: Uuid,
    status: AppointmentStatus,
    notes: Option<&str>,
) -> DbResult<Option<Appointment>> {
    let result = sqlx::query(
        "UPDATE appointments SET status = ?, notes = COALESCE(?, notes), updated_at = ?
         WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(notes)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Troca o status apenas se o atual for `from`. Retorna `false` quando o
/// agendamento não existe ou já estava em outro estado.
pub async fn transition_status(
    pool: &SqlitePool,
    id: Uuid,
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE appointments SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(Utc::now())
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remoção definitiva; os pagamentos vinculados são removidos em cascata
pub async fn delete(pool: &SqlitePool, id: Uuid) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Quantidade de agendamentos por dia em `[from, until)`
pub async fn count_by_day(
    pool: &SqlitePool,
    from: NaiveDate,
    until: NaiveDate,
) -> DbResult<Vec<(NaiveDate, i64)>> {
    let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
        "SELECT date, COUNT(*) FROM appointments
         WHERE date >= ? AND date < ?
         GROUP BY date
         ORDER BY date",
    )
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
