//! Livro de pagamentos

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{Payment, PaymentStatus, PaymentView};

const VIEW_SELECT: &str = "SELECT pay.id, pay.appointment_id, pay.amount, pay.status,
        pay.payment_method, pay.transaction_id, pay.created_at, pay.updated_at, pay.paid_at,
        a.date AS appointment_date, a.time AS appointment_time, a.status AS appointment_status,
        a.patient_id, p.first_name AS patient_first_name, p.last_name AS patient_last_name,
        d.name AS doctor_name, d.specialty AS doctor_specialty
    FROM payments pay
    JOIN appointments a ON a.id = pay.appointment_id
    JOIN accounts p ON p.id = a.patient_id
    JOIN doctors d ON d.id = a.doctor_id";

/// Filtros da listagem de pagamentos
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Pagamentos dos agendamentos deste paciente
    pub patient_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

/// Totais do livro de pagamentos
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct LedgerTotals {
    /// Soma dos pagamentos quitados
    pub revenue: f64,
    /// Soma dos pagamentos pendentes
    pub pending_amount: f64,
    pub paid_count: i64,
    pub payment_count: i64,
}

pub async fn insert(pool: &SqlitePool, payment: &Payment) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO payments (id, appointment_id, amount, status, payment_method,
            transaction_id, created_at, updated_at, paid_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payment.id)
    .bind(payment.appointment_id)
    .bind(payment.amount)
    .bind(payment.status.as_str())
    .bind(payment.payment_method.as_str())
    .bind(&payment.transaction_id)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .bind(payment.paid_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(payment)
}

pub async fn find_view_by_id(pool: &SqlitePool, id: Uuid) -> DbResult<Option<PaymentView>> {
    let mut query = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    query.push(" WHERE pay.id = ").push_bind(id);
    let view = query.build_query_as::<PaymentView>().fetch_optional(pool).await?;
    Ok(view)
}

/// Lista pagamentos do mais recente para o mais antigo
pub async fn list(pool: &SqlitePool, filter: &PaymentFilter) -> DbResult<Vec<PaymentView>> {
    let mut query = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    query.push(" WHERE 1 = 1");
    if let Some(patient_id) = filter.patient_id {
        query.push(" AND a.patient_id = ").push_bind(patient_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND pay.status = ").push_bind(status.as_str());
    }
    query.push(" ORDER BY pay.created_at DESC, pay.id DESC");

    let payments = query.build_query_as::<PaymentView>().fetch_all(pool).await?;
    Ok(payments)
}

/// Troca o status se o atual for `from`, opcionalmente registrando `paid_at`.
/// Retorna `false` se o pagamento não estava em `from`.
pub async fn transition(
    pool: &SqlitePool,
    id: Uuid,
    from: PaymentStatus,
    to: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE payments SET status = ?, paid_at = COALESCE(?, paid_at), updated_at = ?
         WHERE id = ? AND status = ?",
    )
    .bind(to.as_str())
    .bind(paid_at)
    .bind(Utc::now())
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Registra `paid_at` em um pagamento quitado que ainda não o tem
pub async fn stamp_paid_at(pool: &SqlitePool, id: Uuid, paid_at: DateTime<Utc>) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE payments SET paid_at = ?, updated_at = ?
         WHERE id = ? AND status = 'paid' AND paid_at IS NULL",
    )
    .bind(paid_at)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn totals(pool: &SqlitePool) -> DbResult<LedgerTotals> {
    let totals = sqlx::query_as::<_, LedgerTotals>(
        "SELECT
            COALESCE(SUM(CASE WHEN status = 'paid' THEN amount END), 0.0) AS revenue,
            COALESCE(SUM(CASE WHEN status = 'pending' THEN amount END), 0.0) AS pending_amount,
            COUNT(CASE WHEN status = 'paid' THEN 1 END) AS paid_count,
            COUNT(*) AS payment_count
         FROM payments",
    )
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

/// Receita quitada por dia UTC em `[from, until)`. Usa `paid_at` e, na
/// ausência dele, a data de criação do pagamento.
pub async fn revenue_by_day(
    pool: &SqlitePool,
    from: NaiveDate,
    until: NaiveDate,
) -> DbResult<Vec<(NaiveDate, f64)>> {
    let rows = sqlx::query_as::<_, (NaiveDate, f64)>(
        "SELECT day, SUM(amount) FROM (
            SELECT date(COALESCE(paid_at, created_at)) AS day, amount
            FROM payments
            WHERE status = 'paid'
         )
         WHERE day >= ? AND day < ?
         GROUP BY day
         ORDER BY day",
    )
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
