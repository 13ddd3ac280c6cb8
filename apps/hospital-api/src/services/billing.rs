//! Pagamentos de consultas e seu fluxo de status
//!
//! ```text
//! pending ──► paid ──► refunded
//!    │          ▲
//!    ▼          │
//!  failed ──────┘
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use common_db::error::DbError;
use common_db::models::{Appointment, Payment, PaymentMethod, PaymentStatus};
use common_db::store::payments;

use crate::error::{ApiError, ApiResult};

const TXN_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TXN_SUFFIX_LEN: usize = 9;

/// Identificador `txn_<epoch em ms>_<9 caracteres [a-z0-9]>`
pub fn generate_transaction_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TXN_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..TXN_SUFFIX_CHARSET.len());
            TXN_SUFFIX_CHARSET[idx] as char
        })
        .collect();
    format!("txn_{}_{}", now.timestamp_millis(), suffix)
}

/// Registra um pagamento para o agendamento. Dinheiro e transferência são
/// considerados quitados na criação; os demais métodos ficam pendentes.
pub async fn record_payment(
    pool: &SqlitePool,
    appointment: &Appointment,
    amount: f64,
    method: PaymentMethod,
) -> ApiResult<Payment> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("Valor do pagamento deve ser positivo".to_string()));
    }

    let status = if method.settles_on_creation() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    };

    let now = Utc::now();
    let payment = Payment {
        id: Uuid::new_v4(),
        appointment_id: appointment.id,
        amount,
        status,
        payment_method: method,
        transaction_id: generate_transaction_id(now),
        created_at: now,
        updated_at: now,
        paid_at: None,
    };

    match payments::insert(pool, &payment).await {
        Ok(()) => {}
        Err(DbError::ForeignKeyViolation(_)) => {
            return Err(ApiError::NotFound("Agendamento não encontrado".to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        payment_id = %payment.id,
        appointment_id = %appointment.id,
        amount,
        method = %method,
        status = %status,
        transaction_id = %payment.transaction_id,
        "Pagamento registrado"
    );
    Ok(payment)
}

async fn load(pool: &SqlitePool, id: Uuid) -> ApiResult<Payment> {
    payments::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pagamento não encontrado".to_string()))
}

async fn transition(pool: &SqlitePool, id: Uuid, to: PaymentStatus) -> ApiResult<Payment> {
    let current = load(pool, id).await?;

    if !current.status.can_transition_to(to) {
        return Err(ApiError::Conflict(format!(
            "Transição de pagamento inválida: {} -> {}",
            current.status, to
        )));
    }

    let paid_at = (to == PaymentStatus::Paid).then(Utc::now);
    if !payments::transition(pool, id, current.status, to, paid_at).await? {
        return Err(ApiError::Conflict(
            "Pagamento alterado por outra requisição; tente novamente".to_string(),
        ));
    }

    info!(payment_id = %id, from = %current.status, to = %to, "Status do pagamento alterado");
    load(pool, id).await
}

/// Marca como pago e registra `paid_at`. Repetir a operação não altera o
/// `paid_at` já registrado; pagamentos quitados na criação recebem o seu aqui.
pub async fn settle(pool: &SqlitePool, id: Uuid) -> ApiResult<Payment> {
    let current = load(pool, id).await?;
    if current.status == PaymentStatus::Paid {
        if current.paid_at.is_some() {
            return Ok(current);
        }
        if payments::stamp_paid_at(pool, id, Utc::now()).await? {
            info!(payment_id = %id, "Data de quitação registrada");
        }
        return load(pool, id).await;
    }
    transition(pool, id, PaymentStatus::Paid).await
}

pub async fn refund(pool: &SqlitePool, id: Uuid) -> ApiResult<Payment> {
    transition(pool, id, PaymentStatus::Refunded).await
}

pub async fn mark_failed(pool: &SqlitePool, id: Uuid) -> ApiResult<Payment> {
    transition(pool, id, PaymentStatus::Failed).await
}
