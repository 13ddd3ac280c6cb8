//! Modelos de dados compartilhados entre aplicações
//!
//! Este módulo define as estruturas de dados principais do sistema hospitalar:
//! contas, médicos, agendamentos e pagamentos.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use std::str::FromStr;
use uuid::Uuid;

/// Converte uma coluna textual em enum, reportando valores desconhecidos
/// como erro de decodificação (mesmo formato usado pelo SQLx).
fn decode_text_column<T: FromStr>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|_| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Valor inválido para {}: {}", column, raw),
        )),
    })
}

/// Valor textual que não corresponde a nenhuma variante conhecida
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "valor desconhecido: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Gera `as_str`, `Display` e `FromStr` para enums persistidos como texto
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Contas
// ---------------------------------------------------------------------------

/// Papel de uma conta no sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Admin,
}

text_enum!(Role {
    Patient => "patient",
    Admin => "admin",
});

/// Conta de acesso (paciente ou administrador)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    /// Email único, armazenado em minúsculas
    pub email: String,
    /// Hash Argon2 no formato PHC; nunca sai da API
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl FromRow<'_, SqliteRow> for Account {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: decode_text_column(row, "role")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Paciente com resumo do histórico de consultas (visão administrativa)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientOverview {
    #[serde(flatten)]
    pub account: Account,
    pub appointment_count: i64,
    pub last_visit: Option<NaiveDate>,
}

impl FromRow<'_, SqliteRow> for PatientOverview {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            account: Account::from_row(row)?,
            appointment_count: row.try_get("appointment_count")?,
            last_visit: row.try_get("last_visit")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Médicos
// ---------------------------------------------------------------------------

/// Horários atribuídos a médicos cadastrados sem agenda explícita
pub const DEFAULT_SLOTS: [&str; 4] = ["09:00 AM", "10:00 AM", "02:00 PM", "04:00 PM"];

/// Perfil de um médico
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    /// Anos de experiência
    pub experience: i64,
    pub rating: f64,
    pub location: String,
    pub consultation_fee: f64,
    /// Texto livre de disponibilidade ("Amanhã, 14h")
    pub availability: String,
    /// Rótulos de horário reserváveis, em ordem ("10:00 AM")
    pub available_slots: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Option<String>,
    pub about: Option<String>,
    pub reviews: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Procura o rótulo canônico do médico para o horário informado.
    ///
    /// Retorna `None` se o horário não pertence à agenda. Médicos sem agenda
    /// configurada aceitam qualquer horário válido.
    pub fn resolve_slot(&self, requested: SlotTime) -> Option<SlotTime> {
        if self.available_slots.is_empty() {
            return Some(requested);
        }
        self.available_slots
            .iter()
            .filter_map(|label| SlotTime::parse(label))
            .find(|slot| slot.minutes == requested.minutes)
    }
}

impl FromRow<'_, SqliteRow> for Doctor {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let slots: Json<Vec<String>> = row.try_get("available_slots")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            specialty: row.try_get("specialty")?,
            experience: row.try_get("experience")?,
            rating: row.try_get("rating")?,
            location: row.try_get("location")?,
            consultation_fee: row.try_get("consultation_fee")?,
            availability: row.try_get("availability")?,
            available_slots: slots.0,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            education: row.try_get("education")?,
            about: row.try_get("about")?,
            reviews: row.try_get("reviews")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Horário de consulta: rótulo exibido e minutos desde a meia-noite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTime {
    pub label: String,
    pub minutes: i64,
}

impl SlotTime {
    /// Aceita "10:00 AM", "9:30 pm" ou "14:00"
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%I:%M %p")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .ok()?;
        Some(Self {
            label: trimmed.to_string(),
            minutes: i64::from(time.hour() * 60 + time.minute()),
        })
    }
}

// ---------------------------------------------------------------------------
// Agendamentos
// ---------------------------------------------------------------------------

/// Status possíveis de um agendamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    /// Estado inicial de toda reserva
    Scheduled,
    Completed,
    Cancelled,
    /// Paciente não compareceu
    NoShow,
}

text_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no-show",
});

impl AppointmentStatus {
    /// Status que ocupam o horário do médico
    pub fn holds_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Completed)
    }
}

/// Representa uma consulta/agendamento
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Dia da consulta (UTC)
    pub date: NaiveDate,
    /// Rótulo do horário conforme a agenda do médico
    pub time: String,
    #[serde(skip)]
    pub slot_minutes: i64,
    /// Valor copiado do médico no momento da reserva
    pub consultation_fee: f64,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Appointment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            doctor_id: row.try_get("doctor_id")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            slot_minutes: row.try_get("slot_minutes")?,
            consultation_fee: row.try_get("consultation_fee")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
            status: decode_text_column(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Dados resumidos do paciente embutidos nas listagens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Dados resumidos do médico embutidos nas listagens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub location: String,
}

/// Agendamento com paciente e médico resolvidos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: PatientSummary,
    pub doctor: DoctorSummary,
}

impl FromRow<'_, SqliteRow> for AppointmentView {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let appointment = Appointment::from_row(row)?;
        Ok(Self {
            patient: PatientSummary {
                id: appointment.patient_id,
                first_name: row.try_get("patient_first_name")?,
                last_name: row.try_get("patient_last_name")?,
                email: row.try_get("patient_email")?,
            },
            doctor: DoctorSummary {
                id: appointment.doctor_id,
                name: row.try_get("doctor_name")?,
                specialty: row.try_get("doctor_specialty")?,
                location: row.try_get("doctor_location")?,
            },
            appointment,
        })
    }
}

// ---------------------------------------------------------------------------
// Pagamentos
// ---------------------------------------------------------------------------

/// Status de um pagamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

text_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
    Failed => "failed",
});

impl PaymentStatus {
    /// Transições permitidas no ciclo de vida de um pagamento
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Failed, Paid) | (Pending, Failed) | (Paid, Refunded)
        )
    }
}

/// Forma de pagamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    BankTransfer,
    Insurance,
}

text_enum!(PaymentMethod {
    Cash => "cash",
    CreditCard => "credit_card",
    BankTransfer => "bank_transfer",
    Insurance => "insurance",
});

impl PaymentMethod {
    /// Dinheiro e transferência são considerados quitados no registro
    pub fn settles_on_creation(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::BankTransfer)
    }
}

/// Transação financeira vinculada a um agendamento
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Identificador único no formato `txn_<timestamp>_<aleatório>`
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl FromRow<'_, SqliteRow> for Payment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            appointment_id: row.try_get("appointment_id")?,
            amount: row.try_get("amount")?,
            status: decode_text_column(row, "status")?,
            payment_method: decode_text_column(row, "payment_method")?,
            transaction_id: row.try_get("transaction_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            paid_at: row.try_get("paid_at")?,
        })
    }
}

/// Resumo do agendamento embutido nas listagens de pagamentos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_specialty: String,
}

/// Pagamento com o agendamento resolvido
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub appointment: PaymentAppointment,
}

impl FromRow<'_, SqliteRow> for PaymentView {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let payment = Payment::from_row(row)?;
        let first_name: String = row.try_get("patient_first_name")?;
        let last_name: String = row.try_get("patient_last_name")?;
        Ok(Self {
            appointment: PaymentAppointment {
                id: payment.appointment_id,
                date: row.try_get("appointment_date")?,
                time: row.try_get("appointment_time")?,
                status: decode_text_column(row, "appointment_status")?,
                patient_id: row.try_get("patient_id")?,
                patient_name: format!("{} {}", first_name, last_name),
                doctor_name: row.try_get("doctor_name")?,
                doctor_specialty: row.try_get("doctor_specialty")?,
            },
            payment,
        })
    }
}

// ---------------------------------------------------------------------------
// Paginação
// ---------------------------------------------------------------------------

/// Página solicitada (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// Metadados de paginação devolvidos junto com cada página
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Uma página de resultados
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
