//! Utilitários de teste: banco em memória e registros de exemplo

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

use crate::migrations::run_migrations;
use crate::{init_db_pool, DbConfig};
use crate::models::{Account, Appointment, AppointmentStatus, Doctor, Role, SlotTime};
use crate::store::accounts::{self, NewAccount};
use crate::store::doctors::{self, NewDoctor};

/// Pool com uma única conexão para um banco em memória já migrado
pub async fn memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Banco em arquivo temporário (WAL) com várias conexões, para testes de
/// concorrência. O diretório é removido quando o `TempDir` é descartado.
pub async fn file_pool(max_connections: u32) -> Result<(TempDir, SqlitePool)> {
    let dir = tempdir()?;
    let config = DbConfig {
        db_path: dir.path().join("hospital.db").to_string_lossy().into_owned(),
        max_connections,
    };
    let pool = init_db_pool(&config).await?;
    Ok((dir, pool))
}

pub fn sample_doctor(name: &str, specialty: &str, rating: f64) -> NewDoctor {
    NewDoctor {
        name: name.to_string(),
        specialty: specialty.to_string(),
        experience: 10,
        rating,
        location: "São Paulo, SP".to_string(),
        consultation_fee: 250.0,
        availability: "Amanhã, 14h".to_string(),
        available_slots: vec![
            "10:00 AM".to_string(),
            "11:00 AM".to_string(),
            "02:00 PM".to_string(),
        ],
        is_active: true,
        ..Default::default()
    }
}

pub async fn insert_account(pool: &SqlitePool, email: &str, role: Role) -> Result<Account> {
    let account = accounts::insert(
        pool,
        NewAccount {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "João".to_string(),
            last_name: "Souza".to_string(),
            role,
        },
    )
    .await?;
    Ok(account)
}

/// Cria um paciente e um médico ativo
pub async fn seed_patient_and_doctor(pool: &SqlitePool) -> Result<(Account, Doctor)> {
    let patient = insert_account(pool, &format!("{}@example.com", Uuid::new_v4()), Role::Patient).await?;
    let doctor = doctors::insert(pool, sample_doctor("Dr. Sarah Johnson", "Cardiology", 4.9)).await?;
    Ok((patient, doctor))
}

/// Agendamento agendado, ainda não persistido
pub fn sample_appointment(patient_id: Uuid, doctor: &Doctor, date: NaiveDate, time: &str) -> Appointment {
    let slot = SlotTime::parse(time).unwrap_or(SlotTime {
        label: time.to_string(),
        minutes: 0,
    });
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id: doctor.id,
        date,
        time: slot.label,
        slot_minutes: slot.minutes,
        consultation_fee: doctor.consultation_fee,
        reason: "Consulta de rotina".to_string(),
        notes: None,
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    }
}
