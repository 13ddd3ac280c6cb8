//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite. A versão
//! aplicada fica registrada em `PRAGMA user_version`.

use anyhow::{Context, Result};
use sqlx::{Executor, SqlitePool};
use tracing::{error, info};

/// Lista de migrações SQL a serem aplicadas
pub(crate) const MIGRATIONS: &[&str] = &[
    // 001_initial_schema.sql
    r#"
    -- Contas de acesso (pacientes e administradores)
    CREATE TABLE IF NOT EXISTS accounts (
        id BLOB PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('patient', 'admin')),
        created_at TEXT NOT NULL
    );

    -- Diretório de médicos
    CREATE TABLE IF NOT EXISTS doctors (
        id BLOB PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        specialty TEXT NOT NULL,
        experience INTEGER NOT NULL DEFAULT 0,
        rating REAL NOT NULL DEFAULT 0,
        location TEXT NOT NULL,
        consultation_fee REAL NOT NULL CHECK (consultation_fee >= 0),
        availability TEXT NOT NULL DEFAULT '',
        available_slots TEXT NOT NULL DEFAULT '[]', -- JSON com os horários
        email TEXT UNIQUE,
        phone TEXT,
        education TEXT,
        about TEXT,
        reviews INTEGER NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- Agendamentos
    CREATE TABLE IF NOT EXISTS appointments (
        id BLOB PRIMARY KEY NOT NULL,
        patient_id BLOB NOT NULL,
        doctor_id BLOB NOT NULL,
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        slot_minutes INTEGER NOT NULL,
        consultation_fee REAL NOT NULL CHECK (consultation_fee >= 0),
        reason TEXT NOT NULL,
        notes TEXT,
        status TEXT NOT NULL CHECK (status IN ('scheduled', 'completed', 'cancelled', 'no-show')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES accounts (id) ON DELETE RESTRICT,
        FOREIGN KEY (doctor_id) REFERENCES doctors (id) ON DELETE RESTRICT
    );

    -- Pagamentos
    CREATE TABLE IF NOT EXISTS payments (
        id BLOB PRIMARY KEY NOT NULL,
        appointment_id BLOB NOT NULL,
        amount REAL NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('pending', 'paid', 'refunded', 'failed')),
        payment_method TEXT NOT NULL CHECK (payment_method IN ('cash', 'credit_card', 'bank_transfer', 'insurance')),
        transaction_id TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        paid_at TEXT,
        FOREIGN KEY (appointment_id) REFERENCES appointments (id) ON DELETE CASCADE
    );

    -- Índices para otimização
    CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts (role);
    CREATE INDEX IF NOT EXISTS idx_doctors_active ON doctors (is_active);
    CREATE INDEX IF NOT EXISTS idx_appointments_patient_date ON appointments (patient_id, date);
    CREATE INDEX IF NOT EXISTS idx_appointments_doctor_date ON appointments (doctor_id, date);
    CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments (status);
    CREATE INDEX IF NOT EXISTS idx_payments_appointment_id ON payments (appointment_id);
    CREATE INDEX IF NOT EXISTS idx_payments_status ON payments (status);
    "#,
    // 002_booking_slot_uniqueness.sql
    r#"
    -- Um horário ativo por médico/dia: reservas concorrentes falham na escrita
    CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot
        ON appointments (doctor_id, date, slot_minutes)
        WHERE status IN ('scheduled', 'completed');
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    // Obter a versão atual do banco de dados
    let version: i64 = match sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
    {
        Ok(v) => v,
        Err(e) => {
            // Continuar mesmo assim, pois pode ser a primeira execução
            error!("Erro ao obter versão do banco: {}", e);
            0
        }
    };

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let mut transaction = pool.begin().await.with_context(|| {
            format!("Falha ao iniciar transação para migração {}", migration_version)
        })?;

        (&mut *transaction)
            .execute(*migration_sql)
            .await
            .with_context(|| format!("Falha ao executar migração {}", migration_version))?;

        (&mut *transaction)
            .execute(format!("PRAGMA user_version = {}", migration_version).as_str())
            .await
            .with_context(|| format!("Falha ao atualizar versão para {}", migration_version))?;

        transaction.commit().await.with_context(|| {
            format!("Falha ao confirmar transação para migração {}", migration_version)
        })?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}
