//! Common DB - Biblioteca compartilhada de persistência do sistema hospitalar
//!
//! Esta biblioteca fornece:
//! - Modelos de dados (contas, médicos, agendamentos, pagamentos)
//! - Migrações automáticas do banco de dados
//! - Consultas SQL por tabela ([`store`])
//! - Pool de conexão SQLite

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub mod error;
pub mod migrations;
pub mod models;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

/// Configuração da conexão com o banco de dados
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Caminho para o arquivo SQLite
    pub db_path: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: "data/hospital.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Inicializa o pool de conexões e aplica as migrações pendentes
pub async fn init_db_pool(config: &DbConfig) -> Result<SqlitePool> {
    let db_path = Path::new(&config.db_path);

    // Verifica se o diretório pai existe
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .context("Falha ao criar diretório para banco de dados")?;
        }
    }

    let connection_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .pragma("synchronous", "NORMAL");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connection_options)
        .await
        .context("Falha ao conectar ao banco de dados SQLite")?;

    migrations::run_migrations(&pool)
        .await
        .context("Falha ao aplicar migrações")?;

    info!("Banco de dados inicializado com sucesso: {}", config.db_path);
    Ok(pool)
}
