use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hospital_api::cli::{Cli, Command};
use hospital_api::config::AppConfig;
use hospital_api::state::AppState;
use hospital_api::{build_router, built_info, seed};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let json = std::env::var("LOG_FORMAT").map_or(false, |v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Falha ao escutar Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Sinal de desligamento recebido, encerrando...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::from_env().context("Configuração inválida")?;
    cli.apply(&mut config);
    let pool = common_db::init_db_pool(&config.db)
        .await
        .context("Falha ao inicializar o banco de dados")?;

    if cli.command() == Command::Seed {
        if seed::seed_sample_data(&pool, Utc::now().date_naive()).await? {
            info!("Carga de exemplo concluída");
        }
        return Ok(());
    }

    if let Some(admin) = &config.bootstrap_admin {
        seed::ensure_admin(&pool, admin).await?;
    }

    let state = AppState::new(pool, &config);
    let app = build_router(state, &config);

    info!(
        version = built_info::PKG_VERSION,
        addr = %config.bind_addr,
        "Servidor do hospital iniciado"
    );

    axum::Server::try_bind(&config.bind_addr)
        .with_context(|| format!("Falha ao escutar em {}", config.bind_addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    info!("Servidor encerrado");
    Ok(())
}
