//! Linha de comando do serviço

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "hospital-api", version, about = "Serviço HTTP de consultas e pagamentos do hospital", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arquivo SQLite (sobrepõe DATABASE_PATH)
    #[arg(long, global = true)]
    pub database_path: Option<String>,

    /// Endereço de escuta (sobrepõe BIND_ADDR)
    #[arg(long, global = true)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Inicia o servidor HTTP (padrão)
    Serve,
    /// Insere dados de exemplo em um banco vazio e encerra
    Seed,
}

impl Cli {
    /// Comando escolhido; sem subcomando o servidor é iniciado
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    /// Aplica as opções da linha de comando sobre a configuração do ambiente
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.database_path {
            config.db.db_path = path.clone();
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
    }
}
