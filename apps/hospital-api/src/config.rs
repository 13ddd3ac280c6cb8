//! Configuração do serviço a partir de variáveis de ambiente

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use tracing::warn;

use common_auth::token::DEFAULT_TTL_DAYS;
use common_db::DbConfig;

const DEV_JWT_SECRET: &str = "hospital-dev-secret-nao-usar-em-producao";

/// Validade aceita para `TOKEN_TTL_DAYS`, em dias
const TOKEN_TTL_RANGE: RangeInclusive<i64> = 1..=365;

/// Administrador criado na inicialização, caso ainda não exista
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

/// Configuração completa do serviço
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Diretório com o front-end estático, servido como fallback
    pub static_dir: Option<PathBuf>,
    pub max_concurrent_requests: usize,
    /// Origem liberada no CORS; sem valor, qualquer origem é aceita
    pub cors_allow_origin: Option<String>,
    pub bootstrap_admin: Option<AdminBootstrap>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db: DbConfig::default(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_days: DEFAULT_TTL_DAYS,
            static_dir: None,
            max_concurrent_requests: 256,
            cors_allow_origin: None,
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Lê a configuração do ambiente, usando os padrões para o que faltar
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                warn!("JWT_SECRET não definido; usando segredo de desenvolvimento");
                defaults.jwt_secret
            }
            None => return Err(anyhow!("JWT_SECRET é obrigatório")),
        };

        let cors_allow_origin = non_empty_var("CORS_ALLOW_ORIGIN");
        if let Some(origin) = &cors_allow_origin {
            HeaderValue::from_str(origin)
                .with_context(|| format!("CORS_ALLOW_ORIGIN inválido: {}", origin))?;
        }

        let bootstrap_admin = match (non_empty_var("ADMIN_EMAIL"), non_empty_var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("ADMIN_EMAIL e ADMIN_PASSWORD devem ser definidos juntos; ignorando");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            db: DbConfig {
                db_path: non_empty_var("DATABASE_PATH").unwrap_or(defaults.db.db_path),
                max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db.max_connections)?,
            },
            jwt_secret,
            token_ttl_days: checked_ttl(parse_var("TOKEN_TTL_DAYS", defaults.token_ttl_days)?)?,
            static_dir: non_empty_var("STATIC_DIR").map(PathBuf::from),
            max_concurrent_requests: parse_var(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
            cors_allow_origin,
            bootstrap_admin,
        })
    }
}

fn checked_ttl(days: i64) -> Result<i64> {
    if TOKEN_TTL_RANGE.contains(&days) {
        Ok(days)
    } else {
        Err(anyhow!(
            "TOKEN_TTL_DAYS deve estar entre {} e {}: {}",
            TOKEN_TTL_RANGE.start(),
            TOKEN_TTL_RANGE.end(),
            days
        ))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Valor inválido para {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.db.db_path, "data/hospital.db");
        assert_eq!(config.token_ttl_days, 7);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("HOSPITAL_TEST_TTL", "sete");
        assert!(parse_var("HOSPITAL_TEST_TTL", 7i64).is_err());
        std::env::set_var("HOSPITAL_TEST_TTL", " 14 ");
        assert_eq!(parse_var("HOSPITAL_TEST_TTL", 7i64).unwrap(), 14);
        std::env::remove_var("HOSPITAL_TEST_TTL");
        assert_eq!(parse_var("HOSPITAL_TEST_TTL", 7i64).unwrap(), 7);
    }

    #[test]
    fn test_token_ttl_must_be_in_range() {
        assert_eq!(checked_ttl(7).unwrap(), 7);
        assert_eq!(checked_ttl(365).unwrap(), 365);
        assert!(checked_ttl(0).is_err());
        assert!(checked_ttl(-3).is_err());
        assert!(checked_ttl(200_000_000_000).is_err());
    }
}
