//! Estado compartilhado entre os handlers

use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Duration;
use sqlx::SqlitePool;

use common_auth::TokenIssuer;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let tokens = TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            Duration::days(config.token_ttl_days),
        );
        Self {
            pool,
            tokens: Arc::new(tokens),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
