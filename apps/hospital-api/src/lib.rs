//! Serviço HTTP do hospital: agendamentos, pagamentos e painel administrativo

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

/// Metadados gerados em tempo de compilação
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::state::AppState;

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config
        .cors_allow_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// Monta o roteador completo: API em `/api`, front-end estático opcional e
/// as camadas de proteção, rastreamento, CORS, compressão e limite.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new().nest("/api", routes::api_router());
    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        gate::guard_navigation,
    ))
    .layer(cors_layer(config))
    .layer(CompressionLayer::new())
    .layer(TraceLayer::new_for_http())
    .layer(GlobalConcurrencyLimitLayer::new(
        config.max_concurrent_requests.max(1),
    ))
    .with_state(state)
}
