//! Proteção de navegação para as seções `/admin` e `/patient`
//!
//! Só o cookie de sessão é considerado; rotas `/api` fazem a própria
//! verificação pelo extrator de sessão.

use axum::extract::State;
use axum::http::header::COOKIE;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use common_auth::gate::{self, GateDecision, LOGIN_PATH};

use crate::state::AppState;

/// Destino do redirecionamento, com o caminho original em `callbackUrl`
pub fn login_redirect_target(callback: &str) -> String {
    match serde_urlencoded::to_string([("callbackUrl", callback)]) {
        Ok(query) => format!("{}?{}", LOGIN_PATH, query),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

pub async fn guard_navigation<B>(
    State(state): State<AppState>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let path = request.uri().path();
    if path == "/api" || path.starts_with("/api/") {
        return next.run(request).await;
    }

    let claims = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(gate::session_cookie)
        .and_then(|token| state.tokens.verify(token).ok());

    match gate::evaluate(path, claims.as_ref()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin { callback } => {
            debug!(path = %callback, "Navegação sem sessão válida; redirecionando para login");
            Redirect::temporary(&login_redirect_target(&callback)).into_response()
        }
    }
}
