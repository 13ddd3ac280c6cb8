use axum::Json;
use serde::Serialize;

use crate::built_info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
        version: built_info::PKG_VERSION,
    })
}
