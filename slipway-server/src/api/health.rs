//! Health Check Handler

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health - Liveness probe
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
