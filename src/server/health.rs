//! Health check endpoint for liveness probes.

use axum::http::StatusCode;

/// Returns 200 with the text "OK" while the server is accepting connections.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
