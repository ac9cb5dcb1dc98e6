// GET handlers and the read-only guard

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;

/// Service name and version from Cargo.toml at build time.
const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /: liveness.
pub(super) async fn root_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "online",
        "mode": "read-only",
    }))
}

/// GET /stats: one fresh snapshot per request (pays the CPU sampling interval).
pub(super) async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.source.collect().await)
}

/// GET /version: service name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// Rejects every method except GET with 405.
pub(super) async fn read_only(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        tracing::debug!(method = %request.method(), uri = %request.uri(), "rejected non-GET request");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "detail": "Read-Only API: Method Not Allowed",
            })),
        )
            .into_response();
    }
    next.run(request).await
}
