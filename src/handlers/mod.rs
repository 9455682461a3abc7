//! HTTP handlers
//!
//! Controllers for the two resources. Each validates its input through the typed
//! extractors in `crate::extract`, calls one or more use cases and maps the outcome to
//! a status code. Errors are returned as `ApiError` and rendered centrally.
//! Authentication and the teacher check happen in middleware before these run.

pub mod posts;
pub mod users;

/// GET / and GET /health. Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
