use axum::{extract::State, http::StatusCode};

use crate::common::AppState;
use crate::error::{AppError, AppResult};

/// Liveness probe
///
/// Returns 200 OK while the process is serving requests. Does not touch the
/// database and is not rate-limited.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is alive"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe
///
/// Pings the database; 503 when storage cannot be reached.
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "health"
)]
pub async fn readyz(State(state): State<AppState>) -> AppResult<StatusCode> {
    state
        .db
        .ping()
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;
    Ok(StatusCode::OK)
}
