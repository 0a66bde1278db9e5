//! HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run one check. Responds with the workable jobs observed, or a generic
/// failure body; error details only go to the log.
pub async fn check(State(state): State<Arc<AppState>>) -> Response {
    match state.checker.run_once().await {
        Ok(report) => (StatusCode::OK, Json(report.jobs)).into_response(),
        Err(e) => {
            error!(error = %e, "Check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "message": "BAD_REQUEST" })),
            )
                .into_response()
        }
    }
}

pub async fn config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config_summary.clone())
}
