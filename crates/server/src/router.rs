//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/check", post(api::check))
        .route("/config", get(api::config))
        .with_state(state)
}
