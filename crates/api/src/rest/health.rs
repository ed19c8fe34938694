//! `GET /health` (§6.1).

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    schemas_loaded: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", schemas_loaded: state.registry.len() })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
