//! HTTP surface for the content-evaluation API (§6.1).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use ceval_engine::{Evaluator, SchemaRegistry};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::config::limits::MAX_REQUEST_BODY_BYTES;

pub mod evaluate;
pub mod health;
pub mod schemes;
pub mod types;

/// Shared, process-wide state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SchemaRegistry>,
    pub evaluator: Arc<Evaluator>,
    pub model_name: Arc<str>,
}

impl AppState {
    pub fn new(registry: Arc<SchemaRegistry>, evaluator: Arc<Evaluator>, model_name: impl Into<Arc<str>>) -> Self {
        Self { registry, evaluator, model_name: model_name.into() }
    }
}

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .merge(health::routes())
        .merge(schemes::routes())
        .merge(evaluate::routes())
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
}
