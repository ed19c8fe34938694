//! HTTP API for the content-evaluation service.
//!
//! Wires the [`ceval_engine`] evaluator and [`ceval_judge`] backend to an
//! axum router exposing `GET /health`, `GET /schemes`, and `POST /evaluate`
//! (§6.1).

pub mod config;
pub mod error;
pub mod rest;
pub mod schema_loading;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use rest::{create_router, AppState};
pub use server::{EvalServer, ServerConfig};
