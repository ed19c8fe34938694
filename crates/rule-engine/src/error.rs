//! Error types for the evaluation engine crate.

use ceval_core::SchemeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cyclic dependency detected: {0}")]
    CyclicDependency(String),

    #[error("scheme '{scheme}' declares unresolved dependency '{dependency}'")]
    UnresolvedDependency { scheme: String, dependency: String },

    #[error("scheme '{scheme}' references dimension '{dimension}' produced by no dependency")]
    UnresolvedDimension { scheme: String, dimension: String },

    #[error("duplicate scheme id: {0}")]
    DuplicateScheme(String),

    #[error("invalid schema '{scheme}': {message}")]
    InvalidSchema { scheme: String, message: String },

    #[error("scheme not found: {0}")]
    SchemeNotFound(SchemeId),

    #[error("core error: {0}")]
    Core(#[from] ceval_core::CoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
