//! Error types for the evaluation engine.

use thiserror::Error;

use crate::SchemeId;

/// Core errors for the evaluation engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced scheme does not exist in the registry.
    #[error("scheme not found: {0:?}")]
    SchemeNotFound(SchemeId),

    /// Dependency graph contains a cycle.
    #[error("cyclic dependency detected among schemes: {0}")]
    CyclicDependency(String),

    /// A dependency id listed on a scheme does not resolve in the registry.
    #[error("scheme {scheme:?} declares unresolved dependency {dependency:?}")]
    UnresolvedDependency { scheme: SchemeId, dependency: SchemeId },

    /// A derived rule references a dimension no dependency produces.
    #[error("scheme {scheme:?} references dimension '{dimension}' which no dependency produces")]
    UnresolvedDimension { scheme: SchemeId, dimension: String },

    /// Generic schema-shape validation failure, fatal at startup.
    #[error("invalid schema {scheme:?}: {message}")]
    InvalidSchema { scheme: SchemeId, message: String },

    /// Duplicate scheme id during registry construction.
    #[error("duplicate scheme id: {0:?}")]
    DuplicateScheme(SchemeId),

    /// The Judge could not be reached or returned a transport-level failure.
    #[error("judge transport error: {0}")]
    JudgeTransport(String),

    /// The Judge returned a response that could not be interpreted.
    #[error("judge output error: {0}")]
    JudgeOutput(String),

    /// A Judge call did not complete within its deadline.
    #[error("judge call timed out after {0:?}")]
    JudgeTimeout(std::time::Duration),

    /// Serialization/deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all for conditions that should not occur given prior validation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether a failure of this kind should be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::JudgeTransport(_) | CoreError::JudgeTimeout(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

/// Result type alias for `CoreError`.
pub type CoreResult<T> = Result<T, CoreError>;
