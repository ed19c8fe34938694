//! Error types for the Judge adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeAdapterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("api error: {0}")]
    Api(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl JudgeAdapterError {
    /// Network issues, rate limits, and 5xx responses are worth retrying;
    /// configuration and parse errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JudgeAdapterError::Network(_)
                | JudgeAdapterError::RateLimit(_)
                | JudgeAdapterError::Server { .. }
                | JudgeAdapterError::Timeout(_)
        )
    }

    pub fn network(msg: impl Into<String>) -> Self {
        JudgeAdapterError::Network(msg.into())
    }

    pub fn rate_limit(msg: impl Into<String>) -> Self {
        JudgeAdapterError::RateLimit(msg.into())
    }

    pub fn server_error(status: u16, msg: impl Into<String>) -> Self {
        JudgeAdapterError::Server {
            status,
            message: msg.into(),
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        JudgeAdapterError::Timeout(msg.into())
    }
}

pub type JudgeAdapterResult<T> = Result<T, JudgeAdapterError>;

impl From<JudgeAdapterError> for ceval_core::CoreError {
    fn from(e: JudgeAdapterError) -> Self {
        if e.is_retryable() {
            ceval_core::CoreError::JudgeTransport(e.to_string())
        } else {
            ceval_core::CoreError::JudgeOutput(e.to_string())
        }
    }
}
