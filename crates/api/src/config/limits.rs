//! Centralized size limits and header names for the API.

/// Maximum accepted size for a `POST /evaluate` request body.
///
/// Text submitted for evaluation is embedded verbatim into Judge prompts;
/// this bound keeps a single request from ballooning prompt token usage.
pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Maximum number of scheme ids accepted in a single `POST /evaluate` request.
pub const MAX_SCHEMES_PER_REQUEST: usize = 64;

/// Request ID header name for distributed tracing.
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";
