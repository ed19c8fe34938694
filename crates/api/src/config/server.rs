//! Server configuration constants.
//!
//! Default values for the HTTP server; overridable via the `API_HOST`,
//! `API_PORT`, and `HTTP_TIMEOUT_SECONDS` environment variables read in
//! `main`.

/// Default HTTP server port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default bind host.
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default per-request deadline, covering the full evaluate call including
/// every Judge round trip.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
