//! HTTP server for the content-evaluation API.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::server::{DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::rest::{self, AppState};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: format!("{DEFAULT_HTTP_HOST}:{DEFAULT_HTTP_PORT}").parse().unwrap(),
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn with_http_addr(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.http_addr = addr.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// The content-evaluation HTTP server.
pub struct EvalServer {
    config: ServerConfig,
    state: AppState,
}

impl EvalServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> SocketAddr {
        self.config.http_addr
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_with_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
    }

    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.http_addr;
        let router = rest::create_router(self.state, self.config.request_timeout);
        let listener = TcpListener::bind(addr).await?;

        info!("content-evaluation API listening on {}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal).into_future().await?;

        info!("server shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(
            config.http_addr,
            format!("{DEFAULT_HTTP_HOST}:{DEFAULT_HTTP_PORT}").parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::default()
            .with_http_addr("127.0.0.1:9001".parse::<SocketAddr>().unwrap())
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.http_addr, "127.0.0.1:9001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
