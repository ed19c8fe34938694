//! Content-evaluation API binary.
//!
//! # Usage
//!
//! ```bash
//! SCHEMES_DIR=./schemas OPENAI_API_KEY=sk-... cargo run
//! ```

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ceval_api::config::server::{DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_HTTP_TIMEOUT_SECS};
use ceval_api::schema_loading::load_schemas_from_dir;
use ceval_api::{AppState, EvalServer, ServerConfig};
use ceval_engine::{Evaluator, SchemaRegistry};
use ceval_judge::{ConcurrencyConfig, JudgeCallConfig, LlmCaller, OpenAiConfig, OpenAiJudge, RetryConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ceval_api=info,ceval_engine=info,ceval_judge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let schemes_dir = env::var("SCHEMES_DIR").unwrap_or_else(|_| "./schemas".to_string());
    let schemas = load_schemas_from_dir(&PathBuf::from(&schemes_dir)).map_err(|e| {
        tracing::error!(error = %e, dir = %schemes_dir, "failed to load schemas");
        e
    })?;
    let schema_count = schemas.len();

    let registry = Arc::new(SchemaRegistry::build(schemas).map_err(|e| {
        tracing::error!(error = %e, "schema registry failed validation, refusing to start");
        e
    })?);
    tracing::info!(schemas_loaded = schema_count, "schema registry built");

    let openai_config = OpenAiConfig::from_env();
    if openai_config.api_key.is_none() {
        return Err("OPENAI_API_KEY is not set".into());
    }
    let model_name: Arc<str> = openai_config.model.clone().into();
    let judge_timeout = openai_config.timeout;
    let judge = Arc::new(OpenAiJudge::new(openai_config)?);

    let concurrency = ConcurrencyConfig::from_env();
    let caller = Arc::new(LlmCaller::new(judge, concurrency.max_concurrent_llm_calls, RetryConfig::default(), judge_timeout));

    let evaluator = Arc::new(Evaluator::new(registry.clone(), caller, JudgeCallConfig::new(model_name.to_string())));

    let state = AppState::new(registry, evaluator, model_name);

    let host = env::var("API_HOST").unwrap_or_else(|_| DEFAULT_HTTP_HOST.to_string());
    let port: u16 = env::var("API_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_HTTP_PORT);
    let http_addr: SocketAddr = format!("{host}:{port}").parse()?;
    let request_timeout = env::var("HTTP_TIMEOUT_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

    let server_config = ServerConfig::default().with_http_addr(http_addr).with_request_timeout(request_timeout);
    let server = EvalServer::new(server_config, state);

    let shutdown = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        tracing::info!("received shutdown signal");
    };

    server.run_with_shutdown(shutdown).await?;

    Ok(())
}
