//! Environment-sourced configuration (§6.3).
//!
//! Recognized keys: `OPENAI_API_KEY` (required; the Judge rejects calls if
//! absent), `OPENAI_MODEL`, `OPENAI_BASE_URL`, `MAX_CONCURRENT_LLM_CALLS`,
//! `OPENAI_TIMEOUT_SECONDS`.

use std::env;
use std::time::Duration;

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Configuration for the OpenAI-compatible Judge backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());

        if let Ok(v) = env::var("OPENAI_MODEL") {
            config.model = v;
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_TIMEOUT_SECONDS") {
            if let Ok(secs) = v.parse::<u64>() {
                config.timeout = Duration::from_secs(secs);
            }
        }

        config
    }
}

/// Global concurrency cap shared by every inflight request (§5).
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyConfig {
    pub max_concurrent_llm_calls: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_llm_calls: 20,
        }
    }
}

impl ConcurrencyConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = env::var("MAX_CONCURRENT_LLM_CALLS") {
            if let Ok(n) = v.parse::<usize>() {
                if n > 0 {
                    config.max_concurrent_llm_calls = n;
                }
            }
        }
        config
    }
}

/// Exponential backoff for retrying a failed Judge call (§4.10: N=2 retries).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_total_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_total_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms =
            self.initial_backoff.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = backoff_ms.min(self.max_total_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff_for_attempt(0), Duration::from_millis(200));
        assert_eq!(retry.backoff_for_attempt(1), Duration::from_millis(400));
        assert_eq!(retry.backoff_for_attempt(10), retry.max_total_backoff);
    }
}
