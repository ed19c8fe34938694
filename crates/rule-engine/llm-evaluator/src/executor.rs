//! Concurrency Limiter (§5) and retry wrapper around a `Judge` call (§4.10).
//!
//! A single process-wide semaphore bounds how many Judge calls are in flight
//! at once, regardless of how many requests or schemas are asking for one.
//! Retries happen underneath the semaphore permit: a retried call does not
//! need to re-acquire a slot.

use crate::env_config::RetryConfig;
use ceval_core::{CoreError, Judge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Wraps a `Judge` with a bounded-concurrency, retrying call path.
pub struct LlmCaller {
    judge: Arc<dyn Judge>,
    semaphore: Arc<Semaphore>,
    retry: RetryConfig,
    timeout: Duration,
}

impl LlmCaller {
    pub fn new(judge: Arc<dyn Judge>, max_concurrent: usize, retry: RetryConfig, timeout: Duration) -> Self {
        Self {
            judge,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            retry,
            timeout,
        }
    }

    /// Acquire a permit, call the Judge, retry on transport errors up to
    /// `retry.max_retries` times, and enforce `timeout` per attempt (§5).
    #[instrument(skip(self, system_prompt, user_prompt), fields(model_hint = %self.judge.name()))]
    pub async fn call(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CoreError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed");

        let mut attempt = 0u32;
        loop {
            let call = self.judge.judge(system_prompt, user_prompt, temperature, max_tokens);
            let outcome = tokio::time::timeout(self.timeout, call).await;

            let result = match outcome {
                Ok(inner) => inner,
                Err(_) => Err(CoreError::JudgeTimeout(self.timeout)),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff_for_attempt(attempt);
                    warn!(attempt, ?backoff, error = %err, "retrying judge call");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "judge call failed, not retrying");
                    return Err(err);
                }
            }
        }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FlakyJudge {
        calls: AtomicU32,
        fail_times: u32,
    }

    #[async_trait]
    impl Judge for FlakyJudge {
        async fn judge(&self, _s: &str, _u: &str, _t: f32, _m: u32) -> Result<String, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Err(CoreError::JudgeTransport("flaky".into()))
            } else {
                Ok("ok".into())
            }
        }
    }

    #[tokio::test]
    async fn retries_transport_errors_until_success() {
        let judge = Arc::new(FlakyJudge { calls: AtomicU32::new(0), fail_times: 2 });
        let caller = LlmCaller::new(
            judge.clone(),
            4,
            RetryConfig { max_retries: 2, initial_backoff: Duration::from_millis(1), max_total_backoff: Duration::from_millis(5), multiplier: 2.0 },
            Duration::from_secs(1),
        );
        let result = caller.call("s", "u", 0.0, 10).await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(judge.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let judge = Arc::new(FlakyJudge { calls: AtomicU32::new(0), fail_times: 10 });
        let caller = LlmCaller::new(
            judge.clone(),
            4,
            RetryConfig { max_retries: 2, initial_backoff: Duration::from_millis(1), max_total_backoff: Duration::from_millis(5), multiplier: 2.0 },
            Duration::from_secs(1),
        );
        let result = caller.call("s", "u", 0.0, 10).await;
        assert!(result.is_err());
        assert_eq!(judge.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn bounds_concurrency_to_semaphore_capacity() {
        struct SlowJudge(Arc<AtomicU32>);
        #[async_trait]
        impl Judge for SlowJudge {
            async fn judge(&self, _s: &str, _u: &str, _t: f32, _m: u32) -> Result<String, CoreError> {
                let current = self.0.fetch_add(1, Ordering::SeqCst) + 1;
                assert!(current <= 2, "exceeded semaphore capacity");
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.0.fetch_sub(1, Ordering::SeqCst);
                Ok("ok".into())
            }
        }
        let inflight = Arc::new(AtomicU32::new(0));
        let judge = Arc::new(SlowJudge(inflight));
        let caller = Arc::new(LlmCaller::new(judge, 2, RetryConfig::default(), Duration::from_secs(1)));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let caller = caller.clone();
            handles.push(tokio::spawn(async move { caller.call("s", "u", 0.0, 10).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
    }
}
