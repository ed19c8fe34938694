//! The `Judge` trait: the abstract LLM backend the engine scores text against.
//!
//! Any concrete backend (OpenAI-compatible HTTP, a scripted stub for tests)
//! implements this trait. The engine only ever depends on it through an
//! `Arc<dyn Judge>`.

use crate::error::CoreResult;
use async_trait::async_trait;

/// A synchronous text-in -> JSON-out function, safe for concurrent use.
///
/// Implementations must raise [`crate::CoreError::JudgeTransport`] on
/// network/HTTP failure and [`crate::CoreError::JudgeOutput`] on a response
/// that isn't usable text; the engine classifies both per its failure table.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> CoreResult<String>;

    fn name(&self) -> &str {
        "judge"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Placeholder used when no backend has been configured. Always errors.
#[derive(Debug, Clone, Default)]
pub struct NoOpJudge;

impl NoOpJudge {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Judge for NoOpJudge {
    async fn judge(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> CoreResult<String> {
        Err(crate::error::CoreError::JudgeTransport(
            "no Judge backend configured".into(),
        ))
    }

    fn name(&self) -> &str {
        "no-op"
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_judge_returns_error() {
        let judge = NoOpJudge::new();
        let result = judge.judge("system", "user", 0.0, 100).await;
        assert!(result.is_err());
    }

    #[test]
    fn noop_judge_not_ready() {
        let judge = NoOpJudge::new();
        assert!(!judge.is_ready());
        assert_eq!(judge.name(), "no-op");
    }
}
