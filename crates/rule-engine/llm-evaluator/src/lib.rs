//! OpenAI-compatible Judge backend for the content-evaluation engine.
//!
//! Provides the concurrency-bounded, retrying call path (`LlmCaller`), the
//! per-kind prompt builders, and the best-effort JSON response parser that
//! together turn a schema and a request's text into a typed judgment.

mod config;
mod env_config;
mod error;
mod executor;
mod parsing;
mod prompt;

#[cfg(feature = "openai")]
mod openai;

pub use config::JudgeCallConfig;
pub use env_config::{ConcurrencyConfig, OpenAiConfig, RetryConfig};
pub use error::{JudgeAdapterError, JudgeAdapterResult};
pub use executor::LlmCaller;
pub use parsing::{
    extract_json, parse_checklist_response, parse_gate_response, parse_ordinal_response,
    ChecklistItemJudgment, GateJudgment, OrdinalJudgment,
};
pub use prompt::{build_checklist_prompt, build_gate_prompt, build_ordinal_prompt, RenderedPrompt};

#[cfg(feature = "openai")]
pub use openai::OpenAiJudge;
