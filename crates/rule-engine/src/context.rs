//! Request-scoped context threaded through the DAG walker.

use ceval_core::Scope;

/// Everything about a request that influences how a schema is evaluated,
/// independent of which schema is currently being resolved.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub text: String,
    pub context_type: Scope,
    pub include_reasoning: bool,
}

impl RequestContext {
    pub fn new(text: impl Into<String>, context_type: Scope, include_reasoning: bool) -> Self {
        Self {
            text: text.into(),
            context_type,
            include_reasoning,
        }
    }
}
