//! Request/response DTOs for the HTTP surface (§6.1).

use ceval_core::{EvaluationResult, OutputRange, Scope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListSchemesQuery {
    #[serde(default)]
    pub include_parts: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub context_type: Option<Scope>,
}

#[derive(Debug, Serialize)]
pub struct SchemeSummaryDto {
    pub id: String,
    pub name: String,
    pub kind: &'static str,
    pub dimension: String,
    pub output_range: OutputRange,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub text: String,
    pub schemes: Vec<String>,
    #[serde(default)]
    pub context_type: Option<Scope>,
    #[serde(default)]
    pub include_reasoning: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponseMetadata {
    pub processing_time_ms: u128,
    pub model_used: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub results: Vec<EvaluationResult>,
    pub gates_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_label: Option<String>,
    pub metadata: EvaluateResponseMetadata,
}
