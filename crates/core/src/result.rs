//! `EvaluationResult`: the public, per-schema outcome of a request.

use crate::{SchemeId, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Describes the schema kind and range a result was produced against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScaleInfo {
    OrdinalRubric {
        range: (f64, f64),
        anchors: usize,
    },
    ChecklistAdditive {
        raw_range: String,
        normalized_range: String,
    },
    BinaryGate {
        rules: usize,
    },
    Derived {
        method: String,
        dependencies: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        weights: Option<HashMap<String, f64>>,
    },
}

/// Per-item detail nested under a checklist result's `criteria`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemResult {
    pub level: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Per-rule detail nested under a gate result's `criteria`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRuleResult {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Per-dependency detail nested under a derived result's `criteria`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyCriterion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(flatten)]
    pub result: Box<EvaluationResult>,
}

/// Nested detail attached to a result, shaped per kind. Absent for ordinal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criteria {
    Checklist(HashMap<String, ChecklistItemResult>),
    Gate(HashMap<String, GateRuleResult>),
    Derived(HashMap<String, DependencyCriterion>),
}

/// The settled, per-schema outcome of one evaluation within a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub scheme_id: SchemeId,
    pub dimension: String,
    pub value: Value,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub confidence: f64,
    pub scale_info: ScaleInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criteria>,
    /// Non-empty when this schema's evaluation fell back to a default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Drop `reasoning` and `criteria`, per `include_reasoning=false` (§6.1).
    /// Dropping `criteria` entirely also removes any nested derived-dependency
    /// results, so there is nothing left below this level to strip.
    pub fn without_reasoning(mut self) -> Self {
        self.reasoning = None;
        self.criteria = None;
        self
    }
}
