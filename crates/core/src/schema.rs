//! The schema model: the four evaluation kinds and their shared envelope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a schema, stable across requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemeId(pub String);

impl SchemeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `include_parts=false` (the registry default) hides ids matching this.
    pub fn is_part(&self) -> bool {
        static PART_SUFFIX: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new(r"_part[0-9]+$").unwrap());
        PART_SUFFIX.is_match(&self.0)
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SchemeId {
    fn from(s: String) -> Self {
        SchemeId(s)
    }
}

impl From<&str> for SchemeId {
    fn from(s: &str) -> Self {
        SchemeId(s.to_string())
    }
}

/// Scope classification of a gate rule, or of a request's `context_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Content,
    Platform,
    Both,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Both
    }
}

impl Scope {
    /// Whether a rule with this scope is visible under the given request context.
    pub fn visible_under(&self, context: Scope) -> bool {
        match context {
            Scope::Both => true,
            Scope::Content => matches!(self, Scope::Content | Scope::Both),
            Scope::Platform => matches!(self, Scope::Platform | Scope::Both),
        }
    }
}

/// The value type declared by a schema's `output_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    Boolean,
}

/// The declared range of values a schema's result may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputRange {
    Numeric {
        min: f64,
        max: f64,
        value_type: ValueType,
    },
    Enumerated {
        values: Vec<String>,
    },
}

impl OutputRange {
    /// Testable property #1: "in-range".
    pub fn contains(&self, value: crate::Value) -> bool {
        match self {
            OutputRange::Numeric { min, max, value_type } => {
                let ok_type = match value_type {
                    ValueType::Boolean => matches!(value, crate::Value::Bool(_)),
                    _ => matches!(value, crate::Value::Int(_) | crate::Value::Float(_)),
                };
                ok_type && value.as_f64() >= *min && value.as_f64() <= *max
            }
            OutputRange::Enumerated { .. } => true,
        }
    }
}

/// Fallback used when a schema evaluation fails or no rule matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultResult {
    pub value: crate::Value,
    pub label: String,
    pub reasoning: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    0.0
}

/// Either an exact-value or a numeric-range label table (`"3.5-4.4" -> label`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelMap(pub HashMap<String, String>);

impl LabelMap {
    /// Resolution order per the shaper: exact key, then containing range, else `None`.
    pub fn resolve(&self, value: crate::Value) -> Option<String> {
        let exact_key = match value {
            crate::Value::Bool(b) => b.to_string(),
            crate::Value::Int(i) => i.to_string(),
            crate::Value::Float(f) => format_exact(f),
        };
        if let Some(label) = self.0.get(&exact_key) {
            return Some(label.clone());
        }
        let numeric = value.as_f64();
        for (key, label) in &self.0 {
            if let Some((lo, hi)) = parse_range(key) {
                if numeric >= lo && numeric <= hi {
                    return Some(label.clone());
                }
            }
        }
        None
    }
}

fn format_exact(f: f64) -> String {
    if f.fract() == 0.0 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn parse_range(key: &str) -> Option<(f64, f64)> {
    let (lo, hi) = key.split_once('-')?;
    Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
}

// ---------------------------------------------------------------------------
// Ordinal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    pub value: f64,
    pub label: String,
    pub criteria_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalStrategy {
    FirstMatch,
    BestFit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalSchema {
    /// Descending order, as presented to the Judge.
    pub anchors: Vec<Anchor>,
    pub strategy: OrdinalStrategy,
}

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistLevel {
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub prompt: String,
    pub weight: f64,
    pub values: HashMap<String, ChecklistLevel>,
    #[serde(default)]
    pub allow_na: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    Ignore,
    Zero,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistAggregator {
    #[serde(default)]
    pub strategy: AggregatorStrategy,
    pub missing: MissingPolicy,
    pub scale_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorStrategy {
    #[default]
    WeightedMean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistSchema {
    pub items: Vec<ChecklistItem>,
    pub aggregator: ChecklistAggregator,
}

// ---------------------------------------------------------------------------
// Binary gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateAction {
    Reject,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateLogic {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRule {
    pub id: String,
    pub description: String,
    pub action: GateAction,
    pub reason: String,
    pub severity: String,
    pub legal_reference: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub trigger_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub not_trigger_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub evaluation_hint: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSchema {
    pub rules: Vec<GateRule>,
    #[serde(default = "default_pass_action")]
    pub default_action: GateAction,
    #[serde(default)]
    pub gate_logic: Option<GateLogic>,
}

fn default_pass_action() -> GateAction {
    GateAction::Pass
}

// ---------------------------------------------------------------------------
// Derived
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    In,
    NotIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub dimension: String,
    pub operator: Operator,
    pub value: crate::ConditionValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionLogic {
    And,
    Or,
}

impl Default for ConditionLogic {
    fn default() -> Self {
        ConditionLogic::And
    }
}

/// The method used to compute a derived rule's value once its conditions hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivedValue {
    Literal(f64),
    Method(DerivedMethod),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedMethod {
    WeightedAverage,
    Sum,
    Min,
    Max,
    AndGate,
    OrGate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedRule {
    #[serde(default)]
    pub condition_logic: ConditionLogic,
    pub conditions: Vec<Condition>,
    pub value: DerivedValue,
    pub label: String,
    pub reasoning: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub weights: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedSchema {
    pub rules: Vec<DerivedRule>,
}

// ---------------------------------------------------------------------------
// Kind dispatch and the Schema envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaKind {
    Ordinal(OrdinalSchema),
    Checklist(ChecklistSchema),
    BinaryGate(GateSchema),
    Derived(DerivedSchema),
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Ordinal(_) => "ordinal",
            SchemaKind::Checklist(_) => "checklist",
            SchemaKind::BinaryGate(_) => "binary_gate",
            SchemaKind::Derived(_) => "derived",
        }
    }
}

/// An immutable, registry-owned evaluation spec. See the kind-specific
/// payloads above for what distinguishes each variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub id: SchemeId,
    pub name: String,
    /// Free-form tag used by derived rules elsewhere in the registry to
    /// match this schema's result.
    pub dimension: String,
    pub output_range: OutputRange,
    #[serde(default)]
    pub labels: Option<LabelMap>,
    #[serde(default)]
    pub default: Option<DefaultResult>,
    #[serde(default)]
    pub dependencies: Vec<SchemeId>,
    #[serde(flatten)]
    pub kind: SchemaKind,
}

impl Schema {
    pub fn requires_judge(&self) -> bool {
        !matches!(self.kind, SchemaKind::Derived(_))
    }

    /// Every scope present among this schema's (or, if derived, its
    /// transitively-depended-on) gate rules. Used by the registry's
    /// `context_type` filter.
    pub fn gate_scopes(&self) -> Vec<Scope> {
        match &self.kind {
            SchemaKind::BinaryGate(gate) => gate.rules.iter().map(|r| r.scope).collect(),
            _ => Vec::new(),
        }
    }
}
