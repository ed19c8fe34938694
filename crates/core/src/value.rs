//! Dynamic value type shared by schema results and derived-rule conditions.

use serde::{Deserialize, Serialize};

/// A scored value: every schema kind settles on one of these three shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Truthiness used by `and_gate`/`or_gate` derived rules.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce to `f64` for numeric aggregation; booleans become 1.0/0.0.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
        }
    }

    pub fn to_json(self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// A literal appearing on the right-hand side of a derived-rule condition.
/// Broader than `Value` because conditions may compare against string sets
/// (`in`/`not_in` over an enumerated `output_range`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ConditionValue>),
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Float(0.1).is_truthy());
    }

    #[test]
    fn ordering_cross_type() {
        assert!(Value::Int(5) > Value::Float(3.0));
        assert!(Value::Bool(true) > Value::Bool(false));
    }

    #[test]
    fn to_json_roundtrip_shape() {
        assert_eq!(Value::Int(4).to_json(), serde_json::json!(4));
        assert_eq!(Value::Bool(true).to_json(), serde_json::json!(true));
    }
}
