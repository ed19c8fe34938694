//! Result Shaper (§4.9): scale_info population and label resolution.

use ceval_core::{LabelMap, OutputRange, ScaleInfo, Value};
use std::collections::HashMap;

pub fn scale_info_ordinal(range: OutputRange, anchors: usize) -> ScaleInfo {
    let (min, max) = match range {
        OutputRange::Numeric { min, max, .. } => (min, max),
        OutputRange::Enumerated { .. } => (0.0, 0.0),
    };
    ScaleInfo::OrdinalRubric {
        range: (min, max),
        anchors,
    }
}

pub fn scale_info_checklist(min: f64, max: f64) -> ScaleInfo {
    ScaleInfo::ChecklistAdditive {
        raw_range: "0.0-1.0".to_string(),
        normalized_range: format!("{min}-{max}"),
    }
}

pub fn scale_info_gate(rules: usize) -> ScaleInfo {
    ScaleInfo::BinaryGate { rules }
}

pub fn scale_info_derived(method: &str, dependencies: usize, weights: Option<HashMap<String, f64>>) -> ScaleInfo {
    ScaleInfo::Derived {
        method: method.to_string(),
        dependencies,
        weights,
    }
}

/// Resolution order per §4.9 and the open question in §9: exact key of the
/// value, then a containing numeric range, then the matched anchor/rule
/// label passed in as `fallback`, then an empty string.
pub fn resolve_label(labels: Option<&LabelMap>, value: Value, fallback: &str) -> String {
    if let Some(map) = labels {
        if let Some(label) = map.resolve(value) {
            return label;
        }
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_exact_then_range_then_fallback() {
        let mut map = HashMap::new();
        map.insert("4".to_string(), "Weitgehend neutral".to_string());
        map.insert("3.5-4.4".to_string(), "Range label".to_string());
        let labels = LabelMap(map);

        assert_eq!(resolve_label(Some(&labels), Value::Int(4), "anchor"), "Weitgehend neutral");
        assert_eq!(resolve_label(Some(&labels), Value::Float(3.7), "anchor"), "Range label");
        assert_eq!(resolve_label(Some(&labels), Value::Float(9.0), "anchor"), "anchor");
        assert_eq!(resolve_label(None, Value::Float(9.0), ""), "");
    }
}
