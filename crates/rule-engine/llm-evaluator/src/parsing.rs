//! Response Parser (§4.8): best-effort JSON extraction from raw Judge output,
//! then typed extraction into the per-kind judgment shapes the aggregator
//! consumes.

use crate::error::{JudgeAdapterError, JudgeAdapterResult};
use serde::Deserialize;
use std::collections::HashMap;

/// Strip a markdown code fence if present, else fall back to the first
/// balanced `{...}` span in the text. Models routinely wrap JSON in
/// ```json ... ``` or prepend a sentence before the object.
pub fn extract_json(raw: &str) -> JudgeAdapterResult<String> {
    let trimmed = raw.trim();

    if let Some(fenced) = extract_fenced(trimmed) {
        return Ok(fenced);
    }

    if let Some(braced) = extract_braced(trimmed) {
        return Ok(braced);
    }

    Err(JudgeAdapterError::Parse(format!(
        "no JSON object found in response: {}",
        truncate(trimmed, 200)
    )))
}

fn extract_fenced(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
    let after_fence = after_fence.strip_prefix('\n').unwrap_or(after_fence);
    let end = after_fence.find("```")?;
    let body = after_fence[..end].trim();
    if body.starts_with('{') {
        Some(body.to_string())
    } else {
        None
    }
}

fn extract_braced(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        &s[..max]
    }
}

fn parse_typed<T: for<'de> Deserialize<'de>>(raw: &str) -> JudgeAdapterResult<T> {
    let json = extract_json(raw)?;
    serde_json::from_str(&json).map_err(|e| JudgeAdapterError::Parse(format!("{e}: {json}")))
}

/// One rule's judged outcome, as parsed from the Judge's gate response.
#[derive(Debug, Clone, Deserialize)]
pub struct GateJudgment {
    pub triggered: bool,
    #[serde(default)]
    pub reasoning: Option<String>,
}

pub fn parse_gate_response(raw: &str) -> JudgeAdapterResult<HashMap<String, GateJudgment>> {
    parse_typed(raw)
}

/// One item's judged level, as parsed from the Judge's checklist response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistItemJudgment {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

pub fn parse_checklist_response(
    raw: &str,
) -> JudgeAdapterResult<HashMap<String, ChecklistItemJudgment>> {
    parse_typed(raw)
}

#[derive(Debug, Deserialize)]
struct RawOrdinalJudgment {
    value: f64,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default = "default_ordinal_confidence")]
    confidence: f64,
}

fn default_ordinal_confidence() -> f64 {
    0.8
}

pub struct OrdinalJudgment {
    pub value: f64,
    pub reasoning: Option<String>,
    pub confidence: f64,
}

pub fn parse_ordinal_response(raw: &str) -> JudgeAdapterResult<OrdinalJudgment> {
    let parsed: RawOrdinalJudgment = parse_typed(raw)?;
    Ok(OrdinalJudgment {
        value: parsed.value,
        reasoning: parsed.reasoning,
        confidence: parsed.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let raw = "Here is my answer:\n```json\n{\"a\": 1}\n```\nThanks.";
        assert_eq!(extract_json(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn extracts_braced_json_without_fence() {
        let raw = "Sure, the result is {\"a\": {\"b\": 1}} as requested.";
        assert_eq!(extract_json(raw).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn errors_when_no_json_present() {
        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn parses_gate_response() {
        let raw = r#"{"r1": {"triggered": true, "reasoning": "because"}}"#;
        let parsed = parse_gate_response(raw).unwrap();
        assert!(parsed["r1"].triggered);
    }

    #[test]
    fn ordinal_response_defaults_confidence() {
        let raw = r#"{"value": 4, "reasoning": "fits"}"#;
        let parsed = parse_ordinal_response(raw).unwrap();
        assert_eq!(parsed.confidence, 0.8);
    }
}
