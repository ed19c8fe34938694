//! Numeric aggregation for checklist and derived schemas (§4.5, §4.6), gate
//! logic (§4.4), and ordinal resolution (§4.7).

use ceval_core::{
    Anchor, ChecklistAggregator, ChecklistItem, ChecklistItemResult, Condition, ConditionLogic,
    ConditionValue, DependencyCriterion, DerivedMethod, DerivedRule, DerivedValue,
    EvaluationResult, GateAction, GateRule, GateRuleResult, MissingPolicy, Operator,
    OrdinalStrategy, Value,
};
use std::collections::HashMap;

const FLOAT_EPS: f64 = 1e-9;

/// A dependency result resolved by dimension, carrying the weight the
/// referencing rule (if any) assigned to it.
pub struct ResolvedDependency<'a> {
    pub dimension: &'a str,
    pub result: std::sync::Arc<EvaluationResult>,
}

fn values_match(value: Value, cv: &ConditionValue) -> bool {
    match cv {
        ConditionValue::Bool(b) => value.as_bool() == Some(*b),
        ConditionValue::Number(n) => (value.as_f64() - n).abs() < FLOAT_EPS,
        ConditionValue::String(_) => false,
        ConditionValue::List(_) => false,
    }
}

fn evaluate_operator(value: Value, operator: Operator, target: &ConditionValue) -> bool {
    match operator {
        Operator::Eq => values_match(value, target),
        Operator::Ne => !values_match(value, target),
        Operator::Gt => matches!(target, ConditionValue::Number(n) if value.as_f64() > *n),
        Operator::Gte => matches!(target, ConditionValue::Number(n) if value.as_f64() >= *n),
        Operator::Lt => matches!(target, ConditionValue::Number(n) if value.as_f64() < *n),
        Operator::Lte => matches!(target, ConditionValue::Number(n) if value.as_f64() <= *n),
        Operator::In => match target {
            ConditionValue::List(items) => items.iter().any(|item| values_match(value, item)),
            _ => false,
        },
        Operator::NotIn => match target {
            ConditionValue::List(items) => !items.iter().any(|item| values_match(value, item)),
            _ => true,
        },
    }
}

/// Resolve the first listed dependency for each referenced dimension, per
/// the "first one listed in `dependencies` wins" tie-break in §4.5.
fn index_by_dimension<'a>(
    deps: &'a [ResolvedDependency<'a>],
) -> HashMap<&'a str, &'a ResolvedDependency<'a>> {
    let mut index = HashMap::new();
    for dep in deps {
        index.entry(dep.dimension).or_insert(dep);
    }
    index
}

fn conditions_hold(
    conditions: &[Condition],
    logic: ConditionLogic,
    by_dimension: &HashMap<&str, &ResolvedDependency<'_>>,
) -> bool {
    let mut outcomes = conditions.iter().map(|cond| {
        by_dimension
            .get(cond.dimension.as_str())
            .map(|dep| evaluate_operator(dep.result.value, cond.operator, &cond.value))
            .unwrap_or(false)
    });
    match logic {
        ConditionLogic::And => outcomes.all(|ok| ok),
        ConditionLogic::Or => outcomes.any(|ok| ok),
    }
}

pub struct DerivedOutcome {
    pub value: Value,
    pub label: String,
    pub reasoning: String,
    pub confidence: f64,
    pub criteria: HashMap<String, DependencyCriterion>,
}

/// §4.5: evaluate a derived schema's rules in order, falling back to the
/// schema's `default` if none match.
pub fn resolve_derived<'a>(
    rules: &[DerivedRule],
    deps: &'a [ResolvedDependency<'a>],
) -> Option<DerivedOutcome> {
    let by_dimension = index_by_dimension(deps);

    for rule in rules {
        if !conditions_hold(&rule.conditions, rule.condition_logic, &by_dimension) {
            continue;
        }

        let value = match &rule.value {
            DerivedValue::Literal(n) => Value::Float(*n),
            DerivedValue::Method(DerivedMethod::WeightedAverage) => {
                match weighted_average(deps, rule.weights.as_ref()) {
                    Some(v) => Value::Float(v),
                    None => return None,
                }
            }
            DerivedValue::Method(DerivedMethod::Sum) => {
                Value::Float(deps.iter().map(|d| d.result.value.as_f64()).sum())
            }
            DerivedValue::Method(DerivedMethod::Min) => Value::Float(
                deps.iter()
                    .map(|d| d.result.value.as_f64())
                    .fold(f64::INFINITY, f64::min),
            ),
            DerivedValue::Method(DerivedMethod::Max) => Value::Float(
                deps.iter()
                    .map(|d| d.result.value.as_f64())
                    .fold(f64::NEG_INFINITY, f64::max),
            ),
            DerivedValue::Method(DerivedMethod::AndGate) => {
                Value::Bool(deps.iter().all(|d| d.result.value.is_truthy()))
            }
            DerivedValue::Method(DerivedMethod::OrGate) => {
                Value::Bool(deps.iter().any(|d| d.result.value.is_truthy()))
            }
        };

        let criteria = deps
            .iter()
            .map(|dep| {
                let weight = rule
                    .weights
                    .as_ref()
                    .and_then(|w| w.get(dep.dimension))
                    .copied();
                (
                    dep.result.scheme_id.0.clone(),
                    DependencyCriterion {
                        weight,
                        result: Box::new((*dep.result).clone()),
                    },
                )
            })
            .collect();

        return Some(DerivedOutcome {
            value,
            label: rule.label.clone(),
            reasoning: rule.reasoning.clone(),
            confidence: rule.confidence,
            criteria,
        });
    }

    None
}

fn weighted_average(deps: &[ResolvedDependency<'_>], weights: Option<&HashMap<String, f64>>) -> Option<f64> {
    let weights = weights?;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for dep in deps {
        if let Some(&w) = weights.get(dep.dimension) {
            weighted_sum += w * dep.result.value.as_f64();
            total_weight += w;
        }
    }
    if total_weight == 0.0 {
        None
    } else {
        Some(weighted_sum / total_weight)
    }
}

// ---------------------------------------------------------------------------
// Checklist aggregation (§4.6)
// ---------------------------------------------------------------------------

/// One item's judged level and optional reasoning/confidence, as parsed from
/// the Judge's response.
pub struct ChecklistItemJudgment {
    pub level: Option<String>,
    pub reasoning: Option<String>,
    pub confidence: Option<f64>,
}

pub struct ChecklistOutcome {
    pub value: f64,
    pub confidence: f64,
    pub criteria: HashMap<String, ChecklistItemResult>,
}

pub fn aggregate_checklist(
    items: &[ChecklistItem],
    aggregator: &ChecklistAggregator,
    judgments: &HashMap<String, ChecklistItemJudgment>,
) -> ChecklistOutcome {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut confidences = Vec::new();
    let mut criteria = HashMap::new();

    for item in items {
        let judgment = judgments.get(&item.id);
        let level = judgment
            .and_then(|j| j.level.clone())
            .unwrap_or_else(|| "na".to_string());

        let is_na = level == "na" || !item.values.contains_key(&level);
        let score = if is_na {
            match aggregator.missing {
                MissingPolicy::Ignore => None,
                MissingPolicy::Zero => Some(0.0),
            }
        } else {
            item.values.get(&level).map(|lvl| lvl.score)
        };

        if let Some(score) = score {
            weighted_sum += item.weight * score;
            total_weight += item.weight;
        }

        if let Some(conf) = judgment.and_then(|j| j.confidence) {
            confidences.push(conf);
        }

        criteria.insert(
            item.id.clone(),
            ChecklistItemResult {
                level: level.clone(),
                score: score.unwrap_or(0.0),
                reasoning: judgment.and_then(|j| j.reasoning.clone()),
            },
        );
    }

    let mean = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };
    let value = mean * aggregator.scale_factor;

    let confidence = if confidences.is_empty() {
        0.8
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    ChecklistOutcome {
        value,
        confidence,
        criteria,
    }
}

// ---------------------------------------------------------------------------
// Gate logic (§4.4)
// ---------------------------------------------------------------------------

pub struct GateJudgment {
    pub triggered: bool,
    pub reasoning: Option<String>,
}

pub struct GateOutcome {
    pub passed: bool,
    pub reasoning: Option<String>,
    pub confidence: f64,
    pub criteria: HashMap<String, GateRuleResult>,
}

/// Evaluate evaluated rules in declaration order: the first `triggered=true`
/// rule whose `action=reject` determines the outcome. No later rule can
/// flip a failed gate back to pass (Testable Property #9).
pub fn evaluate_gate(
    rules: &[GateRule],
    default_action: GateAction,
    judgments: &HashMap<String, GateJudgment>,
) -> GateOutcome {
    let mut criteria = HashMap::new();
    let mut outcome: Option<(&GateRule, Option<String>)> = None;

    for rule in rules {
        let judgment = judgments.get(&rule.id);
        let triggered = judgment.map(|j| j.triggered).unwrap_or(false);
        criteria.insert(
            rule.id.clone(),
            GateRuleResult {
                triggered,
                reasoning: judgment.and_then(|j| j.reasoning.clone()),
            },
        );

        if outcome.is_none() && triggered && rule.action == GateAction::Reject {
            outcome = Some((rule, judgment.and_then(|j| j.reasoning.clone())));
        }
    }

    match outcome {
        Some((rule, judge_reasoning)) => GateOutcome {
            passed: false,
            reasoning: Some(judge_reasoning.unwrap_or_else(|| rule.reason.clone())),
            confidence: rule.confidence,
            criteria,
        },
        None => GateOutcome {
            passed: default_action == GateAction::Pass,
            reasoning: None,
            confidence: 1.0,
            criteria,
        },
    }
}

// ---------------------------------------------------------------------------
// Ordinal resolution (§4.7)
// ---------------------------------------------------------------------------

pub struct OrdinalOutcome {
    pub value: f64,
    pub label: String,
    pub confidence: f64,
}

/// Both strategies accept the Judge's returned value directly; the
/// difference is which anchor the builder leads with, not the resolution
/// step itself (§4.7).
pub fn resolve_ordinal(
    anchors: &[Anchor],
    _strategy: OrdinalStrategy,
    value: f64,
    confidence: f64,
) -> OrdinalOutcome {
    let label = anchors
        .iter()
        .find(|a| (a.value - value).abs() < FLOAT_EPS)
        .map(|a| a.label.clone())
        .unwrap_or_default();

    OrdinalOutcome {
        value,
        label,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceval_core::{ScaleInfo, SchemeId};
    use std::sync::Arc;

    fn result(dimension: &str, value: Value) -> ResolvedDependency<'static> {
        ResolvedDependency {
            dimension: Box::leak(dimension.to_string().into_boxed_str()),
            result: Arc::new(EvaluationResult {
                scheme_id: SchemeId::new(dimension),
                dimension: dimension.to_string(),
                value,
                label: "x".into(),
                reasoning: None,
                confidence: 1.0,
                scale_info: ScaleInfo::BinaryGate { rules: 0 },
                criteria: None,
                error: None,
            }),
        }
    }

    #[test]
    fn weighted_average_same_value_is_identity() {
        let deps = vec![result("neutrality", Value::Float(4.0)), result("factuality", Value::Float(4.0))];
        let weights: HashMap<String, f64> =
            [("neutrality".to_string(), 2.0), ("factuality".to_string(), 2.5)].into();
        let v = weighted_average(&deps, Some(&weights)).unwrap();
        assert!((v - 4.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_average_matches_spec_example() {
        let deps = vec![result("neutrality", Value::Float(4.0)), result("factuality", Value::Float(5.0))];
        let weights: HashMap<String, f64> =
            [("neutrality".to_string(), 2.0), ("factuality".to_string(), 2.5)].into();
        let v = weighted_average(&deps, Some(&weights)).unwrap();
        assert!((v - 4.5555555555).abs() < 1e-6);
    }

    #[test]
    fn gate_first_reject_short_circuits() {
        let rules = vec![
            GateRule {
                id: "r1".into(),
                description: "d".into(),
                action: GateAction::Reject,
                reason: "first".into(),
                severity: "low".into(),
                legal_reference: "".into(),
                scope: ceval_core::Scope::Both,
                trigger_keywords: None,
                not_trigger_keywords: None,
                evaluation_hint: None,
                confidence: 0.5,
            },
            GateRule {
                id: "r2".into(),
                description: "d".into(),
                action: GateAction::Reject,
                reason: "second".into(),
                severity: "high".into(),
                legal_reference: "".into(),
                scope: ceval_core::Scope::Both,
                trigger_keywords: None,
                not_trigger_keywords: None,
                evaluation_hint: None,
                confidence: 0.9,
            },
        ];
        let mut judgments = HashMap::new();
        judgments.insert("r1".to_string(), GateJudgment { triggered: true, reasoning: None });
        judgments.insert("r2".to_string(), GateJudgment { triggered: true, reasoning: None });

        let outcome = evaluate_gate(&rules, GateAction::Pass, &judgments);
        assert!(!outcome.passed);
        assert_eq!(outcome.reasoning.unwrap(), "first");
    }

    #[test]
    fn checklist_na_ignored_reaches_scaled_max() {
        let items = vec![
            ChecklistItem {
                id: "a".into(),
                prompt: "p".into(),
                weight: 2.0,
                values: [("4".to_string(), ceval_core::ChecklistLevel { score: 1.0, description: "d".into() })].into(),
                allow_na: true,
            },
            ChecklistItem {
                id: "b".into(),
                prompt: "p".into(),
                weight: 1.0,
                values: [("4".to_string(), ceval_core::ChecklistLevel { score: 1.0, description: "d".into() })].into(),
                allow_na: true,
            },
        ];
        let aggregator = ChecklistAggregator {
            strategy: ceval_core::AggregatorStrategy::WeightedMean,
            missing: MissingPolicy::Ignore,
            scale_factor: 5.0,
        };
        let mut judgments = HashMap::new();
        judgments.insert("a".to_string(), ChecklistItemJudgment { level: Some("4".into()), reasoning: None, confidence: None });
        judgments.insert("b".to_string(), ChecklistItemJudgment { level: Some("na".into()), reasoning: None, confidence: None });

        let outcome = aggregate_checklist(&items, &aggregator, &judgments);
        assert!((outcome.value - 5.0).abs() < 1e-9);
        assert_eq!(outcome.confidence, 0.8);
    }
}
