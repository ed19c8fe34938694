//! Evaluator Core (§4.1): the per-request DAG walker.
//!
//! Given a list of requested scheme ids, resolves each one (recursively
//! resolving its dependencies first), memoizing per scheme id for the
//! lifetime of the request via [`PerRequestCache`]. A schema's own judge
//! call and its dependencies' judge calls may run concurrently across
//! different branches of the DAG; the global [`LlmCaller`] semaphore is what
//! actually bounds fan-out (§5).

use crate::aggregator::{
    aggregate_checklist, evaluate_gate, resolve_derived, resolve_ordinal,
    ChecklistItemJudgment as AggChecklistItemJudgment, GateJudgment as AggGateJudgment, ResolvedDependency,
};
use crate::cache::PerRequestCache;
use crate::context::RequestContext;
use crate::registry::SchemaRegistry;
use ceval_core::{
    Criteria, DependencyCriterion, EvaluationResult, OutputRange, Schema, SchemaKind, SchemeId, Value,
    ValueType,
};
use ceval_judge::{
    build_checklist_prompt, build_gate_prompt, build_ordinal_prompt, parse_checklist_response,
    parse_gate_response, parse_ordinal_response, JudgeCallConfig, LlmCaller,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::shaper::{resolve_label, scale_info_checklist, scale_info_derived, scale_info_gate, scale_info_ordinal};

pub struct Evaluator {
    registry: Arc<SchemaRegistry>,
    caller: Arc<LlmCaller>,
    call_config: JudgeCallConfig,
}

impl Evaluator {
    pub fn new(registry: Arc<SchemaRegistry>, caller: Arc<LlmCaller>, call_config: JudgeCallConfig) -> Self {
        Self { registry, caller, call_config }
    }

    /// Evaluate every requested scheme id, preserving input order in the
    /// output (Testable Property #3) regardless of internal completion order.
    pub async fn evaluate(self: Arc<Self>, ids: &[SchemeId], ctx: &RequestContext) -> Vec<Arc<EvaluationResult>> {
        let cache = Arc::new(PerRequestCache::new());
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(Self::resolve(self.clone(), id.clone(), ctx.clone(), cache.clone()).await);
        }
        results
    }

    fn resolve(this: Arc<Self>, id: SchemeId, ctx: RequestContext, cache: Arc<PerRequestCache>) -> BoxFuture<'static, Arc<EvaluationResult>> {
        async move {
            let compute_this = this.clone();
            let compute_cache = cache.clone();
            let compute_id = id.clone();
            cache
                .get_or_evaluate(&id, move || Self::evaluate_one(compute_this, compute_id, ctx, compute_cache))
                .await
        }
        .boxed()
    }

    #[instrument(skip(self, ctx, cache), fields(scheme = %id))]
    fn evaluate_one(self: Arc<Self>, id: SchemeId, ctx: RequestContext, cache: Arc<PerRequestCache>) -> BoxFuture<'static, Arc<EvaluationResult>> {
        async move {
            let schema = match self.registry.get(&id) {
                Some(s) => s.clone(),
                None => return Arc::new(missing_schema_result(&id)),
            };

            let outcome = match &schema.kind {
                SchemaKind::BinaryGate(gate) => self.evaluate_gate(&schema, &gate.rules, gate.default_action, &ctx).await,
                SchemaKind::Checklist(checklist) => self.evaluate_checklist(&schema, checklist, &ctx).await,
                SchemaKind::Ordinal(ordinal) => self.evaluate_ordinal(&schema, ordinal, &ctx).await,
                SchemaKind::Derived(derived) => {
                    Self::evaluate_derived(self.clone(), &schema, &derived.rules, &ctx, &cache).await
                }
            };

            Arc::new(outcome)
        }
        .boxed()
    }

    async fn evaluate_gate(
        &self,
        schema: &Schema,
        rules: &[ceval_core::GateRule],
        default_action: ceval_core::GateAction,
        ctx: &RequestContext,
    ) -> EvaluationResult {
        let rendered = build_gate_prompt(&ctx.text, rules, ctx.context_type);
        match self
            .caller
            .call(&rendered.system, &rendered.user, self.call_config.temperature, self.call_config.max_tokens)
            .await
            .and_then(|raw| parse_gate_response(&raw).map_err(Into::into))
        {
            Ok(judgments) => {
                let judgments = judgments
                    .into_iter()
                    .map(|(id, j)| (id, AggGateJudgment { triggered: j.triggered, reasoning: j.reasoning }))
                    .collect();
                let outcome = evaluate_gate(rules, default_action, &judgments);
                let value = Value::Bool(outcome.passed);
                EvaluationResult {
                    scheme_id: schema.id.clone(),
                    dimension: schema.dimension.clone(),
                    value,
                    label: resolve_label(schema.labels.as_ref(), value, if outcome.passed { "pass" } else { "reject" }),
                    reasoning: if ctx.include_reasoning { outcome.reasoning.clone() } else { None },
                    confidence: outcome.confidence,
                    scale_info: scale_info_gate(rules.len()),
                    criteria: Some(Criteria::Gate(outcome.criteria)),
                    error: None,
                }
            }
            Err(err) => self.fallback(schema, &err.to_string()),
        }
    }

    async fn evaluate_checklist(&self, schema: &Schema, checklist: &ceval_core::ChecklistSchema, ctx: &RequestContext) -> EvaluationResult {
        let rendered = build_checklist_prompt(&ctx.text, &checklist.items);
        match self
            .caller
            .call(&rendered.system, &rendered.user, self.call_config.temperature, self.call_config.max_tokens)
            .await
            .and_then(|raw| parse_checklist_response(&raw).map_err(Into::into))
        {
            Ok(judgments) => {
                let judgments = judgments
                    .into_iter()
                    .map(|(id, j)| (id, AggChecklistItemJudgment { level: j.level, reasoning: j.reasoning, confidence: j.confidence }))
                    .collect();
                let outcome = aggregate_checklist(&checklist.items, &checklist.aggregator, &judgments);
                let value = Value::Float(outcome.value);
                let (min, max) = match &schema.output_range {
                    OutputRange::Numeric { min, max, .. } => (*min, *max),
                    OutputRange::Enumerated { .. } => (0.0, checklist.aggregator.scale_factor),
                };
                EvaluationResult {
                    scheme_id: schema.id.clone(),
                    dimension: schema.dimension.clone(),
                    value,
                    label: resolve_label(schema.labels.as_ref(), value, ""),
                    reasoning: None,
                    confidence: outcome.confidence,
                    scale_info: scale_info_checklist(min, max),
                    criteria: Some(Criteria::Checklist(outcome.criteria)),
                    error: None,
                }
            }
            Err(err) => self.fallback(schema, &err.to_string()),
        }
    }

    async fn evaluate_ordinal(&self, schema: &Schema, ordinal: &ceval_core::OrdinalSchema, ctx: &RequestContext) -> EvaluationResult {
        let rendered = build_ordinal_prompt(&ctx.text, &ordinal.anchors);
        match self
            .caller
            .call(&rendered.system, &rendered.user, self.call_config.temperature, self.call_config.max_tokens)
            .await
            .and_then(|raw| parse_ordinal_response(&raw).map_err(Into::into))
        {
            Ok(judgment) => {
                let outcome = resolve_ordinal(&ordinal.anchors, ordinal.strategy, judgment.value, judgment.confidence);
                let value = Value::Float(outcome.value);
                EvaluationResult {
                    scheme_id: schema.id.clone(),
                    dimension: schema.dimension.clone(),
                    value,
                    label: resolve_label(schema.labels.as_ref(), value, &outcome.label),
                    reasoning: if ctx.include_reasoning { judgment.reasoning } else { None },
                    confidence: outcome.confidence,
                    scale_info: scale_info_ordinal(schema.output_range.clone(), ordinal.anchors.len()),
                    criteria: None,
                    error: None,
                }
            }
            Err(err) => self.fallback(schema, &err.to_string()),
        }
    }

    async fn evaluate_derived(
        this: Arc<Self>,
        schema: &Schema,
        rules: &[ceval_core::DerivedRule],
        ctx: &RequestContext,
        cache: &Arc<PerRequestCache>,
    ) -> EvaluationResult {
        let mut resolved = Vec::with_capacity(schema.dependencies.len());
        for dep_id in &schema.dependencies {
            let result = Self::resolve(this.clone(), dep_id.clone(), ctx.clone(), cache.clone()).await;
            resolved.push(result);
        }

        let dimensions: Vec<String> = schema
            .dependencies
            .iter()
            .filter_map(|id| this.registry.get(id).map(|s| s.dimension.clone()))
            .collect();
        let deps: Vec<ResolvedDependency> = dimensions
            .iter()
            .zip(resolved.iter())
            .map(|(dim, result)| ResolvedDependency { dimension: dim.as_str(), result: result.clone() })
            .collect();

        match resolve_derived(rules, &deps) {
            Some(outcome) => {
                let criteria: std::collections::HashMap<String, DependencyCriterion> = outcome.criteria;
                let method = rules
                    .iter()
                    .find(|r| r.label == outcome.label)
                    .map(|r| derived_method_name(&r.value))
                    .unwrap_or("literal");
                EvaluationResult {
                    scheme_id: schema.id.clone(),
                    dimension: schema.dimension.clone(),
                    value: outcome.value,
                    label: resolve_label(schema.labels.as_ref(), outcome.value, &outcome.label),
                    reasoning: if ctx.include_reasoning { Some(outcome.reasoning) } else { None },
                    confidence: outcome.confidence,
                    scale_info: scale_info_derived(method, deps.len(), None),
                    criteria: Some(Criteria::Derived(criteria)),
                    error: None,
                }
            }
            None => this.fallback(schema, "no derived rule matched and no default is configured"),
        }
    }

    /// §4.10 / §7: on Judge transport or output failure (after retries and
    /// best-effort repair upstream), fall back to the schema's configured
    /// default. If no default is configured the result carries a zero value
    /// and a non-empty `error`.
    fn fallback(&self, schema: &Schema, error: &str) -> EvaluationResult {
        warn!(scheme = %schema.id, error, "schema evaluation failed, using default");
        match &schema.default {
            Some(default) => EvaluationResult {
                scheme_id: schema.id.clone(),
                dimension: schema.dimension.clone(),
                value: default.value,
                label: default.label.clone(),
                reasoning: Some(default.reasoning.clone()),
                confidence: default.confidence,
                scale_info: default_scale_info(schema),
                criteria: None,
                error: Some(error.to_string()),
            },
            None => EvaluationResult {
                scheme_id: schema.id.clone(),
                dimension: schema.dimension.clone(),
                value: zero_value(&schema.output_range),
                label: "Unbewertet".to_string(),
                reasoning: Some(error.to_string()),
                confidence: 0.0,
                scale_info: default_scale_info(schema),
                criteria: None,
                error: Some(error.to_string()),
            },
        }
    }
}

fn missing_schema_result(id: &SchemeId) -> EvaluationResult {
    EvaluationResult {
        scheme_id: id.clone(),
        dimension: String::new(),
        value: Value::Bool(false),
        label: String::new(),
        reasoning: None,
        confidence: 0.0,
        scale_info: ceval_core::ScaleInfo::BinaryGate { rules: 0 },
        criteria: None,
        error: Some(format!("scheme '{id}' not found")),
    }
}

fn zero_value(range: &OutputRange) -> Value {
    match range {
        OutputRange::Numeric { value_type: ValueType::Boolean, .. } => Value::Bool(false),
        OutputRange::Numeric { value_type: ValueType::Int, .. } => Value::Int(0),
        _ => Value::Float(0.0),
    }
}

fn default_scale_info(schema: &Schema) -> ceval_core::ScaleInfo {
    match &schema.kind {
        SchemaKind::Ordinal(o) => scale_info_ordinal(schema.output_range.clone(), o.anchors.len()),
        SchemaKind::Checklist(c) => scale_info_checklist(0.0, c.aggregator.scale_factor),
        SchemaKind::BinaryGate(g) => scale_info_gate(g.rules.len()),
        SchemaKind::Derived(_) => scale_info_derived("literal", schema.dependencies.len(), None),
    }
}

fn derived_method_name(value: &ceval_core::DerivedValue) -> &'static str {
    match value {
        ceval_core::DerivedValue::Literal(_) => "literal",
        ceval_core::DerivedValue::Method(m) => match m {
            ceval_core::DerivedMethod::WeightedAverage => "weighted_average",
            ceval_core::DerivedMethod::Sum => "sum",
            ceval_core::DerivedMethod::Min => "min",
            ceval_core::DerivedMethod::Max => "max",
            ceval_core::DerivedMethod::AndGate => "and_gate",
            ceval_core::DerivedMethod::OrGate => "or_gate",
        },
    }
}
