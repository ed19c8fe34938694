//! Schema Registry: an immutable, startup-validated map from scheme id to
//! [`Schema`], topologically sortable via dependency edges.

use ceval_core::{Schema, SchemaKind, SchemeId, Scope};
use hashbrown::{HashMap, HashSet};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{EngineError, EngineResult};

/// Optional filters for [`SchemaRegistry::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub kind: Option<&'static str>,
    pub include_parts: bool,
    pub context_type: Option<Scope>,
}

#[derive(Debug, Clone)]
pub struct SchemaSummary<'a> {
    pub id: &'a SchemeId,
    pub name: &'a str,
    pub kind: &'static str,
    pub dimension: &'a str,
    pub output_range: &'a ceval_core::OutputRange,
    pub dependencies: &'a [SchemeId],
}

/// In-memory, read-only after construction. Freely shareable across requests.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<SchemeId, Schema>,
    dimension_index: HashMap<String, SchemeId>,
    order: Vec<SchemeId>,
}

impl SchemaRegistry {
    /// Validates every invariant in §3.1: dependency resolution, acyclicity,
    /// dimension resolution for derived rules. Fails fatally and does not
    /// construct a registry on any violation.
    pub fn build(schemas: Vec<Schema>) -> EngineResult<Self> {
        let mut by_id = HashMap::with_capacity(schemas.len());
        let mut order = Vec::with_capacity(schemas.len());
        let mut dimension_index = HashMap::new();

        for schema in schemas {
            if by_id.contains_key(&schema.id) {
                return Err(EngineError::DuplicateScheme(schema.id.0.clone()));
            }
            order.push(schema.id.clone());
            dimension_index.insert(schema.dimension.clone(), schema.id.clone());
            by_id.insert(schema.id.clone(), schema);
        }

        for schema in by_id.values() {
            for dep in &schema.dependencies {
                if !by_id.contains_key(dep) {
                    return Err(EngineError::UnresolvedDependency {
                        scheme: schema.id.0.clone(),
                        dependency: dep.0.clone(),
                    });
                }
            }
            if let SchemaKind::Derived(derived) = &schema.kind {
                let mut producible: HashSet<&str> = schema
                    .dependencies
                    .iter()
                    .filter_map(|dep| by_id.get(dep).map(|s| s.dimension.as_str()))
                    .collect();
                // Transitively reachable via derived dependencies too.
                let mut frontier: Vec<&SchemeId> = schema.dependencies.iter().collect();
                let mut seen: HashSet<&SchemeId> = frontier.iter().copied().collect();
                while let Some(dep_id) = frontier.pop() {
                    if let Some(dep_schema) = by_id.get(dep_id) {
                        producible.insert(dep_schema.dimension.as_str());
                        for nested in &dep_schema.dependencies {
                            if seen.insert(nested) {
                                frontier.push(nested);
                            }
                        }
                    }
                }
                for rule in &derived.rules {
                    for cond in &rule.conditions {
                        if !producible.contains(cond.dimension.as_str()) {
                            return Err(EngineError::UnresolvedDimension {
                                scheme: schema.id.0.clone(),
                                dimension: cond.dimension.clone(),
                            });
                        }
                    }
                }
            }
        }

        Self::check_acyclic(&by_id)?;

        Ok(Self {
            schemas: by_id,
            dimension_index,
            order,
        })
    }

    fn check_acyclic(schemas: &HashMap<SchemeId, Schema>) -> EngineResult<()> {
        let mut graph = DiGraph::<SchemeId, ()>::new();
        let mut node_of: HashMap<SchemeId, NodeIndex> = HashMap::with_capacity(schemas.len());

        for id in schemas.keys() {
            let idx = graph.add_node(id.clone());
            node_of.insert(id.clone(), idx);
        }
        for (id, schema) in schemas {
            let to = node_of[id];
            for dep in &schema.dependencies {
                if let Some(&from) = node_of.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            let node = &graph[cycle.node_id()];
            EngineError::CyclicDependency(node.0.clone())
        })?;

        Ok(())
    }

    pub fn get(&self, id: &SchemeId) -> Option<&Schema> {
        self.schemas.get(id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Resolve a dependency both by id and (for derived-rule matching) by
    /// the dimension its result was tagged with.
    pub fn dimension_owner(&self, dimension: &str) -> Option<&SchemeId> {
        self.dimension_index.get(dimension)
    }

    /// `list` per §4.2: `include_parts=false` hides `*_part[0-9]+` ids;
    /// `context_type` keeps only schemas whose gate rules (directly, or
    /// transitively through derived dependencies) include the requested scope.
    pub fn list(&self, filter: &ListFilter) -> Vec<SchemaSummary<'_>> {
        self.order
            .iter()
            .filter_map(|id| self.schemas.get(id))
            .filter(|s| filter.include_parts || !s.id.is_part())
            .filter(|s| filter.kind.map_or(true, |k| s.kind.name() == k))
            .filter(|s| match filter.context_type {
                None => true,
                Some(ctx) => self.matches_context(s, ctx),
            })
            .map(|s| SchemaSummary {
                id: &s.id,
                name: &s.name,
                kind: s.kind.name(),
                dimension: &s.dimension,
                output_range: &s.output_range,
                dependencies: &s.dependencies,
            })
            .collect()
    }

    fn matches_context(&self, schema: &Schema, ctx: Scope) -> bool {
        if schema
            .gate_scopes()
            .iter()
            .any(|scope| scope.visible_under(ctx))
        {
            return true;
        }
        schema
            .dependencies
            .iter()
            .filter_map(|dep| self.schemas.get(dep))
            .any(|dep| self.matches_context(dep, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceval_core::{
        ConditionLogic, DerivedMethod, DerivedRule, DerivedSchema, DerivedValue, GateAction,
        GateRule, GateSchema, OrdinalSchema, OrdinalStrategy, OutputRange, ValueType,
    };

    fn ordinal(id: &str, dimension: &str) -> Schema {
        Schema {
            id: SchemeId::new(id),
            name: id.to_string(),
            dimension: dimension.to_string(),
            output_range: OutputRange::Numeric {
                min: 1.0,
                max: 5.0,
                value_type: ValueType::Float,
            },
            labels: None,
            default: None,
            dependencies: vec![],
            kind: SchemaKind::Ordinal(OrdinalSchema {
                anchors: vec![],
                strategy: OrdinalStrategy::FirstMatch,
            }),
        }
    }

    fn derived(id: &str, deps: Vec<&str>, conditions_dim: &str) -> Schema {
        Schema {
            id: SchemeId::new(id),
            name: id.to_string(),
            dimension: format!("{id}_dim"),
            output_range: OutputRange::Numeric {
                min: 0.0,
                max: 5.0,
                value_type: ValueType::Float,
            },
            labels: None,
            default: None,
            dependencies: deps.into_iter().map(SchemeId::new).collect(),
            kind: SchemaKind::Derived(DerivedSchema {
                rules: vec![DerivedRule {
                    condition_logic: ConditionLogic::And,
                    conditions: vec![ceval_core::Condition {
                        dimension: conditions_dim.to_string(),
                        operator: ceval_core::Operator::Gte,
                        value: ceval_core::ConditionValue::Number(0.0),
                    }],
                    value: DerivedValue::Method(DerivedMethod::WeightedAverage),
                    label: "x".into(),
                    reasoning: "x".into(),
                    confidence: 1.0,
                    weights: None,
                }],
            }),
        }
    }

    #[test]
    fn rejects_cycle() {
        let mut a = derived("a", vec!["b"], "b_dim");
        a.dimension = "a_dim".into();
        let b = derived("b", vec!["a"], "a_dim");
        let err = SchemaRegistry::build(vec![a, b]).unwrap_err();
        assert!(matches!(err, EngineError::CyclicDependency(_)));
    }

    #[test]
    fn rejects_unresolved_dependency() {
        let a = derived("a", vec!["missing"], "missing_dim");
        let err = SchemaRegistry::build(vec![a]).unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedDependency { .. }));
    }

    #[test]
    fn rejects_unresolved_dimension() {
        let leaf = ordinal("leaf", "leaf_dim");
        let a = derived("a", vec!["leaf"], "not_leaf_dim");
        let err = SchemaRegistry::build(vec![leaf, a]).unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedDimension { .. }));
    }

    #[test]
    fn accepts_valid_graph() {
        let leaf = ordinal("leaf", "leaf_dim");
        let a = derived("a", vec!["leaf"], "leaf_dim");
        let reg = SchemaRegistry::build(vec![leaf, a]).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn include_parts_filters_by_default() {
        let mut visible = ordinal("leaf", "leaf_dim");
        visible.id = SchemeId::new("leaf");
        let mut part = ordinal("leaf_part1", "leaf_part1_dim");
        part.id = SchemeId::new("leaf_part1");
        let reg = SchemaRegistry::build(vec![visible, part]).unwrap();

        let default_filter = ListFilter::default();
        assert_eq!(reg.list(&default_filter).len(), 1);

        let include_all = ListFilter {
            include_parts: true,
            ..Default::default()
        };
        assert_eq!(reg.list(&include_all).len(), 2);
    }

    #[test]
    fn context_filter_keeps_matching_scope() {
        let gate = Schema {
            id: SchemeId::new("gate"),
            name: "gate".into(),
            dimension: "gate_dim".into(),
            output_range: OutputRange::Numeric {
                min: 0.0,
                max: 1.0,
                value_type: ValueType::Boolean,
            },
            labels: None,
            default: None,
            dependencies: vec![],
            kind: SchemaKind::BinaryGate(GateSchema {
                rules: vec![GateRule {
                    id: "r1".into(),
                    description: "d".into(),
                    action: GateAction::Reject,
                    reason: "r".into(),
                    severity: "high".into(),
                    legal_reference: "".into(),
                    scope: Scope::Platform,
                    trigger_keywords: None,
                    not_trigger_keywords: None,
                    evaluation_hint: None,
                    confidence: 1.0,
                }],
                default_action: GateAction::Pass,
                gate_logic: None,
            }),
        };
        let reg = SchemaRegistry::build(vec![gate]).unwrap();

        let content_only = ListFilter {
            context_type: Some(Scope::Content),
            ..Default::default()
        };
        assert!(reg.list(&content_only).is_empty());

        let platform_only = ListFilter {
            context_type: Some(Scope::Platform),
            ..Default::default()
        };
        assert_eq!(reg.list(&platform_only).len(), 1);
    }
}
