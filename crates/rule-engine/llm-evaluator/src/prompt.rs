//! Prompt Builder (§4.3): renders a system/user prompt pair per schema kind.
//!
//! Each builder sends only what the Judge needs to produce a verdict — never
//! weights, aggregator config, or `output_range` internals, none of which the
//! model can act on usefully and all of which would just be noise in the
//! context window.

use ceval_core::{Anchor, ChecklistItem, GateRule, Scope};

pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Rules whose `scope` doesn't apply to the request's `context_type` are
/// dropped before rendering, never sent to the Judge at all.
fn visible_rules<'a>(rules: &'a [GateRule], context: Scope) -> Vec<&'a GateRule> {
    rules.iter().filter(|r| r.scope.visible_under(context)).collect()
}

pub fn build_gate_prompt(text: &str, rules: &[GateRule], context: Scope) -> RenderedPrompt {
    let visible = visible_rules(rules, context);

    let system = "You are a strict content-policy evaluator. You are given a list of \
        rules and a piece of content. For each rule, decide whether the content \
        triggers it. Respond with a JSON object whose keys are rule ids and whose \
        values are objects of the form {\"triggered\": bool, \"reasoning\": string}. \
        Do not include any text outside the JSON object."
        .to_string();

    let mut user = String::new();
    user.push_str("Rules:\n");
    for rule in &visible {
        user.push_str(&format!(
            "- id: {}\n  description: {}\n  severity: {}\n",
            rule.id, rule.description, rule.severity
        ));
        if let Some(keywords) = &rule.trigger_keywords {
            user.push_str(&format!("  trigger_keywords: {}\n", keywords.join(", ")));
        }
        if let Some(keywords) = &rule.not_trigger_keywords {
            user.push_str(&format!("  not_trigger_keywords: {}\n", keywords.join(", ")));
        }
        if let Some(hint) = &rule.evaluation_hint {
            user.push_str(&format!("  hint: {hint}\n"));
        }
    }
    user.push_str("\nContent:\n");
    user.push_str(text);

    RenderedPrompt { system, user }
}

pub fn build_checklist_prompt(text: &str, items: &[ChecklistItem]) -> RenderedPrompt {
    let system = "You are a content evaluator working through a checklist. For each \
        item, choose the level whose description best matches the content, or \
        \"na\" if the item does not apply. Respond with a JSON object whose keys \
        are item ids and whose values are objects of the form {\"level\": string, \
        \"reasoning\": string}. Do not include any text outside the JSON object."
        .to_string();

    let mut user = String::new();
    user.push_str("Checklist:\n");
    for item in items {
        user.push_str(&format!("- id: {}\n  prompt: {}\n  levels:\n", item.id, item.prompt));
        let mut levels: Vec<_> = item.values.iter().collect();
        levels.sort_by(|a, b| a.0.cmp(b.0));
        for (level, detail) in levels {
            user.push_str(&format!("    {level}: {}\n", detail.description));
        }
        if item.allow_na {
            user.push_str("    na: does not apply to this content\n");
        }
    }
    user.push_str("\nContent:\n");
    user.push_str(text);

    RenderedPrompt { system, user }
}

pub fn build_ordinal_prompt(text: &str, anchors: &[Anchor]) -> RenderedPrompt {
    let system = "You are a content evaluator placing content on a labeled scale. \
        Choose the anchor value that best fits the content. Respond with a JSON \
        object of the form {\"value\": number, \"reasoning\": string, \"confidence\": \
        number between 0 and 1}. Do not include any text outside the JSON object."
        .to_string();

    let mut user = String::new();
    user.push_str("Scale (highest to lowest):\n");
    for anchor in anchors {
        user.push_str(&format!("- {} ({}): {}\n", anchor.value, anchor.label, anchor.criteria_text));
    }
    user.push_str("\nContent:\n");
    user.push_str(text);

    RenderedPrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceval_core::{ChecklistLevel, GateAction};
    use std::collections::HashMap;

    fn rule(id: &str, scope: Scope) -> GateRule {
        GateRule {
            id: id.into(),
            description: "d".into(),
            action: GateAction::Reject,
            reason: "r".into(),
            severity: "low".into(),
            legal_reference: "".into(),
            scope,
            trigger_keywords: None,
            not_trigger_keywords: None,
            evaluation_hint: None,
            confidence: 0.5,
        }
    }

    #[test]
    fn gate_prompt_hides_out_of_scope_rules() {
        let rules = vec![rule("content_only", Scope::Content), rule("platform_only", Scope::Platform)];
        let rendered = build_gate_prompt("hello", &rules, Scope::Content);
        assert!(rendered.user.contains("content_only"));
        assert!(!rendered.user.contains("platform_only"));
    }

    #[test]
    fn checklist_prompt_lists_levels() {
        let items = vec![ChecklistItem {
            id: "clarity".into(),
            prompt: "is it clear".into(),
            weight: 1.0,
            values: HashMap::from([("4".to_string(), ChecklistLevel { score: 1.0, description: "very clear".into() })]),
            allow_na: false,
        }];
        let rendered = build_checklist_prompt("hello", &items);
        assert!(rendered.user.contains("very clear"));
        assert!(!rendered.user.contains("na:"));
    }
}
