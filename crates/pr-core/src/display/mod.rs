//! Human-readable trace of a compiled rule.
//!
//! [`render`] is pure: the same rule and resolver always produce
//! byte-identical text, so the console can re-render on every edit and diff
//! the output.

mod format;
mod render;

use crate::category::CategoryResolver;
use crate::condition::Combinator;
use crate::rule::Rule;

pub use format::{format_action, format_filter};

/// Structured explanation of a [`Rule`]; `Display` renders the text form.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExplanation {
    pub name: String,
    pub id: Option<String>,
    pub description: String,
    pub atom_rules: Vec<AtomRuleExpl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomRuleExpl {
    pub combinator: Combinator,
    pub conditions: Vec<ConditionExpl>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpl {
    pub name: String,
    pub filters: Vec<String>,
}

pub fn explain_rule(rule: &Rule, resolver: &dyn CategoryResolver) -> RuleExplanation {
    let atom_rules = rule
        .atom_rules
        .iter()
        .map(|atom| AtomRuleExpl {
            combinator: atom.condition.combinator(),
            conditions: atom
                .condition
                .conditions()
                .iter()
                .map(|c| ConditionExpl {
                    name: c.name.clone(),
                    filters: c
                        .filter
                        .iter()
                        .map(|(field, f)| format_filter(field, f, resolver))
                        .collect(),
                })
                .collect(),
            action: format_action(&atom.action),
        })
        .collect();

    RuleExplanation {
        name: rule.name.clone(),
        id: rule.id.clone(),
        description: rule.description.clone(),
        atom_rules,
    }
}

/// Render `rule` as text.
pub fn render(rule: &Rule, resolver: &dyn CategoryResolver) -> String {
    explain_rule(rule, resolver).to_string()
}
