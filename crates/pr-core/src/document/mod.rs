//! JSON documents exchanged with the console, and their compilation into
//! the typed model.
//!
//! Compilation is where every validation error is raised: a document that
//! compiles can be evaluated without further checks.

mod filter;

use serde::{Deserialize, Serialize};

use crate::action::{ArithOp, RuleAction};
use crate::condition::{AtomCondition, Combinator, RuleCondition};
use crate::employee_filter::EmployeeFilter;
use crate::error::EngineError;
use crate::field_map::{FieldMap, FieldMapItem};
use crate::rule::{AtomRule, Rule};
use crate::schema::EmployeeSchema;

pub use filter::compile_filter;

// ---------------------------------------------------------------------------
// Document shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub rule_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub atom_rules: Vec<AtomRuleDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRuleDocument {
    pub condition: RuleConditionDocument,
    pub action: ActionDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConditionDocument {
    pub combinator: String,
    #[serde(default)]
    pub conditions: Vec<AtomConditionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomConditionDocument {
    #[serde(alias = "name", default)]
    pub condition_name: String,
    /// Field name → FilterField document, in authored order.
    #[serde(default)]
    pub filter: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDocument {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
}

/// Field name → FilterField document (or `null` for "no filter").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeFilterDocument(pub serde_json::Map<String, serde_json::Value>);

pub type FieldMapDocument = Vec<FieldMapItem>;

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Validate and compile a rule document.
pub fn compile_rule(doc: &RuleDocument, schema: &EmployeeSchema) -> Result<Rule, EngineError> {
    if doc.rule_name.trim().is_empty() {
        return Err(EngineError::rule("rule_name", "rule name is empty"));
    }
    let atom_rules = doc
        .atom_rules
        .iter()
        .enumerate()
        .map(|(i, atom)| compile_atom_rule(atom, schema, &format!("atom_rules[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rule {
        id: doc.id.as_ref().map(id_string),
        name: doc.rule_name.clone(),
        description: doc.description.clone(),
        atom_rules,
    })
}

/// Validate and compile the export pre-filter. `null` entries are skipped.
pub fn compile_employee_filter(
    doc: &EmployeeFilterDocument,
    schema: &EmployeeSchema,
) -> Result<EmployeeFilter, EngineError> {
    let mut filter = EmployeeFilter::new();
    for (field, raw) in &doc.0 {
        if let Some(f) = compile_filter(field, raw, schema, field)? {
            filter = filter.with(field.clone(), f);
        }
    }
    Ok(filter)
}

pub fn compile_field_map(doc: &[FieldMapItem]) -> Result<FieldMap, EngineError> {
    FieldMap::new(doc.to_vec())
}

fn compile_atom_rule(
    doc: &AtomRuleDocument,
    schema: &EmployeeSchema,
    path: &str,
) -> Result<AtomRule, EngineError> {
    let condition = compile_rule_condition(&doc.condition, schema, &format!("{path}.condition"))?;
    let action = compile_action(&doc.action, &format!("{path}.action"))?;
    Ok(AtomRule::new(condition, action))
}

fn compile_rule_condition(
    doc: &RuleConditionDocument,
    schema: &EmployeeSchema,
    path: &str,
) -> Result<RuleCondition, EngineError> {
    let combinator = parse_combinator(&doc.combinator).ok_or_else(|| {
        EngineError::rule(
            format!("{path}.combinator"),
            format!("unknown combinator {:?}", doc.combinator),
        )
    })?;
    let mut conditions = Vec::with_capacity(doc.conditions.len());
    for (j, cond) in doc.conditions.iter().enumerate() {
        let cpath = format!("{path}.conditions[{j}]");
        let mut atom = AtomCondition::new(cond.condition_name.clone());
        for (field, raw) in &cond.filter {
            let fpath = format!("{cpath}.filter.{field}");
            if let Some(f) = compile_filter(field, raw, schema, &fpath)? {
                atom = atom.with(field.clone(), f);
            }
        }
        conditions.push(atom);
    }
    RuleCondition::new(combinator, conditions).map_err(|detail| EngineError::rule(path, detail))
}

fn parse_combinator(code: &str) -> Option<Combinator> {
    match code.trim().to_ascii_uppercase().as_str() {
        "NONE" => Some(Combinator::None),
        "NOT" => Some(Combinator::Not),
        "AND" => Some(Combinator::And),
        "OR" => Some(Combinator::Or),
        _ => None,
    }
}

fn compile_action(doc: &ActionDocument, path: &str) -> Result<RuleAction, EngineError> {
    if doc.field.trim().is_empty() {
        return Err(EngineError::rule(format!("{path}.field"), "action field is empty"));
    }
    let operator = match doc.operator.trim() {
        "+" => ArithOp::Add,
        "-" => ArithOp::Sub,
        "*" => ArithOp::Mul,
        "/" => ArithOp::Div,
        other => {
            return Err(EngineError::rule(
                format!("{path}.operator"),
                format!("unsupported operator {other:?}"),
            ));
        }
    };
    let value = match &doc.value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| {
        EngineError::rule(
            format!("{path}.value"),
            format!("action value must be a finite number, got {}", doc.value),
        )
    })?;
    Ok(RuleAction::new(doc.field.clone(), operator, value))
}

fn id_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
