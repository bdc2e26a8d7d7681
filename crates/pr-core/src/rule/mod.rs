//! Rules: ordered sequences of (condition, action) pairs.

#[cfg(test)]
mod tests;

use serde::{Serialize, Serializer};

use crate::action::RuleAction;
use crate::category::CategoryResolver;
use crate::condition::RuleCondition;
use crate::error::EngineError;
use crate::record::Record;

/// One condition/action pair; the unit of rule composition.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRule {
    pub condition: RuleCondition,
    pub action: RuleAction,
}

impl AtomRule {
    pub fn new(condition: RuleCondition, action: RuleAction) -> Self {
        Self { condition, action }
    }

    /// `Ok(None)` when the condition does not hold for `record`.
    pub fn apply(&self, record: &Record) -> Result<Option<Record>, EngineError> {
        if !self.condition.matches(record) {
            return Ok(None);
        }
        self.action.apply(record).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// Applied in order; each step sees the previous step's output.
    pub atom_rules: Vec<AtomRule>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            atom_rules: Vec::new(),
        }
    }

    pub fn with_atom(mut self, atom: AtomRule) -> Self {
        self.atom_rules.push(atom);
        self
    }

    /// Fold every atom rule over `record`, chaining outputs.
    ///
    /// A failing action is skipped and reported; later atom rules still run
    /// against the last good state. The input record is never modified.
    pub fn evaluate(&self, record: &Record) -> Evaluation {
        let mut current = record.clone();
        let mut failures = Vec::new();
        for (index, atom) in self.atom_rules.iter().enumerate() {
            match atom.apply(&current) {
                Ok(Some(next)) => current = next,
                Ok(None) => {}
                Err(error) => failures.push(ActionFailure {
                    atom_rule: index,
                    error,
                }),
            }
        }
        Evaluation {
            record: current,
            failures,
        }
    }

    /// Human-readable trace of this rule; see [`crate::display::render`].
    pub fn display(&self, resolver: &dyn CategoryResolver) -> String {
        crate::display::render(self, resolver)
    }
}

/// Result of running a [`Rule`] over one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub record: Record,
    pub failures: Vec<ActionFailure>,
}

/// An action that could not be applied to a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    /// Index of the atom rule within [`Rule::atom_rules`].
    pub atom_rule: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: EngineError,
}

fn serialize_display<S: Serializer>(error: &EngineError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}
