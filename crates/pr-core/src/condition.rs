use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::FilterField;
use crate::record::Record;

/// Logical operator joining atom conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    None,
    Not,
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::None => "NONE",
            Combinator::Not => "NOT",
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AtomCondition
// ---------------------------------------------------------------------------

/// A named conjunction of per-field filters, in authored order.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomCondition {
    pub name: String,
    pub filter: Vec<(String, FilterField)>,
}

impl AtomCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: Vec::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, filter: FilterField) -> Self {
        self.filter.push((field.into(), filter));
        self
    }

    /// Every filter must hold. A field the record lacks (or holds as
    /// `null`) fails its filter regardless of the condition code. An empty
    /// filter list matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        self.filter
            .iter()
            .all(|(field, f)| record.get(field).is_some_and(|v| f.matches(v)))
    }
}

// ---------------------------------------------------------------------------
// RuleCondition
// ---------------------------------------------------------------------------

/// A combinator applied over atom conditions.
///
/// `None` and `Not` wrap exactly one condition by construction; the
/// "more than one condition under NONE/NOT" shape is rejected by
/// [`RuleCondition::new`] and cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    None(AtomCondition),
    Not(AtomCondition),
    And(Vec<AtomCondition>),
    Or(Vec<AtomCondition>),
}

impl RuleCondition {
    pub fn new(combinator: Combinator, mut conditions: Vec<AtomCondition>) -> Result<Self, String> {
        match combinator {
            Combinator::None | Combinator::Not => {
                if conditions.len() != 1 {
                    return Err(format!(
                        "combinator {combinator} requires exactly one condition, got {}",
                        conditions.len()
                    ));
                }
                let only = conditions.remove(0);
                Ok(if combinator == Combinator::None {
                    RuleCondition::None(only)
                } else {
                    RuleCondition::Not(only)
                })
            }
            Combinator::And => Ok(RuleCondition::And(conditions)),
            Combinator::Or => Ok(RuleCondition::Or(conditions)),
        }
    }

    pub fn combinator(&self) -> Combinator {
        match self {
            RuleCondition::None(_) => Combinator::None,
            RuleCondition::Not(_) => Combinator::Not,
            RuleCondition::And(_) => Combinator::And,
            RuleCondition::Or(_) => Combinator::Or,
        }
    }

    pub fn conditions(&self) -> &[AtomCondition] {
        match self {
            RuleCondition::None(c) | RuleCondition::Not(c) => std::slice::from_ref(c),
            RuleCondition::And(cs) | RuleCondition::Or(cs) => cs,
        }
    }

    /// `And([])` is vacuously true, `Or([])` vacuously false.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RuleCondition::None(c) => c.matches(record),
            RuleCondition::Not(c) => !c.matches(record),
            RuleCondition::And(cs) => cs.iter().all(|c| c.matches(record)),
            RuleCondition::Or(cs) => cs.iter().any(|c| c.matches(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CmpOp, ComparableFilter, StringCondition};
    use crate::record::Value;

    fn record() -> Record {
        Record::new(
            "1",
            [
                ("department", Value::str("Sales")),
                ("hours_worked", Value::Number(45.0)),
            ],
        )
    }

    fn sales() -> AtomCondition {
        AtomCondition::new("sales").with(
            "department",
            FilterField::string("sales", StringCondition::Eq, false),
        )
    }

    fn part_time() -> AtomCondition {
        AtomCondition::new("part_time").with(
            "hours_worked",
            FilterField::comparable(ComparableFilter::single(CmpOp::Lt, 20.0)),
        )
    }

    #[test]
    fn atom_condition_is_conjunction() {
        let both = sales().with(
            "hours_worked",
            FilterField::comparable(ComparableFilter::single(CmpOp::Gt, 40.0)),
        );
        assert!(both.matches(&record()));
        let mismatch = sales().with(
            "hours_worked",
            FilterField::comparable(ComparableFilter::single(CmpOp::Gt, 50.0)),
        );
        assert!(!mismatch.matches(&record()));
    }

    #[test]
    fn empty_atom_condition_matches_everything() {
        assert!(AtomCondition::new("all").matches(&record()));
    }

    #[test]
    fn missing_field_never_matches() {
        let ne = AtomCondition::new("not_hourly").with(
            "salary_type",
            FilterField::string("hourly", StringCondition::Ne, false),
        );
        assert!(!ne.matches(&record()));
    }

    #[test]
    fn none_and_not_require_exactly_one_condition() {
        for combinator in [Combinator::None, Combinator::Not] {
            assert!(RuleCondition::new(combinator, vec![]).is_err());
            assert!(RuleCondition::new(combinator, vec![sales(), part_time()]).is_err());
            assert!(RuleCondition::new(combinator, vec![sales()]).is_ok());
        }
    }

    #[test]
    fn vacuous_and_or() {
        let and = RuleCondition::new(Combinator::And, vec![]).unwrap();
        let or = RuleCondition::new(Combinator::Or, vec![]).unwrap();
        assert!(and.matches(&record()));
        assert!(!or.matches(&record()));
    }

    #[test]
    fn not_negates_none() {
        for c in [sales(), part_time(), AtomCondition::new("empty")] {
            let none = RuleCondition::new(Combinator::None, vec![c.clone()]).unwrap();
            let not = RuleCondition::new(Combinator::Not, vec![c]).unwrap();
            assert_eq!(not.matches(&record()), !none.matches(&record()));
        }
    }

    #[test]
    fn and_or_combine() {
        let and = RuleCondition::new(Combinator::And, vec![sales(), part_time()]).unwrap();
        let or = RuleCondition::new(Combinator::Or, vec![part_time(), sales()]).unwrap();
        assert!(!and.matches(&record()));
        assert!(or.matches(&record()));
        assert_eq!(or.conditions().len(), 2);
        assert_eq!(or.combinator(), Combinator::Or);
    }
}
