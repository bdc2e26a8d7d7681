use crate::action::{ArithOp, RuleAction};
use crate::condition::{AtomCondition, Combinator, RuleCondition};
use crate::error::EngineError;
use crate::filter::{CmpOp, ComparableFilter, FilterField};
use crate::record::{Record, Value};

use super::{AtomRule, Rule};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn employee(id: &str, hours: f64, salary: f64) -> Record {
    Record::new(
        id,
        [
            ("hours_worked", Value::Number(hours)),
            ("salary", Value::Number(salary)),
        ],
    )
}

fn overtime_doubles_salary() -> AtomRule {
    let cond = AtomCondition::new("overtime").with(
        "hours_worked",
        FilterField::comparable(ComparableFilter::single(CmpOp::Gt, 40.0)),
    );
    AtomRule::new(
        RuleCondition::new(Combinator::None, vec![cond]).unwrap(),
        RuleAction::new("salary", ArithOp::Mul, 2.0),
    )
}

fn always_add_100() -> AtomRule {
    AtomRule::new(
        RuleCondition::new(Combinator::And, vec![]).unwrap(),
        RuleAction::new("salary", ArithOp::Add, 100.0),
    )
}

fn salary_of(record: &Record) -> f64 {
    record.get("salary").and_then(Value::as_number).unwrap()
}

// ---------------------------------------------------------------------------
// Sequential composition
// ---------------------------------------------------------------------------

#[test]
fn atom_rules_chain_in_order() {
    let rule = Rule::new("payroll")
        .with_atom(overtime_doubles_salary())
        .with_atom(always_add_100());
    let out = rule.evaluate(&employee("e1", 45.0, 1000.0));
    assert_eq!(salary_of(&out.record), 2100.0);
    assert!(out.failures.is_empty());
}

#[test]
fn reversing_atom_rules_changes_outcome() {
    let rule = Rule::new("payroll")
        .with_atom(always_add_100())
        .with_atom(overtime_doubles_salary());
    let out = rule.evaluate(&employee("e1", 45.0, 1000.0));
    assert_eq!(salary_of(&out.record), 2200.0);
}

#[test]
fn later_conditions_see_earlier_actions() {
    // hours 38 + 5 = 43 crosses the overtime threshold only after step 1.
    let bump_hours = AtomRule::new(
        RuleCondition::new(Combinator::And, vec![]).unwrap(),
        RuleAction::new("hours_worked", ArithOp::Add, 5.0),
    );
    let rule = Rule::new("chain")
        .with_atom(bump_hours)
        .with_atom(overtime_doubles_salary());
    let out = rule.evaluate(&employee("e1", 38.0, 1000.0));
    assert_eq!(salary_of(&out.record), 2000.0);
}

#[test]
fn unmatched_record_passes_through() {
    let rule = Rule::new("payroll").with_atom(overtime_doubles_salary());
    let input = employee("e1", 30.0, 1000.0);
    let out = rule.evaluate(&input);
    assert_eq!(out.record, input);
}

#[test]
fn evaluation_does_not_touch_input() {
    let rule = Rule::new("payroll").with_atom(always_add_100());
    let input = employee("e1", 30.0, 1000.0);
    let _ = rule.evaluate(&input);
    assert_eq!(salary_of(&input), 1000.0);
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[test]
fn division_by_zero_is_skipped_and_reported() {
    let divide = AtomRule::new(
        RuleCondition::new(Combinator::And, vec![]).unwrap(),
        RuleAction::new("salary", ArithOp::Div, 0.0),
    );
    let rule = Rule::new("broken")
        .with_atom(divide)
        .with_atom(always_add_100());
    let out = rule.evaluate(&employee("e1", 10.0, 100.0));

    assert_eq!(salary_of(&out.record), 200.0);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].atom_rule, 0);
    assert!(matches!(
        out.failures[0].error,
        EngineError::DivisionByZero { ref field } if field == "salary"
    ));
}

#[test]
fn failure_serializes_with_message() {
    let divide = AtomRule::new(
        RuleCondition::new(Combinator::And, vec![]).unwrap(),
        RuleAction::new("salary", ArithOp::Div, 0.0),
    );
    let out = Rule::new("r").with_atom(divide).evaluate(&employee("e1", 1.0, 1.0));
    let json = serde_json::to_value(&out.failures[0]).unwrap();
    assert_eq!(json["atom_rule"], 0);
    assert_eq!(json["error"], "division by zero applying `salary / 0`");
}
