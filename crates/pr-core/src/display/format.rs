use std::borrow::Cow;

use crate::action::RuleAction;
use crate::category::CategoryResolver;
use crate::filter::{
    CmpOp, ComparableFilter, FilterField, ListCondition, ObjectCondition, StringCondition,
};

// ---------------------------------------------------------------------------
// Filter formatting
// ---------------------------------------------------------------------------

/// One `field op value` line for a filter.
pub fn format_filter(field: &str, filter: &FilterField, resolver: &dyn CategoryResolver) -> String {
    match filter {
        FilterField::String(f) => {
            let op = match f.condition {
                StringCondition::Eq => "==",
                StringCondition::Ne => "!=",
                StringCondition::StartsWith => "starts with",
                StringCondition::EndsWith => "ends with",
                StringCondition::Contains => "contains",
            };
            let case = if f.case_sensitive {
                "case-sensitive"
            } else {
                "ignore case"
            };
            format!("{field} {op} {:?} ({case})", f.value)
        }
        FilterField::Object(f) => {
            let op = match f.condition {
                ObjectCondition::Eq => "is",
                ObjectCondition::Ne => "is not",
            };
            format!("{field} {op} {}", category(&f.value, resolver))
        }
        FilterField::Comparable(ComparableFilter::Single { op, value }) => {
            format!("{field} {} {value}", cmp_symbol(*op))
        }
        FilterField::Comparable(ComparableFilter::Range { op, lo, hi }) => {
            let lower = if op.lower_inclusive() { "<=" } else { "<" };
            let upper = if op.upper_inclusive() { "<=" } else { "<" };
            format!("{lo} {lower} {field} {upper} {hi}")
        }
        FilterField::List(f) => {
            let quant = match f.condition {
                ListCondition::All => "has all of",
                ListCondition::Any => "has any of",
            };
            let ids = f
                .value
                .iter()
                .map(|id| category(id, resolver))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field} {quant} [{ids}]")
        }
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Gt => ">",
        CmpOp::Lt => "<",
        CmpOp::Gte => ">=",
        CmpOp::Lte => "<=",
    }
}

/// `label (id)` when the resolver knows the id, the bare id otherwise.
fn category(id: &str, resolver: &dyn CategoryResolver) -> String {
    match resolver.label(id) {
        Some(label) => format!("{label} ({id})"),
        None => id.to_string(),
    }
}

pub fn format_action(action: &RuleAction) -> String {
    action.to_string()
}

/// Escape control characters so user text stays on one line of the trace.
pub(super) fn one_line(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
