use std::cmp::Ordering;

use crate::record::Value;

use super::{
    CmpOp, ComparableFilter, FilterField, ListCondition, ListFilter, ObjectCondition,
    ObjectFilter, RangeOp, Scalar, StringCondition, StringFilter,
};

impl FilterField {
    /// Test `actual` against this filter.
    ///
    /// `Null` and opaque values never match, for every condition including
    /// `ne`; callers treat an absent field the same way.
    pub fn matches(&self, actual: &Value) -> bool {
        if actual.is_opaque() {
            return false;
        }
        match self {
            FilterField::String(f) => match_string(f, actual),
            FilterField::Object(f) => match_object(f, actual),
            FilterField::Comparable(f) => match_comparable(f, actual),
            FilterField::List(f) => match_list(f, actual),
        }
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

fn match_string(f: &StringFilter, actual: &Value) -> bool {
    let text = match actual {
        Value::Str(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => actual.to_string(),
        Value::List(_) | Value::Null | Value::Other(_) => return false,
    };
    let (needle, hay) = if f.case_sensitive {
        (f.value.clone(), text)
    } else {
        (f.value.to_lowercase(), text.to_lowercase())
    };
    match f.condition {
        StringCondition::Eq => hay == needle,
        StringCondition::Ne => hay != needle,
        StringCondition::StartsWith => hay.starts_with(&needle),
        StringCondition::EndsWith => hay.ends_with(&needle),
        StringCondition::Contains => hay.contains(&needle),
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

fn match_object(f: &ObjectFilter, actual: &Value) -> bool {
    let id = match actual {
        Value::Str(_) | Value::Number(_) | Value::Bool(_) => actual.to_string(),
        Value::List(_) | Value::Null | Value::Other(_) => return false,
    };
    let eq = id == f.value;
    match f.condition {
        ObjectCondition::Eq => eq,
        ObjectCondition::Ne => !eq,
    }
}

// ---------------------------------------------------------------------------
// Comparable
// ---------------------------------------------------------------------------

/// Order `actual` relative to `bound`, or `None` when the two are not
/// comparable (a number against non-numeric text, lists, bools).
fn order(actual: &Value, bound: &Scalar) -> Option<Ordering> {
    match bound {
        Scalar::Number(b) => actual.as_number()?.partial_cmp(b),
        Scalar::Text(b) => match actual {
            Value::Str(s) => Some(s.as_str().cmp(b.as_str())),
            _ => None,
        },
    }
}

fn match_comparable(f: &ComparableFilter, actual: &Value) -> bool {
    match f {
        ComparableFilter::Single { op, value } => {
            let Some(ord) = order(actual, value) else {
                return false;
            };
            match op {
                CmpOp::Eq => ord == Ordering::Equal,
                CmpOp::Ne => ord != Ordering::Equal,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Gte => ord != Ordering::Less,
                CmpOp::Lte => ord != Ordering::Greater,
            }
        }
        ComparableFilter::Range { op, lo, hi } => {
            let (Some(lo_ord), Some(hi_ord)) = (order(actual, lo), order(actual, hi)) else {
                return false;
            };
            above_lower(*op, lo_ord) && below_upper(*op, hi_ord)
        }
    }
}

fn above_lower(op: RangeOp, ord: Ordering) -> bool {
    if op.lower_inclusive() {
        ord != Ordering::Less
    } else {
        ord == Ordering::Greater
    }
}

fn below_upper(op: RangeOp, ord: Ordering) -> bool {
    if op.upper_inclusive() {
        ord != Ordering::Greater
    } else {
        ord == Ordering::Less
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

fn match_list(f: &ListFilter, actual: &Value) -> bool {
    let held = actual.ids();
    match f.condition {
        ListCondition::All => f.value.iter().all(|id| held.contains(id)),
        ListCondition::Any => f.value.iter().any(|id| held.contains(id)),
    }
}
