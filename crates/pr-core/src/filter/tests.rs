use crate::record::Value;

use super::*;

fn cmp(op: CmpOp, v: impl Into<Scalar>) -> FilterField {
    FilterField::comparable(ComparableFilter::single(op, v))
}

fn range(op: RangeOp, lo: f64, hi: f64) -> FilterField {
    FilterField::comparable(ComparableFilter::range(op, lo, hi).unwrap())
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

#[test]
fn string_case_insensitive_by_flag() {
    let loose = FilterField::string("Bob", StringCondition::Eq, false);
    let strict = FilterField::string("Bob", StringCondition::Eq, true);
    assert!(loose.matches(&Value::str("bob")));
    assert!(!strict.matches(&Value::str("bob")));
    assert!(strict.matches(&Value::str("Bob")));
}

#[test]
fn string_substring_conditions() {
    let v = Value::str("Jane Doe");
    assert!(FilterField::string("jane", StringCondition::StartsWith, false).matches(&v));
    assert!(!FilterField::string("jane", StringCondition::StartsWith, true).matches(&v));
    assert!(FilterField::string("DOE", StringCondition::EndsWith, false).matches(&v));
    assert!(FilterField::string("e d", StringCondition::Contains, false).matches(&v));
    assert!(!FilterField::string("smith", StringCondition::Contains, false).matches(&v));
}

#[test]
fn string_ne_is_negated_eq() {
    let f = FilterField::string("sales", StringCondition::Ne, false);
    assert!(!f.matches(&Value::str("Sales")));
    assert!(f.matches(&Value::str("Support")));
}

#[test]
fn string_matches_numbers_by_canonical_text() {
    let f = FilterField::string("40", StringCondition::Eq, true);
    assert!(f.matches(&Value::Number(40.0)));
}

#[test]
fn null_never_matches_even_ne() {
    let f = FilterField::string("x", StringCondition::Ne, false);
    assert!(!f.matches(&Value::Null));
    let f = FilterField::object("3", ObjectCondition::Ne);
    assert!(!f.matches(&Value::Null));
}

#[test]
fn nested_objects_never_match() {
    let nested = Value::Other(serde_json::json!({"id": 9}));
    let empty: [&str; 0] = [];
    let filters = [
        FilterField::string("9", StringCondition::Ne, false),
        FilterField::object("9", ObjectCondition::Ne),
        cmp(CmpOp::Ne, 0.0),
        FilterField::list(empty, ListCondition::All),
    ];
    for f in &filters {
        assert!(!f.matches(&nested), "{f:?}");
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

#[test]
fn object_identity() {
    let eq = FilterField::object("12", ObjectCondition::Eq);
    let ne = FilterField::object("12", ObjectCondition::Ne);
    for actual in [Value::str("12"), Value::Number(12.0), Value::str("7")] {
        assert_eq!(ne.matches(&actual), !eq.matches(&actual));
    }
    assert!(eq.matches(&Value::Number(12.0)));
    assert!(!eq.matches(&Value::list(["12"])));
}

// ---------------------------------------------------------------------------
// Comparable
// ---------------------------------------------------------------------------

#[test]
fn comparable_single_numeric() {
    let v = Value::Number(40.0);
    assert!(cmp(CmpOp::Eq, 40.0).matches(&v));
    assert!(!cmp(CmpOp::Ne, 40.0).matches(&v));
    assert!(cmp(CmpOp::Gte, 40.0).matches(&v));
    assert!(!cmp(CmpOp::Gt, 40.0).matches(&v));
    assert!(cmp(CmpOp::Lte, 40.0).matches(&v));
    assert!(cmp(CmpOp::Lt, 41.0).matches(&v));
}

#[test]
fn comparable_parses_numeric_strings_in_records() {
    assert!(cmp(CmpOp::Gt, 40.0).matches(&Value::str("45")));
    assert!(!cmp(CmpOp::Gt, 40.0).matches(&Value::str("forty-five")));
}

#[test]
fn comparable_dates_are_lexicographic() {
    let f = cmp(CmpOp::Gte, "2024-01-01");
    assert!(f.matches(&Value::str("2024-06-30")));
    assert!(!f.matches(&Value::str("2023-12-31")));
    assert!(!f.matches(&Value::Number(20240101.0)));
}

#[test]
fn comparable_range_inclusivity() {
    let at_lo = Value::Number(10.0);
    let at_hi = Value::Number(20.0);
    let inside = Value::Number(15.0);

    assert!(!range(RangeOp::GtLt, 10.0, 20.0).matches(&at_lo));
    assert!(!range(RangeOp::GtLt, 10.0, 20.0).matches(&at_hi));
    assert!(range(RangeOp::GtLt, 10.0, 20.0).matches(&inside));

    assert!(range(RangeOp::GtLte, 10.0, 20.0).matches(&at_hi));
    assert!(!range(RangeOp::GtLte, 10.0, 20.0).matches(&at_lo));

    assert!(range(RangeOp::GteLt, 10.0, 20.0).matches(&at_lo));
    assert!(!range(RangeOp::GteLt, 10.0, 20.0).matches(&at_hi));

    assert!(range(RangeOp::GteLte, 10.0, 20.0).matches(&at_lo));
    assert!(range(RangeOp::GteLte, 10.0, 20.0).matches(&at_hi));
    assert!(!range(RangeOp::GteLte, 10.0, 20.0).matches(&Value::Number(20.5)));
}

#[test]
fn range_rejects_swapped_or_mixed_bounds() {
    assert!(ComparableFilter::range(RangeOp::GtLt, 20.0, 10.0).is_err());
    assert!(ComparableFilter::range(RangeOp::GtLt, 1.0, "2024-01-01").is_err());
    assert!(ComparableFilter::range(RangeOp::GteLte, 5.0, 5.0).is_ok());
    assert!(ComparableFilter::range(RangeOp::GtLt, "2024-01-01", "2024-12-31").is_ok());
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_all_is_subset() {
    let f = FilterField::list(["a", "b"], ListCondition::All);
    assert!(f.matches(&Value::list(["a", "b", "c"])));
    assert!(!f.matches(&Value::list(["a", "c"])));
}

#[test]
fn list_any_is_intersection() {
    let f = FilterField::list(["a", "b"], ListCondition::Any);
    assert!(f.matches(&Value::list(["b", "z"])));
    assert!(!f.matches(&Value::list(["y", "z"])));
}

#[test]
fn list_empty_value_vacuous_cases() {
    let empty: [&str; 0] = [];
    let all = FilterField::list(empty, ListCondition::All);
    let any = FilterField::list(empty, ListCondition::Any);
    assert!(all.matches(&Value::list(["x"])));
    assert!(!any.matches(&Value::list(["x"])));
    assert!(!any.matches(&Value::List(vec![])));
}

#[test]
fn list_scalar_actual_is_single_element() {
    let f = FilterField::list(["3"], ListCondition::Any);
    assert!(f.matches(&Value::Number(3.0)));
}

#[test]
fn list_ids_are_deduplicated() {
    let FilterField::List(f) = FilterField::list(["a", "b", "a"], ListCondition::All) else {
        panic!("expected list filter");
    };
    assert_eq!(f.value, vec!["a", "b"]);
}

#[test]
fn condition_codes_round_trip() {
    for c in StringCondition::ALL {
        assert_eq!(StringCondition::from_code(c.code()), Some(*c));
    }
    for c in RangeOp::ALL {
        assert_eq!(RangeOp::from_code(c.code()), Some(*c));
    }
    assert_eq!(CmpOp::from_code("gt_lt"), None);
    assert_eq!(ListCondition::from_code("none"), None);
}
