//! Atomic per-field predicates.
//!
//! A [`FilterField`] is the typed form of a `{value, condition}` document
//! entry. Condition codes are parsed once, when the document is compiled, so
//! matching is an exhaustive `match` with no string dispatch.

mod matcher;
#[cfg(test)]
mod tests;

use std::fmt;

use crate::schema::FilterKind;

// ---------------------------------------------------------------------------
// Condition codes
// ---------------------------------------------------------------------------

/// Declares a condition enum together with its wire codes.
macro_rules! condition_codes {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire code, e.g. `"starts_with"`.
            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

condition_codes! {
    StringCondition {
        Eq => "eq",
        Ne => "ne",
        StartsWith => "starts_with",
        EndsWith => "ends_with",
        Contains => "contains",
    }
}

condition_codes! {
    ObjectCondition {
        Eq => "eq",
        Ne => "ne",
    }
}

condition_codes! {
    /// Single-bound comparison.
    CmpOp {
        Eq => "eq",
        Ne => "ne",
        Gt => "gt",
        Lt => "lt",
        Gte => "gte",
        Lte => "lte",
    }
}

condition_codes! {
    /// Two-bound comparison; the letters give the inclusivity of each end.
    RangeOp {
        GtLt => "gt_lt",
        GtLte => "gt_lte",
        GteLt => "gte_lt",
        GteLte => "gte_lte",
    }
}

condition_codes! {
    ListCondition {
        All => "all",
        Any => "any",
    }
}

impl RangeOp {
    pub fn lower_inclusive(&self) -> bool {
        matches!(self, RangeOp::GteLt | RangeOp::GteLte)
    }

    pub fn upper_inclusive(&self) -> bool {
        matches!(self, RangeOp::GtLte | RangeOp::GteLte)
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FilterField {
    String(StringFilter),
    Object(ObjectFilter),
    Comparable(ComparableFilter),
    List(ListFilter),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringFilter {
    pub value: String,
    pub condition: StringCondition,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFilter {
    /// Category id.
    pub value: String,
    pub condition: ObjectCondition,
}

/// Comparison against one bound or an ordered `[lo, hi]` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparableFilter {
    Single { op: CmpOp, value: Scalar },
    Range { op: RangeOp, lo: Scalar, hi: Scalar },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    /// Category ids, deduplicated, in authored order.
    pub value: Vec<String>,
    pub condition: ListCondition,
}

/// Comparable operand: a number, or text ordered lexicographically
/// (ISO-8601 dates sort correctly this way).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn same_kind(&self, other: &Scalar) -> bool {
        matches!(
            (self, other),
            (Scalar::Number(_), Scalar::Number(_)) | (Scalar::Text(_), Scalar::Text(_))
        )
    }

    fn partial_cmp(&self, other: &Scalar) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&crate::record::format_number(*n)),
            Scalar::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl ComparableFilter {
    pub fn single(op: CmpOp, value: impl Into<Scalar>) -> Self {
        ComparableFilter::Single {
            op,
            value: value.into(),
        }
    }

    /// Build a range filter. Bounds must be of the same kind and ordered
    /// (`lo <= hi`); the error string describes the violation.
    pub fn range(
        op: RangeOp,
        lo: impl Into<Scalar>,
        hi: impl Into<Scalar>,
    ) -> Result<Self, String> {
        let (lo, hi) = (lo.into(), hi.into());
        if !lo.same_kind(&hi) {
            return Err(format!("range bounds {lo} and {hi} are of different kinds"));
        }
        match lo.partial_cmp(&hi) {
            Some(std::cmp::Ordering::Greater) => {
                Err(format!("range bounds out of order: {lo} > {hi}"))
            }
            None => Err(format!("range bounds {lo} and {hi} are not comparable")),
            _ => Ok(ComparableFilter::Range { op, lo, hi }),
        }
    }

    pub fn condition_code(&self) -> &'static str {
        match self {
            ComparableFilter::Single { op, .. } => op.code(),
            ComparableFilter::Range { op, .. } => op.code(),
        }
    }
}

impl FilterField {
    pub fn string(value: &str, condition: StringCondition, case_sensitive: bool) -> Self {
        FilterField::String(StringFilter {
            value: value.to_string(),
            condition,
            case_sensitive,
        })
    }

    pub fn object(value: &str, condition: ObjectCondition) -> Self {
        FilterField::Object(ObjectFilter {
            value: value.to_string(),
            condition,
        })
    }

    pub fn comparable(filter: ComparableFilter) -> Self {
        FilterField::Comparable(filter)
    }

    pub fn list<I, S>(ids: I, condition: ListCondition) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut value: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !value.contains(&id) {
                value.push(id);
            }
        }
        FilterField::List(ListFilter { value, condition })
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterField::String(_) => FilterKind::String,
            FilterField::Object(_) => FilterKind::Object,
            FilterField::Comparable(_) => FilterKind::Comparable,
            FilterField::List(_) => FilterKind::List,
        }
    }

    pub fn condition_code(&self) -> &'static str {
        match self {
            FilterField::String(f) => f.condition.code(),
            FilterField::Object(f) => f.condition.code(),
            FilterField::Comparable(f) => f.condition_code(),
            FilterField::List(f) => f.condition.code(),
        }
    }
}
