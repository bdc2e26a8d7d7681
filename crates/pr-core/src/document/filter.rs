use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::EngineError;
use crate::filter::{
    CmpOp, ComparableFilter, FilterField, ListCondition, ObjectCondition, ObjectFilter,
    RangeOp, Scalar, StringCondition, StringFilter,
};
use crate::schema::{EmployeeSchema, FilterKind};

/// `{value, condition, case_sensitive?, type?}` as sent by the console.
#[derive(Debug, Deserialize)]
struct RawFilterField {
    #[serde(default)]
    value: Json,
    condition: String,
    #[serde(default)]
    case_sensitive: Option<bool>,
    #[serde(default, rename = "type")]
    kind: Option<FilterKind>,
}

/// Compile one field filter document.
///
/// Returns `Ok(None)` for a `null` entry (field left unfiltered). The kind
/// comes from an explicit `type`, then the schema, then the value's shape.
pub fn compile_filter(
    field: &str,
    raw: &Json,
    schema: &EmployeeSchema,
    path: &str,
) -> Result<Option<FilterField>, EngineError> {
    if raw.is_null() {
        return Ok(None);
    }
    let doc: RawFilterField = serde_json::from_value(raw.clone())
        .map_err(|e| EngineError::filter(path, format!("malformed filter: {e}")))?;
    let condition = doc.condition.trim().to_ascii_lowercase();
    let kind = doc
        .kind
        .or_else(|| schema.kind_of(field))
        .unwrap_or_else(|| infer_kind(&doc.value, &condition, doc.case_sensitive.is_some()));

    if kind != FilterKind::String && doc.case_sensitive.is_some() {
        return Err(EngineError::filter(
            path,
            format!("case_sensitive is only valid on string filters, not {kind}"),
        ));
    }

    let unsupported = || EngineError::UnsupportedCondition {
        path: path.to_string(),
        kind: kind.as_str(),
        code: doc.condition.clone(),
    };

    let filter = match kind {
        FilterKind::String => {
            let condition = StringCondition::from_code(&condition).ok_or_else(unsupported)?;
            FilterField::String(StringFilter {
                value: scalar_text(&doc.value, path)?,
                condition,
                case_sensitive: doc.case_sensitive.unwrap_or(false),
            })
        }
        FilterKind::Object => {
            let condition = ObjectCondition::from_code(&condition).ok_or_else(unsupported)?;
            FilterField::Object(ObjectFilter {
                value: id_text(&doc.value, path)?,
                condition,
            })
        }
        FilterKind::Comparable => {
            if let Some(op) = CmpOp::from_code(&condition) {
                FilterField::Comparable(ComparableFilter::Single {
                    op,
                    value: single_bound(&doc.value, path)?,
                })
            } else if let Some(op) = RangeOp::from_code(&condition) {
                let (lo, hi) = two_bounds(&doc.value, path)?;
                let range = ComparableFilter::range(op, lo, hi)
                    .map_err(|detail| EngineError::filter(path, detail))?;
                FilterField::Comparable(range)
            } else {
                return Err(unsupported());
            }
        }
        FilterKind::List => {
            let condition = ListCondition::from_code(&condition).ok_or_else(unsupported)?;
            FilterField::list(id_list(&doc.value, path)?, condition)
        }
    };
    Ok(Some(filter))
}

/// Kind for fields the schema does not know.
fn infer_kind(value: &Json, condition: &str, has_case_flag: bool) -> FilterKind {
    if has_case_flag {
        return FilterKind::String;
    }
    if ListCondition::from_code(condition).is_some() {
        return FilterKind::List;
    }
    if RangeOp::from_code(condition).is_some() {
        return FilterKind::Comparable;
    }
    match value {
        Json::Array(_) | Json::Number(_) => FilterKind::Comparable,
        _ => match condition {
            "gt" | "lt" | "gte" | "lte" => FilterKind::Comparable,
            _ => FilterKind::String,
        },
    }
}

// ---------------------------------------------------------------------------
// Value shapes
// ---------------------------------------------------------------------------

fn scalar_text(value: &Json, path: &str) -> Result<String, EngineError> {
    match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        other => Err(EngineError::filter(
            path,
            format!("expected a single string value, got {other}"),
        )),
    }
}

fn id_text(value: &Json, path: &str) -> Result<String, EngineError> {
    match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        other => Err(EngineError::filter(
            path,
            format!("expected a category id, got {other}"),
        )),
    }
}

fn id_list(value: &Json, path: &str) -> Result<Vec<String>, EngineError> {
    let Json::Array(items) = value else {
        return Err(EngineError::filter(
            path,
            format!("expected a list of category ids, got {value}"),
        ));
    };
    items.iter().map(|item| id_text(item, path)).collect()
}

fn scalar(value: &Json, path: &str) -> Result<Scalar, EngineError> {
    match value {
        Json::Number(n) => n
            .as_f64()
            .map(Scalar::Number)
            .ok_or_else(|| EngineError::filter(path, format!("number {n} is out of range"))),
        Json::String(s) => Ok(match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            _ => Scalar::Text(s.clone()),
        }),
        Json::Null => Err(EngineError::filter(path, "missing bound")),
        other => Err(EngineError::filter(
            path,
            format!("expected a number or date, got {other}"),
        )),
    }
}

fn single_bound(value: &Json, path: &str) -> Result<Scalar, EngineError> {
    if let Json::Array(items) = value {
        return Err(EngineError::filter(
            path,
            format!("single-value condition takes one scalar, got {} values", items.len()),
        ));
    }
    scalar(value, path)
}

fn two_bounds(value: &Json, path: &str) -> Result<(Scalar, Scalar), EngineError> {
    match value {
        Json::Array(items) if items.len() == 2 => {
            Ok((scalar(&items[0], path)?, scalar(&items[1], path)?))
        }
        Json::Array(items) => Err(EngineError::filter(
            path,
            format!("range condition takes exactly two bounds, got {}", items.len()),
        )),
        other => Err(EngineError::filter(
            path,
            format!("range condition takes [lo, hi], got {other}"),
        )),
    }
}
