use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single employee field value.
///
/// Dates travel as ISO-8601 strings; category references are ids inside a
/// [`Value::List`] (or a bare [`Value::Str`] for single-valued objects).
/// Any other JSON shape (nested objects, mixed arrays) is kept verbatim as
/// [`Value::Other`]: it never matches a filter and reads as 0 in actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Other(serde_json::Value),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(ids.into_iter().map(|s| Value::Str(s.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values no filter can inspect: `Null` and [`Value::Other`].
    pub fn is_opaque(&self) -> bool {
        matches!(self, Value::Null | Value::Other(_))
    }

    /// Numeric view of the value. Numeric strings (as exported from
    /// spreadsheets) are parsed; everything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Ids carried by this value: every element of a list, or the value
    /// itself when it is a scalar.
    pub fn ids(&self) -> Vec<String> {
        match self {
            Value::Null | Value::Other(_) => vec![],
            Value::List(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .collect(),
            scalar => vec![scalar.to_string()],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Other(json) => write!(f, "{json}"),
        }
    }
}

/// Canonical number formatting: integral values print without a fraction
/// (`2100`, not `2100.0`), and negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An employee record: an opaque identity plus an open map of fields.
///
/// On the wire this is a flat JSON object whose `id` key (string or number)
/// is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Record {
    pub fn new<I, K>(id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            id: id.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Look up a field. `null` values are reported as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Return a copy of this record with `name` set to `value`.
    pub fn with_field(&self, name: &str, value: Value) -> Self {
        let mut next = self.clone();
        next.fields.insert(name.to_string(), value);
        next
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => format_number(n),
    })
}
