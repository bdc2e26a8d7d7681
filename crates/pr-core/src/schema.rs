use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The four families of field filters the console can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    String,
    Object,
    Comparable,
    List,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::String => "string",
            FilterKind::Object => "object",
            FilterKind::Comparable => "comparable",
            FilterKind::List => "list",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known employee fields and the filter kind each one takes.
///
/// Filter documents do not carry a kind, so the schema decides how a
/// `{value, condition}` pair is interpreted. Fields missing from the schema
/// fall back to shape inference (see `document::filter`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeSchema {
    fields: BTreeMap<String, FilterKind>,
}

impl EmployeeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FilterKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: FilterKind) {
        self.fields.insert(name.into(), kind);
    }

    pub fn kind_of(&self, field: &str) -> Option<FilterKind> {
        self.fields.get(field).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FilterKind)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FilterKind)> for EmployeeSchema {
    fn from_iter<T: IntoIterator<Item = (K, FilterKind)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
