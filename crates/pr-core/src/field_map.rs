use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EngineError;
use crate::record::Record;

/// Synthetic source key projecting the record identity.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapItem {
    pub field: String,
    pub title: String,
}

impl FieldMapItem {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
        }
    }
}

/// Validated, ordered column projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    items: Vec<FieldMapItem>,
}

impl FieldMap {
    /// The same source field may appear under several titles; titles must
    /// be unique and neither side may be empty.
    pub fn new(items: Vec<FieldMapItem>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            if item.field.trim().is_empty() {
                return Err(EngineError::field_map(format!("[{i}].field"), "field is empty"));
            }
            if item.title.trim().is_empty() {
                return Err(EngineError::field_map(format!("[{i}].title"), "title is empty"));
            }
            if !seen.insert(item.title.as_str()) {
                return Err(EngineError::field_map(
                    format!("[{i}].title"),
                    format!("duplicate title {:?}", item.title),
                ));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[FieldMapItem] {
        &self.items
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.title.as_str())
    }

    /// Build the output row for `record`; missing fields become `""`.
    pub fn project(&self, record: &Record) -> Row {
        let cells = self
            .items
            .iter()
            .map(|item| {
                let value = if item.field == ID_FIELD {
                    record.id.clone()
                } else {
                    record
                        .get(&item.field)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                };
                (item.title.clone(), value)
            })
            .collect();
        Row { cells }
    }
}

/// One projected output row: `title → string`, in field-map order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn get(&self, title: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, v)| v.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (title, value) in &self.cells {
            map.serialize_entry(title, value)?;
        }
        map.end()
    }
}
