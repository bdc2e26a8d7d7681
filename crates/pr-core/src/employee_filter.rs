use crate::filter::FilterField;
use crate::record::Record;

/// Global pre-filter of the export pipeline: per-field filters ANDed
/// together. Fields the operator left blank are simply not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    entries: Vec<(String, FilterField)>,
}

impl EmployeeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, filter: FilterField) -> Self {
        self.entries.push((field.into(), filter));
        self
    }

    pub fn entries(&self) -> &[(String, FilterField)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absent or `null` fields fail their filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.entries
            .iter()
            .all(|(field, f)| record.get(field).is_some_and(|v| f.matches(v)))
    }
}
