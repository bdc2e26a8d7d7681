//! Record and category loading from the configured `[source]` files.

use std::path::{Path, PathBuf};

use orion_error::prelude::*;
use orion_error::compat_prelude::*;
use pr_core::{CategoryMap, Record};

use crate::error::{RuntimeReason, RuntimeResult};

/// Load every record file in `paths`, preserving file order and the order
/// of records within each file.
pub fn load_records(paths: &[PathBuf]) -> RuntimeResult<Vec<Record>> {
    let mut records = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(path)
            .owe_sys()
            .position(path.display().to_string())?;
        let before = records.len();
        records.extend(
            parse_records(&content)
                .owe(RuntimeReason::Load)
                .position(path.display().to_string())?,
        );
        pr_debug!(
            res,
            file = %path.display(),
            records = records.len() - before,
            "record file loaded"
        );
    }
    Ok(records)
}

#[derive(Debug, thiserror::Error)]
pub enum RecordParseError {
    #[error("invalid record array: {0}")]
    Array(serde_json::Error),
    #[error("line {line}: invalid record: {source}")]
    Line {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parse a record file: a JSON array of objects, or one object per line.
/// Blank lines in JSON Lines input are ignored.
pub fn parse_records(content: &str) -> Result<Vec<Record>, RecordParseError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(RecordParseError::Array);
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|source| RecordParseError::Line { line: i + 1, source })
        })
        .collect()
}

pub fn load_categories(path: &Path) -> RuntimeResult<CategoryMap> {
    let content = std::fs::read_to_string(path)
        .owe_sys()
        .position(path.display().to_string())?;
    let categories = CategoryMap::from_json(&content)
        .owe(RuntimeReason::Load)
        .position(path.display().to_string())?;
    pr_debug!(res, file = %path.display(), labels = categories.len(), "category labels loaded");
    Ok(categories)
}
