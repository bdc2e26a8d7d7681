use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Where employee records and category labels come from (`[source]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Glob (or literal path) of record files: JSON arrays or JSON Lines.
    pub records: String,
    /// Optional category label file (`{id: label}` or `[{id, name}]`).
    #[serde(default)]
    pub categories: Option<String>,
}

impl SourceConfig {
    /// Record files in load order (sorted by path).
    pub fn record_paths(&self, base_dir: &Path) -> Result<Vec<PathBuf>> {
        resolve_glob(&self.records, base_dir)
    }

    pub fn categories_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.categories.as_ref().map(|c| base_dir.join(c))
    }
}

/// Resolve `pattern` relative to `base_dir`. Patterns without glob
/// characters are literal paths and must exist; glob patterns must match at
/// least one file. Results are sorted.
pub fn resolve_glob(pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let full = base_dir.join(pattern);
    if !(pattern.contains('*') || pattern.contains('?') || pattern.contains('[')) {
        if full.exists() {
            return Ok(vec![full]);
        }
        anyhow::bail!("file not found: {}", full.display());
    }

    let full_str = full.to_string_lossy();
    let mut paths = Vec::new();
    for entry in glob::glob(&full_str).with_context(|| format!("invalid glob {pattern:?}"))? {
        let path = entry.with_context(|| format!("reading glob match for {pattern:?}"))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        anyhow::bail!("no files match {}", full.display());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_is_sorted_and_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        for name in ["b.json", "a.json", "c.txt"] {
            std::fs::write(data.join(name), "[]").unwrap();
        }
        let paths = resolve_glob("data/*.json", dir.path()).unwrap();
        assert_eq!(paths, vec![data.join("a.json"), data.join("b.json")]);
    }

    #[test]
    fn literal_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_glob("missing.json", dir.path()).is_err());
        std::fs::write(dir.path().join("present.json"), "[]").unwrap();
        assert_eq!(resolve_glob("present.json", dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_glob("*.jsonl", dir.path()).is_err());
    }
}
