//! Reading documents and configuration from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use pr_config::EngineConfig;
use pr_core::{EmployeeFilterDocument, EmployeeSchema};
use pr_runtime::lifecycle::ExportRequest;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Load `payroll.toml`; returns the config and the directory relative paths
/// resolve against.
pub fn load_config(path: &Path) -> Result<(EngineConfig, PathBuf)> {
    let config_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("config path '{}': {e}", path.display()))?;
    let config = EngineConfig::load(&config_path)?;
    let base_dir = config_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path has no parent directory"))?
        .to_path_buf();
    Ok((config, base_dir))
}

pub fn schema_of(config: Option<&EngineConfig>) -> EmployeeSchema {
    config.map(|c| c.schema.clone()).unwrap_or_default()
}

pub fn load_request(
    field_map: &Path,
    filter: Option<&Path>,
    rule: Option<&Path>,
) -> Result<ExportRequest> {
    Ok(ExportRequest {
        filter: match filter {
            Some(path) => read_json(path)?,
            None => EmployeeFilterDocument::default(),
        },
        rule: rule.map(read_json).transpose()?,
        field_map: read_json(field_map)?,
    })
}
