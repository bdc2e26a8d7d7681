use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use pr_core::{EmployeeSchema, FilterKind};

use crate::export::ExportConfig;
use crate::logging::LoggingConfig;
use crate::source::SourceConfig;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EngineConfigRaw {
    #[serde(default)]
    export: ExportConfig,
    source: SourceConfig,
    /// Employee field name → filter kind.
    #[serde(default)]
    schema: BTreeMap<String, FilterKind>,
    #[serde(default)]
    logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// EngineConfig (resolved, validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub export: ExportConfig,
    pub source: SourceConfig,
    pub schema: EmployeeSchema,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Read and parse a `payroll.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for EngineConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a resolved, validated [`EngineConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: EngineConfigRaw = toml::from_str(toml_str)?;

        let config = EngineConfig {
            export: raw.export,
            source: raw.source,
            schema: raw.schema.into_iter().collect(),
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
