use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use pr_runtime::lifecycle::{ExportRequest, Workspace};
use pr_runtime::tracing_init::init_tracing;

use crate::docs::load_config;

pub async fn run(config: PathBuf, request: ExportRequest, limit: Option<usize>) -> Result<()> {
    let (config, base_dir) = load_config(&config)?;
    let _guard = init_tracing(&config.logging, &base_dir)?;

    let workspace = Workspace::load(config, &base_dir).map_err(|e| anyhow::anyhow!("{e}"))?;
    let preview = workspace
        .preview(&request, limit, &CancellationToken::new())
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}
