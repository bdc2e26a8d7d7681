use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use pr_runtime::lifecycle::{ExportRequest, Workspace, wait_for_signal};
use pr_runtime::sink::{write_error_report, write_rows_jsonl};
use pr_runtime::tracing_init::init_tracing;

use crate::docs::load_config;

pub async fn run(
    config: PathBuf,
    request: ExportRequest,
    out: PathBuf,
    errors: Option<PathBuf>,
) -> Result<()> {
    let (config, base_dir) = load_config(&config)?;
    let _guard = init_tracing(&config.logging, &base_dir)?;

    let workspace = Workspace::load(config, &base_dir).map_err(|e| anyhow::anyhow!("{e}"))?;

    let cancel = CancellationToken::new();
    let signal = tokio::spawn(wait_for_signal(cancel.clone()));
    let result = workspace.export(&request, &cancel).await;
    signal.abort();
    let output = result.map_err(|e| anyhow::anyhow!("{e}"))?;

    let written = write_rows_jsonl(&output.rows, &out).map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(path) = errors {
        write_error_report(&output.errors, &path).map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    tracing::info!(
        domain = "sys",
        rows = written,
        total_rows = output.total_rows,
        failed_records = output.errors.len(),
        out = %out.display(),
        "export complete"
    );
    eprintln!(
        "{written} row(s) written to {}; {} record(s) with skipped actions",
        out.display(),
        output.errors.len()
    );
    Ok(())
}
