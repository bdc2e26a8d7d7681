use crate::engine::EngineConfig;

/// Internal validation, called automatically during `EngineConfig::from_str` / `load`.
pub(crate) fn validate(config: &EngineConfig) -> anyhow::Result<()> {
    let export = &config.export;
    if export.preview_limit == 0 {
        anyhow::bail!("export.preview_limit must be > 0");
    }
    if export.batch_size == 0 {
        anyhow::bail!("export.batch_size must be > 0");
    }
    if export.parallelism == 0 {
        anyhow::bail!("export.parallelism must be > 0");
    }

    if config.source.records.trim().is_empty() {
        anyhow::bail!("source.records must name at least one record file or glob");
    }
    if let Some(ref categories) = config.source.categories
        && categories.trim().is_empty()
    {
        anyhow::bail!("source.categories must not be empty when present");
    }

    for (name, _) in config.schema.fields() {
        if name.trim().is_empty() {
            anyhow::bail!("schema: field names must not be empty");
        }
    }

    Ok(())
}
