use std::path::PathBuf;

use anyhow::Result;

use pr_core::{CategoryMap, RuleDocument, compile_rule};
use pr_runtime::source::load_categories;

use crate::docs::{load_config, read_json, schema_of};

pub fn run(rule: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = config.as_deref().map(load_config).transpose()?;
    let schema = schema_of(config.as_ref().map(|(c, _)| c));

    let categories = match config
        .as_ref()
        .and_then(|(c, base_dir)| c.source.categories_path(base_dir))
    {
        Some(path) => load_categories(&path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => CategoryMap::new(),
    };

    let doc: RuleDocument = read_json(&rule)?;
    let compiled = compile_rule(&doc, &schema)?;
    print!("{}", compiled.display(&categories));
    Ok(())
}
