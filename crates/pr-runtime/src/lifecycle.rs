use std::path::{Path, PathBuf};
use std::sync::Arc;

use orion_error::op_context;
use orion_error::prelude::*;
use orion_error::compat_prelude::*;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use pr_config::EngineConfig;
use pr_core::{
    CategoryMap, EmployeeFilterDocument, FieldMapDocument, Record, Rule, RuleDocument,
    compile_employee_filter, compile_field_map, compile_rule,
};

use crate::error::{RuntimeResult, engine_error};
use crate::pipeline::{ExportOutput, ExportPipeline, ExportPlan, PreviewResponse};
use crate::source::{load_categories, load_records};

/// A preview or export request as submitted by the console.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub filter: EmployeeFilterDocument,
    #[serde(default)]
    pub rule: Option<RuleDocument>,
    pub field_map: FieldMapDocument,
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Loaded configuration, category labels and record source.
///
/// Records are held behind an `Arc` and never modified; every run reads the
/// same snapshot. Category labels are refreshed explicitly by the owner.
pub struct Workspace {
    config: EngineConfig,
    base_dir: PathBuf,
    categories: CategoryMap,
    records: Arc<Vec<Record>>,
}

impl Workspace {
    /// Resolve the record glob, load every record file and the optional
    /// category file. Relative paths resolve against `base_dir`.
    pub fn load(config: EngineConfig, base_dir: &Path) -> RuntimeResult<Self> {
        let mut op = op_context!("workspace-load").with_auto_log();
        op.record("records", config.source.records.as_str());
        op.record("base_dir", base_dir.display().to_string().as_str());

        let paths = config.source.record_paths(base_dir).owe_conf()?;
        let records = load_records(&paths)?;
        let categories = match config.source.categories_path(base_dir) {
            Some(path) => load_categories(&path)?,
            None => CategoryMap::new(),
        };

        pr_info!(
            sys,
            files = paths.len(),
            records = records.len(),
            categories = categories.len(),
            schema_fields = config.schema.len(),
            "workspace loaded"
        );
        op.mark_suc();
        Ok(Self {
            config,
            base_dir: base_dir.to_path_buf(),
            categories,
            records: Arc::new(records),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Re-read the category file, replacing every label. Without a
    /// configured file this is a no-op. Returns the label count.
    pub fn refresh_categories(&mut self) -> RuntimeResult<usize> {
        let Some(path) = self.config.source.categories_path(&self.base_dir) else {
            return Ok(self.categories.len());
        };
        let fresh = load_categories(&path)?;
        self.categories.replace_all(fresh);
        pr_info!(conf, labels = self.categories.len(), "category labels refreshed");
        Ok(self.categories.len())
    }

    pub fn compile_rule(&self, doc: &RuleDocument) -> RuntimeResult<Rule> {
        compile_rule(doc, &self.config.schema).map_err(engine_error)
    }

    /// Compile `doc` and render it with this workspace's category labels.
    pub fn display(&self, doc: &RuleDocument) -> RuntimeResult<String> {
        Ok(self.compile_rule(doc)?.display(&self.categories))
    }

    /// Compile every document in `request` into an export plan.
    pub fn plan(&self, request: &ExportRequest) -> RuntimeResult<ExportPlan> {
        let schema = &self.config.schema;
        let filter = compile_employee_filter(&request.filter, schema).map_err(engine_error)?;
        let rule = request
            .rule
            .as_ref()
            .map(|doc| self.compile_rule(doc))
            .transpose()?;
        let field_map = compile_field_map(&request.field_map).map_err(engine_error)?;
        Ok(ExportPlan::new(filter, rule, field_map))
    }

    /// First `limit` rows (default `export.preview_limit`) plus the total
    /// number of records passing the filter.
    #[tracing::instrument(name = "workspace.preview", skip_all, fields(limit = ?limit))]
    pub async fn preview(
        &self,
        request: &ExportRequest,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> RuntimeResult<PreviewResponse> {
        let limit = limit.unwrap_or(self.config.export.preview_limit);
        let output = self
            .pipeline(request)?
            .run(Arc::clone(&self.records), Some(limit), cancel)
            .await?;
        Ok(output.into_preview())
    }

    /// Every row, for the download path.
    #[tracing::instrument(name = "workspace.export", skip_all)]
    pub async fn export(
        &self,
        request: &ExportRequest,
        cancel: &CancellationToken,
    ) -> RuntimeResult<ExportOutput> {
        self.pipeline(request)?
            .run(Arc::clone(&self.records), None, cancel)
            .await
    }

    fn pipeline(&self, request: &ExportRequest) -> RuntimeResult<ExportPipeline> {
        Ok(ExportPipeline::new(self.plan(request)?, &self.config.export))
    }
}

// ---------------------------------------------------------------------------
// Signal handling
// ---------------------------------------------------------------------------

/// Wait for SIGINT or SIGTERM, then cancel `cancel`.
pub async fn wait_for_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        pr_info!(sys, signal = "SIGINT", "received signal, cancelling");
                    }
                    _ = sigterm.recv() => {
                        pr_info!(sys, signal = "SIGTERM", "received signal, cancelling");
                    }
                }
            }
            Err(e) => {
                pr_warn!(sys, error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
    cancel.cancel();
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => pr_info!(sys, signal = "SIGINT", "received signal, cancelling"),
        Err(e) => {
            pr_error!(sys, error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pr_core::{CategoryResolver, Value};

    const CONFIG: &str = r#"
[export]
preview_limit = 1

[source]
records = "data/*.jsonl"
categories = "roles.json"

[schema]
role = "object"
"#;

    fn fixture() -> (tempfile::TempDir, EngineConfig) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(
            data.join("a.jsonl"),
            "{\"id\": 1, \"name\": \"ann\", \"role\": \"3\", \"salary\": 100}\n",
        )
        .unwrap();
        std::fs::write(
            data.join("b.jsonl"),
            "{\"id\": 2, \"name\": \"ben\", \"role\": \"4\", \"salary\": 200}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("roles.json"), r#"{"3": "Manager"}"#).unwrap();
        (dir, CONFIG.parse().unwrap())
    }

    fn request(rule: Option<serde_json::Value>) -> ExportRequest {
        serde_json::from_value(serde_json::json!({
            "filter": {"role": null},
            "rule": rule,
            "field_map": [{"field": "name", "title": "Name"}, {"field": "salary", "title": "Salary"}]
        }))
        .unwrap()
    }

    fn managers_get_raise() -> serde_json::Value {
        serde_json::json!({
            "rule_name": "manager raise",
            "atom_rules": [{
                "condition": {"combinator": "NONE", "conditions": [
                    {"condition_name": "managers", "filter": {"role": {"value": "3", "condition": "eq"}}}
                ]},
                "action": {"field": "salary", "operator": "+", "value": 50}
            }]
        })
    }

    #[test]
    fn load_reads_records_in_path_order_and_labels() {
        let (dir, config) = fixture();
        let ws = Workspace::load(config, dir.path()).unwrap();
        let ids: Vec<_> = ws.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(ws.records()[1].get("name"), Some(&Value::str("ben")));
        assert_eq!(ws.categories().label("3").as_deref(), Some("Manager"));
    }

    #[test]
    fn load_fails_without_matching_records() {
        let dir = tempfile::tempdir().unwrap();
        let config: EngineConfig = "[source]\nrecords = \"data/*.json\"\n".parse().unwrap();
        assert!(Workspace::load(config, dir.path()).is_err());
    }

    #[test]
    fn refresh_picks_up_new_labels() {
        let (dir, config) = fixture();
        let mut ws = Workspace::load(config, dir.path()).unwrap();
        std::fs::write(
            dir.path().join("roles.json"),
            r#"[{"id": 3, "name": "Lead"}, {"id": 4, "name": "Clerk"}]"#,
        )
        .unwrap();
        assert_eq!(ws.refresh_categories().unwrap(), 2);
        assert_eq!(ws.categories().label("3").as_deref(), Some("Lead"));
    }

    #[test]
    fn display_uses_loaded_labels() {
        let (dir, config) = fixture();
        let ws = Workspace::load(config, dir.path()).unwrap();
        let doc: RuleDocument = serde_json::from_value(managers_get_raise()).unwrap();
        let text = ws.display(&doc).unwrap();
        assert!(text.contains("role is Manager (3)"), "{text}");
    }

    #[test]
    fn invalid_documents_are_rejected_before_running() {
        let (dir, config) = fixture();
        let ws = Workspace::load(config, dir.path()).unwrap();
        let mut bad = request(None);
        bad.field_map.clear();
        bad.field_map.push(pr_core::FieldMapItem::new("name", ""));
        assert!(ws.plan(&bad).is_err());

        let rule: RuleDocument = serde_json::from_value(serde_json::json!({
            "rule_name": "bad",
            "atom_rules": [{
                "condition": {"combinator": "NOT", "conditions": []},
                "action": {"field": "salary", "operator": "+", "value": 1}
            }]
        }))
        .unwrap();
        assert!(ws.compile_rule(&rule).is_err());
    }

    #[tokio::test]
    async fn preview_defaults_to_configured_limit() {
        let (dir, config) = fixture();
        let ws = Workspace::load(config, dir.path()).unwrap();
        let preview = ws
            .preview(&request(Some(managers_get_raise())), None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(preview.total_rows, 2);
        assert_eq!(preview.preview_content.len(), 1);
        assert_eq!(preview.preview_content[0].get("Salary"), Some("150"));

        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["preview_content"][0]["Name"], "ann");
    }

    #[tokio::test]
    async fn export_returns_every_row() {
        let (dir, config) = fixture();
        let ws = Workspace::load(config, dir.path()).unwrap();
        let out = ws
            .export(&request(Some(managers_get_raise())), &CancellationToken::new())
            .await
            .unwrap();
        let salaries: Vec<_> = out.rows.iter().map(|r| r.get("Salary").unwrap()).collect();
        assert_eq!(salaries, ["150", "200"]);
    }
}
