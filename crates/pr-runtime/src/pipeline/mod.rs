//! Filter → rule → projection over a record source.
//!
//! The pre-filter runs first and fixes `total_rows`. Matching records are
//! then cut into batches, evaluated on the blocking pool, and reassembled in
//! source order, so output order never depends on scheduling. Both stages
//! run off the async threads and both observe the cancellation token.


use std::collections::BTreeMap;
use std::sync::Arc;

use orion_error::prelude::*;
use pr_config::ExportConfig;
use pr_core::{ActionFailure, EmployeeFilter, FieldMap, Record, Row, Rule};
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{RuntimeError, RuntimeReason, RuntimeResult, cancelled};

/// Records scanned by the pre-filter between cancellation checks.
const SELECT_CANCEL_STRIDE: usize = 256;

/// Compiled export request: which records, which rule, which columns.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub filter: EmployeeFilter,
    pub rule: Option<Rule>,
    pub field_map: FieldMap,
}

impl ExportPlan {
    pub fn new(filter: EmployeeFilter, rule: Option<Rule>, field_map: FieldMap) -> Self {
        Self {
            filter,
            rule,
            field_map,
        }
    }

    /// Evaluate the rule (if any) over one pre-filtered record and project it.
    pub fn process(&self, record: &Record) -> (Row, Vec<ActionFailure>) {
        match &self.rule {
            Some(rule) => {
                let evaluation = rule.evaluate(record);
                (self.field_map.project(&evaluation.record), evaluation.failures)
            }
            None => (self.field_map.project(record), Vec::new()),
        }
    }

    /// Indices of records passing the employee filter, in source order.
    /// Returns `None` once `cancel` fires.
    fn select(&self, records: &[Record], cancel: &CancellationToken) -> Option<Vec<usize>> {
        let mut selected = Vec::new();
        for (i, record) in records.iter().enumerate() {
            if i % SELECT_CANCEL_STRIDE == 0 && cancel.is_cancelled() {
                return None;
            }
            if self.filter.matches(record) {
                selected.push(i);
            }
        }
        Some(selected)
    }
}

/// Per-record action failures, keyed by record id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    failures: BTreeMap<String, Vec<ActionFailure>>,
}

impl ErrorReport {
    pub fn push(&mut self, record_id: &str, failures: Vec<ActionFailure>) {
        if failures.is_empty() {
            return;
        }
        self.failures
            .entry(record_id.to_string())
            .or_default()
            .extend(failures);
    }

    pub fn get(&self, record_id: &str) -> Option<&[ActionFailure]> {
        self.failures.get(record_id).map(Vec::as_slice)
    }

    /// Number of records with at least one failure.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ActionFailure])> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportOutput {
    /// Records that passed the pre-filter, independent of any limit.
    pub total_rows: usize,
    pub rows: Vec<Row>,
    pub errors: ErrorReport,
}

impl ExportOutput {
    pub fn into_preview(self) -> PreviewResponse {
        PreviewResponse {
            total_rows: self.total_rows,
            preview_content: self.rows,
        }
    }
}

/// The preview shape returned to the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResponse {
    pub total_rows: usize,
    pub preview_content: Vec<Row>,
}

#[derive(Default)]
struct BatchOutput {
    rows: Vec<Row>,
    failures: Vec<(String, Vec<ActionFailure>)>,
}

/// Evaluate `indices` of `records` in order. Returns `None` when `cancel`
/// fires before the batch completes.
fn process_batch(
    plan: &ExportPlan,
    records: &[Record],
    indices: &[usize],
    cancel: &CancellationToken,
) -> Option<BatchOutput> {
    let mut out = BatchOutput {
        rows: Vec::with_capacity(indices.len()),
        failures: Vec::new(),
    };
    for &i in indices {
        if cancel.is_cancelled() {
            return None;
        }
        let record = &records[i];
        let (row, failures) = plan.process(record);
        for failure in &failures {
            pr_warn!(
                pipe,
                record = %record.id,
                atom_rule = failure.atom_rule,
                error = %failure.error,
                "action skipped"
            );
        }
        if !failures.is_empty() {
            out.failures.push((record.id.clone(), failures));
        }
        out.rows.push(row);
    }
    Some(out)
}

/// Runs an [`ExportPlan`] over a shared record source.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    plan: Arc<ExportPlan>,
    batch_size: usize,
    parallelism: usize,
}

impl ExportPipeline {
    pub fn new(plan: ExportPlan, config: &ExportConfig) -> Self {
        Self {
            plan: Arc::new(plan),
            batch_size: config.batch_size.max(1),
            parallelism: config.parallelism.max(1),
        }
    }

    pub fn plan(&self) -> &ExportPlan {
        &self.plan
    }

    /// Run on the current thread with no cancellation.
    pub fn run_blocking(&self, records: &[Record], limit: Option<usize>) -> ExportOutput {
        let never = CancellationToken::new();
        let selected = self.plan.select(records, &never).unwrap_or_default();
        let (total_rows, selected) = apply_limit(selected, limit);
        let mut output = ExportOutput {
            total_rows,
            ..Default::default()
        };
        for batch in selected.chunks(self.batch_size) {
            if let Some(done) = process_batch(&self.plan, records, batch, &never) {
                merge(&mut output, done);
            }
        }
        output
    }

    /// Run batches on the blocking pool, at most `parallelism` at a time.
    ///
    /// Cancellation is checked during the pre-filter, between batches and
    /// between records; a cancelled run returns [`RuntimeReason::Cancelled`]
    /// and no rows.
    #[tracing::instrument(
        name = "export.run",
        skip_all,
        fields(records = records.len(), limit = ?limit)
    )]
    pub async fn run(
        &self,
        records: Arc<Vec<Record>>,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> RuntimeResult<ExportOutput> {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }
        let selecting = {
            let plan = Arc::clone(&self.plan);
            let records = Arc::clone(&records);
            let token = cancel.clone();
            tokio::task::spawn_blocking(move || plan.select(&records, &token))
        };
        let selected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            joined = selecting => joined.map_err(task_failed)?,
        };
        let Some(selected) = selected else {
            return Err(cancelled());
        };
        let (total_rows, selected) = apply_limit(selected, limit);
        let batches: Vec<Vec<usize>> = selected
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect();
        pr_debug!(
            pipe,
            total_rows,
            selected = selected.len(),
            batches = batches.len(),
            "export batches planned"
        );

        let mut slots: Vec<Option<BatchOutput>> = Vec::with_capacity(batches.len());
        slots.resize_with(batches.len(), || None);
        let mut tasks: JoinSet<(usize, Option<BatchOutput>)> = JoinSet::new();
        let mut pending = batches.into_iter().enumerate();

        loop {
            while tasks.len() < self.parallelism {
                let Some((index, batch)) = pending.next() else {
                    break;
                };
                if cancel.is_cancelled() {
                    tasks.abort_all();
                    return Err(cancelled());
                }
                let plan = Arc::clone(&self.plan);
                let records = Arc::clone(&records);
                let token = cancel.clone();
                tasks.spawn_blocking(move || {
                    (index, process_batch(&plan, &records, &batch, &token))
                });
            }

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(cancelled());
                }
                joined = tasks.join_next() => joined,
            };
            let Some(joined) = joined else {
                break;
            };
            let (index, done) = joined.map_err(task_failed)?;
            match done {
                Some(done) => slots[index] = Some(done),
                None => {
                    tasks.abort_all();
                    return Err(cancelled());
                }
            }
        }

        let mut output = ExportOutput {
            total_rows,
            ..Default::default()
        };
        for done in slots.into_iter().flatten() {
            merge(&mut output, done);
        }
        pr_info!(
            pipe,
            total_rows,
            rows = output.rows.len(),
            failed_records = output.errors.len(),
            "export finished"
        );
        Ok(output)
    }
}

/// Split the pre-filter result into `total_rows` and the rows to evaluate.
fn apply_limit(mut selected: Vec<usize>, limit: Option<usize>) -> (usize, Vec<usize>) {
    let total_rows = selected.len();
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    (total_rows, selected)
}

fn task_failed(e: tokio::task::JoinError) -> RuntimeError {
    StructError::from(RuntimeReason::Export).with_detail(format!("export task failed: {e}"))
}

fn merge(output: &mut ExportOutput, batch: BatchOutput) {
    output.rows.extend(batch.rows);
    for (id, failures) in batch.failures {
        output.errors.push(&id, failures);
    }
}
