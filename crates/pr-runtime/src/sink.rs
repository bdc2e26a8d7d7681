use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use orion_error::prelude::*;
use orion_error::compat_prelude::*;
use pr_core::Row;

use crate::error::{RuntimeReason, RuntimeResult};
use crate::pipeline::ErrorReport;

/// Write `rows` as JSON Lines, one object per row with keys in field-map
/// order. Returns the number of rows written.
pub fn write_rows_jsonl(rows: &[Row], path: &Path) -> RuntimeResult<usize> {
    let mut writer = create(path)?;
    for row in rows {
        serde_json::to_writer(&mut writer, row)
            .owe(RuntimeReason::Export)
            .position(path.display().to_string())?;
        writeln!(writer)
            .owe_sys()
            .position(path.display().to_string())?;
    }
    writer
        .flush()
        .owe_sys()
        .position(path.display().to_string())?;
    pr_info!(res, file = %path.display(), rows = rows.len(), "rows written");
    Ok(rows.len())
}

/// Write the batch error report as a pretty-printed JSON object.
pub fn write_error_report(report: &ErrorReport, path: &Path) -> RuntimeResult<()> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, report)
        .owe(RuntimeReason::Export)
        .position(path.display().to_string())?;
    writeln!(writer)
        .owe_sys()
        .position(path.display().to_string())?;
    writer
        .flush()
        .owe_sys()
        .position(path.display().to_string())?;
    pr_info!(res, file = %path.display(), failed_records = report.len(), "error report written");
    Ok(())
}

fn create(path: &Path) -> RuntimeResult<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .owe_sys()
            .position(parent.display().to_string())?;
    }
    let file = File::create(path)
        .owe_sys()
        .position(path.display().to_string())?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pr_core::{FieldMap, FieldMapItem, Record, Value};

    #[test]
    fn rows_keep_field_map_key_order() {
        let map = FieldMap::new(vec![
            FieldMapItem::new("username", "Name"),
            FieldMapItem::new("id", "Employee"),
            FieldMapItem::new("missing", "Notes"),
        ])
        .unwrap();
        let rows = vec![map.project(&Record::new("7", [("username", Value::str("zoe"))]))];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/rows.jsonl");
        assert_eq!(write_rows_jsonl(&rows, &path).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\"Name\":\"zoe\",\"Employee\":\"7\",\"Notes\":\"\"}\n");
    }

    #[test]
    fn empty_report_is_an_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.json");
        write_error_report(&ErrorReport::default(), &path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
