use std::path::PathBuf;
use std::process;

use anyhow::Result;

use pr_core::{
    EmployeeFilterDocument, FieldMapDocument, RuleDocument, compile_employee_filter,
    compile_field_map, compile_rule,
};

use crate::docs::{load_config, read_json, schema_of};

pub fn run(
    rule: PathBuf,
    filter: Option<PathBuf>,
    field_map: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = config.as_deref().map(load_config).transpose()?;
    let schema = schema_of(config.as_ref().map(|(c, _)| c));

    let mut failures = Vec::new();

    let rule_doc: RuleDocument = read_json(&rule)?;
    match compile_rule(&rule_doc, &schema) {
        Ok(compiled) => eprintln!(
            "{}: rule '{}' OK ({} atom rule(s))",
            rule.display(),
            compiled.name,
            compiled.atom_rules.len()
        ),
        Err(e) => failures.push(format!("{}: {e}", rule.display())),
    }

    if let Some(path) = filter {
        let doc: EmployeeFilterDocument = read_json(&path)?;
        match compile_employee_filter(&doc, &schema) {
            Ok(f) => eprintln!("{}: filter OK ({} field(s))", path.display(), f.entries().len()),
            Err(e) => failures.push(format!("{}: {e}", path.display())),
        }
    }

    if let Some(path) = field_map {
        let doc: FieldMapDocument = read_json(&path)?;
        match compile_field_map(&doc) {
            Ok(m) => eprintln!("{}: field map OK ({} column(s))", path.display(), m.items().len()),
            Err(e) => failures.push(format!("{}: {e}", path.display())),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("error: {failure}");
        }
        process::exit(1);
    }
    Ok(())
}
