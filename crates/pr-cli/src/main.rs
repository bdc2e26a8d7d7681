use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd_display;
mod cmd_export;
mod cmd_preview;
mod cmd_validate;
mod docs;

#[derive(Parser)]
#[command(name = "payroll-rules", about = "Payroll rule & filter engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile documents and report validation errors (exit 1 on failure)
    Validate {
        /// Rule document (JSON)
        #[arg(short, long)]
        rule: PathBuf,

        /// Employee filter document to check as well
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Field map document to check as well
        #[arg(long)]
        field_map: Option<PathBuf>,

        /// payroll.toml, for the employee schema
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the human-readable trace of a rule
    Display {
        /// Rule document (JSON)
        #[arg(short, long)]
        rule: PathBuf,

        /// payroll.toml, for the schema and category labels
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the first rows of an export as preview JSON
    Preview {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        field_map: PathBuf,

        #[arg(long)]
        filter: Option<PathBuf>,

        #[arg(short, long)]
        rule: Option<PathBuf>,

        /// Rows to return (defaults to export.preview_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run the full export and write rows as JSON Lines. Ctrl-C cancels.
    Export {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        field_map: PathBuf,

        #[arg(long)]
        filter: Option<PathBuf>,

        #[arg(short, long)]
        rule: Option<PathBuf>,

        /// Output file for rows
        #[arg(short, long)]
        out: PathBuf,

        /// Output file for the per-record error report
        #[arg(long)]
        errors: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            rule,
            filter,
            field_map,
            config,
        } => {
            cmd_validate::run(rule, filter, field_map, config)?;
        }

        Commands::Display { rule, config } => {
            cmd_display::run(rule, config)?;
        }

        Commands::Preview {
            config,
            field_map,
            filter,
            rule,
            limit,
        } => {
            let request = docs::load_request(&field_map, filter.as_deref(), rule.as_deref())?;
            cmd_preview::run(config, request, limit).await?;
        }

        Commands::Export {
            config,
            field_map,
            filter,
            rule,
            out,
            errors,
        } => {
            let request = docs::load_request(&field_map, filter.as_deref(), rule.as_deref())?;
            cmd_export::run(config, request, out, errors).await?;
        }
    }

    Ok(())
}
