//! Clean an export into Parquet or CSV tables

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::output::{print_csv, print_json};
use crate::cli::OutputFormat;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::storage::{default_storage_path, export_csv, Table, TableStore, WriteSummary};

use super::load_tables;

#[derive(Serialize)]
struct TableRows {
    table: &'static str,
    rows: usize,
}

/// Normalize the export and write every table under `out`
pub fn run(
    export: &Path,
    out: Option<PathBuf>,
    csv: bool,
    config: &AnalysisConfig,
    format: OutputFormat,
) -> Result<()> {
    let tables = load_tables(export, config)?;
    let out = out.unwrap_or_else(default_storage_path);

    let summary = if csv {
        export_csv(&tables, &out)?;
        WriteSummary::of(&tables)
    } else {
        TableStore::new(&out).write_tables(&tables)?
    };

    let rows = [
        (Table::Records, summary.records),
        (Table::Workouts, summary.workouts),
        (Table::ActivitySummaries, summary.activity_summaries),
    ];

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": out,
            "window": config.window,
            "records": summary.records,
            "workouts": summary.workouts,
            "activity_summaries": summary.activity_summaries,
        }))?,
        OutputFormat::Csv => {
            let rows: Vec<TableRows> = rows
                .iter()
                .map(|(table, count)| TableRows {
                    table: table.dir_name(),
                    rows: *count,
                })
                .collect();
            print_csv(&rows)?;
        }
        OutputFormat::Table => {
            println!("{:<20} {:>10}", "Table", "Rows");
            println!("{}", "-".repeat(31));
            for (table, count) in rows {
                println!("{:<20} {:>10}", table.dir_name(), count);
            }
            println!(
                "\nWindow {} to {}, written to {}",
                config.window.start,
                config.window.end,
                out.display()
            );
        }
    }

    Ok(())
}
