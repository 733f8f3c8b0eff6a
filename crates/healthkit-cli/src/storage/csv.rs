//! Flat CSV export, one file per table

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::error::{HealthError, Result};
use crate::models::HealthTables;

use super::batches;
use super::partitions::Table;

/// Write one batch as a CSV file with a header row
fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| HealthError::storage(format!("Failed to create {:?}: {}", path, e)))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .map_err(|e| HealthError::storage(format!("Failed to write CSV: {}", e)))
}

/// Export all three tables into `dir`, returning the files written
pub fn export_csv(tables: &HealthTables, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .map_err(|e| HealthError::storage(format!("Failed to create directory {:?}: {}", dir, e)))?;

    let records: Vec<_> = tables.records.iter().collect();
    let workouts: Vec<_> = tables.workouts.iter().collect();
    let summaries: Vec<_> = tables.activity_summaries.iter().collect();

    let outputs = [
        (Table::Records, batches::records_to_batch(&records)?),
        (Table::Workouts, batches::workouts_to_batch(&workouts)?),
        (
            Table::ActivitySummaries,
            batches::activity_summaries_to_batch(&summaries)?,
        ),
    ];

    let mut paths = Vec::with_capacity(outputs.len());
    for (table, batch) in outputs {
        let path = dir.join(table.csv_file_name());
        write_csv(&path, &batch)?;
        info!(path = %path.display(), rows = batch.num_rows(), "exported CSV");
        paths.push(path);
    }
    Ok(paths)
}
