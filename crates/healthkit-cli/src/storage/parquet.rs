//! Parquet read/write for the monthly partitioned tables
//!
//! Every partition file is written to a temp path and renamed into place,
//! so a reader never sees a half-written file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use crate::error::{HealthError, Result};
use crate::models::{ActivitySummary, HealthTables, Record, Workout};

use super::batches;
use super::partitions::Table;

/// Rows written per table by [`TableStore::write_tables`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub records: usize,
    pub workouts: usize,
    pub activity_summaries: usize,
}

impl WriteSummary {
    /// Row counts of a set of tables
    pub fn of(tables: &HealthTables) -> Self {
        Self {
            records: tables.records.len(),
            workouts: tables.workouts.len(),
            activity_summaries: tables.activity_summaries.len(),
        }
    }
}

/// Parquet storage for the normalized tables
#[derive(Debug, Clone)]
pub struct TableStore {
    base_path: PathBuf,
}

impl TableStore {
    /// Create a new TableStore at the given base path
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the full path for a partition file
    pub fn partition_path(&self, table: Table, partition_key: &str) -> PathBuf {
        self.base_path
            .join(table.dir_name())
            .join(format!("{}.parquet", partition_key))
    }

    fn table_dir(&self, table: Table) -> PathBuf {
        self.base_path.join(table.dir_name())
    }

    /// Remove every partition of a table
    pub fn clear(&self, table: Table) -> Result<()> {
        let dir = self.table_dir(table);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| {
                HealthError::storage(format!("Failed to remove directory {:?}: {}", dir, e))
            })?;
        }
        Ok(())
    }

    /// Partition files of a table, sorted by partition key
    pub fn list_partitions(&self, table: Table) -> Result<Vec<PathBuf>> {
        let dir = self.table_dir(table);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| HealthError::storage(format!("Failed to read directory {:?}: {}", dir, e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| HealthError::storage(format!("Failed to read directory entry: {}", e)))?
                .path();
            if path.extension().is_some_and(|ext| ext == "parquet") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Write a record batch to a partition file atomically
    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> Result<()> {
        let temp_path = path.with_extension("parquet.tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| HealthError::storage(format!("Failed to create directory: {}", e)))?;
        }

        let file = File::create(&temp_path)
            .map_err(|e| HealthError::storage(format!("Failed to create temp file: {}", e)))?;

        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(Default::default()))
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .map_err(|e| HealthError::storage(format!("Failed to create Parquet writer: {}", e)))?;

        writer
            .write(batch)
            .map_err(|e| HealthError::storage(format!("Failed to write batch: {}", e)))?;

        writer
            .close()
            .map_err(|e| HealthError::storage(format!("Failed to close writer: {}", e)))?;

        fs::rename(&temp_path, path)
            .map_err(|e| HealthError::storage(format!("Failed to rename temp file: {}", e)))?;

        Ok(())
    }

    /// Read all record batches from a partition file
    fn read_batches(&self, path: &Path) -> Result<Vec<RecordBatch>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)
            .map_err(|e| HealthError::storage(format!("Failed to open file: {}", e)))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| HealthError::storage(format!("Failed to create reader: {}", e)))?
            .build()
            .map_err(|e| HealthError::storage(format!("Failed to build reader: {}", e)))?;

        reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HealthError::storage(format!("Failed to read batches: {}", e)))
    }

    /// Group rows by partition, replace the table, write each partition
    fn write_partitioned<T>(
        &self,
        table: Table,
        rows: &[T],
        date_of: impl Fn(&T) -> NaiveDate,
        to_batch: impl Fn(&[&T]) -> Result<RecordBatch>,
    ) -> Result<()> {
        let mut partitions: BTreeMap<String, Vec<&T>> = BTreeMap::new();
        for row in rows {
            partitions
                .entry(table.partition_key(date_of(row)))
                .or_default()
                .push(row);
        }

        self.clear(table)?;
        for (key, partition_rows) in partitions {
            let path = self.partition_path(table, &key);
            let batch = to_batch(partition_rows.as_slice())?;
            self.write_batch(&path, &batch)?;
            debug!(table = table.dir_name(), partition = %key, rows = partition_rows.len(), "wrote partition");
        }
        Ok(())
    }

    fn read_partitioned<T>(
        &self,
        table: Table,
        from_batch: impl Fn(&RecordBatch) -> Result<Vec<T>>,
    ) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        for path in self.list_partitions(table)? {
            for batch in self.read_batches(&path)? {
                rows.extend(from_batch(&batch)?);
            }
        }
        Ok(rows)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Write records to monthly partitions by start date
    pub fn write_records(&self, records: &[Record]) -> Result<()> {
        self.write_partitioned(
            Table::Records,
            records,
            |r| r.start_date,
            batches::records_to_batch,
        )
    }

    pub fn read_records(&self) -> Result<Vec<Record>> {
        self.read_partitioned(Table::Records, batches::batch_to_records)
    }

    // =========================================================================
    // Workouts
    // =========================================================================

    /// Write workouts to monthly partitions by local start date
    pub fn write_workouts(&self, workouts: &[Workout]) -> Result<()> {
        self.write_partitioned(
            Table::Workouts,
            workouts,
            |w| w.start_date.date_naive(),
            batches::workouts_to_batch,
        )
    }

    pub fn read_workouts(&self) -> Result<Vec<Workout>> {
        self.read_partitioned(Table::Workouts, batches::batch_to_workouts)
    }

    // =========================================================================
    // Activity summaries
    // =========================================================================

    /// Write activity summaries to monthly partitions by date
    pub fn write_activity_summaries(&self, summaries: &[ActivitySummary]) -> Result<()> {
        self.write_partitioned(
            Table::ActivitySummaries,
            summaries,
            |s| s.date,
            batches::activity_summaries_to_batch,
        )
    }

    pub fn read_activity_summaries(&self) -> Result<Vec<ActivitySummary>> {
        self.read_partitioned(Table::ActivitySummaries, batches::batch_to_activity_summaries)
    }

    // =========================================================================
    // All tables
    // =========================================================================

    /// Replace all three tables with the given rows
    pub fn write_tables(&self, tables: &HealthTables) -> Result<WriteSummary> {
        self.write_records(&tables.records)?;
        self.write_workouts(&tables.workouts)?;
        self.write_activity_summaries(&tables.activity_summaries)?;

        let summary = WriteSummary::of(tables);
        info!(path = %self.base_path.display(), ?summary, "tables written");
        Ok(summary)
    }

    pub fn read_tables(&self) -> Result<HealthTables> {
        Ok(HealthTables {
            records: self.read_records()?,
            workouts: self.read_workouts()?,
            activity_summaries: self.read_activity_summaries()?,
        })
    }
}
