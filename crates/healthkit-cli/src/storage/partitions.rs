//! Partition key calculation for the monthly Parquet layout

use chrono::NaiveDate;

/// Normalized tables and their on-disk layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Monthly partitions by record start date
    Records,
    /// Monthly partitions by local workout start date
    Workouts,
    /// Monthly partitions by summary date
    ActivitySummaries,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Records, Table::Workouts, Table::ActivitySummaries];

    /// Get the directory name for this table
    pub fn dir_name(&self) -> &'static str {
        match self {
            Table::Records => "records",
            Table::Workouts => "workouts",
            Table::ActivitySummaries => "activity_summaries",
        }
    }

    /// Calculate partition key (YYYY-MM) for a given date
    pub fn partition_key(&self, date: NaiveDate) -> String {
        date.format("%Y-%m").to_string()
    }

    /// File name used when the table is exported as a single CSV
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.dir_name())
    }
}
