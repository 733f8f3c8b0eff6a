//! Storage layer for the normalized tables
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/healthkit/
//! ├── records/
//! │   ├── 2020-10.parquet         # Monthly partitions by start date
//! │   └── ...
//! ├── workouts/
//! │   ├── 2020-11.parquet         # Monthly partitions by local start date
//! │   └── ...
//! └── activity_summaries/
//!     ├── 2020-11.parquet         # Monthly partitions by summary date
//!     └── ...
//! ```
//!
//! Each table can also be exported as a single CSV file. External tools can
//! query the Parquet partitions directly:
//!
//! ```sql
//! SELECT type, sum(value) FROM 'records/*.parquet' GROUP BY type;
//! ```

mod batches;
mod csv;
mod parquet;
mod partitions;

pub use csv::export_csv;
pub use parquet::{TableStore, WriteSummary};
pub use partitions::Table;

use std::path::PathBuf;

/// Get the default storage path
pub fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healthkit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_storage_path() {
        assert!(default_storage_path().ends_with("healthkit"));
    }
}
