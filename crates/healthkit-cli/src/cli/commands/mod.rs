pub mod clean;
pub mod config;
pub mod trends;
pub mod workouts;

pub use clean::run as clean;
pub use config::{init as config_init, path as config_path, show as config_show};
pub use trends::{energy, steps, trend, Metric};
pub use workouts::run as workouts;

use std::path::Path;

use tracing::warn;

use crate::archive::Archive;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::HealthTables;
use crate::normalize::normalize_archive;

/// Load an export and normalize all three tables
fn load_tables(export: &Path, config: &AnalysisConfig) -> Result<HealthTables> {
    let archive = Archive::load(export)?;
    let tables = normalize_archive(&archive, config)?;
    if tables.is_empty() {
        warn!(
            start = %config.window.start,
            end = %config.window.end,
            "no rows fall inside the analysis window"
        );
    }
    Ok(tables)
}
