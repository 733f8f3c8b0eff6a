//! Cleaning pipeline: raw export collections to typed tables
//!
//! Each table has its own normalizer. They share nothing but the
//! configuration they are built from, so they can run in any order:
//!
//! ```text
//! Archive ──┬── RecordNormalizer   ──> Vec<Record>
//!           ├── WorkoutNormalizer  ──> Vec<Workout>
//!           └── ActivityNormalizer ──> Vec<ActivitySummary>
//! ```
//!
//! Date fields that do not match their format abort the run. Numeric
//! fields that fail to parse fall back to a per-column default.

mod activity;
mod records;
mod workouts;

pub use activity::{ActivityNormalizer, ACTIVITY_DROPPED_COLUMNS};
pub use records::{RecordNormalizer, CATEGORY_PREFIX, QUANTITY_PREFIX, RECORD_COLUMNS};
pub use workouts::{WorkoutNormalizer, WORKOUT_DROPPED_COLUMNS, WORKOUT_PREFIX};

use std::collections::HashMap;

use tracing::info;

use crate::archive::{Archive, RawEntry, ATTRIBUTE_MARKER};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::HealthTables;

/// Run all three normalizers over a loaded archive
pub fn normalize_archive(archive: &Archive, config: &AnalysisConfig) -> Result<HealthTables> {
    let records = RecordNormalizer::from_config(config).normalize(&archive.records)?;
    let workouts = WorkoutNormalizer::from_config(config).normalize(&archive.workouts)?;
    let activity_summaries =
        ActivityNormalizer::from_config(config).normalize(&archive.activity_summaries)?;

    info!(
        records = records.len(),
        workouts = workouts.len(),
        activity_summaries = activity_summaries.len(),
        window_start = %config.window.start,
        window_end = %config.window.end,
        "normalized archive"
    );

    Ok(HealthTables {
        records,
        workouts,
        activity_summaries,
    })
}

/// Column view of a raw entry with the attribute marker removed from keys.
///
/// An attribute wins over a child element of the same name.
pub(crate) fn strip_markers(entry: &RawEntry) -> HashMap<&str, &str> {
    let mut columns = HashMap::with_capacity(entry.len());
    for (key, value) in entry.iter() {
        match key.strip_prefix(ATTRIBUTE_MARKER) {
            Some(bare) => {
                columns.insert(bare, value);
            }
            None => {
                columns.entry(key).or_insert(value);
            }
        }
    }
    columns
}

/// Parse a numeric column, treating blanks, garbage and NaN as absent
pub(crate) fn coerce_numeric(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

/// A present, non-blank column value
pub(crate) fn non_blank<'a>(columns: &HashMap<&str, &'a str>, key: &str) -> Option<&'a str> {
    columns
        .get(key)
        .copied()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
