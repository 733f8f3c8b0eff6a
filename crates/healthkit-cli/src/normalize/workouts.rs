//! Workout cleaning: activity labels, zero-filled totals

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace, warn};

use super::{coerce_numeric, non_blank, strip_markers};
use crate::archive::RawEntry;
use crate::config::{AnalysisConfig, DateWindow};
use crate::error::{HealthError, Result};
use crate::models::Workout;

pub const WORKOUT_PREFIX: &str = "HKWorkoutActivityType";

/// Unit, device and nested metadata columns that never reach the table
pub const WORKOUT_DROPPED_COLUMNS: [&str; 9] = [
    "creationDate",
    "durationUnit",
    "totalDistanceUnit",
    "totalEnergyBurnedUnit",
    "sourceVersion",
    "MetadataEntry",
    "WorkoutRoute",
    "WorkoutEvent",
    "device",
];

const WORKOUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Cleans the `<Workout>` collection
#[derive(Debug, Clone)]
pub struct WorkoutNormalizer {
    window: DateWindow,
    label_corrections: BTreeMap<String, String>,
}

impl WorkoutNormalizer {
    pub fn new(window: DateWindow, label_corrections: BTreeMap<String, String>) -> Self {
        Self {
            window,
            label_corrections,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.window, config.workout_label_corrections.clone())
    }

    /// Clean every raw workout, failing on the first malformed date
    pub fn normalize(&self, raw: &[RawEntry]) -> Result<Vec<Workout>> {
        let mut workouts = Vec::new();
        let mut dropped: BTreeMap<&str, usize> = BTreeMap::new();
        let mut undated = 0usize;

        for entry in raw {
            let mut columns = strip_markers(entry);
            for name in WORKOUT_DROPPED_COLUMNS {
                if columns.remove(name).is_some() {
                    *dropped.entry(name).or_default() += 1;
                }
            }

            let start_date = parse_workout_date(&columns, "startDate")?;
            let end_date = parse_workout_date(&columns, "endDate")?;

            let Some(start_date) = start_date else {
                undated += 1;
                continue;
            };
            if !self.window.contains_timestamp(start_date.naive_local()) {
                continue;
            }

            let label = columns.get("workoutActivityType").copied().unwrap_or_default();
            let label = label.strip_prefix(WORKOUT_PREFIX).unwrap_or(label);

            workouts.push(Workout {
                activity_type: self.correct_label(label),
                duration: numeric_or_zero(&columns, "duration"),
                total_distance: numeric_or_zero(&columns, "totalDistance"),
                total_energy_burned: numeric_or_zero(&columns, "totalEnergyBurned"),
                source_name: columns.get("sourceName").map(|s| s.to_string()),
                start_date,
                end_date,
            });
        }

        if undated > 0 {
            warn!(rows = undated, "skipped workouts without startDate");
        }
        trace!(?dropped, "dropped workout metadata columns");
        debug!(raw = raw.len(), kept = workouts.len(), "normalized workouts");
        Ok(workouts)
    }

    /// Map a mislabeled activity to its real name; unlisted labels pass through
    pub fn correct_label(&self, label: &str) -> String {
        self.label_corrections
            .get(label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }
}

fn numeric_or_zero(columns: &HashMap<&str, &str>, field: &str) -> f64 {
    coerce_numeric(columns.get(field).copied()).unwrap_or(0.0)
}

fn parse_workout_date(
    columns: &HashMap<&str, &str>,
    field: &str,
) -> Result<Option<DateTime<FixedOffset>>> {
    let Some(raw) = non_blank(columns, field) else {
        return Ok(None);
    };
    DateTime::parse_from_str(raw, WORKOUT_DATE_FORMAT)
        .map(Some)
        .map_err(|_| HealthError::date_parse(field, raw, WORKOUT_DATE_FORMAT))
}
