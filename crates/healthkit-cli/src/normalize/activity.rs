//! Activity summary cleaning: one row per day with zero-filled rings

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{coerce_numeric, non_blank, strip_markers};
use crate::archive::RawEntry;
use crate::config::{AnalysisConfig, DateWindow};
use crate::error::{HealthError, Result};
use crate::models::ActivitySummary;

/// Energy unit and move-time columns that never reach the table
pub const ACTIVITY_DROPPED_COLUMNS: [&str; 3] =
    ["activeEnergyBurnedUnit", "appleMoveTime", "appleMoveTimeGoal"];

const ACTIVITY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Cleans the `<ActivitySummary>` collection
#[derive(Debug, Clone)]
pub struct ActivityNormalizer {
    window: DateWindow,
}

impl ActivityNormalizer {
    pub fn new(window: DateWindow) -> Self {
        Self { window }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.window)
    }

    /// Clean every raw summary, failing on the first malformed date
    pub fn normalize(&self, raw: &[RawEntry]) -> Result<Vec<ActivitySummary>> {
        let mut summaries = Vec::new();
        let mut undated = 0usize;

        for entry in raw {
            let mut columns = strip_markers(entry);
            for name in ACTIVITY_DROPPED_COLUMNS {
                columns.remove(name);
            }

            let Some(date) = parse_summary_date(&columns)? else {
                undated += 1;
                continue;
            };

            let summary = ActivitySummary {
                date,
                active_energy_burned: numeric_or_zero(&columns, "activeEnergyBurned"),
                active_energy_burned_goal: numeric_or_zero(&columns, "activeEnergyBurnedGoal"),
                apple_exercise_time: numeric_or_zero(&columns, "appleExerciseTime"),
                apple_exercise_time_goal: numeric_or_zero(&columns, "appleExerciseTimeGoal"),
                apple_stand_hours: numeric_or_zero(&columns, "appleStandHours"),
                apple_stand_hours_goal: numeric_or_zero(&columns, "appleStandHoursGoal"),
            };

            if self.window.contains_date(summary.date) {
                summaries.push(summary);
            }
        }

        if undated > 0 {
            warn!(rows = undated, "skipped activity summaries without dateComponents");
        }
        debug!(raw = raw.len(), kept = summaries.len(), "normalized activity summaries");
        Ok(summaries)
    }
}

fn numeric_or_zero(columns: &HashMap<&str, &str>, field: &str) -> f64 {
    coerce_numeric(columns.get(field).copied()).unwrap_or(0.0)
}

fn parse_summary_date(columns: &HashMap<&str, &str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = non_blank(columns, "dateComponents") else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, ACTIVITY_DATE_FORMAT)
        .map(Some)
        .map_err(|_| HealthError::date_parse("dateComponents", raw, ACTIVITY_DATE_FORMAT))
}
