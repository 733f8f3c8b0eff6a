use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use super::{daily_series, Aggregation, DailyValue};
use crate::archive::RawEntry;
use crate::config::{AnalysisConfig, DateWindow};
use crate::error::Result;
use crate::normalize::RecordNormalizer;

pub const STEP_COUNT_TYPE: &str = "StepCount";

/// Daily step totals from `step_history_start` onwards.
///
/// The cleaned record table only covers the analysis window, so this goes
/// back to the raw records with an open-ended window and no exclusion lists.
/// Sources listed in `step_source_exclusions` are dropped so that steps
/// counted by both phone and watch are not summed twice.
pub fn step_history(raw_records: &[RawEntry], config: &AnalysisConfig) -> Result<Vec<DailyValue>> {
    let window = DateWindow::new(config.step_history_start, NaiveDate::MAX)?;
    let records = RecordNormalizer::new(window, HashSet::new()).normalize(raw_records)?;

    let excluded: HashSet<&str> = config
        .step_source_exclusions
        .iter()
        .map(String::as_str)
        .collect();
    let steps: Vec<_> = records
        .into_iter()
        .filter(|r| r.record_type == STEP_COUNT_TYPE)
        .filter(|r| !r.source_name.as_deref().is_some_and(|s| excluded.contains(s)))
        .collect();

    debug!(samples = steps.len(), since = %window.start, "step history");
    Ok(daily_series(&steps, STEP_COUNT_TYPE, Aggregation::Sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(record_type: &str, source: &str, start: &str, value: &str) -> RawEntry {
        [
            ("@type", record_type),
            ("@sourceName", source),
            ("@unit", "count"),
            ("@value", value),
            ("@startDate", start),
            ("@endDate", start),
        ]
        .into_iter()
        .collect()
    }

    fn steps(source: &str, start: &str, value: &str) -> RawEntry {
        sample("HKQuantityTypeIdentifierStepCount", source, start, value)
    }

    #[test]
    fn test_history_reaches_before_window_and_skips_sources() {
        let raw = vec![
            steps("Watch", "2019-08-31 10:00:00", "999"),
            steps("Watch", "2019-09-01 10:00:00", "100"),
            steps("Milhouse", "2019-09-01 10:00:00", "5000"),
            steps("Watch", "2019-09-01 18:00:00", "50"),
            steps("AllTrails", "2020-11-01 10:00:00", "4000"),
            steps("Watch", "2020-11-01 10:00:00", "12000"),
        ];

        let history = step_history(&raw, &AnalysisConfig::default()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date.to_string(), "2019-09-01");
        assert_eq!(history[0].value, 150.0);
        assert_eq!(history[1].value, 12000.0);
    }

    #[test]
    fn test_history_keeps_samples_after_window() {
        let raw = vec![
            steps("Watch", "2020-11-01 10:00:00", "100"),
            steps("Watch", "2021-03-01 10:00:00", "9000"),
        ];

        let history = step_history(&raw, &AnalysisConfig::default()).unwrap();
        let days: Vec<(String, f64)> = history.iter().map(|d| (d.date.to_string(), d.value)).collect();
        assert_eq!(
            days,
            vec![("2020-11-01".to_string(), 100.0), ("2021-03-01".to_string(), 9000.0)]
        );
    }

    #[test]
    fn test_history_ignores_other_types() {
        let raw = vec![sample(
            "HKQuantityTypeIdentifierHeartRate",
            "Watch",
            "2020-11-01 10:00:00",
            "70",
        )];
        let history = step_history(&raw, &AnalysisConfig::default()).unwrap();
        assert!(history.is_empty());
    }
}
