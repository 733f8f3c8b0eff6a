//! Record cleaning: type names, occurrence values, day granularity

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, warn};

use super::{coerce_numeric, non_blank, strip_markers};
use crate::archive::RawEntry;
use crate::config::{AnalysisConfig, DateWindow};
use crate::error::{HealthError, Result};
use crate::models::Record;

pub const QUANTITY_PREFIX: &str = "HKQuantityTypeIdentifier";
pub const CATEGORY_PREFIX: &str = "HKCategoryTypeIdentifier";

/// Columns kept from a raw record; everything else is discarded
pub const RECORD_COLUMNS: [&str; 6] = ["type", "sourceName", "value", "unit", "startDate", "endDate"];

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RECORD_DATE_WITH_OFFSET: &str = "%Y-%m-%d %H:%M:%S %z";

/// Value given to samples that only mark that something happened
const OCCURRENCE_VALUE: f64 = 1.0;

/// Cleans the `<Record>` collection
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    window: DateWindow,
    excluded_types: HashSet<String>,
}

impl RecordNormalizer {
    pub fn new(window: DateWindow, excluded_types: HashSet<String>) -> Self {
        Self {
            window,
            excluded_types,
        }
    }

    /// Window and both exclusion lists from the config
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.window, config.excluded_record_types())
    }

    /// Clean every raw record, failing on the first malformed date
    pub fn normalize(&self, raw: &[RawEntry]) -> Result<Vec<Record>> {
        let mut in_window = 0usize;
        let mut undated = 0usize;
        let mut records = Vec::new();

        for entry in raw {
            let columns = project(&strip_markers(entry));

            let start_time = parse_record_date(&columns, "startDate")?;
            let end_time = parse_record_date(&columns, "endDate")?;
            let value = coerce_numeric(columns.get("value").copied());

            let Some(start_time) = start_time else {
                undated += 1;
                continue;
            };
            if !self.window.contains_timestamp(start_time) {
                continue;
            }
            in_window += 1;

            let record = Record {
                record_type: strip_type_prefix(columns.get("type").copied().unwrap_or_default()),
                source_name: columns.get("sourceName").map(|s| s.to_string()),
                value: value.unwrap_or(OCCURRENCE_VALUE),
                unit: columns.get("unit").map(|s| s.to_string()),
                start_date: start_time.date(),
                end_date: end_time.map(|t| t.date()),
                start_time,
                end_time,
                duration: end_time.map(|end| end - start_time),
            };

            if !self.is_excluded(&record.record_type) {
                records.push(record);
            }
        }

        if undated > 0 {
            warn!(rows = undated, "skipped records without startDate");
        }
        debug!(
            raw = raw.len(),
            in_window,
            kept = records.len(),
            "normalized records"
        );
        Ok(records)
    }

    /// Drop rows whose type is on an exclusion list
    pub fn retain_included(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| !self.is_excluded(&r.record_type))
            .collect()
    }

    fn is_excluded(&self, record_type: &str) -> bool {
        self.excluded_types.contains(record_type)
    }
}

/// Keep only the six record columns
fn project<'a>(columns: &HashMap<&'a str, &'a str>) -> HashMap<&'a str, &'a str> {
    RECORD_COLUMNS
        .iter()
        .filter_map(|&name| columns.get(name).map(|&value| (name, value)))
        .collect()
}

/// Remove the quantity or category vocabulary prefix
fn strip_type_prefix(raw: &str) -> String {
    raw.strip_prefix(QUANTITY_PREFIX)
        .or_else(|| raw.strip_prefix(CATEGORY_PREFIX))
        .unwrap_or(raw)
        .to_string()
}

/// Parse a record timestamp as wall-clock time.
///
/// Exports append the UTC offset of the device (`+1100`); it is accepted
/// and discarded so that days follow the local calendar.
fn parse_record_date(columns: &HashMap<&str, &str>, field: &str) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = non_blank(columns, field) else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(raw, RECORD_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_str(raw, RECORD_DATE_WITH_OFFSET).map(|t| t.naive_local()))
        .map(Some)
        .map_err(|_| HealthError::date_parse(field, raw, RECORD_DATE_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::from_config(&AnalysisConfig::default())
    }

    fn record(record_type: &str, value: Option<&str>, start: &str, end: &str) -> RawEntry {
        let mut pairs = vec![
            ("@type", record_type.to_string()),
            ("@sourceName", "Watch".to_string()),
            ("@unit", "count".to_string()),
            ("@startDate", start.to_string()),
            ("@endDate", end.to_string()),
        ];
        if let Some(v) = value {
            pairs.push(("@value", v.to_string()));
        }
        pairs.into_iter().collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unparsable_value_becomes_one_occurrence() {
        let raw = vec![record(
            "HKQuantityTypeIdentifierRespiratoryRate",
            Some("not_a_number"),
            "2020-11-01 08:00:00",
            "2020-11-01 08:05:00",
        )];

        let records = normalizer().normalize(&raw).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.record_type, "RespiratoryRate");
        assert_eq!(r.value, 1.0);
        assert_eq!(r.start_date, date(2020, 11, 1));
        assert_eq!(r.end_date, Some(date(2020, 11, 1)));
        assert_eq!(r.duration, Some(Duration::minutes(5)));
    }

    #[test]
    fn test_missing_value_becomes_one_occurrence() {
        let raw = vec![record(
            "HKCategoryTypeIdentifierToothbrushingEvent",
            None,
            "2020-11-01 21:00:00",
            "2020-11-01 21:02:00",
        )];
        let records = normalizer().normalize(&raw).unwrap();
        assert_eq!(records[0].record_type, "ToothbrushingEvent");
        assert_eq!(records[0].value, 1.0);
    }

    #[test]
    fn test_both_prefix_families_are_stripped() {
        assert_eq!(strip_type_prefix("HKQuantityTypeIdentifierStepCount"), "StepCount");
        assert_eq!(strip_type_prefix("HKCategoryTypeIdentifierSleepAnalysis"), "SleepAnalysis");
        assert_eq!(strip_type_prefix("HKDataTypeSleepDurationGoal"), "HKDataTypeSleepDurationGoal");
    }

    #[test]
    fn test_measured_value_is_kept() {
        let raw = vec![record(
            "HKQuantityTypeIdentifierHeartRate",
            Some("64"),
            "2020-11-01 08:00:00",
            "2020-11-01 08:00:00",
        )];
        let records = normalizer().normalize(&raw).unwrap();
        assert_eq!(records[0].value, 64.0);
        assert_eq!(records[0].duration, Some(Duration::zero()));
    }

    #[test]
    fn test_window_filter_uses_start_timestamp() {
        let raw = vec![
            record("HKQuantityTypeIdentifierStepCount", Some("1"), "2020-10-11 23:59:59", "2020-10-12 00:10:00"),
            record("HKQuantityTypeIdentifierStepCount", Some("2"), "2020-10-12 00:00:00", "2020-10-12 00:10:00"),
            record("HKQuantityTypeIdentifierStepCount", Some("3"), "2020-12-06 00:00:00", "2020-12-06 00:10:00"),
            record("HKQuantityTypeIdentifierStepCount", Some("4"), "2020-12-06 09:00:00", "2020-12-06 09:10:00"),
        ];
        let values: Vec<f64> = normalizer()
            .normalize(&raw)
            .unwrap()
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_excluded_types_are_dropped() {
        let raw = vec![
            record("HKQuantityTypeIdentifierDietarySugar", Some("12"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
            record("HKQuantityTypeIdentifierFlightsClimbed", Some("2"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
            record("HKCategoryTypeIdentifierSleepAnalysis", None, "2020-11-01 01:00:00", "2020-11-01 07:00:00"),
            record("HKQuantityTypeIdentifierDietaryEnergyConsumed", Some("8000"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
        ];
        let records = normalizer().normalize(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, "DietaryEnergyConsumed");
    }

    #[test]
    fn test_exclusion_filter_is_idempotent() {
        let raw = vec![
            record("HKQuantityTypeIdentifierHeartRate", Some("60"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
            record("HKQuantityTypeIdentifierDietaryFiber", Some("4"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
            record("HKQuantityTypeIdentifierBodyMass", Some("91.2"), "2020-11-02 07:00:00", "2020-11-02 07:00:00"),
        ];
        let n = normalizer();
        let once = n.normalize(&raw).unwrap();
        let twice = n.retain_included(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_exclusions() {
        let config = AnalysisConfig {
            dietary_exclusions: vec![],
            low_relevance_exclusions: vec!["HeartRate".to_string()],
            ..AnalysisConfig::default()
        };
        let raw = vec![
            record("HKQuantityTypeIdentifierHeartRate", Some("60"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
            record("HKQuantityTypeIdentifierDietarySugar", Some("3"), "2020-11-01 08:00:00", "2020-11-01 08:00:00"),
        ];
        let records = RecordNormalizer::from_config(&config).normalize(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, "DietarySugar");
    }

    #[test]
    fn test_bad_date_is_fatal_even_outside_window() {
        let raw = vec![record(
            "HKQuantityTypeIdentifierStepCount",
            Some("5"),
            "01/11/2019 08:00",
            "2019-11-01 08:05:00",
        )];
        let err = normalizer().normalize(&raw).unwrap_err();
        match err {
            HealthError::DateParse { field, value, .. } => {
                assert_eq!(field, "startDate");
                assert_eq!(value, "01/11/2019 08:00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_export_offset_is_discarded() {
        let raw = vec![record(
            "HKQuantityTypeIdentifierStepCount",
            Some("120"),
            "2020-11-01 23:30:00 +1100",
            "2020-11-01 23:40:00 +1100",
        )];
        let records = normalizer().normalize(&raw).unwrap();
        assert_eq!(records[0].start_date, date(2020, 11, 1));
        assert_eq!(records[0].duration, Some(Duration::minutes(10)));
    }

    #[test]
    fn test_missing_start_date_drops_row_and_missing_end_has_no_duration() {
        let no_start: RawEntry = [("@type", "HKQuantityTypeIdentifierStepCount"), ("@value", "3")]
            .into_iter()
            .collect();
        let no_end: RawEntry = [
            ("@type", "HKQuantityTypeIdentifierStepCount"),
            ("@value", "3"),
            ("@startDate", "2020-11-01 08:00:00"),
        ]
        .into_iter()
        .collect();

        let records = normalizer().normalize(&[no_start, no_end]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].end_date, None);
        assert_eq!(records[0].duration, None);
    }

    #[test]
    fn test_extra_attributes_are_discarded() {
        let mut raw = record("HKQuantityTypeIdentifierHeartRate", Some("70"), "2020-11-01 08:00:00", "2020-11-01 08:00:00");
        raw.push_attribute("sourceVersion", "7.1");
        raw.push_attribute("creationDate", "garbage that is never parsed");
        raw.push_child("MetadataEntry");

        let records = normalizer().normalize(&[raw]).unwrap();
        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("sourceVersion").is_none());
        assert!(json.get("creationDate").is_none());
        assert!(json.get("MetadataEntry").is_none());
    }
}
