//! Integration tests for the export cleaning pipeline
//!
//! These tests run the loader and normalizers over a recorded export fixture.

use chrono::{Duration, NaiveDate};
use healthkit_cli::analysis::{energy_balance, step_history, workout_overview, workout_stats, EnergyStatus};
use healthkit_cli::archive::Archive;
use healthkit_cli::config::AnalysisConfig;
use healthkit_cli::models::HealthTables;
use healthkit_cli::normalize::{normalize_archive, RecordNormalizer};
use healthkit_cli::storage::{export_csv, Table, TableStore};
use healthkit_cli::HealthError;
use tempfile::TempDir;

const EXPORT: &str = include_str!("fixtures/export_sample.xml");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture() -> Archive {
    Archive::parse_str(EXPORT).unwrap()
}

fn cleaned() -> HealthTables {
    normalize_archive(&fixture(), &AnalysisConfig::default()).unwrap()
}

/// Wrap collection entries in a document that has all three collections
fn export_with(records: &str, workouts: &str, summaries: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<HealthData locale=\"en_AU\">\n{}\n{}\n{}\n</HealthData>",
        records, workouts, summaries
    )
}

const ANY_RECORD: &str = r#"<Record type="HKQuantityTypeIdentifierStepCount" value="1" startDate="2020-11-01 08:00:00" endDate="2020-11-01 08:00:00"/>"#;
const ANY_WORKOUT: &str = r#"<Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="30" startDate="2020-11-01 08:00:00 +1100" endDate="2020-11-01 08:30:00 +1100"/>"#;
const ANY_SUMMARY: &str = r#"<ActivitySummary dateComponents="2020-11-01" activeEnergyBurned="500"/>"#;

mod loader_tests {
    use super::*;

    #[test]
    fn test_fixture_collections() {
        let archive = fixture();
        assert_eq!(archive.records.len(), 13);
        assert_eq!(archive.workouts.len(), 5);
        assert_eq!(archive.activity_summaries.len(), 4);
    }

    #[test]
    fn test_attributes_are_marked_and_children_are_keys() {
        let archive = fixture();
        let other = &archive.workouts[0];
        assert_eq!(other.get("@workoutActivityType"), Some("HKWorkoutActivityTypeOther"));
        assert_eq!(other.get("MetadataEntry"), Some(""));
        assert_eq!(other.get("WorkoutEvent"), Some(""));
        assert_eq!(other.get("@device"), Some("<<HKDevice: 0x283e5c1e0>>"));

        // Nested deeper than one level is not a column
        let running = &archive.workouts[1];
        assert_eq!(running.get("WorkoutRoute"), Some(""));
        assert_eq!(running.get("FileReference"), None);
    }

    #[test]
    fn test_correlation_and_its_records_are_skipped() {
        let archive = fixture();
        assert_eq!(archive.records.len(), 13);

        for entry in archive.records.iter().chain(&archive.workouts).chain(&archive.activity_summaries) {
            assert!(entry.get("Correlation").is_none());
            assert!(entry.get("@type").map_or(true, |t| !t.contains("BloodPressure")));
        }
    }

    #[test]
    fn test_missing_collection_is_fatal() {
        let xml = export_with(ANY_RECORD, ANY_WORKOUT, "");
        let err = Archive::parse_str(&xml).unwrap_err();
        assert!(matches!(err, HealthError::MissingCollection("ActivitySummary")));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let truncated = &EXPORT[..EXPORT.len() / 2];
        assert!(Archive::parse_str(truncated).is_err());
    }
}

mod normalize_tests {
    use super::*;

    #[test]
    fn test_fixture_row_counts() {
        let tables = cleaned();
        assert_eq!(tables.records.len(), 8);
        assert_eq!(tables.workouts.len(), 4);
        assert_eq!(tables.activity_summaries.len(), 2);
    }

    #[test]
    fn test_unparseable_value_becomes_occurrence() {
        let records = format!(
            "{}\n{}",
            ANY_RECORD,
            r#"<Record type="HKQuantityTypeIdentifierBodyMass" value="not_a_number" startDate="2020-11-01 08:00:00" endDate="2020-11-01 08:05:00"/>"#
        );
        let archive = Archive::parse_str(&export_with(&records, ANY_WORKOUT, ANY_SUMMARY)).unwrap();
        let tables = normalize_archive(&archive, &AnalysisConfig::default()).unwrap();

        let row = tables
            .records
            .iter()
            .find(|r| r.record_type == "BodyMass")
            .unwrap();
        assert_eq!(row.value, 1.0);
        assert_eq!(row.start_date, date(2020, 11, 1));
        assert_eq!(row.end_date, Some(date(2020, 11, 1)));
        assert_eq!(row.duration, Some(Duration::minutes(5)));
        assert_eq!(row.day_span(), Some(0));
    }

    #[test]
    fn test_other_workout_is_personal_training() {
        let tables = cleaned();
        let labels: Vec<&str> = tables.workouts.iter().map(|w| w.activity_type.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Personal Training Program", "Running", "Running", "Climbing"]
        );
        assert!(!labels.contains(&"Other"));
    }

    #[test]
    fn test_summary_outside_window_is_absent() {
        let tables = cleaned();
        let dates: Vec<NaiveDate> = tables.activity_summaries.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2020, 11, 1), date(2020, 11, 2)]);
    }

    #[test]
    fn test_every_row_is_inside_the_window() {
        let config = AnalysisConfig::default();
        let tables = cleaned();

        assert!(tables.records.iter().all(|r| config.window.contains_date(r.start_date)));
        assert!(tables
            .workouts
            .iter()
            .all(|w| config.window.contains_date(w.start_date.date_naive())));
        assert!(tables
            .activity_summaries
            .iter()
            .all(|s| config.window.contains_date(s.date)));
    }

    #[test]
    fn test_no_excluded_or_prefixed_types_survive() {
        let config = AnalysisConfig::default();
        let excluded = config.excluded_record_types();
        let tables = cleaned();

        for record in &tables.records {
            assert!(!excluded.contains(&record.record_type), "{}", record.record_type);
            assert!(!record.record_type.starts_with("HK"), "{}", record.record_type);
        }
        for workout in &tables.workouts {
            assert!(!workout.activity_type.starts_with("HKWorkoutActivityType"));
        }

        let category = tables
            .records
            .iter()
            .find(|r| r.record_type == "ToothbrushingEvent")
            .unwrap();
        assert_eq!(category.value, 1.0);
    }

    #[test]
    fn test_exclusion_filter_is_idempotent() {
        let config = AnalysisConfig::default();
        let tables = cleaned();
        let before = tables.records.len();
        let again = RecordNormalizer::from_config(&config).retain_included(tables.records);
        assert_eq!(again.len(), before);
    }

    #[test]
    fn test_missing_numeric_fields_are_zero() {
        let tables = cleaned();
        let climbing = tables
            .workouts
            .iter()
            .find(|w| w.activity_type == "Climbing")
            .unwrap();
        assert_eq!(climbing.duration, 95.0);
        assert_eq!(climbing.total_distance, 0.0);
        assert_eq!(climbing.total_energy_burned, 0.0);
    }

    #[test]
    fn test_serialized_rows_carry_no_markers() {
        let tables = cleaned();
        let rows = [
            serde_json::to_value(&tables.records[0]).unwrap(),
            serde_json::to_value(&tables.workouts[0]).unwrap(),
            serde_json::to_value(&tables.activity_summaries[0]).unwrap(),
        ];
        for row in rows {
            for key in row.as_object().unwrap().keys() {
                assert!(!key.starts_with('@'), "{}", key);
            }
        }
        assert!(rows_have_no_dropped_columns(&tables));
    }

    fn rows_have_no_dropped_columns(tables: &HealthTables) -> bool {
        let workout = serde_json::to_value(&tables.workouts[0]).unwrap();
        let summary = serde_json::to_value(&tables.activity_summaries[0]).unwrap();
        ["durationUnit", "device", "MetadataEntry", "WorkoutEvent", "creationDate"]
            .iter()
            .all(|c| workout.get(c).is_none())
            && ["appleMoveTime", "activeEnergyBurnedUnit"]
                .iter()
                .all(|c| summary.get(c).is_none())
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let summaries = r#"<ActivitySummary dateComponents="11/01/2020" activeEnergyBurned="500"/>"#;
        let archive = Archive::parse_str(&export_with(ANY_RECORD, ANY_WORKOUT, summaries)).unwrap();
        let err = normalize_archive(&archive, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, HealthError::DateParse { ref field, .. } if field == "dateComponents"));
    }

    #[test]
    fn test_window_without_rows_is_empty() {
        assert!(!cleaned().is_empty());

        let config = AnalysisConfig::default()
            .with_window(Some(date(2019, 1, 1)), Some(date(2019, 1, 31)))
            .unwrap();
        assert!(normalize_archive(&fixture(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_narrower_window() {
        let config = AnalysisConfig::default()
            .with_window(Some(date(2020, 11, 2)), Some(date(2020, 11, 4)))
            .unwrap();
        let tables = normalize_archive(&fixture(), &config).unwrap();
        assert_eq!(tables.workouts.len(), 2);
        assert_eq!(tables.activity_summaries.len(), 1);
    }
}

mod analysis_tests {
    use super::*;

    #[test]
    fn test_step_history_spans_past_window_bounds() {
        let history = step_history(&fixture().records, &AnalysisConfig::default()).unwrap();
        let days: Vec<(NaiveDate, f64)> = history.iter().map(|d| (d.date, d.value)).collect();
        assert_eq!(
            days,
            vec![
                (date(2020, 9, 1), 3000.0),
                (date(2020, 11, 1), 2000.0),
                (date(2020, 11, 2), 4000.0),
                (date(2020, 12, 7), 700.0),
            ]
        );
    }

    #[test]
    fn test_energy_balance_from_fixture() {
        let config = AnalysisConfig::default();
        let tables = cleaned();
        let days = energy_balance(&tables.records, &tables.activity_summaries, &config);

        assert_eq!(days.len(), 1);
        assert!((days[0].consumed_kcal - 2000.0).abs() < 1e-9);
        assert_eq!(days[0].active_kcal, 850.5);
        assert!((days[0].net_kcal - 3088.5).abs() < 1e-9);
        assert_eq!(days[0].status, EnergyStatus::AboveTdee);
    }

    #[test]
    fn test_workout_overview_from_fixture() {
        let stats = workout_stats(&cleaned().workouts);
        let overview = workout_overview(&stats);
        assert_eq!(overview.workouts, 4);
        assert_eq!(overview.total_minutes, 45.5 + 30.0 + 50.0 + 95.0);
        assert_eq!(overview.total_energy, 1120.0);
    }
}

mod storage_tests {
    use super::*;

    #[test]
    fn test_parquet_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = TableStore::new(temp.path());
        let tables = cleaned();

        let summary = store.write_tables(&tables).unwrap();
        assert_eq!(summary.records, 8);

        let partitions = store.list_partitions(Table::Workouts).unwrap();
        assert_eq!(partitions.len(), 1);
        assert!(partitions[0].ends_with("workouts/2020-11.parquet"));

        let mut read_back = store.read_tables().unwrap();
        read_back.records.sort_by_key(|r| (r.start_time, r.record_type.clone()));
        let mut expected = tables.clone();
        expected.records.sort_by_key(|r| (r.start_time, r.record_type.clone()));
        assert_eq!(read_back, expected);
    }

    #[test]
    fn test_csv_export() {
        let temp = TempDir::new().unwrap();
        let paths = export_csv(&cleaned(), temp.path()).unwrap();
        assert_eq!(paths.len(), 3);

        let workouts = std::fs::read_to_string(temp.path().join("workouts.csv")).unwrap();
        assert_eq!(workouts.lines().count(), 5);
        assert!(workouts.contains("Personal Training Program"));
    }
}
