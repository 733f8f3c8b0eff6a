//! Arrow record batch conversion for the normalized tables
//!
//! Column names follow the export's attribute names (`type`, `startDate`,
//! `workoutActivityType`, ...) so the files read like the source data.

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::{HealthError, Result};
use crate::models::{ActivitySummary, Record, Workout};

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Workout instants are stored in UTC with the source offset in a separate column
const UTC: &str = "+00:00";

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
        .ok_or_else(|| HealthError::storage(format!("date out of range: {} days", days)))
}

fn micros_to_naive(micros: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|t| t.naive_utc())
        .ok_or_else(|| HealthError::storage(format!("timestamp out of range: {}", micros)))
}

fn micros_to_fixed(micros: i64, offset_seconds: i32) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_seconds)
        .ok_or_else(|| HealthError::storage(format!("invalid UTC offset: {}", offset_seconds)))?;
    DateTime::from_timestamp_micros(micros)
        .map(|t| t.with_timezone(&offset))
        .ok_or_else(|| HealthError::storage(format!("timestamp out of range: {}", micros)))
}

/// Look up a column by name and downcast it
fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| HealthError::storage(format!("missing or mistyped column '{}'", name)))
}

fn optional_string(array: &StringArray, i: usize) -> Option<String> {
    array.is_valid(i).then(|| array.value(i).to_string())
}

fn build(schema: Schema, columns: Vec<ArrayRef>) -> Result<RecordBatch> {
    RecordBatch::try_new(Arc::new(schema), columns)
        .map_err(|e| HealthError::storage(format!("Failed to create record batch: {}", e)))
}

fn naive_timestamp() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, None)
}

fn utc_timestamp() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into()))
}

// =========================================================================
// Records
// =========================================================================

pub(crate) fn records_to_batch(records: &[&Record]) -> Result<RecordBatch> {
    let record_type = StringArray::from_iter_values(records.iter().map(|r| r.record_type.as_str()));
    let source_name: StringArray = records.iter().map(|r| r.source_name.as_deref()).collect();
    let value = Float64Array::from_iter_values(records.iter().map(|r| r.value));
    let unit: StringArray = records.iter().map(|r| r.unit.as_deref()).collect();
    let start_date = Date32Array::from_iter_values(records.iter().map(|r| date_to_days(r.start_date)));
    let end_date: Date32Array = records.iter().map(|r| r.end_date.map(date_to_days)).collect();
    let start_time = TimestampMicrosecondArray::from_iter_values(
        records.iter().map(|r| r.start_time.and_utc().timestamp_micros()),
    );
    let end_time: TimestampMicrosecondArray = records
        .iter()
        .map(|r| r.end_time.map(|t| t.and_utc().timestamp_micros()))
        .collect();
    let duration: Int64Array = records
        .iter()
        .map(|r| r.duration.map(|d| d.num_seconds()))
        .collect();

    let schema = Schema::new(vec![
        Field::new("type", DataType::Utf8, false),
        Field::new("sourceName", DataType::Utf8, true),
        Field::new("value", DataType::Float64, false),
        Field::new("unit", DataType::Utf8, true),
        Field::new("startDate", DataType::Date32, false),
        Field::new("endDate", DataType::Date32, true),
        Field::new("startTime", naive_timestamp(), false),
        Field::new("endTime", naive_timestamp(), true),
        Field::new("durationSeconds", DataType::Int64, true),
    ]);

    build(
        schema,
        vec![
            Arc::new(record_type),
            Arc::new(source_name),
            Arc::new(value),
            Arc::new(unit),
            Arc::new(start_date),
            Arc::new(end_date),
            Arc::new(start_time),
            Arc::new(end_time),
            Arc::new(duration),
        ],
    )
}

pub(crate) fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    let record_type = column::<StringArray>(batch, "type")?;
    let source_name = column::<StringArray>(batch, "sourceName")?;
    let value = column::<Float64Array>(batch, "value")?;
    let unit = column::<StringArray>(batch, "unit")?;
    let start_date = column::<Date32Array>(batch, "startDate")?;
    let end_date = column::<Date32Array>(batch, "endDate")?;
    let start_time = column::<TimestampMicrosecondArray>(batch, "startTime")?;
    let end_time = column::<TimestampMicrosecondArray>(batch, "endTime")?;
    let duration = column::<Int64Array>(batch, "durationSeconds")?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(Record {
                record_type: record_type.value(i).to_string(),
                source_name: optional_string(source_name, i),
                value: value.value(i),
                unit: optional_string(unit, i),
                start_date: days_to_date(start_date.value(i))?,
                end_date: end_date
                    .is_valid(i)
                    .then(|| days_to_date(end_date.value(i)))
                    .transpose()?,
                start_time: micros_to_naive(start_time.value(i))?,
                end_time: end_time
                    .is_valid(i)
                    .then(|| micros_to_naive(end_time.value(i)))
                    .transpose()?,
                duration: duration.is_valid(i).then(|| Duration::seconds(duration.value(i))),
            })
        })
        .collect()
}

// =========================================================================
// Workouts
// =========================================================================

pub(crate) fn workouts_to_batch(workouts: &[&Workout]) -> Result<RecordBatch> {
    let activity_type =
        StringArray::from_iter_values(workouts.iter().map(|w| w.activity_type.as_str()));
    let duration = Float64Array::from_iter_values(workouts.iter().map(|w| w.duration));
    let total_distance = Float64Array::from_iter_values(workouts.iter().map(|w| w.total_distance));
    let total_energy_burned =
        Float64Array::from_iter_values(workouts.iter().map(|w| w.total_energy_burned));
    let source_name: StringArray = workouts.iter().map(|w| w.source_name.as_deref()).collect();
    let start_date =
        TimestampMicrosecondArray::from_iter_values(workouts.iter().map(|w| w.start_date.timestamp_micros()))
            .with_timezone(UTC);
    let start_offset = Int32Array::from_iter_values(
        workouts.iter().map(|w| w.start_date.offset().local_minus_utc()),
    );
    let end_date: TimestampMicrosecondArray = workouts
        .iter()
        .map(|w| w.end_date.map(|t| t.timestamp_micros()))
        .collect();
    let end_date = end_date.with_timezone(UTC);
    let end_offset: Int32Array = workouts
        .iter()
        .map(|w| w.end_date.map(|t| t.offset().local_minus_utc()))
        .collect();

    let schema = Schema::new(vec![
        Field::new("workoutActivityType", DataType::Utf8, false),
        Field::new("duration", DataType::Float64, false),
        Field::new("totalDistance", DataType::Float64, false),
        Field::new("totalEnergyBurned", DataType::Float64, false),
        Field::new("sourceName", DataType::Utf8, true),
        Field::new("startDate", utc_timestamp(), false),
        Field::new("startOffsetSeconds", DataType::Int32, false),
        Field::new("endDate", utc_timestamp(), true),
        Field::new("endOffsetSeconds", DataType::Int32, true),
    ]);

    build(
        schema,
        vec![
            Arc::new(activity_type),
            Arc::new(duration),
            Arc::new(total_distance),
            Arc::new(total_energy_burned),
            Arc::new(source_name),
            Arc::new(start_date),
            Arc::new(start_offset),
            Arc::new(end_date),
            Arc::new(end_offset),
        ],
    )
}

pub(crate) fn batch_to_workouts(batch: &RecordBatch) -> Result<Vec<Workout>> {
    let activity_type = column::<StringArray>(batch, "workoutActivityType")?;
    let duration = column::<Float64Array>(batch, "duration")?;
    let total_distance = column::<Float64Array>(batch, "totalDistance")?;
    let total_energy_burned = column::<Float64Array>(batch, "totalEnergyBurned")?;
    let source_name = column::<StringArray>(batch, "sourceName")?;
    let start_date = column::<TimestampMicrosecondArray>(batch, "startDate")?;
    let start_offset = column::<Int32Array>(batch, "startOffsetSeconds")?;
    let end_date = column::<TimestampMicrosecondArray>(batch, "endDate")?;
    let end_offset = column::<Int32Array>(batch, "endOffsetSeconds")?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(Workout {
                activity_type: activity_type.value(i).to_string(),
                duration: duration.value(i),
                total_distance: total_distance.value(i),
                total_energy_burned: total_energy_burned.value(i),
                source_name: optional_string(source_name, i),
                start_date: micros_to_fixed(start_date.value(i), start_offset.value(i))?,
                end_date: end_date
                    .is_valid(i)
                    .then(|| micros_to_fixed(end_date.value(i), end_offset.value(i)))
                    .transpose()?,
            })
        })
        .collect()
}

// =========================================================================
// Activity summaries
// =========================================================================

pub(crate) fn activity_summaries_to_batch(summaries: &[&ActivitySummary]) -> Result<RecordBatch> {
    let date = Date32Array::from_iter_values(summaries.iter().map(|s| date_to_days(s.date)));
    let f64_column = |f: fn(&ActivitySummary) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(summaries.iter().map(|s| f(s))))
    };

    let schema = Schema::new(vec![
        Field::new("dateComponents", DataType::Date32, false),
        Field::new("activeEnergyBurned", DataType::Float64, false),
        Field::new("activeEnergyBurnedGoal", DataType::Float64, false),
        Field::new("appleExerciseTime", DataType::Float64, false),
        Field::new("appleExerciseTimeGoal", DataType::Float64, false),
        Field::new("appleStandHours", DataType::Float64, false),
        Field::new("appleStandHoursGoal", DataType::Float64, false),
    ]);

    build(
        schema,
        vec![
            Arc::new(date),
            f64_column(|s| s.active_energy_burned),
            f64_column(|s| s.active_energy_burned_goal),
            f64_column(|s| s.apple_exercise_time),
            f64_column(|s| s.apple_exercise_time_goal),
            f64_column(|s| s.apple_stand_hours),
            f64_column(|s| s.apple_stand_hours_goal),
        ],
    )
}

pub(crate) fn batch_to_activity_summaries(batch: &RecordBatch) -> Result<Vec<ActivitySummary>> {
    let date = column::<Date32Array>(batch, "dateComponents")?;
    let active_energy_burned = column::<Float64Array>(batch, "activeEnergyBurned")?;
    let active_energy_burned_goal = column::<Float64Array>(batch, "activeEnergyBurnedGoal")?;
    let apple_exercise_time = column::<Float64Array>(batch, "appleExerciseTime")?;
    let apple_exercise_time_goal = column::<Float64Array>(batch, "appleExerciseTimeGoal")?;
    let apple_stand_hours = column::<Float64Array>(batch, "appleStandHours")?;
    let apple_stand_hours_goal = column::<Float64Array>(batch, "appleStandHoursGoal")?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(ActivitySummary {
                date: days_to_date(date.value(i))?,
                active_energy_burned: active_energy_burned.value(i),
                active_energy_burned_goal: active_energy_burned_goal.value(i),
                apple_exercise_time: apple_exercise_time.value(i),
                apple_exercise_time_goal: apple_exercise_time_goal.value(i),
                apple_stand_hours: apple_stand_hours.value(i),
                apple_stand_hours_goal: apple_stand_hours_goal.value(i),
            })
        })
        .collect()
}
