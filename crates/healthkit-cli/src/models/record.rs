use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single timestamped health measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Bare type name, e.g. `HeartRate` or `MindfulSession`
    #[serde(rename = "type")]
    pub record_type: String,

    /// Device or app that wrote the sample
    pub source_name: Option<String>,

    /// Measured quantity; `1.0` for occurrence-only samples
    pub value: f64,

    pub unit: Option<String>,

    /// Calendar day the sample started on
    pub start_date: NaiveDate,

    /// Calendar day the sample ended on
    pub end_date: Option<NaiveDate>,

    /// Full start timestamp (wall clock)
    pub start_time: NaiveDateTime,

    /// Full end timestamp (wall clock)
    pub end_time: Option<NaiveDateTime>,

    /// `end_time - start_time`
    #[serde(default, with = "super::duration_secs", rename = "durationSeconds")]
    pub duration: Option<Duration>,
}

impl Record {
    /// Whole days between the end and start dates
    pub fn day_span(&self) -> Option<i64> {
        self.end_date.map(|end| (end - self.start_date).num_days())
    }
}
