use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single logged exercise session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Corrected activity label, e.g. `Running` or `Cross Training`
    #[serde(rename = "workoutActivityType")]
    pub activity_type: String,

    /// Duration in minutes
    pub duration: f64,

    /// Distance in kilometres
    pub total_distance: f64,

    /// Energy in kilocalories
    pub total_energy_burned: f64,

    pub source_name: Option<String>,

    pub start_date: DateTime<FixedOffset>,

    pub end_date: Option<DateTime<FixedOffset>>,
}
