use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of activity ring totals and goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(rename = "dateComponents")]
    pub date: NaiveDate,

    /// Move ring, kcal
    pub active_energy_burned: f64,
    pub active_energy_burned_goal: f64,

    /// Exercise ring, minutes
    pub apple_exercise_time: f64,
    pub apple_exercise_time_goal: f64,

    /// Stand ring, hours
    pub apple_stand_hours: f64,
    pub apple_stand_hours_goal: f64,
}

