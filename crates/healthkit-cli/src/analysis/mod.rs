//! Descriptive queries over the normalized tables
//!
//! Everything here returns plain data series; rendering is left to the
//! caller (terminal tables, JSON, or an external plotting tool reading the
//! Parquet output).

mod daily;
mod energy;
mod rolling;
mod steps;
mod workouts;

pub use daily::{activity_series, daily_series, Aggregation, DailyValue};
pub use energy::{energy_balance, EnergyDay, EnergyStatus, KJ_PER_KCAL};
pub use rolling::{rolling_mean, trend, Trend, TrendPoint};
pub use steps::{step_history, STEP_COUNT_TYPE};
pub use workouts::{workout_overview, workout_stats, ColumnStats, WorkoutOverview, WorkoutTypeStats};
