use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Workout;

/// min / max / mean / sum of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
}

impl ColumnStats {
    fn from_values(values: &[f64]) -> Self {
        let sum: f64 = values.iter().sum();
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: sum / values.len() as f64,
            sum,
        }
    }
}

/// Aggregates for one activity type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutTypeStats {
    pub activity_type: String,
    pub count: usize,
    /// Minutes
    pub duration: ColumnStats,
    /// Kilocalories
    pub energy: ColumnStats,
}

/// Totals across all activity types
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkoutOverview {
    pub workouts: usize,
    pub total_minutes: f64,
    pub total_hours: f64,
    pub total_energy: f64,
    /// Mean of the per-type mean durations
    pub average_minutes: f64,
    /// Mean of the per-type mean energies
    pub average_energy: f64,
}

/// Per-type statistics, sorted by activity type
pub fn workout_stats(workouts: &[Workout]) -> Vec<WorkoutTypeStats> {
    let mut groups: BTreeMap<&str, Vec<&Workout>> = BTreeMap::new();
    for workout in workouts {
        groups.entry(workout.activity_type.as_str()).or_default().push(workout);
    }

    groups
        .into_iter()
        .map(|(activity_type, group)| {
            let durations: Vec<f64> = group.iter().map(|w| w.duration).collect();
            let energies: Vec<f64> = group.iter().map(|w| w.total_energy_burned).collect();
            WorkoutTypeStats {
                activity_type: activity_type.to_string(),
                count: group.len(),
                duration: ColumnStats::from_values(&durations),
                energy: ColumnStats::from_values(&energies),
            }
        })
        .collect()
}

/// Roll per-type statistics up into one overview
pub fn workout_overview(stats: &[WorkoutTypeStats]) -> WorkoutOverview {
    let total_minutes: f64 = stats.iter().map(|s| s.duration.sum).sum();
    let types = stats.len().max(1) as f64;
    WorkoutOverview {
        workouts: stats.iter().map(|s| s.count).sum(),
        total_minutes,
        total_hours: total_minutes / 60.0,
        total_energy: stats.iter().map(|s| s.energy.sum).sum(),
        average_minutes: stats.iter().map(|s| s.duration.mean).sum::<f64>() / types,
        average_energy: stats.iter().map(|s| s.energy.mean).sum::<f64>() / types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn workout(activity_type: &str, duration: f64, energy: f64) -> Workout {
        Workout {
            activity_type: activity_type.to_string(),
            duration,
            total_distance: 0.0,
            total_energy_burned: energy,
            source_name: None,
            start_date: DateTime::parse_from_rfc3339("2020-11-02T07:00:00+11:00").unwrap(),
            end_date: None,
        }
    }

    fn sample() -> Vec<Workout> {
        vec![
            workout("Running", 30.0, 300.0),
            workout("Climbing", 120.0, 600.0),
            workout("Running", 50.0, 500.0),
        ]
    }

    #[test]
    fn test_stats_grouped_and_sorted() {
        let stats = workout_stats(&sample());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].activity_type, "Climbing");

        let running = &stats[1];
        assert_eq!(running.count, 2);
        assert_eq!(running.duration.min, 30.0);
        assert_eq!(running.duration.max, 50.0);
        assert_eq!(running.duration.mean, 40.0);
        assert_eq!(running.energy.sum, 800.0);
    }

    #[test]
    fn test_overview() {
        let overview = workout_overview(&workout_stats(&sample()));
        assert_eq!(overview.workouts, 3);
        assert_eq!(overview.total_minutes, 200.0);
        assert_eq!(overview.total_energy, 1400.0);
        // (120 + 40) / 2 types
        assert_eq!(overview.average_minutes, 80.0);
        assert_eq!(overview.average_energy, 500.0);
    }

    #[test]
    fn test_overview_of_nothing() {
        let overview = workout_overview(&[]);
        assert_eq!(overview.workouts, 0);
        assert_eq!(overview.average_minutes, 0.0);
    }
}
