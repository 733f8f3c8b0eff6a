//! Workout statistics per activity type

use std::path::Path;

use serde::Serialize;

use crate::analysis::{workout_overview, workout_stats, WorkoutTypeStats};
use crate::cli::output::{print_csv, print_json};
use crate::cli::OutputFormat;
use crate::config::AnalysisConfig;
use crate::error::Result;

use super::load_tables;

/// Flat CSV row of one activity type's statistics
#[derive(Debug, PartialEq, Serialize)]
struct WorkoutRow<'a> {
    activity_type: &'a str,
    count: usize,
    minutes_min: f64,
    minutes_max: f64,
    minutes_mean: f64,
    minutes_sum: f64,
    energy_min: f64,
    energy_max: f64,
    energy_mean: f64,
    energy_sum: f64,
}

impl<'a> From<&'a WorkoutTypeStats> for WorkoutRow<'a> {
    fn from(s: &'a WorkoutTypeStats) -> Self {
        Self {
            activity_type: &s.activity_type,
            count: s.count,
            minutes_min: s.duration.min,
            minutes_max: s.duration.max,
            minutes_mean: s.duration.mean,
            minutes_sum: s.duration.sum,
            energy_min: s.energy.min,
            energy_max: s.energy.max,
            energy_mean: s.energy.mean,
            energy_sum: s.energy.sum,
        }
    }
}

pub fn run(export: &Path, config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    let tables = load_tables(export, config)?;
    let stats = workout_stats(&tables.workouts);
    let overview = workout_overview(&stats);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "types": stats,
            "overview": overview,
        }))?,
        OutputFormat::Csv => {
            let rows: Vec<WorkoutRow> = stats.iter().map(WorkoutRow::from).collect();
            print_csv(&rows)?;
        }
        OutputFormat::Table => {
            if stats.is_empty() {
                println!("No workouts between {} and {}.", config.window.start, config.window.end);
                return Ok(());
            }

            println!(
                "{:<32} {:>6} {:>8} {:>8} {:>8} {:>9} {:>8} {:>8} {:>8} {:>9}",
                "Activity", "Count", "Min", "Max", "Avg", "Minutes", "Min kcal", "Max kcal", "Avg kcal", "kcal"
            );
            println!("{}", "-".repeat(116));
            for s in &stats {
                println!(
                    "{:<32} {:>6} {:>8.1} {:>8.1} {:>8.1} {:>9.1} {:>8.0} {:>8.0} {:>8.0} {:>9.0}",
                    s.activity_type,
                    s.count,
                    s.duration.min,
                    s.duration.max,
                    s.duration.mean,
                    s.duration.sum,
                    s.energy.min,
                    s.energy.max,
                    s.energy.mean,
                    s.energy.sum
                );
            }

            println!();
            println!("Workouts:       {}", overview.workouts);
            println!(
                "Total time:     {:.0} min ({:.1} h)",
                overview.total_minutes, overview.total_hours
            );
            println!("Total energy:   {:.0} kcal", overview.total_energy);
            println!("Average:        {:.1} min, {:.0} kcal", overview.average_minutes, overview.average_energy);
        }
    }

    Ok(())
}
