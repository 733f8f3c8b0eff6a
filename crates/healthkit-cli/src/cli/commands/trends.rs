//! Daily trend, energy balance and step history reports

use std::io;
use std::path::Path;

use crate::analysis::{
    activity_series, daily_series, energy_balance, step_history, trend as build_trend,
    Aggregation, DailyValue, Trend, STEP_COUNT_TYPE,
};
use crate::archive::Archive;
use crate::cli::output::{format_opt, print_csv, print_json};
use crate::cli::OutputFormat;
use crate::config::AnalysisConfig;
use crate::error::Result;

use super::load_tables;

/// Rolling windows of the long-run step report
const STEP_WINDOWS: [usize; 2] = [7, 100];

/// Daily series a trend can be drawn for
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    /// Active energy from the activity summaries
    ActiveEnergy,
    /// Summed step count
    Steps,
    /// Mean heart rate
    HeartRate,
    /// Mean resting heart rate
    RestingHeartRate,
    /// Lowest body mass of the day
    BodyMass,
}

impl Metric {
    /// Record type and daily aggregation, `None` for summary-based metrics
    fn record_source(&self) -> Option<(&'static str, Aggregation)> {
        match self {
            Metric::ActiveEnergy => None,
            Metric::Steps => Some((STEP_COUNT_TYPE, Aggregation::Sum)),
            Metric::HeartRate => Some(("HeartRate", Aggregation::Mean)),
            Metric::RestingHeartRate => Some(("RestingHeartRate", Aggregation::Mean)),
            Metric::BodyMass => Some(("BodyMass", Aggregation::Min)),
        }
    }
}

/// Daily values of one metric with rolling means
pub fn trend(
    export: &Path,
    metric: Metric,
    windows: &[usize],
    config: &AnalysisConfig,
    format: OutputFormat,
) -> Result<()> {
    let tables = load_tables(export, config)?;
    let series: Vec<DailyValue> = match metric.record_source() {
        Some((record_type, aggregation)) => daily_series(&tables.records, record_type, aggregation),
        None => activity_series(&tables.activity_summaries),
    };

    print_trend(&build_trend(&series, windows)?, format)
}

/// Net intake per day against basal rate and TDEE
pub fn energy(export: &Path, config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    let tables = load_tables(export, config)?;
    let days = energy_balance(&tables.records, &tables.activity_summaries, config);

    match format {
        OutputFormat::Json => print_json(&days)?,
        OutputFormat::Csv => print_csv(&days)?,
        OutputFormat::Table => {
            if days.is_empty() {
                println!("No dietary energy logged in the window.");
                return Ok(());
            }

            println!(
                "{:<12} {:>10} {:>10} {:>10} {:>12}",
                "Date", "Consumed", "Active", "Net", "Status"
            );
            println!("{}", "-".repeat(58));
            for d in &days {
                println!(
                    "{:<12} {:>10.0} {:>10.0} {:>10.0} {:>12}",
                    d.date.to_string(),
                    d.consumed_kcal,
                    d.active_kcal,
                    d.net_kcal,
                    d.status.to_string()
                );
            }
            println!(
                "\nBasal rate {:.0} kcal, TDEE estimate {:.0} kcal",
                config.basal_metabolic_rate, config.tdee_estimate
            );
        }
    }

    Ok(())
}

/// Long-run daily steps from `step_history_start`
pub fn steps(export: &Path, config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    let archive = Archive::load(export)?;
    let history = step_history(&archive.records, config)?;
    print_trend(&build_trend(&history, &STEP_WINDOWS)?, format)
}

fn print_trend(trend: &Trend, format: OutputFormat) -> Result<()> {
    let mean_headers: Vec<String> = trend.windows.iter().map(|w| format!("{}d mean", w)).collect();

    match format {
        OutputFormat::Json => print_json(trend)?,
        OutputFormat::Csv => write_trend_csv(io::stdout().lock(), trend)?,
        OutputFormat::Table => {
            if trend.points.is_empty() {
                println!("No data in the window.");
                return Ok(());
            }

            let mut header = format!("{:<12} {:>10}", "Date", "Value");
            for h in &mean_headers {
                header.push_str(&format!(" {:>10}", h));
            }
            println!("{}", header);
            println!("{}", "-".repeat(23 + 11 * mean_headers.len()));

            for p in &trend.points {
                let mut line = format!("{:<12} {:>10.1}", p.date.to_string(), p.value);
                for mean in &p.rolling_means {
                    line.push_str(&format!(" {:>10}", format_opt(*mean, 1)));
                }
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// One column per rolling window, so rows are written field by field
fn write_trend_csv<W: io::Write>(writer: W, trend: &Trend) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string(), "value".to_string()];
    header.extend(trend.windows.iter().map(|w| format!("mean_{}d", w)));
    wtr.write_record(&header)?;

    for p in &trend.points {
        let mut row = vec![p.date.to_string(), p.value.to_string()];
        row.extend(
            p.rolling_means
                .iter()
                .map(|m| m.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
