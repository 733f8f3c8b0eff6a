use chrono::NaiveDate;
use serde::Serialize;

use super::DailyValue;
use crate::error::{HealthError, Result};

/// Trailing mean over `window` rows.
///
/// Positions before the window fills are `None`. Rows are consecutive
/// observations, not calendar days, so gaps in a series are not padded.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(HealthError::invalid_param("rolling window must be at least 1"));
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    Ok(out)
}

/// One day of a trend with a rolling mean per window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub rolling_means: Vec<Option<f64>>,
}

/// A daily series with rolling means, e.g. 3- and 7-day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub windows: Vec<usize>,
    pub points: Vec<TrendPoint>,
}

/// Attach a rolling mean for each window to a daily series
pub fn trend(series: &[DailyValue], windows: &[usize]) -> Result<Trend> {
    let values: Vec<f64> = series.iter().map(|d| d.value).collect();
    let means = windows
        .iter()
        .map(|&w| rolling_mean(&values, w))
        .collect::<Result<Vec<_>>>()?;

    let points = series
        .iter()
        .enumerate()
        .map(|(i, day)| TrendPoint {
            date: day.date,
            value: day.value,
            rolling_means: means.iter().map(|m| m[i]).collect(),
        })
        .collect();

    Ok(Trend {
        windows: windows.to_vec(),
        points,
    })
}
