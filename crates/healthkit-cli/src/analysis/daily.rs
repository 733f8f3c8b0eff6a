use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ActivitySummary, Record};

/// How samples of one day collapse into a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
    Min,
    Max,
}

impl Aggregation {
    fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Group records of one type by start date, ordered by date
pub fn daily_series(records: &[Record], record_type: &str, aggregation: Aggregation) -> Vec<DailyValue> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.record_type == record_type) {
        days.entry(record.start_date).or_default().push(record.value);
    }

    days.into_iter()
        .map(|(date, values)| DailyValue {
            date,
            value: aggregation.apply(&values),
        })
        .collect()
}

/// Active energy burned per day, ordered by date
pub fn activity_series(summaries: &[ActivitySummary]) -> Vec<DailyValue> {
    let mut series: Vec<DailyValue> = summaries
        .iter()
        .map(|s| DailyValue {
            date: s.date,
            value: s.active_energy_burned,
        })
        .collect();
    series.sort_by_key(|d| d.date);
    series
}
