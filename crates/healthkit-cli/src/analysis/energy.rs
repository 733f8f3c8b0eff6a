use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::models::{ActivitySummary, Record};

/// Kilojoules in one kilocalorie
pub const KJ_PER_KCAL: f64 = 4.184;

const DIETARY_ENERGY_TYPE: &str = "DietaryEnergyConsumed";

/// Where a day's net intake sits relative to the configured rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyStatus {
    AboveTdee,
    BelowBasal,
    Within,
}

impl std::fmt::Display for EnergyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyStatus::AboveTdee => write!(f, "above TDEE"),
            EnergyStatus::BelowBasal => write!(f, "below basal"),
            EnergyStatus::Within => write!(f, "within"),
        }
    }
}

/// Intake against expenditure for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyDay {
    pub date: NaiveDate,
    pub consumed_kcal: f64,
    pub active_kcal: f64,
    /// consumed - active + basal metabolic rate
    pub net_kcal: f64,
    pub status: EnergyStatus,
}

/// Daily energy balance for every day with logged dietary energy.
///
/// Active energy is joined by date; a day without an activity summary
/// counts as zero active energy.
pub fn energy_balance(
    records: &[Record],
    summaries: &[ActivitySummary],
    config: &AnalysisConfig,
) -> Vec<EnergyDay> {
    let mut consumed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.record_type == DIETARY_ENERGY_TYPE) {
        *consumed.entry(record.start_date).or_default() += to_kcal(record.value, record.unit.as_deref());
    }

    let active: BTreeMap<NaiveDate, f64> = summaries
        .iter()
        .map(|s| (s.date, s.active_energy_burned))
        .collect();

    consumed
        .into_iter()
        .map(|(date, consumed_kcal)| {
            let active_kcal = active.get(&date).copied().unwrap_or(0.0);
            let net_kcal = consumed_kcal - active_kcal + config.basal_metabolic_rate;
            let status = if net_kcal > config.tdee_estimate {
                EnergyStatus::AboveTdee
            } else if net_kcal < config.basal_metabolic_rate {
                EnergyStatus::BelowBasal
            } else {
                EnergyStatus::Within
            };
            EnergyDay {
                date,
                consumed_kcal,
                active_kcal,
                net_kcal,
                status,
            }
        })
        .collect()
}

/// Dietary energy is logged in kJ by most meal trackers
fn to_kcal(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("kcal") | Some("Cal") => value,
        _ => value / KJ_PER_KCAL,
    }
}
