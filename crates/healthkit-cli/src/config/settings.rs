use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DateWindow;
use crate::error::{HealthError, Result};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Nutrition sub-metrics logged by meal trackers; only total energy is kept
const DIETARY_EXCLUSIONS: &[&str] = &[
    "DietaryFatPolyunsaturated",
    "DietaryFatMonounsaturated",
    "DietaryFatSaturated",
    "DietaryCholesterol",
    "DietarySodium",
    "DietaryCarbohydrates",
    "DietaryFiber",
    "DietarySugar",
    "DietaryProtein",
    "DietaryVitaminC",
    "DietaryIron",
    "DietaryPotassium",
    "DietaryCalcium",
    "DietaryFatTotal",
];

/// Device-only or low-relevance metrics for an exercise/energy analysis
const LOW_RELEVANCE_EXCLUSIONS: &[&str] = &[
    "Height",
    "BodyFatPercentage",
    "LeanBodyMass",
    "NumberOfTimesFallen",
    "SwimmingStrokeCount",
    "EnvironmentalAudioExposure",
    "WalkingDoubleSupportPercentage",
    "SixMinuteWalkTestDistance",
    "StairAscentSpeed",
    "StairDescentSpeed",
    "AppleStandHour",
    "MindfulSession",
    "AudioExposureEvent",
    "HandwashingEvent",
    "HeartRateVariabilitySDNN",
    "DistanceCycling",
    "DistanceSwimming",
    "HeadphoneAudioExposure",
    "AppleStandTime",
    "SleepAnalysis",
    "HighHeartRateEvent",
    "FlightsClimbed",
];

/// Workout labels the source app gets wrong
const WORKOUT_LABEL_CORRECTIONS: &[(&str, &str)] = &[
    ("CrossTraining", "Cross Training"),
    ("TraditionalStrengthTraining", "Traditional Strength Training"),
    ("Other", "Personal Training Program"),
];

/// Step sources that double count the watch (phone, hiking app)
const STEP_SOURCE_EXCLUSIONS: &[&str] = &["Milhouse", "AllTrails"];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Every tunable of the cleaning pipeline and the reports built on it.
///
/// Plain values are declared before the nested tables so the struct
/// serializes to valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Basal metabolic rate in kcal/day, used by the energy balance report
    pub basal_metabolic_rate: f64,
    /// Estimated total daily energy expenditure in kcal/day
    pub tdee_estimate: f64,
    /// First day of the long-run step history
    pub step_history_start: NaiveDate,
    pub dietary_exclusions: Vec<String>,
    pub low_relevance_exclusions: Vec<String>,
    pub step_source_exclusions: Vec<String>,
    pub window: DateWindow,
    pub workout_label_corrections: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            basal_metabolic_rate: 1939.0,
            tdee_estimate: 3000.0,
            step_history_start: NaiveDate::from_ymd_opt(2019, 9, 1).unwrap_or_default(),
            dietary_exclusions: owned(DIETARY_EXCLUSIONS),
            low_relevance_exclusions: owned(LOW_RELEVANCE_EXCLUSIONS),
            step_source_exclusions: owned(STEP_SOURCE_EXCLUSIONS),
            window: DateWindow {
                start: NaiveDate::from_ymd_opt(2020, 10, 12).unwrap_or_default(),
                end: NaiveDate::from_ymd_opt(2020, 12, 6).unwrap_or_default(),
            },
            workout_label_corrections: WORKOUT_LABEL_CORRECTIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            HealthError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load an explicit config file, or the default one if it exists, or defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = super::default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse TOML, filling unset keys with defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| HealthError::config(format!("Invalid config: {}", e)))?;
        DateWindow::new(config.window.start, config.window.end)?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| HealthError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Write to a config file, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            super::ensure_dir(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Override the window bounds from command line arguments
    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        let start = from.unwrap_or(self.window.start);
        let end = to.unwrap_or(self.window.end);
        self.window = DateWindow::new(start, end)?;
        Ok(self)
    }

    /// Union of both record exclusion lists
    pub fn excluded_record_types(&self) -> HashSet<String> {
        self.dietary_exclusions
            .iter()
            .chain(self.low_relevance_exclusions.iter())
            .cloned()
            .collect()
    }
}
