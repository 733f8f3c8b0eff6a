//! Normalized tables produced by the cleaning pipeline

mod activity_summary;
mod record;
mod workout;

pub use activity_summary::ActivitySummary;
pub use record::Record;
pub use workout::Workout;

/// The three cleaned tables of one export, restricted to the analysis window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthTables {
    pub records: Vec<Record>,
    pub workouts: Vec<Workout>,
    pub activity_summaries: Vec<ActivitySummary>,
}

impl HealthTables {
    /// Whether no table has any rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.workouts.is_empty() && self.activity_summaries.is_empty()
    }
}

/// Serialize an optional duration as whole seconds
pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.map(Duration::seconds))
    }
}
