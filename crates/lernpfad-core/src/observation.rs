//! Observation records reported back by the caller after each response.

use serde::{Deserialize, Serialize};

/// One observed learner response, the input to the state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Content item the learner responded to
    pub content_id: String,
    /// Topic the response exercises
    pub topic: String,
    /// Whether the response was correct
    pub correct: bool,
    /// Seconds spent on the item
    #[serde(default)]
    pub time_spent_secs: u64,
    /// Observed engagement in [0, 1]
    #[serde(default = "default_engagement")]
    pub engagement: f64,
}

fn default_engagement() -> f64 {
    0.5
}
