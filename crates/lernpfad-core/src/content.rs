//! Content and topic descriptors.
//!
//! Content kinds are open string ids rather than a closed enum so that new
//! modalities can be introduced through configuration alone; the constants
//! in [`kind`] are the conventional ids the default affinity table knows.

use crate::student::StudentState;
use serde::{Deserialize, Serialize};

/// Conventional content-kind ids.
pub mod kind {
    pub const VIDEO: &str = "video";
    pub const TEXT: &str = "text";
    pub const INTERACTIVE: &str = "interactive";
    pub const QUIZ: &str = "quiz";
    pub const CASE_STUDY: &str = "case_study";
}

/// Share of the learner's current load that carries over into the projected
/// load of the next item, and its cap.
const CARRYOVER_LOAD_FACTOR: f64 = 0.3;

/// A piece of learning content. Immutable for the duration of a
/// recommendation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    /// Modality id, see [`kind`]
    pub kind: String,
    /// `None` marks content for a new, not yet curricularized topic
    #[serde(default)]
    pub topic: Option<String>,
    /// Difficulty in [0, 1]
    pub difficulty: f64,
    /// Intrinsic cognitive load in [0, 1]
    #[serde(default = "default_intrinsic_load")]
    pub intrinsic_load: f64,
    #[serde(default)]
    pub title: String,
    /// Topic ids that must be mastered before this item is eligible
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional precomputed engagement feature vector φ; when absent the
    /// engine's feature source derives one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f64>>,
}

fn default_intrinsic_load() -> f64 {
    0.5
}

impl ContentItem {
    /// Projected cognitive load of consuming this item in the learner's
    /// current state: intrinsic load scaled by difficulty plus a capped
    /// carry-over of the learner's present load, clamped to [0, 1].
    #[must_use]
    pub fn projected_load(&self, student: &StudentState) -> f64 {
        let base = self.intrinsic_load * self.difficulty;
        let carryover = (student.current_load * CARRYOVER_LOAD_FACTOR).min(CARRYOVER_LOAD_FACTOR);
        (base + carryover).clamp(0.0, 1.0)
    }
}

/// A curriculum topic. Topics form the prerequisite graph the eligibility
/// filter walks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Importance weight used in the knowledge aggregate, must be positive
    #[serde(default = "default_importance")]
    pub importance_weight: f64,
    /// Average difficulty of the topic's content
    #[serde(default = "default_topic_difficulty")]
    pub difficulty: f64,
}

fn default_importance() -> f64 {
    1.0
}

fn default_topic_difficulty() -> f64 {
    0.5
}

impl Topic {
    #[must_use]
    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisites.is_empty()
    }
}
