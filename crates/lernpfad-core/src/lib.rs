//! Core types and traits shared across the lernpfad workspace.
//!
//! This crate defines the learner and content data model plus the
//! [`Objective`] trait that scoring strategies implement. It carries no
//! algorithm logic of its own; the decision engine lives in
//! `lernpfad-engine`.

pub mod content;
pub mod observation;
pub mod student;

pub use content::{ContentItem, Topic};
pub use observation::Observation;
pub use student::StudentState;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single scoring strategy evaluating one pedagogical signal.
///
/// Implementations are stateless over the learner: all mutable state lives
/// in the [`StudentState`] passed in. `knowledge` is the learner's aggregate
/// knowledge level, precomputed once per recommendation cycle.
pub trait Objective {
    /// Stable key identifying this objective in component breakdowns.
    fn key(&self) -> &'static str;
    /// Score `content` for `student`. Each objective documents its realized
    /// range; the weighted combination does not renormalize.
    fn score(&self, content: &ContentItem, student: &StudentState, knowledge: f64) -> f64;
}

/// Outcome of one content selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Id of the selected content item
    pub content_id: String,
    /// Modality of the selected item (e.g. "video", "quiz")
    pub kind: String,
    /// Total score that won the argmax
    pub score: f64,
    /// Per-objective breakdown, including the exploration bonus and total
    pub components: BTreeMap<String, f64>,
    /// Human-readable selection rationale
    pub why: String,
}
