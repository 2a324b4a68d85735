//! The five scoring objectives and their weighted combination.
//!
//! Each objective is a small strategy implementing [`Objective`], so they
//! can be unit-tested in isolation and new objectives can be added without
//! touching the aggregation. The combination itself is a fixed-arity
//! weighted sum; weights are validated in [`crate::config`].

use crate::config::{EngineConfig, ScoringWeights};
use lernpfad_core::{content::kind, ContentItem, Objective, StudentState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Affinity assumed for (kind, style) pairs absent from the matrix.
const NEUTRAL_AFFINITY: f64 = 0.5;
/// Style score used when the learner has no style profile yet.
const NEUTRAL_STYLE_SCORE: f64 = 0.5;
/// Gap score for content whose topic is new or uncurricularized.
const NEW_TOPIC_GAP_SCORE: f64 = 0.5;
/// Sigmoid exponent clamp; beyond this the result saturates anyway.
const SIGMOID_EXPONENT_LIMIT: f64 = 500.0;

/// Content-kind × learning-style affinity table, supplied externally and
/// read-only to the engine. Unknown pairs fall back to a neutral affinity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffinityMatrix {
    table: BTreeMap<String, BTreeMap<String, f64>>,
}

impl AffinityMatrix {
    #[must_use]
    pub fn new(table: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        Self { table }
    }

    /// Affinity of a content kind for a learning style, in [0, 1].
    #[must_use]
    pub fn affinity(&self, content_kind: &str, style: &str) -> f64 {
        self.table
            .get(content_kind)
            .and_then(|row| row.get(style))
            .copied()
            .unwrap_or(NEUTRAL_AFFINITY)
    }
}

impl Default for AffinityMatrix {
    /// Curated affinities for the conventional modalities.
    fn default() -> Self {
        let rows: [(&str, [(&str, f64); 4]); 5] = [
            (
                kind::VIDEO,
                [
                    ("visual", 1.0),
                    ("auditory", 0.8),
                    ("kinesthetic", 0.3),
                    ("reading_writing", 0.4),
                ],
            ),
            (
                kind::TEXT,
                [
                    ("visual", 0.5),
                    ("auditory", 0.3),
                    ("kinesthetic", 0.2),
                    ("reading_writing", 1.0),
                ],
            ),
            (
                kind::INTERACTIVE,
                [
                    ("visual", 0.7),
                    ("auditory", 0.5),
                    ("kinesthetic", 1.0),
                    ("reading_writing", 0.6),
                ],
            ),
            (
                kind::QUIZ,
                [
                    ("visual", 0.6),
                    ("auditory", 0.4),
                    ("kinesthetic", 0.7),
                    ("reading_writing", 0.9),
                ],
            ),
            (
                kind::CASE_STUDY,
                [
                    ("visual", 0.8),
                    ("auditory", 0.6),
                    ("kinesthetic", 0.9),
                    ("reading_writing", 0.8),
                ],
            ),
        ];
        let table = rows
            .into_iter()
            .map(|(k, styles)| {
                (
                    k.to_string(),
                    styles
                        .into_iter()
                        .map(|(s, a)| (s.to_string(), a))
                        .collect(),
                )
            })
            .collect();
        Self { table }
    }
}

/// Learning-style match: Σ_j affinity(kind, style_j) · preference_j.
///
/// With preferences summing to 1 and affinities in [0, 1] the realized
/// range is [0, 1]. An empty preference map scores neutral.
#[derive(Debug, Clone)]
pub struct StyleMatch {
    affinity: AffinityMatrix,
}

impl StyleMatch {
    #[must_use]
    pub fn new(affinity: AffinityMatrix) -> Self {
        Self { affinity }
    }
}

impl Objective for StyleMatch {
    fn key(&self) -> &'static str {
        "style"
    }

    fn score(&self, content: &ContentItem, student: &StudentState, _knowledge: f64) -> f64 {
        if student.style_preference.is_empty() {
            return NEUTRAL_STYLE_SCORE;
        }
        student
            .style_preference
            .iter()
            .map(|(style, p)| self.affinity.affinity(&content.kind, style) * p)
            .sum()
    }
}

/// Difficulty fit: a Gaussian over the distance between the item's
/// difficulty and the optimal challenge point `K + δ`. Range (0, 1],
/// maximal exactly at the challenge point.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyFit {
    delta: f64,
    sigma: f64,
}

impl DifficultyFit {
    #[must_use]
    pub fn new(delta: f64, sigma: f64) -> Self {
        Self { delta, sigma }
    }
}

impl Objective for DifficultyFit {
    fn key(&self) -> &'static str {
        "difficulty"
    }

    fn score(&self, content: &ContentItem, _student: &StudentState, knowledge: f64) -> f64 {
        let target = knowledge + self.delta;
        let distance = content.difficulty - target;
        (-(distance * distance) / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// Cognitive-load fit: `1 - |projected - target| / target`, clamped to
/// [0, 1] so that an overload cannot dominate the weighted sum with an
/// unbounded negative value.
#[derive(Debug, Clone, Copy)]
pub struct LoadFit;

impl Objective for LoadFit {
    fn key(&self) -> &'static str {
        "load"
    }

    fn score(&self, content: &ContentItem, student: &StudentState, _knowledge: f64) -> f64 {
        let projected = content.projected_load(student);
        let target = student.load_capacity;
        (1.0 - (projected - target).abs() / target).clamp(0.0, 1.0)
    }
}

/// Knowledge-gap targeting: `1 - mastery`, preferring weak topics. Content
/// without a topic, or for a topic the learner has never seen, scores the
/// neutral new-topic value.
#[derive(Debug, Clone, Copy)]
pub struct GapTargeting;

impl Objective for GapTargeting {
    fn key(&self) -> &'static str {
        "gap"
    }

    fn score(&self, content: &ContentItem, student: &StudentState, _knowledge: f64) -> f64 {
        match &content.topic {
            None => NEW_TOPIC_GAP_SCORE,
            Some(topic) => match student.topic_mastery(topic) {
                None => NEW_TOPIC_GAP_SCORE,
                Some(mastery) => 1.0 - mastery,
            },
        }
    }
}

/// Produces the engagement feature vector φ for a (content, student) pair.
/// The engine treats the output as opaque numbers.
pub trait FeatureSource {
    fn features(&self, content: &ContentItem, student: &StudentState, knowledge: f64) -> Vec<f64>;
}

/// Heuristic fallback features when no trained feature pipeline is wired
/// in: style match, closeness of difficulty to the middle of the scale,
/// recent performance, and fixed variety/time-of-day placeholders.
#[derive(Debug, Clone)]
pub struct HeuristicFeatures {
    affinity: AffinityMatrix,
}

impl HeuristicFeatures {
    #[must_use]
    pub fn new(affinity: AffinityMatrix) -> Self {
        Self { affinity }
    }
}

impl FeatureSource for HeuristicFeatures {
    fn features(&self, content: &ContentItem, student: &StudentState, knowledge: f64) -> Vec<f64> {
        let style = StyleMatch::new(self.affinity.clone()).score(content, student, knowledge);
        vec![
            style,
            1.0 - (content.difficulty - 0.5).abs(),
            student.average_performance(lernpfad_core::student::RECENT_PERFORMANCE_WINDOW),
            0.5,
            0.7,
        ]
    }
}

/// Default model weights θ paired with [`HeuristicFeatures`].
pub const HEURISTIC_THETA: [f64; 5] = [0.3, 0.25, 0.2, 0.15, 0.1];

/// Engagement prediction: `sigmoid(θ · φ)`. θ and φ come from outside; the
/// engine only applies the dot product and the sigmoid. An explicit
/// `feature_vector` on the content item overrides the feature source. The
/// dot product runs over the shorter of θ and φ.
pub struct EngagementPrediction {
    theta: Vec<f64>,
    features: Box<dyn FeatureSource + Send + Sync>,
}

impl EngagementPrediction {
    #[must_use]
    pub fn new(theta: Vec<f64>, features: Box<dyn FeatureSource + Send + Sync>) -> Self {
        Self { theta, features }
    }
}

impl std::fmt::Debug for EngagementPrediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementPrediction")
            .field("theta", &self.theta)
            .finish_non_exhaustive()
    }
}

impl Objective for EngagementPrediction {
    fn key(&self) -> &'static str {
        "engagement"
    }

    fn score(&self, content: &ContentItem, student: &StudentState, knowledge: f64) -> f64 {
        let phi = match &content.feature_vector {
            Some(vector) => vector.clone(),
            None => self.features.features(content, student, knowledge),
        };
        let dot: f64 = self.theta.iter().zip(phi.iter()).map(|(t, x)| t * x).sum();
        sigmoid(dot)
    }
}

fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-SIGMOID_EXPONENT_LIMIT, SIGMOID_EXPONENT_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

/// The fixed objective set combined by a weighted sum.
pub struct ScoringEngine {
    weights: ScoringWeights,
    objectives: Vec<(f64, Box<dyn Objective + Send + Sync>)>,
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

impl ScoringEngine {
    /// Wire up the five objectives from configuration, an affinity matrix,
    /// and an engagement model (θ plus feature source).
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        affinity: AffinityMatrix,
        theta: Vec<f64>,
        features: Box<dyn FeatureSource + Send + Sync>,
    ) -> Self {
        let w = config.weights;
        let objectives: Vec<(f64, Box<dyn Objective + Send + Sync>)> = vec![
            (w.style, Box::new(StyleMatch::new(affinity))),
            (
                w.difficulty,
                Box::new(DifficultyFit::new(config.zpd_delta, config.zpd_sigma)),
            ),
            (w.load, Box::new(LoadFit)),
            (w.gap, Box::new(GapTargeting)),
            (
                w.engagement,
                Box::new(EngagementPrediction::new(theta, features)),
            ),
        ];
        Self {
            weights: w,
            objectives,
        }
    }

    /// Default wiring: curated affinities and the heuristic engagement
    /// model.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let affinity = AffinityMatrix::default();
        let features = Box::new(HeuristicFeatures::new(affinity.clone()));
        Self::new(config, affinity, HEURISTIC_THETA.to_vec(), features)
    }

    #[must_use]
    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Replace the objective weights in place. Validation happens at the
    /// recommender boundary; the keys pair each objective with its slot.
    pub(crate) fn set_weights(&mut self, weights: ScoringWeights) {
        self.weights = weights;
        for (weight, objective) in &mut self.objectives {
            *weight = match objective.key() {
                "style" => weights.style,
                "difficulty" => weights.difficulty,
                "load" => weights.load,
                "gap" => weights.gap,
                "engagement" => weights.engagement,
                _ => *weight,
            };
        }
    }

    /// Raw per-objective scores, keyed by objective.
    #[must_use]
    pub fn component_scores(
        &self,
        content: &ContentItem,
        student: &StudentState,
        knowledge: f64,
    ) -> BTreeMap<String, f64> {
        self.objectives
            .iter()
            .map(|(_, objective)| {
                (
                    objective.key().to_string(),
                    objective.score(content, student, knowledge),
                )
            })
            .collect()
    }

    /// Weighted sum of the objective scores, without any exploration bonus.
    #[must_use]
    pub fn weighted_score(
        &self,
        content: &ContentItem,
        student: &StudentState,
        knowledge: f64,
    ) -> f64 {
        self.objectives
            .iter()
            .map(|(weight, objective)| weight * objective.score(content, student, knowledge))
            .sum()
    }
}
