//! Learner state: per-topic mastery, style preferences, and the rolling
//! performance/engagement windows that feed engagement prediction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of entries kept in the rolling performance and engagement
/// windows.
pub const HISTORY_WINDOW: usize = 20;

/// Number of recent performance entries averaged for engagement features.
pub const RECENT_PERFORMANCE_WINDOW: usize = 5;

/// Default cognitive-load target for a fresh profile.
const DEFAULT_LOAD_CAPACITY: f64 = 0.7;

/// The four conventional style ids a fresh profile starts with. The style
/// set is open: preferences and affinity tables may use any ids, these are
/// only the uniform-prior defaults.
pub const DEFAULT_STYLES: [&str; 4] = ["visual", "auditory", "kinesthetic", "reading_writing"];

/// Mutable per-student state.
///
/// Mastery probabilities are updated by the engine's mastery tracker only;
/// everything else is updated by the observation transition or by external
/// profile updates between recommendation calls. Maps are `BTreeMap` so that
/// iteration, serialization, and tie-breaking stay deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentState {
    /// Unique learner id
    pub student_id: String,
    /// topic id -> P(mastery), each in [0, 1]
    #[serde(default)]
    pub mastery_by_topic: BTreeMap<String, f64>,
    /// topic id -> importance weight, non-negative, need not sum to 1
    #[serde(default)]
    pub topic_weights: BTreeMap<String, f64>,
    /// style id -> probability; non-negative, sums to 1 over known styles.
    /// Empty means "no profile yet" and style scoring falls back to neutral.
    #[serde(default)]
    pub style_preference: BTreeMap<String, f64>,
    /// Optimal cognitive-load target, in (0, 1]
    pub load_capacity: f64,
    /// Current decaying cognitive-load estimate, in [0, 1]
    #[serde(default)]
    pub current_load: f64,
    /// Rolling correctness window (1.0 correct / 0.0 incorrect), newest last
    #[serde(default)]
    pub recent_performance: Vec<f64>,
    /// Rolling engagement window, newest last
    #[serde(default)]
    pub engagement_history: Vec<f64>,
    /// Topics whose mastery crossed the configured threshold
    #[serde(default)]
    pub mastered_topics: Vec<String>,
    /// Lifetime interaction count
    #[serde(default)]
    pub total_interactions: u64,
}

impl StudentState {
    /// Fresh profile with a uniform style prior and default load target.
    #[must_use]
    pub fn new(student_id: impl Into<String>) -> Self {
        let share = 1.0 / DEFAULT_STYLES.len() as f64;
        let style_preference = DEFAULT_STYLES
            .iter()
            .map(|s| ((*s).to_string(), share))
            .collect();
        Self {
            student_id: student_id.into(),
            mastery_by_topic: BTreeMap::new(),
            topic_weights: BTreeMap::new(),
            style_preference,
            load_capacity: DEFAULT_LOAD_CAPACITY,
            current_load: 0.0,
            recent_performance: Vec::new(),
            engagement_history: Vec::new(),
            mastered_topics: Vec::new(),
            total_interactions: 0,
        }
    }

    /// Mastery probability for a topic, `None` when the topic is new.
    #[must_use]
    pub fn topic_mastery(&self, topic: &str) -> Option<f64> {
        self.mastery_by_topic.get(topic).copied()
    }

    /// Whether the topic's mastery has reached `threshold`. Unknown topics
    /// are never mastered.
    #[must_use]
    pub fn is_topic_mastered(&self, topic: &str, threshold: f64) -> bool {
        self.topic_mastery(topic).is_some_and(|m| m >= threshold)
    }

    /// Mean of the last `window` performance entries, 0.5 when empty.
    #[must_use]
    pub fn average_performance(&self, window: usize) -> f64 {
        mean_of_tail(&self.recent_performance, window)
    }

    /// Mean of the last `window` engagement entries, 0.5 when empty.
    #[must_use]
    pub fn average_engagement(&self, window: usize) -> f64 {
        mean_of_tail(&self.engagement_history, window)
    }

    /// Trend of the performance window as a least-squares slope; positive
    /// means the learner is improving. Zero until two entries exist.
    #[must_use]
    pub fn learning_velocity(&self) -> f64 {
        let n = self.recent_performance.len();
        if n < 2 {
            return 0.0;
        }
        let n_f = n as f64;
        let sum_x = (n * (n - 1)) as f64 / 2.0;
        let sum_x2 = ((n - 1) * n * (2 * n - 1)) as f64 / 6.0;
        let sum_y: f64 = self.recent_performance.iter().sum();
        let sum_xy: f64 = self
            .recent_performance
            .iter()
            .enumerate()
            .map(|(i, y)| i as f64 * y)
            .sum();
        (n_f * sum_xy - sum_x * sum_y) / (n_f * sum_x2 - sum_x * sum_x)
    }

    /// Style with the highest preference; ties resolve to the
    /// lexicographically first id. `None` while there is no profile.
    #[must_use]
    pub fn dominant_style(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (style, p) in &self.style_preference {
            let replace = match best {
                None => true,
                Some((_, top)) => *p > top,
            };
            if replace {
                best = Some((style.as_str(), *p));
            }
        }
        best.map(|(style, _)| style)
    }

    /// Append to the performance window, discarding the oldest entry once
    /// [`HISTORY_WINDOW`] is exceeded.
    pub fn push_performance(&mut self, value: f64) {
        push_bounded(&mut self.recent_performance, value);
    }

    /// Append to the engagement window, bounded like the performance window.
    pub fn push_engagement(&mut self, value: f64) {
        push_bounded(&mut self.engagement_history, value);
    }

    /// Fold a new load sample into the decaying load estimate:
    /// `load = decay * load + (1 - decay) * new_load`, clamped to [0, 1].
    pub fn update_load(&mut self, new_load: f64, decay: f64) {
        let folded = decay * self.current_load + (1.0 - decay) * new_load;
        self.current_load = folded.clamp(0.0, 1.0);
    }
}

fn push_bounded(window: &mut Vec<f64>, value: f64) {
    window.push(value);
    if window.len() > HISTORY_WINDOW {
        let excess = window.len() - HISTORY_WINDOW;
        window.drain(..excess);
    }
}

fn mean_of_tail(values: &[f64], window: usize) -> f64 {
    if values.is_empty() || window == 0 {
        return 0.5;
    }
    let tail = &values[values.len().saturating_sub(window)..];
    tail.iter().sum::<f64>() / tail.len() as f64
}
