//! Engine configuration and fail-fast validation.
//!
//! All tuning parameters are plain data supplied by the caller. Validation
//! rejects inconsistent values outright; nothing is silently renormalized.

use crate::error::{EngineError, Result};
use lernpfad_core::StudentState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for the "weights sum to 1" check.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;
/// Tolerance for the "style preferences sum to 1" check.
const STYLE_SUM_TOLERANCE: f64 = 0.01;

/// Weights of the five scoring objectives. Must be non-negative and sum
/// to 1 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub style: f64,
    pub difficulty: f64,
    pub load: f64,
    pub gap: f64,
    pub engagement: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            style: 0.15,
            difficulty: 0.25,
            load: 0.20,
            gap: 0.25,
            engagement: 0.15,
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.style + self.difficulty + self.load + self.gap + self.engagement
    }
}

/// Knowledge-tracing parameters for one topic (or the global defaults).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BktParams {
    /// P(incorrect | mastered)
    pub p_slip: f64,
    /// P(correct | not mastered)
    pub p_guess: f64,
    /// P(transition to mastered per practice step)
    pub p_learn: f64,
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            p_slip: 0.1,
            p_guess: 0.2,
            p_learn: 0.3,
        }
    }
}

/// All engine tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: ScoringWeights,
    /// Optimal challenge offset δ above current knowledge
    #[serde(default = "default_zpd_delta")]
    pub zpd_delta: f64,
    /// Width σ of the difficulty-fit Gaussian, must be positive
    #[serde(default = "default_zpd_sigma")]
    pub zpd_sigma: f64,
    /// Initial exploration strength β₀, non-negative
    #[serde(default = "default_beta0")]
    pub beta0: f64,
    /// Mastery level at which a topic counts as mastered
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: f64,
    /// Knowledge level reported while no topic is known yet
    #[serde(default = "default_knowledge")]
    pub default_knowledge: f64,
    /// Mastery prior assigned when a topic is first observed
    #[serde(default = "default_mastery_prior")]
    pub mastery_prior: f64,
    /// Projected-load ceiling used by the eligibility filter
    #[serde(default = "default_load_ceiling")]
    pub load_ceiling: f64,
    /// Decay factor for the learner's rolling cognitive-load estimate
    #[serde(default = "default_load_decay")]
    pub load_decay: f64,
    /// Global knowledge-tracing defaults
    #[serde(default)]
    pub bkt: BktParams,
    /// Per-topic overrides of the knowledge-tracing parameters
    #[serde(default)]
    pub bkt_overrides: BTreeMap<String, BktParams>,
    /// Clamp mastery priors away from exact 0/1 before the Bayes update.
    /// With this disabled a degenerate prior becomes a hard error.
    #[serde(default = "default_true")]
    pub clamp_degenerate_priors: bool,
}

fn default_zpd_delta() -> f64 {
    0.2
}
fn default_zpd_sigma() -> f64 {
    0.15
}
fn default_beta0() -> f64 {
    1.0
}
fn default_mastery_threshold() -> f64 {
    0.7
}
fn default_knowledge() -> f64 {
    0.1
}
fn default_mastery_prior() -> f64 {
    0.2
}
fn default_load_ceiling() -> f64 {
    0.9
}
fn default_load_decay() -> f64 {
    0.8
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            zpd_delta: default_zpd_delta(),
            zpd_sigma: default_zpd_sigma(),
            beta0: default_beta0(),
            mastery_threshold: default_mastery_threshold(),
            default_knowledge: default_knowledge(),
            mastery_prior: default_mastery_prior(),
            load_ceiling: default_load_ceiling(),
            load_decay: default_load_decay(),
            bkt: BktParams::default(),
            bkt_overrides: BTreeMap::new(),
            clamp_degenerate_priors: true,
        }
    }
}

impl EngineConfig {
    /// Validate every parameter, failing on the first violation.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("style", w.style),
            ("difficulty", w.difficulty),
            ("load", w.load),
            ("gap", w.gap),
            ("engagement", w.engagement),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfiguration(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        let sum = w.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidConfiguration(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        if !self.zpd_sigma.is_finite() || self.zpd_sigma <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "zpd_sigma must be positive, got {}",
                self.zpd_sigma
            )));
        }
        if !self.beta0.is_finite() || self.beta0 < 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "beta0 must be non-negative, got {}",
                self.beta0
            )));
        }
        for (name, value) in [
            ("mastery_threshold", self.mastery_threshold),
            ("default_knowledge", self.default_knowledge),
            ("mastery_prior", self.mastery_prior),
            ("load_ceiling", self.load_ceiling),
            ("load_decay", self.load_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        validate_bkt("defaults", &self.bkt)?;
        for (topic, params) in &self.bkt_overrides {
            validate_bkt(topic, params)?;
        }
        Ok(())
    }

    /// Knowledge-tracing parameters for `topic`, falling back to the global
    /// defaults.
    #[must_use]
    pub fn bkt_for(&self, topic: &str) -> BktParams {
        self.bkt_overrides.get(topic).copied().unwrap_or(self.bkt)
    }
}

fn validate_bkt(scope: &str, params: &BktParams) -> Result<()> {
    for (name, value) in [
        ("p_slip", params.p_slip),
        ("p_guess", params.p_guess),
        ("p_learn", params.p_learn),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::InvalidConfiguration(format!(
                "{name} for '{scope}' must be in [0, 1], got {value}"
            )));
        }
    }
    Ok(())
}

/// Validate an externally supplied learner profile before it enters the
/// engine: probability ranges, non-negative weights, and a style
/// distribution that sums to 1 (an empty one is allowed).
pub fn validate_student(student: &StudentState) -> Result<()> {
    for (topic, mastery) in &student.mastery_by_topic {
        if !(0.0..=1.0).contains(mastery) {
            return Err(EngineError::InvalidConfiguration(format!(
                "mastery for topic '{topic}' must be in [0, 1], got {mastery}"
            )));
        }
    }
    for (topic, weight) in &student.topic_weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "topic weight for '{topic}' must be non-negative, got {weight}"
            )));
        }
    }
    if !student.style_preference.is_empty() {
        let mut sum = 0.0;
        for (style, p) in &student.style_preference {
            if !p.is_finite() || *p < 0.0 {
                return Err(EngineError::InvalidConfiguration(format!(
                    "style preference for '{style}' must be non-negative, got {p}"
                )));
            }
            sum += p;
        }
        if (sum - 1.0).abs() > STYLE_SUM_TOLERANCE {
            return Err(EngineError::InvalidConfiguration(format!(
                "style preferences must sum to 1.0, got {sum}"
            )));
        }
    }
    if !(student.load_capacity > 0.0 && student.load_capacity <= 1.0) {
        return Err(EngineError::InvalidConfiguration(format!(
            "load_capacity must be in (0, 1], got {}",
            student.load_capacity
        )));
    }
    if !(0.0..=1.0).contains(&student.current_load) {
        return Err(EngineError::InvalidConfiguration(format!(
            "current_load must be in [0, 1], got {}",
            student.current_load
        )));
    }
    Ok(())
}
