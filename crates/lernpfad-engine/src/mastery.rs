//! Per-topic mastery estimation via Bayesian knowledge tracing.
//!
//! Each observed response updates the topic's mastery probability in two
//! steps: a Bayes posterior conditioned on correctness, then a learning-gain
//! step `p + (1 - p) * p_learn`. The result is clamped to [0, 1] to guard
//! against floating-point drift.

use crate::config::{BktParams, EngineConfig};
use crate::error::{EngineError, Result};
use lernpfad_core::StudentState;

/// Margin by which priors are kept away from exact 0/1 before the Bayes
/// update, so the posterior denominator cannot vanish.
const PRIOR_CLAMP_EPSILON: f64 = 1e-6;

/// Updates a learner's per-topic mastery probabilities from observed
/// responses. Stateless over the learner: all mutable state lives in the
/// [`StudentState`] passed to [`update`](MasteryTracker::update).
#[derive(Debug, Clone)]
pub struct MasteryTracker {
    defaults: BktParams,
    overrides: std::collections::BTreeMap<String, BktParams>,
    prior: f64,
    clamp_degenerate_priors: bool,
}

impl MasteryTracker {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            defaults: config.bkt,
            overrides: config.bkt_overrides.clone(),
            prior: config.mastery_prior,
            clamp_degenerate_priors: config.clamp_degenerate_priors,
        }
    }

    /// Apply one correct/incorrect observation for `topic` and return the
    /// new mastery probability. A topic seen for the first time starts at
    /// the configured prior. On error the student state is left untouched.
    pub fn update(&self, student: &mut StudentState, topic: &str, correct: bool) -> Result<f64> {
        let prior = student
            .topic_mastery(topic)
            .unwrap_or(self.prior);
        let params = self
            .overrides
            .get(topic)
            .copied()
            .unwrap_or(self.defaults);

        let posterior = self.posterior(topic, prior, correct, &params)?;
        let updated = posterior + (1.0 - posterior) * params.p_learn;
        let updated = updated.clamp(0.0, 1.0);

        student
            .mastery_by_topic
            .insert(topic.to_string(), updated);

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            topic,
            correct,
            prior,
            mastery = updated,
            "mastery updated"
        );

        Ok(updated)
    }

    /// Bayes posterior P(mastered | observation).
    fn posterior(&self, topic: &str, prior: f64, correct: bool, params: &BktParams) -> Result<f64> {
        let prior = if self.clamp_degenerate_priors {
            prior.clamp(PRIOR_CLAMP_EPSILON, 1.0 - PRIOR_CLAMP_EPSILON)
        } else {
            prior
        };

        let (numerator, denominator) = if correct {
            let n = (1.0 - params.p_slip) * prior;
            (n, n + params.p_guess * (1.0 - prior))
        } else {
            let n = params.p_slip * prior;
            (n, n + (1.0 - params.p_guess) * (1.0 - prior))
        };

        if denominator <= 0.0 {
            return Err(EngineError::DegenerateProbability {
                topic: topic.to_string(),
            });
        }
        Ok(numerator / denominator)
    }
}
