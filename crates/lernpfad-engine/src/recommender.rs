//! Orchestration: score every candidate, pick the argmax, and apply the
//! state transition once the learner's response has been observed.
//!
//! Selection and the observation update are deliberately separate
//! operations: a response is usually not available synchronously, and the
//! exploration counters must only advance once per content actually shown.

use crate::config::{EngineConfig, ScoringWeights};
use crate::error::{EngineError, Result};
use crate::exploration::ExplorationTracker;
use crate::knowledge::KnowledgeAggregator;
use crate::mastery::MasteryTracker;
use crate::scoring::ScoringEngine;
use crate::{config, scoring};
use lernpfad_core::{ContentItem, Observation, Recommendation, StudentState};

/// The decision engine: five weighted objectives plus an exploration bonus
/// over an externally supplied candidate set.
#[derive(Debug)]
pub struct Recommender {
    config: EngineConfig,
    scoring: ScoringEngine,
    exploration: ExplorationTracker,
    mastery: MasteryTracker,
    knowledge: KnowledgeAggregator,
}

impl Recommender {
    /// Build with the default wiring (curated affinities, heuristic
    /// engagement model). Fails fast on invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let scoring = ScoringEngine::from_config(&config);
        Ok(Self::assemble(config, scoring))
    }

    /// Build with externally supplied affinities and engagement model.
    pub fn with_model(
        config: EngineConfig,
        affinity: scoring::AffinityMatrix,
        theta: Vec<f64>,
        features: Box<dyn scoring::FeatureSource + Send + Sync>,
    ) -> Result<Self> {
        config.validate()?;
        let scoring = ScoringEngine::new(&config, affinity, theta, features);
        Ok(Self::assemble(config, scoring))
    }

    fn assemble(config: EngineConfig, scoring: ScoringEngine) -> Self {
        let exploration = ExplorationTracker::from_config(&config);
        let mastery = MasteryTracker::from_config(&config);
        let knowledge = KnowledgeAggregator::from_config(&config);
        Self {
            config,
            scoring,
            exploration,
            mastery,
            knowledge,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn exploration(&self) -> &ExplorationTracker {
        &self.exploration
    }

    /// Replace the exploration tracker, e.g. with counters resumed from a
    /// persisted session.
    pub fn set_exploration(&mut self, exploration: ExplorationTracker) {
        self.exploration = exploration;
    }

    /// Replace the scoring weights at runtime, e.g. with an accepted tuning
    /// proposal or an A/B-test variant. The weights are validated against
    /// the usual invariant first; exploration counters and learner state
    /// are unaffected.
    pub fn set_weights(&mut self, weights: ScoringWeights) -> Result<()> {
        let mut config = self.config.clone();
        config.weights = weights;
        config.validate()?;
        self.config = config;
        self.scoring.set_weights(weights);
        Ok(())
    }

    /// Select the best content for the learner at interaction index `t`.
    ///
    /// Deterministic: identical inputs always yield the same item, with
    /// exact score ties broken toward the lexicographically smallest
    /// content id. Mutates nothing; call [`record_selection`] once the item
    /// has actually been shown.
    ///
    /// [`record_selection`]: Recommender::record_selection
    pub fn select(
        &self,
        student: &StudentState,
        candidates: &[ContentItem],
        t: u64,
    ) -> Result<Recommendation> {
        config::validate_student(student)?;
        if candidates.is_empty() {
            return Err(EngineError::EmptyCandidateSet);
        }

        let knowledge = self.knowledge.knowledge_level(student);

        let mut best: Option<(f64, &ContentItem)> = None;
        for content in candidates {
            let weighted = self.scoring.weighted_score(content, student, knowledge);
            let total = weighted + self.exploration.bonus(&content.kind, t);
            best = match best {
                None => Some((total, content)),
                Some((best_score, best_content)) => {
                    let replace = match total.partial_cmp(&best_score) {
                        Some(std::cmp::Ordering::Greater) => true,
                        Some(std::cmp::Ordering::Equal) => content.id < best_content.id,
                        _ => false,
                    };
                    if replace {
                        Some((total, content))
                    } else {
                        Some((best_score, best_content))
                    }
                }
            };
        }

        // candidates is non-empty, so best is always set by the loop above
        let Some((score, content)) = best else {
            return Err(EngineError::EmptyCandidateSet);
        };

        let mut components = self.scoring.component_scores(content, student, knowledge);
        let bonus = self.exploration.bonus(&content.kind, t);
        components.insert("exploration".to_string(), bonus);
        components.insert("total".to_string(), score);

        let why = format!(
            "argmax over {} candidates at knowledge {:.3} (exploration bonus {:.3})",
            candidates.len(),
            knowledge,
            bonus
        );

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            student = %student.student_id,
            content = %content.id,
            score,
            t,
            "content selected"
        );

        Ok(Recommendation {
            content_id: content.id.clone(),
            kind: content.kind.clone(),
            score,
            components,
            why,
        })
    }

    /// Advance the exploration counters for a kind that was actually shown.
    pub fn record_selection(&mut self, content_kind: &str) {
        self.exploration.record_selection(content_kind);
    }

    /// Full state transition for one observed response: knowledge-tracing
    /// update for the topic, performance and engagement windows, decaying
    /// cognitive load, mastered-topic bookkeeping, and the interaction
    /// count. Returns the topic's new mastery. On error the student state
    /// is left untouched.
    pub fn apply_observation(
        &self,
        student: &mut StudentState,
        observation: &Observation,
        content: &ContentItem,
    ) -> Result<f64> {
        config::validate_student(student)?;
        let mastery = self
            .mastery
            .update(student, &observation.topic, observation.correct)?;

        student.push_performance(if observation.correct { 1.0 } else { 0.0 });
        student.push_engagement(observation.engagement.clamp(0.0, 1.0));
        student.update_load(content.intrinsic_load, self.config.load_decay);

        if mastery >= self.config.mastery_threshold
            && !student.mastered_topics.contains(&observation.topic)
        {
            student.mastered_topics.push(observation.topic.clone());
        }
        student.total_interactions += 1;

        Ok(mastery)
    }

    /// Current knowledge level, exposed for callers that want to report it.
    #[must_use]
    pub fn knowledge_level(&self, student: &StudentState) -> f64 {
        self.knowledge.knowledge_level(student)
    }
}
