#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Observation outcome analysis and scoring-weight tuning.
//!
//! This crate retrospectively analyzes observed learner responses and
//! generates scoring-weight adjustment proposals. It follows the principle:
//! **lernpfad-feedback analyzes and proposes, never directly modifies live
//! weights**. The surrounding service reviews a proposal and decides
//! whether to apply it.

use lernpfad_core::{ContentItem, Observation};
use lernpfad_engine::{EngineConfig, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

// Confidence calculation constants
/// Sample size at which confidence plateaus
const CONFIDENCE_SAMPLE_SIZE_PLATEAU: f64 = 50.0;
/// Confidence level when 2+ patterns detected
const CONFIDENCE_HIGH_PATTERN: f64 = 0.7;
/// Confidence level when <2 patterns detected
const CONFIDENCE_LOW_PATTERN: f64 = 0.5;
/// Weight for the sample-size component of confidence
const CONFIDENCE_SAMPLE_WEIGHT: f64 = 0.4;
/// Weight for the pattern-count component of confidence
const CONFIDENCE_PATTERN_WEIGHT: f64 = 0.6;

// Pattern detection thresholds
/// Minimum outcomes for one topic or kind before its patterns are analyzed
const PATTERN_MIN_OUTCOMES_PER_KEY: usize = 5;
/// Error rate above which a topic is flagged as overloading the learner
const PATTERN_HIGH_ERROR_THRESHOLD: f64 = 0.6;
/// Mean engagement below which a content kind is flagged
const PATTERN_LOW_ENGAGEMENT_THRESHOLD: f64 = 0.4;
/// Overall error rate indicating mis-tuned difficulty targeting
const PATTERN_OVERALL_ERROR_THRESHOLD: f64 = 0.5;

// Adjustment magnitudes
/// Weight mass shifted from difficulty fit toward gap targeting when the
/// overall error rate is high
const ADJUSTMENT_WEIGHT_SHIFT: f64 = 0.05;
/// Reduction of the exploration strength when engagement is low
const ADJUSTMENT_BETA0_DELTA: f64 = -0.1;

/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Applying proposal breaks the weight invariant: {0}")]
    InvalidAdjustment(String),
}

/// One observed response enriched with the content metadata the analyzer
/// groups by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationOutcome {
    /// Content item the learner responded to
    pub content_id: String,
    /// Modality of that item
    pub kind: String,
    /// Topic exercised, if the content had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Whether the response was correct
    pub correct: bool,
    /// Observed engagement in [0, 1]
    pub engagement: f64,
    /// Timestamp when the outcome was recorded
    pub ts: String,
    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ObservationOutcome {
    /// Build an outcome from an engine observation and the content item it
    /// refers to, stamped with the current time. The topic comes from the
    /// content descriptor, so uncurricularized content stays topicless in
    /// the analysis.
    #[must_use]
    pub fn from_observation(observation: &Observation, content: &ContentItem) -> Self {
        Self {
            content_id: observation.content_id.clone(),
            kind: content.kind.clone(),
            topic: content.topic.clone(),
            correct: observation.correct,
            engagement: observation.engagement,
            ts: iso8601_now(),
            metadata: None,
        }
    }
}

/// Statistics aggregated from observation outcomes.
#[derive(Debug, Default, Clone)]
pub struct OutcomeStatistics {
    /// Total number of outcomes (correct + incorrect).
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub total_engagement: f64,
}

impl OutcomeStatistics {
    /// Share of correct responses (0.0 to 1.0).
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.correct as f64 / self.total as f64
        }
    }

    /// Share of incorrect responses (0.0 to 1.0).
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        debug_assert!(
            self.correct + self.incorrect == self.total,
            "OutcomeStatistics totals are inconsistent"
        );
        if self.total == 0 {
            return 0.0;
        }
        1.0 - self.accuracy()
    }

    /// Mean observed engagement.
    #[must_use]
    pub fn average_engagement(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.total_engagement / self.total as f64
        }
    }
}

/// Value type for tuning deltas with explicit kind and unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeltaValue {
    /// Absolute numeric adjustment
    #[serde(rename = "absolute")]
    Absolute { value: f64 },
    /// Relative percentage adjustment
    #[serde(rename = "relative")]
    Relative { value: f64, unit: String },
}

/// Status of a tuning proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Proposed,
    Accepted,
    Rejected,
    Superseded,
}

/// Evidence supporting a tuning proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Number of outcomes analyzed
    pub outcomes_analyzed: usize,
    /// Error rate with the current weights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_rate_before: Option<f64>,
    /// Mean engagement over the analyzed outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_engagement: Option<f64>,
    /// Identified patterns that led to this proposal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
}

/// Proposed scoring-weight adjustments based on outcome analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightAdjustmentProposal {
    /// Version of the proposal format
    pub version: String,
    /// Identifier of the configuration being adjusted
    pub basis_config: String,
    /// Timestamp when the proposal was generated
    pub ts: String,
    /// Proposed adjustments keyed by parameter path
    /// (e.g. "weights.difficulty", "beta0")
    pub deltas: HashMap<String, DeltaValue>,
    /// Confidence in the proposed adjustments (0.0 to 1.0)
    pub confidence: f64,
    /// Evidence supporting the proposal
    pub evidence: Evidence,
    /// Human-readable explanations for the adjustments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Vec<String>>,
    /// Current status of this proposal
    #[serde(default)]
    pub status: ProposalStatus,
}

impl WeightAdjustmentProposal {
    /// Apply the weight deltas of this proposal to a configuration,
    /// returning the adjusted weights. Fails when the result would violate
    /// the engine's weight invariant (non-negative, summing to 1):
    /// applying is the caller's decision, validity is not.
    pub fn apply_weights(&self, config: &EngineConfig) -> Result<ScoringWeights, FeedbackError> {
        let mut weights = config.weights;
        for (key, delta) in &self.deltas {
            let DeltaValue::Absolute { value } = delta else {
                continue;
            };
            let slot = match key.as_str() {
                "weights.style" => &mut weights.style,
                "weights.difficulty" => &mut weights.difficulty,
                "weights.load" => &mut weights.load,
                "weights.gap" => &mut weights.gap,
                "weights.engagement" => &mut weights.engagement,
                _ => continue,
            };
            *slot += value;
        }

        let mut adjusted = config.clone();
        adjusted.weights = weights;
        adjusted
            .validate()
            .map_err(|e| FeedbackError::InvalidAdjustment(e.to_string()))?;
        Ok(weights)
    }
}

/// Analyzes observation outcomes and generates tuning proposals.
#[derive(Debug)]
pub struct FeedbackAnalyzer {
    /// Minimum number of outcomes required before proposing adjustments
    min_outcomes: usize,
    /// Minimum confidence threshold for proposals
    min_confidence: f64,
}

impl Default for FeedbackAnalyzer {
    fn default() -> Self {
        Self {
            min_outcomes: 10,
            min_confidence: 0.5,
        }
    }
}

impl FeedbackAnalyzer {
    /// Create a new analyzer with custom thresholds.
    #[must_use]
    pub fn new(min_outcomes: usize, min_confidence: f64) -> Self {
        Self {
            min_outcomes,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    /// Aggregate outcomes by a grouping key (e.g. topic, content kind).
    #[must_use]
    pub fn aggregate_outcomes(
        &self,
        outcomes: &[ObservationOutcome],
        key_fn: impl Fn(&ObservationOutcome) -> Option<String>,
    ) -> HashMap<String, OutcomeStatistics> {
        let mut stats: HashMap<String, OutcomeStatistics> = HashMap::new();

        for outcome in outcomes {
            if let Some(key) = key_fn(outcome) {
                let entry = stats.entry(key).or_default();
                entry.total += 1;
                if outcome.correct {
                    entry.correct += 1;
                } else {
                    entry.incorrect += 1;
                }
                if outcome.engagement.is_finite() {
                    entry.total_engagement += outcome.engagement;
                }
            }
        }

        stats
    }

    fn summarize_outcomes(&self, outcomes: &[ObservationOutcome]) -> OutcomeStatistics {
        let mut stats = OutcomeStatistics::default();

        for outcome in outcomes {
            stats.total += 1;
            if outcome.correct {
                stats.correct += 1;
            } else {
                stats.incorrect += 1;
            }
            if outcome.engagement.is_finite() {
                stats.total_engagement += outcome.engagement;
            }
        }

        stats
    }

    /// Analyze outcomes and identify patterns that warrant a tuning change.
    ///
    /// This is a heuristic-based analysis (not ML-based initially).
    #[must_use]
    pub fn analyze_patterns(&self, outcomes: &[ObservationOutcome]) -> Vec<String> {
        let mut patterns = Vec::new();

        if outcomes.len() < self.min_outcomes {
            return patterns;
        }

        // Pattern 1: learners repeatedly failing one topic
        let by_topic = self.aggregate_outcomes(outcomes, |o| o.topic.clone());
        let mut topics: Vec<_> = by_topic.iter().collect();
        topics.sort_by(|a, b| a.0.cmp(b.0));
        for (topic, stats) in topics {
            if stats.total >= PATTERN_MIN_OUTCOMES_PER_KEY
                && stats.error_rate() > PATTERN_HIGH_ERROR_THRESHOLD
            {
                patterns.push(format!(
                    "High error rate ({:.1}%) for topic '{}'",
                    stats.error_rate() * 100.0,
                    topic
                ));
            }
        }

        // Pattern 2: a content kind that fails to engage
        let by_kind = self.aggregate_outcomes(outcomes, |o| Some(o.kind.clone()));
        let mut kinds: Vec<_> = by_kind.iter().collect();
        kinds.sort_by(|a, b| a.0.cmp(b.0));
        for (kind, stats) in kinds {
            if stats.total >= PATTERN_MIN_OUTCOMES_PER_KEY
                && stats.average_engagement() < PATTERN_LOW_ENGAGEMENT_THRESHOLD
            {
                patterns.push(format!(
                    "Low engagement ({:.2}) for content kind '{}'",
                    stats.average_engagement(),
                    kind
                ));
            }
        }

        // Pattern 3: overall error rate out of band
        let overall = self.summarize_outcomes(outcomes);
        if overall.total >= self.min_outcomes
            && overall.error_rate() > PATTERN_OVERALL_ERROR_THRESHOLD
        {
            patterns.push(format!(
                "Overall error rate is high ({:.1}%)",
                overall.error_rate() * 100.0
            ));
        }

        patterns
    }

    /// Generate a tuning proposal based on analyzed outcomes.
    ///
    /// Returns `None` if there is insufficient data or confidence is too
    /// low.
    #[must_use]
    pub fn propose_adjustment(
        &self,
        basis_config: &str,
        outcomes: &[ObservationOutcome],
    ) -> Option<WeightAdjustmentProposal> {
        if outcomes.len() < self.min_outcomes {
            return None;
        }

        let patterns = self.analyze_patterns(outcomes);
        if patterns.is_empty() {
            return None;
        }

        let overall = self.summarize_outcomes(outcomes);

        // Confidence from sample size and pattern consistency
        #[allow(clippy::cast_precision_loss)]
        let confidence = {
            let sample_confidence =
                (outcomes.len() as f64 / CONFIDENCE_SAMPLE_SIZE_PLATEAU).min(1.0);
            let pattern_confidence = if patterns.len() >= 2 {
                CONFIDENCE_HIGH_PATTERN
            } else {
                CONFIDENCE_LOW_PATTERN
            };
            (sample_confidence * CONFIDENCE_SAMPLE_WEIGHT
                + pattern_confidence * CONFIDENCE_PATTERN_WEIGHT)
                .clamp(0.0, 1.0)
        };

        if confidence < self.min_confidence {
            return None;
        }

        let mut deltas = HashMap::new();
        let mut reasoning = Vec::new();

        // Learners failing broadly: shift weight mass from difficulty fit
        // toward gap targeting so weak topics are revisited sooner. The two
        // deltas cancel, keeping the weight sum at 1.
        if overall.error_rate() > PATTERN_OVERALL_ERROR_THRESHOLD {
            deltas.insert(
                "weights.difficulty".to_string(),
                DeltaValue::Absolute {
                    value: -ADJUSTMENT_WEIGHT_SHIFT,
                },
            );
            deltas.insert(
                "weights.gap".to_string(),
                DeltaValue::Absolute {
                    value: ADJUSTMENT_WEIGHT_SHIFT,
                },
            );
            reasoning
                .push("Shift weight from difficulty fit to gap targeting due to high error rate".to_string());
        }

        // Disengaged learners: explore less, exploit known-good content.
        if overall.average_engagement() < PATTERN_LOW_ENGAGEMENT_THRESHOLD {
            deltas.insert(
                "beta0".to_string(),
                DeltaValue::Absolute {
                    value: ADJUSTMENT_BETA0_DELTA,
                },
            );
            reasoning.push("Reduce exploration due to low engagement".to_string());
        }

        Some(WeightAdjustmentProposal {
            version: "0.1.0".to_string(),
            basis_config: basis_config.to_string(),
            ts: iso8601_now(),
            deltas,
            confidence,
            evidence: Evidence {
                outcomes_analyzed: outcomes.len(),
                error_rate_before: Some(overall.error_rate()),
                average_engagement: Some(overall.average_engagement()),
                patterns: Some(patterns),
            },
            reasoning: Some(reasoning),
            status: ProposalStatus::Proposed,
        })
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_outcome(
        content_id: &str,
        kind: &str,
        topic: &str,
        correct: bool,
        engagement: f64,
    ) -> ObservationOutcome {
        ObservationOutcome {
            content_id: content_id.to_string(),
            kind: kind.to_string(),
            topic: Some(topic.to_string()),
            correct,
            engagement,
            ts: iso8601_now(),
            metadata: None,
        }
    }

    #[test]
    fn outcome_bridges_observation_and_content() {
        let content = ContentItem {
            id: "frac-quiz-1".to_string(),
            kind: "quiz".to_string(),
            topic: Some("fractions".to_string()),
            difficulty: 0.5,
            intrinsic_load: 0.6,
            title: String::new(),
            prerequisites: vec![],
            tags: vec![],
            feature_vector: None,
        };
        let observation = Observation {
            content_id: "frac-quiz-1".to_string(),
            topic: "fractions".to_string(),
            correct: false,
            time_spent_secs: 90,
            engagement: 0.4,
        };

        let outcome = ObservationOutcome::from_observation(&observation, &content);
        assert_eq!(outcome.content_id, "frac-quiz-1");
        assert_eq!(outcome.kind, "quiz");
        assert_eq!(outcome.topic.as_deref(), Some("fractions"));
        assert!(!outcome.correct);
        assert!((outcome.engagement - 0.4).abs() < 1e-12);
    }

    #[test]
    fn outcome_statistics_calculates_rates_correctly() {
        let stats = OutcomeStatistics {
            total: 10,
            correct: 7,
            incorrect: 3,
            total_engagement: 5.0,
        };

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(stats.accuracy(), 0.7);
            assert_eq!(stats.error_rate(), 0.3);
            assert_eq!(stats.average_engagement(), 0.5);
        }
    }

    #[test]
    fn outcome_statistics_handles_empty_set() {
        let stats = OutcomeStatistics::default();

        #[allow(clippy::float_cmp)]
        {
            assert_eq!(stats.accuracy(), 0.0);
            assert_eq!(stats.error_rate(), 0.0);
            assert_eq!(stats.average_engagement(), 0.0);
        }
    }

    #[test]
    fn analyzer_aggregates_outcomes_by_topic() {
        let analyzer = FeedbackAnalyzer::default();
        let outcomes = vec![
            create_outcome("c1", "video", "fractions", true, 0.8),
            create_outcome("c2", "quiz", "fractions", false, 0.5),
            create_outcome("c3", "text", "decimals", true, 0.6),
        ];

        let by_topic = analyzer.aggregate_outcomes(&outcomes, |o| o.topic.clone());

        assert_eq!(by_topic.len(), 2);
        let fractions = by_topic.get("fractions").expect("fractions stats");
        assert_eq!(fractions.total, 2);
        assert_eq!(fractions.correct, 1);
    }

    #[test]
    fn analyzer_identifies_high_error_topics() {
        let analyzer = FeedbackAnalyzer::default();
        let outcomes: Vec<ObservationOutcome> = (0..10)
            .map(|i| create_outcome(&format!("c{i}"), "quiz", "algebra", false, 0.6))
            .collect();

        let patterns = analyzer.analyze_patterns(&outcomes);

        assert!(!patterns.is_empty());
        assert!(patterns.iter().any(|p| p.contains("High error rate")));
        assert!(patterns.iter().any(|p| p.contains("algebra")));
    }

    #[test]
    fn analyzer_flags_disengaging_content_kinds() {
        let analyzer = FeedbackAnalyzer::default();
        let outcomes: Vec<ObservationOutcome> = (0..12)
            .map(|i| create_outcome(&format!("c{i}"), "text", "fractions", true, 0.2))
            .collect();

        let patterns = analyzer.analyze_patterns(&outcomes);

        assert!(patterns.iter().any(|p| p.contains("Low engagement")));
        assert!(patterns.iter().any(|p| p.contains("text")));
    }

    #[test]
    fn analyzer_uses_topicless_outcomes_for_overall_stats() {
        let analyzer = FeedbackAnalyzer::default();
        let mut outcomes: Vec<ObservationOutcome> = (0..9)
            .map(|i| ObservationOutcome {
                content_id: format!("c{i}"),
                kind: "interactive".to_string(),
                topic: None,
                correct: false,
                engagement: 0.7,
                ts: iso8601_now(),
                metadata: None,
            })
            .collect();
        outcomes.push(create_outcome("c9", "video", "fractions", true, 0.8));

        let patterns = analyzer.analyze_patterns(&outcomes);

        assert!(patterns
            .iter()
            .any(|p| p.contains("Overall error rate is high")));
    }

    #[test]
    fn analyzer_requires_minimum_outcomes() {
        let analyzer = FeedbackAnalyzer::new(10, 0.5);
        let outcomes = vec![
            create_outcome("c1", "quiz", "fractions", false, 0.5),
            create_outcome("c2", "quiz", "fractions", false, 0.5),
        ];

        let proposal = analyzer.propose_adjustment("default", &outcomes);
        assert!(proposal.is_none());
    }

    #[test]
    fn analyzer_generates_proposal_with_sufficient_data() {
        let analyzer = FeedbackAnalyzer::new(10, 0.5);
        let outcomes: Vec<ObservationOutcome> = (0..15)
            .map(|i| {
                let correct = i % 3 == 0; // 33% accuracy
                create_outcome(&format!("c{i}"), "quiz", "algebra", correct, 0.6)
            })
            .collect();

        let proposal = analyzer.propose_adjustment("default", &outcomes);
        assert!(proposal.is_some());

        let proposal = proposal.expect("proposal should exist");
        assert_eq!(proposal.basis_config, "default");
        assert_eq!(proposal.evidence.outcomes_analyzed, 15);
        assert!(proposal.confidence >= 0.5);
        assert!(proposal.deltas.contains_key("weights.gap"));
    }

    #[test]
    fn proposal_weight_deltas_cancel_out() {
        let analyzer = FeedbackAnalyzer::new(10, 0.5);
        let outcomes: Vec<ObservationOutcome> = (0..20)
            .map(|i| create_outcome(&format!("c{i}"), "quiz", "algebra", i % 4 == 0, 0.6))
            .collect();

        let proposal = analyzer
            .propose_adjustment("default", &outcomes)
            .expect("proposal");
        let config = EngineConfig::default();
        let adjusted = proposal.apply_weights(&config).expect("apply");

        assert!((adjusted.sum() - 1.0).abs() < 1e-9);
        assert!(adjusted.gap > config.weights.gap);
        assert!(adjusted.difficulty < config.weights.difficulty);
    }

    #[test]
    fn applying_invalid_deltas_is_rejected() {
        let proposal = WeightAdjustmentProposal {
            version: "0.1.0".to_string(),
            basis_config: "default".to_string(),
            ts: iso8601_now(),
            deltas: HashMap::from([(
                "weights.gap".to_string(),
                DeltaValue::Absolute { value: 0.5 },
            )]),
            confidence: 0.9,
            evidence: Evidence {
                outcomes_analyzed: 20,
                error_rate_before: None,
                average_engagement: None,
                patterns: None,
            },
            reasoning: None,
            status: ProposalStatus::Proposed,
        };

        let err = proposal.apply_weights(&EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("weight invariant"));
    }

    #[test]
    fn proposal_serializes_to_valid_json() {
        let proposal = WeightAdjustmentProposal {
            version: "0.1.0".to_string(),
            basis_config: "default".to_string(),
            ts: iso8601_now(),
            deltas: {
                let mut map = HashMap::new();
                map.insert(
                    "beta0".to_string(),
                    DeltaValue::Absolute { value: -0.1 },
                );
                map
            },
            confidence: 0.68,
            evidence: Evidence {
                outcomes_analyzed: 100,
                error_rate_before: Some(0.42),
                average_engagement: Some(0.55),
                patterns: Some(vec!["Test pattern".to_string()]),
            },
            reasoning: Some(vec!["Test reasoning".to_string()]),
            status: ProposalStatus::Proposed,
        };

        let json = serde_json::to_string_pretty(&proposal).expect("should serialize");
        assert!(json.contains("beta0"));

        let _deserialized: WeightAdjustmentProposal =
            serde_json::from_str(&json).expect("should deserialize");
    }

    #[test]
    fn fixtures_outcome_deserializes() {
        let json = r#"{
            "content_id": "frac-quiz-1",
            "kind": "quiz",
            "topic": "fractions",
            "correct": false,
            "engagement": 0.3,
            "ts": "2026-01-04T12:00:00Z"
        }"#;

        let outcome: ObservationOutcome =
            serde_json::from_str(json).expect("should deserialize outcome");
        assert_eq!(outcome.content_id, "frac-quiz-1");
        assert!(!outcome.correct);
        assert_eq!(outcome.topic.as_deref(), Some("fractions"));
    }

    #[test]
    fn fixtures_full_adjustment_file_deserializes() {
        let json = include_str!("../../../tests/fixtures/feedback/adjustment.ok.json");
        let proposal: WeightAdjustmentProposal =
            serde_json::from_str(json).expect("should deserialize fixture");

        assert_eq!(proposal.basis_config, "default");
        assert_eq!(proposal.deltas.len(), 3);
        assert_eq!(proposal.status, ProposalStatus::Proposed);
        assert!(proposal.reasoning.as_ref().is_some_and(|r| r.len() >= 2));
        assert!(proposal
            .evidence
            .patterns
            .as_ref()
            .is_some_and(|p| p.len() >= 2));

        if let Some(DeltaValue::Absolute { value }) = proposal.deltas.get("weights.gap") {
            assert!((value - 0.05).abs() < 1e-9);
        } else {
            panic!("Expected absolute delta for weights.gap");
        }
        if let Some(DeltaValue::Relative { value, unit }) = proposal.deltas.get("zpd_delta") {
            assert!((value + 10.0).abs() < 1e-9);
            assert_eq!(unit, "percent");
        } else {
            panic!("Expected relative delta for zpd_delta");
        }
    }
}
