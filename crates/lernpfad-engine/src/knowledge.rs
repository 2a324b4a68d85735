//! Aggregation of per-topic mastery into a scalar knowledge level.

use crate::config::EngineConfig;
use lernpfad_core::StudentState;

/// Stateless aggregate over a learner's mastery map.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeAggregator {
    default_knowledge: f64,
}

impl KnowledgeAggregator {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            default_knowledge: config.default_knowledge,
        }
    }

    /// Weighted average of mastery over the topics present in both the
    /// mastery map and the weight map, normalized by the sum of the weights
    /// actually used so that missing topics do not drag the average toward
    /// zero. Falls back to the configured default when no topic is known
    /// (or all usable weights are zero).
    #[must_use]
    pub fn knowledge_level(&self, student: &StudentState) -> f64 {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (topic, mastery) in &student.mastery_by_topic {
            if let Some(weight) = student.topic_weights.get(topic) {
                weighted_sum += weight * mastery;
                weight_total += weight;
            }
        }
        if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            self.default_knowledge
        }
    }

    /// Mastery probability for a single topic; `None` signals a new topic.
    #[must_use]
    pub fn mastery_of(&self, student: &StudentState, topic: &str) -> Option<f64> {
        student.topic_mastery(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> KnowledgeAggregator {
        KnowledgeAggregator::from_config(&EngineConfig::default())
    }

    #[test]
    fn empty_state_returns_default() {
        let student = StudentState::new("s1");
        assert!((aggregator().knowledge_level(&student) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn weighted_average_over_shared_topics() {
        let mut student = StudentState::new("s1");
        student.mastery_by_topic.insert("a".into(), 0.8);
        student.mastery_by_topic.insert("b".into(), 0.2);
        student.topic_weights.insert("a".into(), 3.0);
        student.topic_weights.insert("b".into(), 1.0);

        // (3 * 0.8 + 1 * 0.2) / 4 = 0.65
        assert!((aggregator().knowledge_level(&student) - 0.65).abs() < 1e-9);
    }

    #[test]
    fn topics_without_weights_are_ignored() {
        let mut student = StudentState::new("s1");
        student.mastery_by_topic.insert("a".into(), 0.9);
        student.mastery_by_topic.insert("orphan".into(), 0.0);
        student.topic_weights.insert("a".into(), 1.0);
        // A configured weight for a topic never practiced must not bias the
        // average either.
        student.topic_weights.insert("future".into(), 5.0);

        assert!((aggregator().knowledge_level(&student) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn knowledge_level_stays_in_unit_interval() {
        let mut student = StudentState::new("s1");
        for (i, mastery) in [0.0, 0.31, 0.77, 1.0].into_iter().enumerate() {
            let topic = format!("t{i}");
            student.mastery_by_topic.insert(topic.clone(), mastery);
            student.topic_weights.insert(topic, (i + 1) as f64);
        }
        let level = aggregator().knowledge_level(&student);
        assert!((0.0..=1.0).contains(&level));
    }

    #[test]
    fn mastery_of_distinguishes_new_topics() {
        let mut student = StudentState::new("s1");
        student.mastery_by_topic.insert("a".into(), 0.4);
        let agg = aggregator();
        assert_eq!(agg.mastery_of(&student, "a"), Some(0.4));
        assert_eq!(agg.mastery_of(&student, "b"), None);
    }
}
