//! Pedagogical pre-filtering of a raw catalog into the candidate set.
//!
//! This is the caller-side companion to the recommender: selection itself
//! never filters. Content passes when its prerequisites are mastered, its
//! difficulty sits inside the learner's challenge window, and its projected
//! load stays under the configured ceiling.

use crate::config::EngineConfig;
use lernpfad_core::{ContentItem, StudentState, Topic};
use std::collections::BTreeMap;

/// Slack added on both sides of the challenge window.
const ZPD_MARGIN: f64 = 0.1;

/// Filter `catalog` down to the items a learner may be offered right now.
/// Items without a topic skip the prerequisite and difficulty-window checks
/// (there is no mastery basis to judge them by) but still honor the load
/// ceiling.
#[must_use]
pub fn eligible(
    catalog: &[ContentItem],
    student: &StudentState,
    topics: &BTreeMap<String, Topic>,
    config: &EngineConfig,
) -> Vec<ContentItem> {
    catalog
        .iter()
        .filter(|content| is_eligible(content, student, topics, config))
        .cloned()
        .collect()
}

fn is_eligible(
    content: &ContentItem,
    student: &StudentState,
    topics: &BTreeMap<String, Topic>,
    config: &EngineConfig,
) -> bool {
    if content.projected_load(student) > config.load_ceiling {
        return false;
    }

    let Some(topic_id) = &content.topic else {
        return true;
    };

    if !prerequisites_met(content, topics.get(topic_id.as_str()), student, config) {
        return false;
    }

    let basis = student.topic_mastery(topic_id).unwrap_or(0.0);
    let lower = basis - ZPD_MARGIN;
    let upper = basis + config.zpd_delta + ZPD_MARGIN;
    (lower..=upper).contains(&content.difficulty)
}

fn prerequisites_met(
    content: &ContentItem,
    topic: Option<&Topic>,
    student: &StudentState,
    config: &EngineConfig,
) -> bool {
    let topic_prereqs = topic.map(|t| t.prerequisites.as_slice()).unwrap_or(&[]);
    topic_prereqs
        .iter()
        .chain(content.prerequisites.iter())
        .all(|prereq| student.is_topic_mastered(prereq, config.mastery_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lernpfad_core::content::kind;

    fn item(id: &str, topic: Option<&str>, difficulty: f64) -> ContentItem {
        ContentItem {
            id: id.into(),
            kind: kind::TEXT.into(),
            topic: topic.map(String::from),
            difficulty,
            intrinsic_load: 0.3,
            title: String::new(),
            prerequisites: vec![],
            tags: vec![],
            feature_vector: None,
        }
    }

    fn topic(id: &str, prerequisites: &[&str]) -> Topic {
        Topic {
            id: id.into(),
            name: id.into(),
            prerequisites: prerequisites.iter().map(|p| (*p).to_string()).collect(),
            importance_weight: 1.0,
            difficulty: 0.5,
        }
    }

    #[test]
    fn difficulty_window_filters_out_of_reach_content() {
        let mut student = StudentState::new("s1");
        student.mastery_by_topic.insert("fractions".into(), 0.3);
        let topics = BTreeMap::from([("fractions".to_string(), topic("fractions", &[]))]);
        let catalog = vec![
            item("in-window", Some("fractions"), 0.4),
            item("too-hard", Some("fractions"), 0.9),
            item("too-easy", Some("fractions"), 0.1),
        ];

        let result = eligible(&catalog, &student, &topics, &EngineConfig::default());
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        // window: [0.2, 0.3 + 0.2 + 0.1] = [0.2, 0.6]
        assert_eq!(ids, vec!["in-window"]);
    }

    #[test]
    fn unmastered_prerequisite_blocks_content() {
        let mut student = StudentState::new("s1");
        student.mastery_by_topic.insert("fractions".into(), 0.2);
        let topics = BTreeMap::from([(
            "algebra".to_string(),
            topic("algebra", &["fractions"]),
        )]);
        let catalog = vec![item("a1", Some("algebra"), 0.2)];

        let config = EngineConfig::default();
        assert!(eligible(&catalog, &student, &topics, &config).is_empty());

        student.mastery_by_topic.insert("fractions".into(), 0.8);
        assert_eq!(eligible(&catalog, &student, &topics, &config).len(), 1);
    }

    #[test]
    fn load_ceiling_applies_to_all_content() {
        let mut student = StudentState::new("s1");
        student.current_load = 1.0;
        let heavy = ContentItem {
            intrinsic_load: 1.0,
            ..item("heavy", None, 0.9)
        };
        let catalog = vec![heavy, item("light", None, 0.3)];

        let result = eligible(&catalog, &student, &BTreeMap::new(), &EngineConfig::default());
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["light"]);
    }

    #[test]
    fn topicless_content_skips_mastery_checks() {
        let student = StudentState::new("s1");
        let catalog = vec![item("open", None, 0.95)];
        let result = eligible(&catalog, &student, &BTreeMap::new(), &EngineConfig::default());
        assert_eq!(result.len(), 1);
    }
}
