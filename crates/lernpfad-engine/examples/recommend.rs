//! Select the next content item for a learner profile read from stdin.
//!
//! Input: an optional `StudentState` JSON object (a fresh profile is used
//! when stdin is empty). Output: the pretty-printed recommendation record.
//!
//! Run with: cargo run -p lernpfad-engine --example recommend

use std::io::{self, Read};

use lernpfad_engine::{EngineConfig, Recommender};
use lernpfad_core::{ContentItem, StudentState};
use serde_json::json;

fn demo_catalog() -> Vec<ContentItem> {
    let raw = json!([
        {"id": "frac-video-1", "kind": "video", "topic": "fractions",
         "difficulty": 0.35, "intrinsic_load": 0.4, "title": "Visualizing fractions"},
        {"id": "frac-quiz-1", "kind": "quiz", "topic": "fractions",
         "difficulty": 0.5, "intrinsic_load": 0.6, "title": "Fraction basics check"},
        {"id": "dec-text-1", "kind": "text", "topic": "decimals",
         "difficulty": 0.45, "intrinsic_load": 0.5, "title": "Decimals introduced"},
        {"id": "ratio-interactive-1", "kind": "interactive", "topic": null,
         "difficulty": 0.55, "intrinsic_load": 0.7, "title": "Ratio playground"}
    ]);
    serde_json::from_value(raw).unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let student: StudentState = if input.trim().is_empty() {
        let mut s = StudentState::new("demo-learner");
        s.mastery_by_topic.insert("fractions".into(), 0.3);
        s.topic_weights.insert("fractions".into(), 1.0);
        s
    } else {
        serde_json::from_str(&input)?
    };

    let recommender = Recommender::new(EngineConfig::default())?;
    let recommendation = recommender.select(&student, &demo_catalog(), 0)?;

    serde_json::to_writer_pretty(io::stdout(), &recommendation)?;
    println!();

    Ok(())
}
