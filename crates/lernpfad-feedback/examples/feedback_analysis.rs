//! Example demonstrating outcome analysis and weight-tuning proposal
//! generation.
//!
//! This example shows how lernpfad analyzes observed learner responses
//! retrospectively and proposes scoring-weight adjustments without directly
//! modifying live weights.
//!
//! Run with: cargo run -p lernpfad-feedback --example feedback_analysis

use lernpfad_engine::{EngineConfig, Recommender};
use lernpfad_feedback::{FeedbackAnalyzer, ObservationOutcome};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== lernpfad: Observation Feedback Analysis ===\n");

    // Simulated session outcomes: algebra is going badly, text content
    // fails to engage.
    let outcomes = vec![
        create_outcome("alg-quiz-1", "quiz", "algebra", false, 0.5),
        create_outcome("alg-quiz-1", "quiz", "algebra", false, 0.4),
        create_outcome("alg-text-1", "text", "algebra", false, 0.3),
        create_outcome("alg-text-1", "text", "algebra", false, 0.2),
        create_outcome("alg-video-1", "video", "algebra", true, 0.7),
        create_outcome("alg-quiz-2", "quiz", "algebra", false, 0.4),
        create_outcome("frac-text-1", "text", "fractions", false, 0.3),
        create_outcome("frac-text-2", "text", "fractions", true, 0.2),
        create_outcome("frac-text-2", "text", "fractions", false, 0.35),
        create_outcome("frac-video-1", "video", "fractions", true, 0.8),
        create_outcome("frac-quiz-1", "quiz", "fractions", false, 0.5),
        create_outcome("frac-quiz-1", "quiz", "fractions", true, 0.6),
    ];

    println!("Analyzing {} observation outcomes...\n", outcomes.len());

    let analyzer = FeedbackAnalyzer::default();

    println!("Statistics by topic:");
    let by_topic = analyzer.aggregate_outcomes(&outcomes, |o| o.topic.clone());
    for (topic, stats) in &by_topic {
        println!(
            "  {} -> correct: {}/{} ({:.1}%), avg engagement: {:.2}",
            topic,
            stats.correct,
            stats.total,
            stats.accuracy() * 100.0,
            stats.average_engagement()
        );
    }
    println!();

    println!("Identified patterns:");
    let patterns = analyzer.analyze_patterns(&outcomes);
    if patterns.is_empty() {
        println!("  (none detected with current thresholds)");
    } else {
        for pattern in &patterns {
            println!("  - {}", pattern);
        }
    }
    println!();

    println!("Generating weight adjustment proposal...");
    match analyzer.propose_adjustment("default", &outcomes) {
        Some(proposal) => {
            println!("\nProposal generated:");
            println!("  Basis config: {}", proposal.basis_config);
            println!("  Confidence: {:.2}", proposal.confidence);
            println!("  Status: {:?}", proposal.status);
            println!("\n  Deltas:");
            for (key, value) in &proposal.deltas {
                println!("    {}: {:?}", key, value);
            }
            if let Some(reasoning) = &proposal.reasoning {
                println!("\n  Reasoning:");
                for r in reasoning {
                    println!("    - {}", r);
                }
            }

            println!("\nProposal as JSON:");
            let json = serde_json::to_string_pretty(&proposal)?;
            println!("{}", json);

            println!("\nWeights if the proposal were applied:");
            match proposal.apply_weights(&EngineConfig::default()) {
                Ok(weights) => {
                    println!("  {:?} (sum {:.3})", weights, weights.sum());
                    // The handoff the surrounding service performs after
                    // accepting a proposal.
                    let mut recommender = Recommender::new(EngineConfig::default())?;
                    recommender.set_weights(weights)?;
                    println!("  Engine accepted the adjusted weights.");
                }
                Err(e) => println!("  rejected: {}", e),
            }
        }
        None => {
            println!("\nInsufficient data or confidence for a proposal");
            println!("  (requires sufficient outcomes with detectable patterns)");
        }
    }

    println!("\n=== Analysis complete ===");
    println!("\nNote: lernpfad-feedback proposes adjustments but does NOT apply them.");
    println!("The surrounding service reviews and applies approved configurations.");

    Ok(())
}

fn create_outcome(
    content_id: &str,
    kind: &str,
    topic: &str,
    correct: bool,
    engagement: f64,
) -> ObservationOutcome {
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";
    let ts = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string());

    ObservationOutcome {
        content_id: content_id.to_string(),
        kind: kind.to_string(),
        topic: Some(topic.to_string()),
        correct,
        engagement,
        ts,
        metadata: None,
    }
}
