//! Adaptive content selection and mastery tracking.
//!
//! The engine combines five pedagogical signals (style fit, difficulty fit,
//! cognitive-load fit, knowledge-gap priority, predicted engagement) with an
//! upper-confidence-bound exploration bonus, selects the best candidate, and
//! updates the learner's mastery estimate from observed responses via
//! Bayesian knowledge tracing.
//!
//! Everything here is pure, synchronous computation over state the caller
//! owns: no I/O, no globals, no hidden randomness. Independent learners can
//! be processed concurrently without any shared lock; per-learner calls must
//! be serialized by the caller.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod exploration;
pub mod knowledge;
pub mod mastery;
pub mod recommender;
pub mod scoring;

pub use config::{BktParams, EngineConfig, ScoringWeights};
pub use eligibility::eligible;
pub use error::{EngineError, Result};
pub use exploration::{ExplorationCounters, ExplorationTracker};
pub use knowledge::KnowledgeAggregator;
pub use mastery::MasteryTracker;
pub use recommender::Recommender;
pub use scoring::{AffinityMatrix, FeatureSource, HeuristicFeatures, ScoringEngine};
