use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Degenerate mastery prior for topic '{topic}': update would divide by zero")]
    DegenerateProbability { topic: String },
    #[error("No eligible content to choose among")]
    EmptyCandidateSet,
}

pub type Result<T> = std::result::Result<T, EngineError>;
