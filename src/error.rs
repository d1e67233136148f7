// Error taxonomy shared by every stage of the evolution pipeline

use thiserror::Error;

/// Errors surfaced by the simulation, the network and the genetic algorithm
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolutionError {
    /// Invalid run parameters, detected before any episode is played
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The seeded apple sequence has no further entries
    #[error("apple sequence exhausted after {consumed} of {len} apples")]
    ExhaustedSequence { consumed: usize, len: usize },

    /// The network produced an action index outside the four directions
    #[error("decoded action index {0} is not a direction")]
    InvalidAction(usize),

    /// A genome built from raw genes does not match the network layout
    #[error("genome has {actual} genes, expected {expected}")]
    GenomeLength { expected: usize, actual: usize },

    /// Training log could not be written or read
    #[error("training log: {0}")]
    Log(String),
}

pub type Result<T> = std::result::Result<T, EvolutionError>;
