//! Error types for multi-index set construction

use thiserror::Error;

/// Result type for index set operations
pub type Result<T> = std::result::Result<T, IndexSetError>;

/// Errors that can occur while building or editing multi-index sets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexSetError {
    /// Dimension must be at least one
    #[error("Invalid dimension {0}: must be at least 1")]
    InvalidDimension(usize),

    /// Anisotropic weight vector does not match the dimension
    #[error("Anisotropic weights have length {got}, expected {expected}")]
    WeightsLength { expected: usize, got: usize },

    /// Anisotropic weights must be positive
    #[error("Anisotropic weight {weight} at position {position} must be positive")]
    InvalidWeight { position: usize, weight: usize },

    /// Unknown depth-type tag
    #[error("Unknown depth type '{0}'")]
    UnknownDepthType(String),

    /// Depth type needs the exactness of a global rule
    #[error("Depth type {0} requires a global rule")]
    RuleRequired(String),

    /// Insertion would break downward closure
    #[error("Multi-index {index:?} is not admissible: predecessor in dimension {dimension} is missing")]
    NotAdmissible { index: Vec<usize>, dimension: usize },

    /// Multi-index length differs from the set dimension
    #[error("Multi-index has length {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
