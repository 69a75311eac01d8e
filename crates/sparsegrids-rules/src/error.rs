//! Error types for sparsegrids-rules

use thiserror::Error;

use crate::RuleKind;

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Errors that can occur while building or querying one-dimensional rules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// The rule tag does not name a known family
    #[error("Unknown rule tag '{0}'")]
    UnknownRule(String),

    /// Shape parameter outside the valid range of the family
    #[error("Invalid {name} = {value} for {rule}: must be finite and greater than -1")]
    InvalidShapeParameter {
        rule: RuleKind,
        name: &'static str,
        value: f64,
    },

    /// Basis order not supported by the local rules
    #[error("Basis order {order} is not supported (maximum {max})")]
    InvalidOrder { order: usize, max: usize },

    /// A global rule was given where a local one is expected, or vice versa
    #[error("Rule {rule} is not a {expected} rule")]
    WrongFamily {
        rule: RuleKind,
        expected: &'static str,
    },

    /// Level beyond what the family can represent
    #[error("Level {level} exceeds the largest supported level {max} for {rule}")]
    LevelTooLarge {
        rule: RuleKind,
        level: usize,
        max: usize,
    },

    /// Node index outside the nodes of a level
    #[error("Node index {index} out of range for level {level} ({count} nodes)")]
    NodeIndexOutOfRange {
        level: usize,
        index: usize,
        count: usize,
    },

    /// A node solver did not converge
    #[error("Numerical failure: {message}")]
    NumericalFailure { message: String },
}
