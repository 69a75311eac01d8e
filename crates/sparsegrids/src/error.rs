//! Error types for sparse grid operations

use sparsegrids_indexset::IndexSetError;
use sparsegrids_rules::RuleError;
use thiserror::Error;

/// Result type for sparse grid operations
pub type Result<T> = std::result::Result<T, SparseGridError>;

/// Errors that can occur while building or using a sparse grid.
///
/// A call that fails leaves the grid unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseGridError {
    /// Invalid construction or option parameter
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input array with the wrong number of rows or columns
    #[error("Shape mismatch: {message}")]
    Shape { message: String },

    /// The grid has no loaded values to work with
    #[error("Grid not ready: {message}")]
    NotReady { message: String },

    /// Operation not available for this kind of grid
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// A rule solver failed
    #[error("Numerical failure: {message}")]
    NumericalFailure { message: String },
}

impl SparseGridError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub(crate) fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }
}

impl From<RuleError> for SparseGridError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NumericalFailure { message } => Self::NumericalFailure { message },
            other => Self::configuration(other.to_string()),
        }
    }
}

impl From<IndexSetError> for SparseGridError {
    fn from(err: IndexSetError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// Check that `x` has one coordinate per dimension.
pub(crate) fn check_point(x: &[f64], dimension: usize) -> Result<()> {
    if x.len() != dimension {
        return Err(SparseGridError::shape(format!(
            "point has {} coordinates, grid dimension is {}",
            x.len(),
            dimension
        )));
    }
    Ok(())
}

/// Check that `values` is a `rows x cols` table.
pub(crate) fn check_values(values: &[Vec<f64>], rows: usize, cols: usize) -> Result<()> {
    if values.len() != rows {
        return Err(SparseGridError::shape(format!(
            "expected values for {} points, got {}",
            rows,
            values.len()
        )));
    }
    if let Some((row, v)) = values.iter().enumerate().find(|(_, v)| v.len() != cols) {
        return Err(SparseGridError::shape(format!(
            "row {} has {} values, grid has {} outputs",
            row,
            v.len(),
            cols
        )));
    }
    Ok(())
}
