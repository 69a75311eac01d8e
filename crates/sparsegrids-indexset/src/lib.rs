//! Multi-index sets for Smolyak-type sparse grids.
//!
//! A sparse grid is a linear combination of tensor products of
//! one-dimensional rules. The tensors are named by multi-indices (one level
//! per dimension) and the selected multi-indices form a downward-closed set.
//!
//! # Quick Start
//!
//! ```
//! use sparsegrids_indexset::{combination_weights, DepthType, IndexSetBuilder};
//! use sparsegrids_rules::GlobalRule;
//!
//! let set = IndexSetBuilder::new(2, 1, DepthType::Level)
//!     .build(&GlobalRule::ClenshawCurtis)
//!     .unwrap();
//! assert_eq!(set.indices(), &[vec![0, 0], vec![0, 1], vec![1, 0]]);
//!
//! // Smolyak: U(1,0) + U(0,1) - U(0,0)
//! assert_eq!(combination_weights(&set), vec![-1, 1, 1]);
//! ```

mod builder;
mod depth;
mod error;
mod set;

pub use builder::{combination_weights, IndexSetBuilder};
pub use depth::DepthType;
pub use error::{IndexSetError, Result};
pub use set::MultiIndexSet;

/// One level per dimension
pub type MultiIndex = Vec<usize>;
