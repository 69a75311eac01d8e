//! Sparse grids for high-dimensional quadrature and interpolation.
//!
//! A sparse grid samples a black-box function `f: R^d -> R^m` on a structured
//! set of points, far fewer than a full tensor grid, and from the sampled
//! values builds a quadrature rule and an interpolant. Two engines are
//! provided behind the [`SparseGrid`] façade:
//!
//! - **Global grids** combine tensor products of one-dimensional
//!   interpolatory rules (Clenshaw-Curtis, Gauss-Legendre, ...) with Smolyak
//!   combination weights over an admissible multi-index set.
//! - **Local polynomial grids** use hierarchical piecewise polynomials and can
//!   be refined adaptively wherever the hierarchical surplus is large.
//!
//! Sampling is a two-step protocol with no callbacks: the grid lists the
//! points it needs, the caller evaluates `f` there and loads the values back
//! in the same order.
//!
//! # Example: adaptive interpolation
//!
//! ```
//! use sparsegrids::{LocalGridBuilder, RefinementStrategy};
//!
//! let f = |x: &[f64]| (-x[0] * x[0]).exp() * x[1].cos();
//!
//! let mut grid = LocalGridBuilder::new(2, 1, 3).with_order(2).build().unwrap();
//! grid.set_transform_ab(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
//!
//! for _ in 0..4 {
//!     if grid.num_needed_points() == 0 {
//!         break;
//!     }
//!     let values: Vec<Vec<f64>> = grid.get_needed_points().iter().map(|x| vec![f(x)]).collect();
//!     grid.load_needed_points(&values).unwrap();
//!     grid.set_refinement(1e-4, RefinementStrategy::Classic).unwrap();
//! }
//!
//! let approx = grid.evaluate(&[0.3, 0.7]).unwrap()[0];
//! assert!((approx - f(&[0.3, 0.7])).abs() < 1e-3);
//! ```
//!
//! # Logging
//!
//! Construction, loading and refinement emit [`tracing`] events. The library
//! never installs a subscriber.

mod error;
mod global_grid;
mod grid;
mod local_grid;
mod refinement;
mod transform;

pub use error::{Result, SparseGridError};
pub use global_grid::GlobalGrid;
pub use grid::{
    make_full_tensor_grid, make_global_grid, make_local_polynomial_grid, GlobalGridBuilder,
    LocalGridBuilder, SparseGrid,
};
pub use local_grid::LocalPolynomialGrid;
pub use refinement::{RefinementOptions, RefinementStrategy, SurplusScaling};
pub use transform::DomainTransform;

pub use sparsegrids_indexset::{DepthType, MultiIndex, MultiIndexSet};
pub use sparsegrids_rules::{GlobalRule, RuleKind};
