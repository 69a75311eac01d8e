//! One-dimensional rules for sparse grid construction.
//!
//! Every sparse grid is assembled from one-dimensional building blocks. This
//! crate provides them in two families:
//!
//! - [`GlobalRule`]: interpolatory quadrature rules (Clenshaw-Curtis, Fejér,
//!   Gauss-Legendre, Gauss-Chebyshev, Gauss-Gegenbauer, Gauss-Jacobi) that
//!   produce nodes and weights per level, combined into a deduplicated
//!   [`OneDTable`] with a Lagrange basis.
//! - [`LocalBasis`]: hierarchical piecewise polynomials of order 0 to 3 with
//!   compact support, addressed by integer node ids.
//!
//! All rules live on the canonical interval `[-1, 1]`.
//!
//! # Quick Start
//!
//! ```
//! use sparsegrids_rules::{GlobalRule, RuleKind};
//!
//! let rule = GlobalRule::new(RuleKind::ClenshawCurtis, 0.0, 0.0).unwrap();
//! let (nodes, weights) = rule.nodes_and_weights(2).unwrap();
//! assert_eq!(nodes.len(), 5);
//!
//! // Clenshaw-Curtis with 5 nodes integrates x^4 exactly
//! let integral: f64 = nodes.iter().zip(&weights).map(|(x, w)| w * x.powi(4)).sum();
//! assert!((integral - 0.4).abs() < 1e-14);
//! ```
//!
//! # Local Rules
//!
//! ```
//! use sparsegrids_rules::{LocalBasis, RuleKind};
//!
//! let basis = LocalBasis::new(RuleKind::LocalPolynomial, 1).unwrap();
//! let support = basis.basis_support(2, 0).unwrap();
//! assert_eq!((support.left, support.right), (-1.0, 0.0));
//! assert!((support.eval(-0.5) - 1.0).abs() < 1e-15);
//! ```
//!
//! # Error Handling
//!
//! ```
//! use sparsegrids_rules::{GlobalRule, RuleError, RuleKind};
//!
//! let result = GlobalRule::new(RuleKind::GaussGegenbauer, -1.5, 0.0);
//! assert!(matches!(result, Err(RuleError::InvalidShapeParameter { .. })));
//!
//! let parsed: Result<RuleKind, _> = "simpson".parse();
//! assert!(matches!(parsed, Err(RuleError::UnknownRule(_))));
//! ```

mod clenshaw_curtis;
mod error;
mod gauss;
mod global;
mod local;
mod table;

pub use error::{Result, RuleError};
pub use global::GlobalRule;
pub use local::{BasisSupport, Children, LocalBasis, LocalRule, MAX_LOCAL_LEVEL};
pub use table::OneDTable;

use std::fmt;
use std::str::FromStr;

/// Tolerance under which two generated nodes are the same point
pub const NODE_TOLERANCE: f64 = 1e-12;

/// Tag naming a one-dimensional rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Nested Chebyshev-extrema rule, `2^l + 1` nodes
    ClenshawCurtis,
    /// Nested Fejér type 2 rule (Chebyshev extrema without endpoints)
    Fejer2,
    /// Gauss-Legendre, `l + 1` nodes
    GaussLegendre,
    /// Gauss-Chebyshev with weight `1 / sqrt(1 - x^2)`
    GaussChebyshev1,
    /// Gauss-Chebyshev with weight `sqrt(1 - x^2)`
    GaussChebyshev2,
    /// Gauss-Gegenbauer with weight `(1 - x^2)^alpha`
    GaussGegenbauer,
    /// Gauss-Jacobi with weight `(1 - x)^alpha (1 + x)^beta`
    GaussJacobi,
    /// Hierarchical local polynomials including the boundary
    LocalPolynomial,
    /// Hierarchical local polynomials vanishing on the boundary
    LocalPolynomialZero,
}

impl RuleKind {
    /// Every rule family
    pub const ALL: [RuleKind; 9] = [
        RuleKind::ClenshawCurtis,
        RuleKind::Fejer2,
        RuleKind::GaussLegendre,
        RuleKind::GaussChebyshev1,
        RuleKind::GaussChebyshev2,
        RuleKind::GaussGegenbauer,
        RuleKind::GaussJacobi,
        RuleKind::LocalPolynomial,
        RuleKind::LocalPolynomialZero,
    ];

    /// True for the hierarchical piecewise-polynomial families
    pub fn is_local(self) -> bool {
        matches!(self, RuleKind::LocalPolynomial | RuleKind::LocalPolynomialZero)
    }

    /// True if the nodes of level `l` are a subset of the nodes of level `l + 1`
    pub fn is_nested(self) -> bool {
        matches!(
            self,
            RuleKind::ClenshawCurtis
                | RuleKind::Fejer2
                | RuleKind::LocalPolynomial
                | RuleKind::LocalPolynomialZero
        )
    }

    /// Canonical string tag
    pub fn tag(self) -> &'static str {
        match self {
            RuleKind::ClenshawCurtis => "clenshaw-curtis",
            RuleKind::Fejer2 => "fejer2",
            RuleKind::GaussLegendre => "gauss-legendre",
            RuleKind::GaussChebyshev1 => "gauss-chebyshev1",
            RuleKind::GaussChebyshev2 => "gauss-chebyshev2",
            RuleKind::GaussGegenbauer => "gauss-gegenbauer",
            RuleKind::GaussJacobi => "gauss-jacobi",
            RuleKind::LocalPolynomial => "local-polynomial",
            RuleKind::LocalPolynomialZero => "local-polynomial-zero",
        }
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            RuleKind::ClenshawCurtis => "Clenshaw-Curtis points and weights, nested",
            RuleKind::Fejer2 => "Fejer type 2 points and weights, nested",
            RuleKind::GaussLegendre => "Gauss-Legendre points and weights",
            RuleKind::GaussChebyshev1 => "Gauss-Chebyshev points and weights of type 1",
            RuleKind::GaussChebyshev2 => "Gauss-Chebyshev points and weights of type 2",
            RuleKind::GaussGegenbauer => "Gauss-Gegenbauer points and weights",
            RuleKind::GaussJacobi => "Gauss-Jacobi points and weights",
            RuleKind::LocalPolynomial => "Local piecewise polynomials",
            RuleKind::LocalPolynomialZero => {
                "Local piecewise polynomials with zero boundary values"
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    /// Accepts the canonical tags as well as the `rule_*` spellings, e.g.
    /// `"rule_clenshawcurtis"` or `"rule_pwpolynomial"`.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("rule_")
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "clenshawcurtis" | "cc" => Ok(RuleKind::ClenshawCurtis),
            "fejer2" => Ok(RuleKind::Fejer2),
            "gausslegendre" => Ok(RuleKind::GaussLegendre),
            "gausschebyshev1" | "gausschebyshev" => Ok(RuleKind::GaussChebyshev1),
            "gausschebyshev2" => Ok(RuleKind::GaussChebyshev2),
            "gaussgegenbauer" => Ok(RuleKind::GaussGegenbauer),
            "gaussjacobi" => Ok(RuleKind::GaussJacobi),
            "localpolynomial" | "pwpolynomial" | "localp" => Ok(RuleKind::LocalPolynomial),
            "localpolynomialzero" | "pwpolynomial0" | "pwpolynomialzero" | "localp0" => {
                Ok(RuleKind::LocalPolynomialZero)
            }
            _ => Err(RuleError::UnknownRule(s.to_string())),
        }
    }
}
