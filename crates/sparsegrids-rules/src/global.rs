//! Global interpolatory rule families.

use crate::clenshaw_curtis::{clenshaw_curtis, fejer2};
use crate::error::{Result, RuleError};
use crate::gauss::{
    gauss_chebyshev1, gauss_chebyshev2, gauss_gegenbauer, gauss_jacobi, gauss_legendre,
};
use crate::RuleKind;

/// Largest level of the Clenshaw-Curtis family (`2^30 + 1` nodes)
const MAX_CC_LEVEL: usize = 30;
/// Largest level of the Fejér family (`2^30 - 1` nodes)
const MAX_FEJER_LEVEL: usize = 29;
/// Largest level of the Gauss families
const MAX_GAUSS_LEVEL: usize = 4096;

/// A global one-dimensional rule together with its shape parameters.
///
/// # Example
///
/// ```
/// use sparsegrids_rules::{GlobalRule, RuleKind};
///
/// let rule = GlobalRule::new(RuleKind::GaussLegendre, 0.0, 0.0).unwrap();
/// assert_eq!(rule.num_points(3).unwrap(), 4);
/// assert_eq!(rule.quadrature_exactness(3), 7);
/// assert!(!rule.is_nested());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobalRule {
    ClenshawCurtis,
    Fejer2,
    GaussLegendre,
    GaussChebyshev1,
    GaussChebyshev2,
    GaussGegenbauer { alpha: f64 },
    GaussJacobi { alpha: f64, beta: f64 },
}

fn check_shape(rule: RuleKind, name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > -1.0 {
        Ok(value)
    } else {
        Err(RuleError::InvalidShapeParameter { rule, name, value })
    }
}

impl GlobalRule {
    /// Create a global rule from its tag.
    ///
    /// `alpha` is read by Gegenbauer and Jacobi, `beta` by Jacobi only; both
    /// are ignored by the other families.
    pub fn new(kind: RuleKind, alpha: f64, beta: f64) -> Result<Self> {
        match kind {
            RuleKind::ClenshawCurtis => Ok(GlobalRule::ClenshawCurtis),
            RuleKind::Fejer2 => Ok(GlobalRule::Fejer2),
            RuleKind::GaussLegendre => Ok(GlobalRule::GaussLegendre),
            RuleKind::GaussChebyshev1 => Ok(GlobalRule::GaussChebyshev1),
            RuleKind::GaussChebyshev2 => Ok(GlobalRule::GaussChebyshev2),
            RuleKind::GaussGegenbauer => Ok(GlobalRule::GaussGegenbauer {
                alpha: check_shape(kind, "alpha", alpha)?,
            }),
            RuleKind::GaussJacobi => Ok(GlobalRule::GaussJacobi {
                alpha: check_shape(kind, "alpha", alpha)?,
                beta: check_shape(kind, "beta", beta)?,
            }),
            RuleKind::LocalPolynomial | RuleKind::LocalPolynomialZero => {
                Err(RuleError::WrongFamily {
                    rule: kind,
                    expected: "global",
                })
            }
        }
    }

    /// The family tag
    pub fn kind(&self) -> RuleKind {
        match self {
            GlobalRule::ClenshawCurtis => RuleKind::ClenshawCurtis,
            GlobalRule::Fejer2 => RuleKind::Fejer2,
            GlobalRule::GaussLegendre => RuleKind::GaussLegendre,
            GlobalRule::GaussChebyshev1 => RuleKind::GaussChebyshev1,
            GlobalRule::GaussChebyshev2 => RuleKind::GaussChebyshev2,
            GlobalRule::GaussGegenbauer { .. } => RuleKind::GaussGegenbauer,
            GlobalRule::GaussJacobi { .. } => RuleKind::GaussJacobi,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.kind().is_nested()
    }

    /// Largest level this family can generate
    pub fn max_level(&self) -> usize {
        match self {
            GlobalRule::ClenshawCurtis => MAX_CC_LEVEL,
            GlobalRule::Fejer2 => MAX_FEJER_LEVEL,
            _ => MAX_GAUSS_LEVEL,
        }
    }

    fn check_level(&self, level: usize) -> Result<()> {
        if level > self.max_level() {
            return Err(RuleError::LevelTooLarge {
                rule: self.kind(),
                level,
                max: self.max_level(),
            });
        }
        Ok(())
    }

    /// Number of nodes of `level`
    pub fn num_points(&self, level: usize) -> Result<usize> {
        self.check_level(level)?;
        Ok(self.points_unchecked(level))
    }

    fn points_unchecked(&self, level: usize) -> usize {
        match self {
            GlobalRule::ClenshawCurtis => {
                if level == 0 {
                    1
                } else {
                    (1usize << level) + 1
                }
            }
            GlobalRule::Fejer2 => (1usize << (level + 1)) - 1,
            _ => level + 1,
        }
    }

    /// Largest polynomial degree integrated exactly at `level`.
    ///
    /// Saturates for levels beyond [`GlobalRule::max_level`].
    pub fn quadrature_exactness(&self, level: usize) -> usize {
        let level = level.min(self.max_level());
        match self {
            GlobalRule::ClenshawCurtis | GlobalRule::Fejer2 => self.points_unchecked(level),
            _ => 2 * level + 1,
        }
    }

    /// Largest polynomial degree reproduced exactly by the interpolant at `level`
    pub fn interpolation_exactness(&self, level: usize) -> usize {
        let level = level.min(self.max_level());
        self.points_unchecked(level) - 1
    }

    /// Nodes (ascending) and weights of `level`.
    ///
    /// Weights integrate against the family's weight function on `[-1, 1]`.
    pub fn nodes_and_weights(&self, level: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = self.num_points(level)?;
        match *self {
            GlobalRule::ClenshawCurtis => Ok(clenshaw_curtis(n)),
            GlobalRule::Fejer2 => Ok(fejer2(n)),
            GlobalRule::GaussLegendre => gauss_legendre(n),
            GlobalRule::GaussChebyshev1 => Ok(gauss_chebyshev1(n)),
            GlobalRule::GaussChebyshev2 => Ok(gauss_chebyshev2(n)),
            GlobalRule::GaussGegenbauer { alpha } => gauss_gegenbauer(n, alpha),
            GlobalRule::GaussJacobi { alpha, beta } => gauss_jacobi(n, alpha, beta),
        }
    }

    /// Nodes of `level`
    pub fn nodes(&self, level: usize) -> Result<Vec<f64>> {
        Ok(self.nodes_and_weights(level)?.0)
    }

    /// Quadrature weights of `level`
    pub fn weights(&self, level: usize) -> Result<Vec<f64>> {
        Ok(self.nodes_and_weights(level)?.1)
    }
}
