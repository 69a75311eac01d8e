//! The grid façade: one type over both engines, plus the domain transform.

use sparsegrids_indexset::DepthType;
use sparsegrids_rules::{GlobalRule, RuleKind};

use crate::error::{check_point, Result, SparseGridError};
use crate::global_grid::GlobalGrid;
use crate::local_grid::LocalPolynomialGrid;
use crate::refinement::{RefinementOptions, RefinementStrategy};
use crate::transform::DomainTransform;

#[derive(Debug, Clone)]
enum Engine {
    Global(GlobalGrid),
    Local(LocalPolynomialGrid),
}

/// A sparse grid: sample points, quadrature and interpolation.
///
/// The grid hands out the points it needs ([`SparseGrid::get_needed_points`]),
/// takes the function values back in the same row order
/// ([`SparseGrid::load_needed_points`]) and then integrates or evaluates the
/// interpolant. Local grids can be refined adaptively, which appends new
/// needed points.
///
/// # Example
///
/// ```
/// use sparsegrids::{DepthType, GlobalGridBuilder, RuleKind};
///
/// let mut grid = GlobalGridBuilder::new(2, 1, 4)
///     .with_depth_type(DepthType::Level)
///     .with_rule(RuleKind::ClenshawCurtis)
///     .build()
///     .unwrap();
///
/// let values: Vec<Vec<f64>> = grid
///     .get_needed_points()
///     .iter()
///     .map(|x| vec![x[0] * x[0] + x[1]])
///     .collect();
/// grid.load_needed_points(&values).unwrap();
///
/// let integral = grid.integrate().unwrap();
/// assert!((integral[0] - 4.0 / 3.0).abs() < 1e-12);
/// let value = grid.evaluate(&[0.5, 0.25]).unwrap();
/// assert!((value[0] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SparseGrid {
    engine: Engine,
    transform: Option<DomainTransform>,
}

/// Build a global grid from its full parameter list.
///
/// `anisotropic_weights` may be empty (isotropic). `alpha` and `beta` are the
/// shape parameters of the Gegenbauer and Jacobi rules and are ignored by the
/// other families.
#[allow(clippy::too_many_arguments)]
pub fn make_global_grid(
    dimension: usize,
    outputs: usize,
    depth: usize,
    depth_type: DepthType,
    rule: RuleKind,
    anisotropic_weights: &[usize],
    alpha: f64,
    beta: f64,
) -> Result<SparseGrid> {
    let rule = GlobalRule::new(rule, alpha, beta)?;
    let grid = GlobalGrid::new(
        dimension,
        outputs,
        depth,
        depth_type,
        rule,
        anisotropic_weights,
    )?;
    Ok(SparseGrid {
        engine: Engine::Global(grid),
        transform: None,
    })
}

/// Build the tensor product grid with `levels[k]` in dimension `k`.
///
/// `levels` must hold one level per dimension. `alpha` and `beta` are used as
/// in [`make_global_grid`].
pub fn make_full_tensor_grid(
    dimension: usize,
    outputs: usize,
    levels: &[usize],
    rule: RuleKind,
    alpha: f64,
    beta: f64,
) -> Result<SparseGrid> {
    if levels.len() != dimension {
        return Err(SparseGridError::shape(format!(
            "{} tensor levels for a grid of dimension {}",
            levels.len(),
            dimension
        )));
    }
    let rule = GlobalRule::new(rule, alpha, beta)?;
    let grid = GlobalGrid::full_tensor(outputs, levels, rule)?;
    Ok(SparseGrid {
        engine: Engine::Global(grid),
        transform: None,
    })
}

/// Build a local hierarchical grid holding every point of total level at
/// most `initial_level`.
pub fn make_local_polynomial_grid(
    dimension: usize,
    outputs: usize,
    initial_level: usize,
    order: usize,
    rule: RuleKind,
) -> Result<SparseGrid> {
    let grid = LocalPolynomialGrid::new(dimension, outputs, initial_level, order, rule)?;
    Ok(SparseGrid {
        engine: Engine::Local(grid),
        transform: None,
    })
}

/// Builder for global grids with defaults: level depth, Clenshaw-Curtis,
/// isotropic, `alpha = beta = 0`.
#[derive(Debug, Clone)]
pub struct GlobalGridBuilder {
    dimension: usize,
    outputs: usize,
    depth: usize,
    depth_type: DepthType,
    rule: RuleKind,
    anisotropic_weights: Vec<usize>,
    alpha: f64,
    beta: f64,
}

impl GlobalGridBuilder {
    pub fn new(dimension: usize, outputs: usize, depth: usize) -> Self {
        Self {
            dimension,
            outputs,
            depth,
            depth_type: DepthType::Level,
            rule: RuleKind::ClenshawCurtis,
            anisotropic_weights: Vec::new(),
            alpha: 0.0,
            beta: 0.0,
        }
    }

    pub fn with_depth_type(mut self, depth_type: DepthType) -> Self {
        self.depth_type = depth_type;
        self
    }

    pub fn with_rule(mut self, rule: RuleKind) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_anisotropic_weights(mut self, weights: Vec<usize>) -> Self {
        self.anisotropic_weights = weights;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn build(&self) -> Result<SparseGrid> {
        make_global_grid(
            self.dimension,
            self.outputs,
            self.depth,
            self.depth_type,
            self.rule,
            &self.anisotropic_weights,
            self.alpha,
            self.beta,
        )
    }
}

/// Builder for local grids with defaults: linear basis, boundary rule.
#[derive(Debug, Clone)]
pub struct LocalGridBuilder {
    dimension: usize,
    outputs: usize,
    initial_level: usize,
    order: usize,
    rule: RuleKind,
}

impl LocalGridBuilder {
    pub fn new(dimension: usize, outputs: usize, initial_level: usize) -> Self {
        Self {
            dimension,
            outputs,
            initial_level,
            order: 1,
            rule: RuleKind::LocalPolynomial,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_rule(mut self, rule: RuleKind) -> Self {
        self.rule = rule;
        self
    }

    pub fn build(&self) -> Result<SparseGrid> {
        make_local_polynomial_grid(
            self.dimension,
            self.outputs,
            self.initial_level,
            self.order,
            self.rule,
        )
    }
}

impl SparseGrid {
    /// The global engine, if this is a global grid
    pub fn as_global(&self) -> Option<&GlobalGrid> {
        match &self.engine {
            Engine::Global(g) => Some(g),
            Engine::Local(_) => None,
        }
    }

    /// The local engine, if this is a local grid
    pub fn as_local(&self) -> Option<&LocalPolynomialGrid> {
        match &self.engine {
            Engine::Local(g) => Some(g),
            Engine::Global(_) => None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.engine, Engine::Global(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self.engine, Engine::Local(_))
    }

    pub fn num_dimensions(&self) -> usize {
        match &self.engine {
            Engine::Global(g) => g.dimension(),
            Engine::Local(g) => g.dimension(),
        }
    }

    pub fn num_outputs(&self) -> usize {
        match &self.engine {
            Engine::Global(g) => g.outputs(),
            Engine::Local(g) => g.outputs(),
        }
    }

    pub fn num_points(&self) -> usize {
        match &self.engine {
            Engine::Global(g) => g.num_points(),
            Engine::Local(g) => g.num_points(),
        }
    }

    pub fn num_needed_points(&self) -> usize {
        match &self.engine {
            Engine::Global(g) => g.num_needed_points(),
            Engine::Local(g) => g.num_needed_points(),
        }
    }

    pub fn num_loaded_points(&self) -> usize {
        match &self.engine {
            Engine::Global(g) => g.num_loaded_points(),
            Engine::Local(g) => g.num_loaded_points(),
        }
    }

    fn to_physical(&self, points: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
        match &self.transform {
            Some(t) => points.iter().map(|x| t.to_physical(x)).collect(),
            None => points,
        }
    }

    fn to_canonical(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_point(x, self.num_dimensions())?;
        Ok(match &self.transform {
            Some(t) => t.to_canonical(x),
            None => x.to_vec(),
        })
    }

    fn jacobian(&self) -> f64 {
        self.transform.as_ref().map_or(1.0, DomainTransform::jacobian)
    }

    /// Every point of the grid, in the transformed domain
    pub fn get_points(&self) -> Vec<Vec<f64>> {
        let points = match &self.engine {
            Engine::Global(g) => g.points(),
            Engine::Local(g) => g.points(),
        };
        self.to_physical(points)
    }

    /// Points awaiting values, in the row order of [`SparseGrid::load_needed_points`]
    pub fn get_needed_points(&self) -> Vec<Vec<f64>> {
        let points = match &self.engine {
            Engine::Global(g) => g.needed_points(),
            Engine::Local(g) => g.needed_points(),
        };
        self.to_physical(points)
    }

    pub fn get_loaded_points(&self) -> Vec<Vec<f64>> {
        let points = match &self.engine {
            Engine::Global(g) => g.loaded_points(),
            Engine::Local(g) => g.loaded_points(),
        };
        self.to_physical(points)
    }

    /// Quadrature weights aligned with [`SparseGrid::get_points`], scaled to
    /// the transformed domain. Global grids only.
    pub fn get_weights(&self) -> Result<Vec<f64>> {
        match &self.engine {
            Engine::Global(g) => {
                let scale = self.jacobian();
                Ok(g.quadrature_weights().iter().map(|w| w * scale).collect())
            }
            Engine::Local(_) => Err(SparseGridError::unsupported(
                "local grids have no quadrature weights, use integrate",
            )),
        }
    }

    /// Load one row of `num_outputs()` values per needed point.
    ///
    /// The call is atomic: on a shape error nothing is stored.
    pub fn load_needed_points(&mut self, values: &[Vec<f64>]) -> Result<()> {
        match &mut self.engine {
            Engine::Global(g) => g.load_values(values),
            Engine::Local(g) => g.load_values(values),
        }
    }

    /// Value of the interpolant at `x` (transformed domain)
    pub fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>> {
        let x = self.to_canonical(x)?;
        match &self.engine {
            Engine::Global(g) => g.evaluate(&x),
            Engine::Local(g) => g.evaluate(&x),
        }
    }

    /// [`SparseGrid::evaluate`] for many points
    pub fn evaluate_batch(&self, xs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        xs.iter().map(|x| self.evaluate(x)).collect()
    }

    /// Integral of the interpolant over the transformed domain
    pub fn integrate(&self) -> Result<Vec<f64>> {
        let integral = match &self.engine {
            Engine::Global(g) => g.integrate()?,
            Engine::Local(g) => g.integrate()?,
        };
        let scale = self.jacobian();
        Ok(integral.into_iter().map(|v| v * scale).collect())
    }

    /// Map the canonical domain onto the box `[low, high]`.
    pub fn set_transform_ab(&mut self, low: &[f64], high: &[f64]) -> Result<()> {
        let d = self.num_dimensions();
        if low.len() != d || high.len() != d {
            return Err(SparseGridError::shape(format!(
                "transform bounds have lengths {} and {}, grid dimension is {}",
                low.len(),
                high.len(),
                d
            )));
        }
        let transform = DomainTransform::new(low.to_vec(), high.to_vec())?;
        tracing::debug!(low = ?low, high = ?high, "set domain transform");
        self.transform = Some(transform);
        Ok(())
    }

    /// Lower and upper corners of the domain, `[-1, 1]^d` without a transform
    pub fn get_transform_ab(&self) -> (Vec<f64>, Vec<f64>) {
        match &self.transform {
            Some(t) => (t.low().to_vec(), t.high().to_vec()),
            None => {
                let d = self.num_dimensions();
                (vec![-1.0; d], vec![1.0; d])
            }
        }
    }

    pub fn clear_transform(&mut self) {
        self.transform = None;
    }

    /// Rebuild a global grid with a new depth, keeping its rule, anisotropy
    /// and transform.
    ///
    /// Values already loaded carry over to the points the new grid shares
    /// with the old one; only the remaining points are needed.
    pub fn recycle_global_grid(&mut self, depth: usize, depth_type: DepthType) -> Result<()> {
        match &mut self.engine {
            Engine::Global(g) => {
                *g = g.recycled(depth, depth_type)?;
                Ok(())
            }
            Engine::Local(_) => Err(SparseGridError::unsupported(
                "local grids grow by refinement",
            )),
        }
    }

    /// [`SparseGrid::recycle_global_grid`] onto a full tensor of `levels`.
    pub fn recycle_full_tensor_grid(&mut self, levels: &[usize]) -> Result<()> {
        match &mut self.engine {
            Engine::Global(g) => {
                *g = g.recycled_full_tensor(levels)?;
                Ok(())
            }
            Engine::Local(_) => Err(SparseGridError::unsupported(
                "local grids grow by refinement",
            )),
        }
    }

    /// Refine a local grid with the given tolerance and strategy and the
    /// default (relative) surplus scaling.
    pub fn set_refinement(&mut self, tolerance: f64, strategy: RefinementStrategy) -> Result<()> {
        self.set_refinement_with(
            &RefinementOptions::default()
                .with_tolerance(tolerance)
                .with_strategy(strategy),
        )
    }

    /// Refine a local grid; pending needed points from an earlier refinement
    /// are replaced.
    pub fn set_refinement_with(&mut self, options: &RefinementOptions) -> Result<()> {
        match &mut self.engine {
            Engine::Global(_) => Err(SparseGridError::unsupported(
                "global grids cannot be refined by surplus",
            )),
            Engine::Local(g) => g.refine(options).map(|_| ()),
        }
    }

    /// Drop points added by refinement that have not been loaded
    pub fn clear_refinement(&mut self) {
        if let Engine::Local(g) = &mut self.engine {
            g.clear_refinement();
        }
    }

    /// Weights `u` with `evaluate(x) = sum_p u[p] f(p)`. Global grids only.
    pub fn get_interpolation_weights(&self, x: &[f64]) -> Result<Vec<f64>> {
        let x = self.to_canonical(x)?;
        match &self.engine {
            Engine::Global(g) => g.interpolation_weights(&x),
            Engine::Local(_) => Err(SparseGridError::unsupported(
                "interpolation weights are only available for global grids",
            )),
        }
    }

    /// Hierarchical surpluses of the loaded points. Local grids only.
    pub fn get_surpluses(&self) -> Result<Vec<Vec<f64>>> {
        match &self.engine {
            Engine::Local(g) => Ok(g.surpluses()),
            Engine::Global(_) => Err(SparseGridError::unsupported(
                "surpluses are only available for local grids",
            )),
        }
    }
}
