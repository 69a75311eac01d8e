//! Global Smolyak grids built from tensor products of interpolatory rules.

use std::collections::HashMap;

use sparsegrids_indexset::{
    combination_weights, DepthType, IndexSetBuilder, MultiIndex, MultiIndexSet,
};
use sparsegrids_rules::{GlobalRule, OneDTable};

use crate::error::{check_point, check_values, Result, SparseGridError};

/// A tensor with non-zero combination weight
#[derive(Debug, Clone)]
struct Tensor {
    levels: MultiIndex,
    weight: i64,
    /// Grid point ids in row-major order over the level nodes
    points: Vec<usize>,
}

/// Advance `pos` through `0..counts[k]` with the last dimension fastest.
fn next_position(pos: &mut [usize], counts: &[usize]) -> bool {
    for k in (0..pos.len()).rev() {
        pos[k] += 1;
        if pos[k] < counts[k] {
            return true;
        }
        pos[k] = 0;
    }
    false
}

/// Sparse grid `sum_i c(i) U^{i_1} x ... x U^{i_d}` over a multi-index set.
///
/// A fresh grid needs every point. A grid rebuilt from a loaded one with
/// [`GlobalGrid::recycled`] keeps the values of the points both share and
/// needs only the new ones. Coordinates live in `[-1, 1]^d`.
#[derive(Debug, Clone)]
pub struct GlobalGrid {
    dimension: usize,
    outputs: usize,
    depth: usize,
    depth_type: DepthType,
    anisotropic_weights: Vec<usize>,
    table: OneDTable,
    index_set: MultiIndexSet,
    combination: Vec<i64>,
    tensors: Vec<Tensor>,
    /// Node ids into `table`, one per dimension
    points: Vec<Vec<usize>>,
    weights: Vec<f64>,
    /// One row per point, empty while the point is needed
    values: Vec<Vec<f64>>,
    /// Ids of the points awaiting values, ascending
    needed: Vec<usize>,
}

impl GlobalGrid {
    pub fn new(
        dimension: usize,
        outputs: usize,
        depth: usize,
        depth_type: DepthType,
        rule: GlobalRule,
        anisotropic_weights: &[usize],
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(SparseGridError::configuration(
                "grid dimension must be at least 1",
            ));
        }
        let index_set = IndexSetBuilder::new(dimension, depth, depth_type)
            .with_anisotropic_weights(anisotropic_weights.to_vec())
            .build(&rule)?;
        Self::from_index_set(
            outputs,
            depth,
            depth_type,
            rule,
            anisotropic_weights.to_vec(),
            index_set,
        )
    }

    /// Tensor product grid of `levels[k]` in dimension `k`.
    pub fn full_tensor(outputs: usize, levels: &[usize], rule: GlobalRule) -> Result<Self> {
        if levels.is_empty() {
            return Err(SparseGridError::configuration(
                "grid dimension must be at least 1",
            ));
        }
        if let Some(&level) = levels.iter().find(|&&l| l > rule.max_level()) {
            return Err(SparseGridError::configuration(format!(
                "level {} exceeds the last level {} of {}",
                level,
                rule.max_level(),
                rule.kind()
            )));
        }
        let index_set = MultiIndexSet::full_tensor(levels)?;
        let depth = levels.iter().copied().max().unwrap_or(0);
        Self::from_index_set(outputs, depth, DepthType::Tensor, rule, Vec::new(), index_set)
    }

    fn from_index_set(
        outputs: usize,
        depth: usize,
        depth_type: DepthType,
        rule: GlobalRule,
        anisotropic_weights: Vec<usize>,
        index_set: MultiIndexSet,
    ) -> Result<Self> {
        let dimension = index_set.dimension();
        let combination = combination_weights(&index_set);
        let max_level = index_set.max_levels().into_iter().max().unwrap_or(0);
        let table = OneDTable::new(rule, max_level)?;

        let mut points: Vec<Vec<usize>> = Vec::new();
        let mut lookup: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut tensors = Vec::new();
        for (levels, &weight) in index_set.iter().zip(&combination) {
            if weight == 0 {
                continue;
            }
            let counts: Vec<usize> = levels.iter().map(|&l| table.level_nodes(l).len()).collect();
            let mut pos = vec![0; dimension];
            let mut tensor_points = Vec::with_capacity(counts.iter().product());
            loop {
                let key: Vec<usize> = levels
                    .iter()
                    .zip(&pos)
                    .map(|(&l, &j)| table.level_nodes(l)[j])
                    .collect();
                let id = match lookup.get(&key) {
                    Some(&id) => id,
                    None => {
                        points.push(key.clone());
                        lookup.insert(key, points.len() - 1);
                        points.len() - 1
                    }
                };
                tensor_points.push(id);
                if !next_position(&mut pos, &counts) {
                    break;
                }
            }
            tensors.push(Tensor {
                levels: levels.clone(),
                weight,
                points: tensor_points,
            });
        }

        let num_points = points.len();
        let mut grid = Self {
            dimension,
            outputs,
            depth,
            depth_type,
            anisotropic_weights,
            table,
            index_set,
            combination,
            tensors,
            weights: vec![0.0; num_points],
            points,
            values: vec![Vec::new(); num_points],
            needed: if outputs == 0 {
                Vec::new()
            } else {
                (0..num_points).collect()
            },
        };
        grid.weights = grid.compute_quadrature_weights();

        tracing::debug!(
            dimension,
            outputs,
            depth,
            depth_type = %depth_type,
            rule = %rule.kind(),
            num_indices = grid.index_set.len(),
            num_tensors = grid.tensors.len(),
            num_points,
            "built global grid"
        );
        Ok(grid)
    }

    /// Same rule, outputs and anisotropy with a new depth.
    ///
    /// Points already loaded here keep their values in the new grid.
    pub fn recycled(&self, depth: usize, depth_type: DepthType) -> Result<Self> {
        let mut grid = Self::new(
            self.dimension,
            self.outputs,
            depth,
            depth_type,
            self.rule(),
            &self.anisotropic_weights,
        )?;
        grid.take_values_from(self);
        Ok(grid)
    }

    /// Same rule and outputs as a full tensor of `levels`, keeping loaded values.
    pub fn recycled_full_tensor(&self, levels: &[usize]) -> Result<Self> {
        if levels.len() != self.dimension {
            return Err(SparseGridError::shape(format!(
                "{} tensor levels for a grid of dimension {}",
                levels.len(),
                self.dimension
            )));
        }
        let mut grid = Self::full_tensor(self.outputs, levels, self.rule())?;
        grid.take_values_from(self);
        Ok(grid)
    }

    /// Copy the rows of `old` at matching coordinates; the rest stay needed.
    fn take_values_from(&mut self, old: &GlobalGrid) {
        if self.outputs == 0 {
            return;
        }
        let loaded: HashMap<Vec<u64>, usize> = (0..old.points.len())
            .filter(|&id| !old.values[id].is_empty())
            .map(|id| (old.coordinate_key(id), id))
            .collect();
        if loaded.is_empty() {
            return;
        }
        let mut needed = Vec::new();
        for id in 0..self.points.len() {
            match loaded.get(&self.coordinate_key(id)) {
                Some(&old_id) => self.values[id] = old.values[old_id].clone(),
                None => needed.push(id),
            }
        }
        tracing::debug!(
            kept = self.points.len() - needed.len(),
            needed = needed.len(),
            "recycled global grid values"
        );
        self.needed = needed;
    }

    fn coordinate_key(&self, id: usize) -> Vec<u64> {
        self.points[id]
            .iter()
            .map(|&n| self.table.node(n).to_bits())
            .collect()
    }

    fn compute_quadrature_weights(&self) -> Vec<f64> {
        let mut weights = vec![0.0; self.points.len()];
        for tensor in &self.tensors {
            let level_weights: Vec<&[f64]> = tensor
                .levels
                .iter()
                .map(|&l| self.table.level_weights(l))
                .collect();
            let counts: Vec<usize> = level_weights.iter().map(|w| w.len()).collect();
            let mut pos = vec![0; self.dimension];
            for &id in &tensor.points {
                let product: f64 = level_weights
                    .iter()
                    .zip(&pos)
                    .map(|(w, &j)| w[j])
                    .product();
                weights[id] += tensor.weight as f64 * product;
                next_position(&mut pos, &counts);
            }
        }
        weights
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn depth_type(&self) -> DepthType {
        self.depth_type
    }

    pub fn anisotropic_weights(&self) -> &[usize] {
        &self.anisotropic_weights
    }

    pub fn rule(&self) -> GlobalRule {
        self.table.rule()
    }

    /// The multi-index set, including indices with zero combination weight
    pub fn index_set(&self) -> &MultiIndexSet {
        &self.index_set
    }

    /// Combination weights aligned with [`GlobalGrid::index_set`]
    pub fn combination_weights(&self) -> &[i64] {
        &self.combination
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// True once every point has values
    pub fn is_loaded(&self) -> bool {
        self.outputs > 0 && self.needed.is_empty()
    }

    pub fn num_needed_points(&self) -> usize {
        self.needed.len()
    }

    pub fn num_loaded_points(&self) -> usize {
        if self.outputs == 0 {
            0
        } else {
            self.points.len() - self.needed.len()
        }
    }

    fn coordinates(&self, id: usize) -> Vec<f64> {
        self.points[id].iter().map(|&n| self.table.node(n)).collect()
    }

    /// All points, canonical coordinates
    pub fn points(&self) -> Vec<Vec<f64>> {
        (0..self.points.len()).map(|id| self.coordinates(id)).collect()
    }

    pub fn needed_points(&self) -> Vec<Vec<f64>> {
        self.needed.iter().map(|&id| self.coordinates(id)).collect()
    }

    pub fn loaded_points(&self) -> Vec<Vec<f64>> {
        (0..self.points.len())
            .filter(|&id| !self.values[id].is_empty())
            .map(|id| self.coordinates(id))
            .collect()
    }

    /// Quadrature weights on `[-1, 1]^d`, aligned with [`GlobalGrid::points`]
    pub fn quadrature_weights(&self) -> &[f64] {
        &self.weights
    }

    /// Store one row of `outputs` values per needed point.
    pub fn load_values(&mut self, values: &[Vec<f64>]) -> Result<()> {
        if self.outputs == 0 {
            return Err(SparseGridError::unsupported(
                "a grid with zero outputs takes no values",
            ));
        }
        check_values(values, self.needed.len(), self.outputs)?;
        if values.is_empty() {
            return Ok(());
        }
        for (&id, row) in self.needed.iter().zip(values) {
            self.values[id] = row.clone();
        }
        self.needed.clear();
        tracing::debug!(num_points = values.len(), "loaded global grid values");
        Ok(())
    }

    /// Vector `u` with `evaluate(x) = sum_p u[p] f(p)`.
    pub fn interpolation_weights(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_point(x, self.dimension)?;
        let mut u = vec![0.0; self.points.len()];
        for tensor in &self.tensors {
            let basis: Vec<Vec<f64>> = tensor
                .levels
                .iter()
                .zip(x)
                .map(|(&l, &xk)| self.table.lagrange(l, xk))
                .collect();
            let counts: Vec<usize> = basis.iter().map(Vec::len).collect();
            let mut pos = vec![0; self.dimension];
            for &id in &tensor.points {
                let product: f64 = basis.iter().zip(&pos).map(|(b, &j)| b[j]).product();
                u[id] += tensor.weight as f64 * product;
                next_position(&mut pos, &counts);
            }
        }
        Ok(u)
    }

    fn loaded_values(&self) -> Result<&[Vec<f64>]> {
        if self.outputs == 0 {
            return Err(SparseGridError::unsupported(
                "a grid with zero outputs has no interpolant",
            ));
        }
        if !self.needed.is_empty() {
            return Err(SparseGridError::not_ready(format!(
                "{} points still need values",
                self.needed.len()
            )));
        }
        Ok(&self.values)
    }

    /// Value of the interpolant at canonical `x`
    pub fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>> {
        let values = self.loaded_values()?;
        let u = self.interpolation_weights(x)?;
        let mut result = vec![0.0; self.outputs];
        for (row, &w) in values.iter().zip(&u) {
            for (r, v) in result.iter_mut().zip(row) {
                *r += w * v;
            }
        }
        Ok(result)
    }

    /// Integral of the interpolant over `[-1, 1]^d` against the rule's weight
    pub fn integrate(&self) -> Result<Vec<f64>> {
        if self.outputs == 0 {
            return Ok(Vec::new());
        }
        let values = self.loaded_values()?;
        let mut result = vec![0.0; self.outputs];
        for (row, &w) in values.iter().zip(&self.weights) {
            for (r, v) in result.iter_mut().zip(row) {
                *r += w * v;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sparsegrids_rules::RuleKind;

    fn cc_grid(depth: usize, outputs: usize) -> GlobalGrid {
        GlobalGrid::new(2, outputs, depth, DepthType::Level, GlobalRule::ClenshawCurtis, &[])
            .unwrap()
    }

    #[test]
    fn test_next_position() {
        let counts = [2, 3];
        let mut pos = vec![0, 0];
        let mut seen = vec![pos.clone()];
        while next_position(&mut pos, &counts) {
            seen.push(pos.clone());
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[1], vec![0, 1]);
        assert_eq!(seen[3], vec![1, 0]);
    }

    #[test]
    fn test_level_one_cc_grid() {
        let grid = cc_grid(1, 1);
        // the cross {(0,0), (+-1, 0), (0, +-1)}
        assert_eq!(grid.num_points(), 5);
        let total: f64 = grid.quadrature_weights().iter().sum();
        assert_abs_diff_eq!(total, 4.0, epsilon = 1e-14);
        assert_eq!(grid.combination_weights(), &[-1, 1, 1]);
    }

    #[test]
    fn test_points_unique() {
        let grid = cc_grid(5, 0);
        let mut keys: Vec<Vec<u64>> = grid
            .points()
            .iter()
            .map(|p| p.iter().map(|x| x.to_bits()).collect())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), grid.num_points());
    }

    #[test]
    fn test_lifecycle() {
        let mut grid = cc_grid(3, 1);
        let n = grid.num_points();
        assert_eq!(grid.num_needed_points(), n);
        assert_eq!(grid.num_loaded_points(), 0);
        assert!(matches!(
            grid.evaluate(&[0.0, 0.0]),
            Err(SparseGridError::NotReady { .. })
        ));

        let values: Vec<Vec<f64>> = grid
            .needed_points()
            .iter()
            .map(|p| vec![p[0] * p[1] + 1.0])
            .collect();
        grid.load_values(&values).unwrap();
        assert_eq!(grid.num_needed_points(), 0);
        assert_eq!(grid.num_loaded_points(), n);
        assert!(grid.needed_points().is_empty());
        assert_abs_diff_eq!(grid.evaluate(&[0.3, -0.4]).unwrap()[0], 0.88, epsilon = 1e-13);
        assert_abs_diff_eq!(grid.integrate().unwrap()[0], 4.0, epsilon = 1e-13);
    }

    #[test]
    fn test_full_tensor_grid() {
        let grid = GlobalGrid::full_tensor(1, &[2, 1], GlobalRule::ClenshawCurtis).unwrap();
        assert_eq!(grid.num_points(), 5 * 3);
        assert_eq!(grid.depth_type(), DepthType::Tensor);
        assert_eq!(grid.tensors.len(), 1);
        let total: f64 = grid.quadrature_weights().iter().sum();
        assert_abs_diff_eq!(total, 4.0, epsilon = 1e-14);
        assert!(matches!(
            GlobalGrid::full_tensor(1, &[31, 0], GlobalRule::ClenshawCurtis),
            Err(SparseGridError::Configuration { .. })
        ));
    }

    #[test]
    fn test_recycle_keeps_loaded_values() {
        let f = |p: &[f64]| vec![p[0] * p[1] + 1.0];
        let mut grid = cc_grid(2, 1);
        let values: Vec<Vec<f64>> = grid
            .needed_points()
            .iter()
            .map(|p| f(p.as_slice()))
            .collect();
        grid.load_values(&values).unwrap();
        let old_points = grid.points();

        let mut bigger = grid.recycled(3, DepthType::Level).unwrap();
        assert_eq!(bigger.num_points(), cc_grid(3, 1).num_points());
        assert_eq!(bigger.num_loaded_points(), old_points.len());
        assert_eq!(bigger.num_needed_points(), bigger.num_points() - old_points.len());
        let needed = bigger.needed_points();
        assert!(needed.iter().all(|p| !old_points.contains(p)));
        assert!(matches!(
            bigger.evaluate(&[0.0, 0.0]),
            Err(SparseGridError::NotReady { .. })
        ));

        let values: Vec<Vec<f64>> = needed.iter().map(|p| f(p.as_slice())).collect();
        bigger.load_values(&values).unwrap();
        assert!(bigger.is_loaded());
        assert_abs_diff_eq!(bigger.evaluate(&[0.3, -0.4]).unwrap()[0], 0.88, epsilon = 1e-13);
    }

    #[test]
    fn test_recycle_before_load_needs_everything() {
        let grid = cc_grid(2, 1);
        let tensor = grid.recycled_full_tensor(&[2, 2]).unwrap();
        assert_eq!(tensor.num_needed_points(), 25);
        assert_eq!(tensor.num_loaded_points(), 0);
        assert!(matches!(
            grid.recycled_full_tensor(&[2]),
            Err(SparseGridError::Shape { .. })
        ));
    }

    #[test]
    fn test_interpolation_weights_are_cardinal() {
        let grid = cc_grid(3, 1);
        for (p, x) in grid.points().iter().enumerate() {
            let u = grid.interpolation_weights(x).unwrap();
            for (q, &w) in u.iter().enumerate() {
                let expected = if p == q { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(w, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_weight_tensors_skipped() {
        // Gauss-Legendre is not nested: the level-(0, 0) tensor has weight 0 at depth 2
        // in two dimensions, so it contributes no points
        let grid = GlobalGrid::new(2, 0, 2, DepthType::Level, GlobalRule::GaussLegendre, &[])
            .unwrap();
        let active: usize = grid.combination_weights().iter().filter(|&&c| c != 0).count();
        assert!(active < grid.index_set().len());
        let total: f64 = grid.quadrature_weights().iter().sum();
        assert_abs_diff_eq!(total, 4.0, epsilon = 1e-13);
    }

    #[test]
    fn test_zero_outputs() {
        let mut grid = cc_grid(2, 0);
        assert_eq!(grid.num_needed_points(), 0);
        assert!(grid.needed_points().is_empty());
        assert_eq!(grid.integrate().unwrap(), Vec::<f64>::new());
        assert!(matches!(
            grid.load_values(&[]),
            Err(SparseGridError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            grid.evaluate(&[0.0, 0.0]),
            Err(SparseGridError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_shape_errors() {
        let mut grid = cc_grid(2, 2);
        let n = grid.num_needed_points();
        assert!(matches!(
            grid.load_values(&vec![vec![0.0, 0.0]; n - 1]),
            Err(SparseGridError::Shape { .. })
        ));
        assert!(matches!(
            grid.load_values(&vec![vec![0.0]; n]),
            Err(SparseGridError::Shape { .. })
        ));
        assert!(!grid.is_loaded());
        assert!(matches!(
            grid.interpolation_weights(&[0.0]),
            Err(SparseGridError::Shape { .. })
        ));
    }

    #[test]
    fn test_local_rule_rejected() {
        let err = GlobalRule::new(RuleKind::LocalPolynomial, 0.0, 0.0).unwrap_err();
        let err: SparseGridError = err.into();
        assert!(matches!(err, SparseGridError::Configuration { .. }));
    }
}
