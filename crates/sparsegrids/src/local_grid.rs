//! Local hierarchical polynomial grids with adaptive refinement.

use std::collections::{HashMap, HashSet};

use sparsegrids_indexset::{DepthType, IndexSetBuilder};
use sparsegrids_rules::{LocalBasis, LocalRule, RuleKind, MAX_LOCAL_LEVEL};

use crate::error::{check_point, check_values, Result, SparseGridError};
use crate::refinement::{propose_points, RefinementOptions};

/// One grid point in the arena.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointRecord {
    /// One-dimensional node id per dimension
    pub(crate) nodes: Vec<u32>,
    /// Function values, empty while the point is needed
    pub(crate) values: Vec<f64>,
    /// Hierarchical surplus, empty while the point is needed
    pub(crate) surplus: Vec<f64>,
}

/// Sparse grid of tensor products of hierarchical local basis functions.
///
/// Points live in an arena; loaded points come first and the needed points
/// form the suffix `records[num_loaded..]`.
#[derive(Debug, Clone)]
pub struct LocalPolynomialGrid {
    dimension: usize,
    outputs: usize,
    initial_level: usize,
    basis: LocalBasis,
    records: Vec<PointRecord>,
    lookup: HashMap<Vec<u32>, usize>,
    num_loaded: usize,
}

impl LocalPolynomialGrid {
    /// Grid holding every point whose levels sum to at most `initial_level`.
    pub fn new(
        dimension: usize,
        outputs: usize,
        initial_level: usize,
        order: usize,
        rule: RuleKind,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(SparseGridError::configuration(
                "grid dimension must be at least 1",
            ));
        }
        let basis = LocalBasis::new(rule, order)?;
        if initial_level > MAX_LOCAL_LEVEL as usize {
            return Err(SparseGridError::configuration(format!(
                "initial level {} exceeds the largest local level {}",
                initial_level, MAX_LOCAL_LEVEL
            )));
        }

        let mut levels: Vec<Vec<usize>> =
            IndexSetBuilder::new(dimension, initial_level, DepthType::Level)
                .build_levels()?
                .indices()
                .to_vec();
        levels.sort_by_key(|l| l.iter().sum::<usize>());

        let mut grid = Self {
            dimension,
            outputs,
            initial_level,
            basis,
            records: Vec::new(),
            lookup: HashMap::new(),
            num_loaded: 0,
        };
        let local = basis.rule();
        for level in &levels {
            let firsts: Vec<u32> = level.iter().map(|&l| local.first_node(l as u32)).collect();
            let counts: Vec<u32> = level.iter().map(|&l| local.num_nodes(l as u32)).collect();
            let mut offset = vec![0u32; dimension];
            loop {
                let nodes = firsts.iter().zip(&offset).map(|(f, o)| f + o).collect();
                grid.push_record(nodes);
                // odometer over the nodes of each level, last dimension fastest
                let mut k = dimension;
                while k > 0 {
                    k -= 1;
                    offset[k] += 1;
                    if offset[k] < counts[k] {
                        break;
                    }
                    offset[k] = 0;
                }
                if offset.iter().all(|&o| o == 0) {
                    break;
                }
            }
        }

        tracing::debug!(
            dimension,
            outputs,
            initial_level,
            order,
            rule = %rule,
            num_points = grid.records.len(),
            "built local polynomial grid"
        );
        Ok(grid)
    }

    fn push_record(&mut self, nodes: Vec<u32>) {
        self.lookup.insert(nodes.clone(), self.records.len());
        self.records.push(PointRecord {
            nodes,
            values: Vec::new(),
            surplus: Vec::new(),
        });
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn initial_level(&self) -> usize {
        self.initial_level
    }

    pub fn order(&self) -> usize {
        self.basis.order()
    }

    pub fn rule(&self) -> LocalRule {
        self.basis.rule()
    }

    pub fn num_points(&self) -> usize {
        self.records.len()
    }

    pub fn num_loaded_points(&self) -> usize {
        self.num_loaded
    }

    pub fn num_needed_points(&self) -> usize {
        if self.outputs == 0 {
            0
        } else {
            self.records.len() - self.num_loaded
        }
    }

    fn coordinates(&self, record: &PointRecord) -> Vec<f64> {
        let rule = self.basis.rule();
        record.nodes.iter().map(|&n| rule.node(n)).collect()
    }

    /// Loaded points followed by needed points, canonical coordinates
    pub fn points(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(|r| self.coordinates(r)).collect()
    }

    pub fn loaded_points(&self) -> Vec<Vec<f64>> {
        self.records[..self.num_loaded]
            .iter()
            .map(|r| self.coordinates(r))
            .collect()
    }

    /// Needed points, in the row order [`LocalPolynomialGrid::load_values`] expects
    pub fn needed_points(&self) -> Vec<Vec<f64>> {
        if self.outputs == 0 {
            return Vec::new();
        }
        self.records[self.num_loaded..]
            .iter()
            .map(|r| self.coordinates(r))
            .collect()
    }

    /// Hierarchical surpluses of the loaded points
    pub fn surpluses(&self) -> Vec<Vec<f64>> {
        self.records[..self.num_loaded]
            .iter()
            .map(|r| r.surplus.clone())
            .collect()
    }

    /// Visit every point admitted by `include` whose support contains `x`,
    /// together with its basis value at `x`.
    ///
    /// Walks the hierarchy from the root, entering a child only if `include`
    /// admits it and its support in the refined dimension contains `x`.
    fn walk(
        &self,
        x: &[f64],
        include: impl Fn(usize) -> bool,
        mut visit: impl FnMut(usize, f64),
    ) {
        let rule = self.basis.rule();
        let root = match self.lookup.get(&vec![0u32; self.dimension]) {
            Some(&root) if include(root) => root,
            _ => return,
        };
        let mut visited = HashSet::from([root]);
        let mut stack = vec![root];
        while let Some(p) = stack.pop() {
            let record = &self.records[p];
            let phi: f64 = record
                .nodes
                .iter()
                .zip(x)
                .map(|(&n, &xk)| self.basis.eval(n, xk))
                .product();
            visit(p, phi);

            for k in 0..self.dimension {
                for child in rule.children(record.nodes[k]) {
                    let (left, right) = self.basis.support(child);
                    if x[k] < left || x[k] > right {
                        continue;
                    }
                    let mut key = record.nodes.clone();
                    key[k] = child;
                    if let Some(&c) = self.lookup.get(&key) {
                        if include(c) && visited.insert(c) {
                            stack.push(c);
                        }
                    }
                }
            }
        }
    }

    fn total_level(&self, record: &PointRecord) -> u32 {
        let rule = self.basis.rule();
        record.nodes.iter().map(|&n| rule.level(n)).sum()
    }

    /// Recompute the surplus of every loaded point, coarse to fine.
    fn compute_surpluses(&mut self) {
        let n = self.num_loaded;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| self.total_level(&self.records[i]));

        let mut done = vec![false; n];
        for &p in &order {
            let x = self.coordinates(&self.records[p]);
            let mut coarse = vec![0.0; self.outputs];
            self.walk(
                &x,
                |q| q < n && done[q],
                |q, phi| {
                    if phi != 0.0 {
                        for (c, s) in coarse.iter_mut().zip(&self.records[q].surplus) {
                            *c += phi * s;
                        }
                    }
                },
            );
            let record = &mut self.records[p];
            record.surplus = record
                .values
                .iter()
                .zip(&coarse)
                .map(|(v, c)| v - c)
                .collect();
            done[p] = true;
        }
    }

    /// Store one row of values per needed point and update all surpluses.
    pub fn load_values(&mut self, values: &[Vec<f64>]) -> Result<()> {
        if self.outputs == 0 {
            return Err(SparseGridError::unsupported(
                "a grid with zero outputs takes no values",
            ));
        }
        check_values(values, self.num_needed_points(), self.outputs)?;
        if values.is_empty() {
            return Ok(());
        }
        for (record, row) in self.records[self.num_loaded..].iter_mut().zip(values) {
            record.values = row.clone();
        }
        self.num_loaded = self.records.len();
        self.compute_surpluses();
        tracing::debug!(
            num_new = values.len(),
            num_loaded = self.num_loaded,
            "loaded local grid values"
        );
        Ok(())
    }

    fn check_ready(&self) -> Result<()> {
        if self.outputs == 0 {
            return Err(SparseGridError::unsupported(
                "a grid with zero outputs has no interpolant",
            ));
        }
        if self.num_loaded == 0 {
            return Err(SparseGridError::not_ready("no values have been loaded"));
        }
        Ok(())
    }

    /// Value of the interpolant at canonical `x`
    pub fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.check_ready()?;
        check_point(x, self.dimension)?;
        let mut result = vec![0.0; self.outputs];
        let n = self.num_loaded;
        self.walk(
            x,
            |q| q < n,
            |q, phi| {
                if phi != 0.0 {
                    for (r, s) in result.iter_mut().zip(&self.records[q].surplus) {
                        *r += phi * s;
                    }
                }
            },
        );
        Ok(result)
    }

    /// Integral of the interpolant over `[-1, 1]^d`
    pub fn integrate(&self) -> Result<Vec<f64>> {
        if self.outputs == 0 {
            return Ok(Vec::new());
        }
        self.check_ready()?;
        let mut result = vec![0.0; self.outputs];
        for record in &self.records[..self.num_loaded] {
            let volume: f64 = record.nodes.iter().map(|&n| self.basis.integral(n)).product();
            for (r, s) in result.iter_mut().zip(&record.surplus) {
                *r += volume * s;
            }
        }
        Ok(result)
    }

    fn discard_pending(&mut self) {
        for record in self.records.drain(self.num_loaded..) {
            self.lookup.remove(&record.nodes);
        }
    }

    /// Replace the pending points by the children of points with large
    /// surpluses. Returns the number of points added.
    pub fn refine(&mut self, options: &RefinementOptions) -> Result<usize> {
        if self.outputs == 0 {
            return Err(SparseGridError::unsupported(
                "a grid with zero outputs cannot be refined",
            ));
        }
        options.validate(self.outputs)?;
        if self.num_loaded == 0 {
            return Ok(0);
        }
        self.discard_pending();
        let new_points = propose_points(
            self.basis,
            &self.records[..self.num_loaded],
            &self.lookup,
            self.outputs,
            options,
        );
        let added = new_points.len();
        for nodes in new_points {
            self.push_record(nodes);
        }
        Ok(added)
    }

    /// Drop the points added by refinement that have not been loaded yet.
    pub fn clear_refinement(&mut self) {
        if self.num_loaded > 0 {
            self.discard_pending();
        }
    }
}
