//! Pooled node/weight tables for global rules.

use crate::error::Result;
use crate::global::GlobalRule;
use crate::NODE_TOLERANCE;

/// Nodes and weights of a global rule for levels `0..=max_level`.
///
/// Nodes of all levels are pooled into one list and deduplicated, so a
/// coordinate produced by several levels has a single node id. Grid points
/// built from the table are keyed by these ids.
///
/// # Example
///
/// ```
/// use sparsegrids_rules::{GlobalRule, OneDTable};
///
/// let table = OneDTable::new(GlobalRule::ClenshawCurtis, 2).unwrap();
/// // nested rule: level 2 holds every node
/// assert_eq!(table.num_nodes(), 5);
/// assert_eq!(table.level_nodes(0), &[0]);
/// assert_eq!(table.node(0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct OneDTable {
    rule: GlobalRule,
    nodes: Vec<f64>,
    level_nodes: Vec<Vec<usize>>,
    level_weights: Vec<Vec<f64>>,
    // 1 / prod_{k != j} (x_j - x_k) per level
    denominators: Vec<Vec<f64>>,
}

impl OneDTable {
    /// Generate every level up to and including `max_level`.
    pub fn new(rule: GlobalRule, max_level: usize) -> Result<Self> {
        let mut nodes: Vec<f64> = Vec::new();
        // (coordinate, id) sorted by coordinate
        let mut sorted: Vec<(f64, usize)> = Vec::new();
        let mut level_nodes = Vec::with_capacity(max_level + 1);
        let mut level_weights = Vec::with_capacity(max_level + 1);
        let mut denominators = Vec::with_capacity(max_level + 1);

        for level in 0..=max_level {
            let (x, w) = rule.nodes_and_weights(level)?;
            let mut ids = Vec::with_capacity(x.len());
            for &xi in &x {
                let pos = sorted.partition_point(|&(v, _)| v < xi - NODE_TOLERANCE);
                let id = match sorted.get(pos) {
                    Some(&(v, id)) if (v - xi).abs() <= NODE_TOLERANCE => id,
                    _ => {
                        let id = nodes.len();
                        nodes.push(xi);
                        sorted.insert(pos, (xi, id));
                        id
                    }
                };
                ids.push(id);
            }
            denominators.push(
                (0..x.len())
                    .map(|j| {
                        let prod: f64 = (0..x.len())
                            .filter(|&k| k != j)
                            .map(|k| x[j] - x[k])
                            .product();
                        1.0 / prod
                    })
                    .collect(),
            );
            level_nodes.push(ids);
            level_weights.push(w);
        }

        Ok(Self {
            rule,
            nodes,
            level_nodes,
            level_weights,
            denominators,
        })
    }

    pub fn rule(&self) -> GlobalRule {
        self.rule
    }

    pub fn max_level(&self) -> usize {
        self.level_nodes.len() - 1
    }

    /// Number of distinct nodes over all levels
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Coordinate of node `id`
    ///
    /// # Panics
    /// Panics if `id >= num_nodes()`.
    pub fn node(&self, id: usize) -> f64 {
        self.nodes[id]
    }

    /// All distinct node coordinates, indexed by node id
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Node ids of `level`, in ascending coordinate order
    ///
    /// # Panics
    /// Panics if `level > max_level()`.
    pub fn level_nodes(&self, level: usize) -> &[usize] {
        &self.level_nodes[level]
    }

    /// Quadrature weights of `level`, aligned with [`OneDTable::level_nodes`]
    ///
    /// # Panics
    /// Panics if `level > max_level()`.
    pub fn level_weights(&self, level: usize) -> &[f64] {
        &self.level_weights[level]
    }

    /// Values of the Lagrange basis of `level` at `x`.
    pub fn lagrange(&self, level: usize, x: f64) -> Vec<f64> {
        let mut out = vec![0.0; self.level_nodes[level].len()];
        self.lagrange_into(level, x, &mut out);
        out
    }

    /// Write the Lagrange basis of `level` at `x` into `out`.
    ///
    /// # Panics
    /// Panics if `out` is shorter than the level.
    pub fn lagrange_into(&self, level: usize, x: f64, out: &mut [f64]) {
        let ids = &self.level_nodes[level];
        let denominators = &self.denominators[level];
        for (j, value) in out.iter_mut().take(ids.len()).enumerate() {
            let mut prod = denominators[j];
            for (k, &id) in ids.iter().enumerate() {
                if k != j {
                    prod *= x - self.nodes[id];
                }
            }
            *value = prod;
        }
    }
}
