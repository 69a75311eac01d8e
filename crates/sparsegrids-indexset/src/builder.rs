//! Enumeration of multi-index sets under a depth limit

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use sparsegrids_rules::GlobalRule;

use crate::depth::{DepthLimit, DepthType};
use crate::error::{IndexSetError, Result};
use crate::set::MultiIndexSet;
use crate::MultiIndex;

/// Heap entry ordered by metric, ties broken lexicographically
#[derive(Debug, PartialEq)]
struct Candidate {
    metric: f64,
    index: MultiIndex,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.metric
            .total_cmp(&other.metric)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Builder for the multi-index set of a sparse grid.
///
/// # Example
///
/// ```
/// use sparsegrids_indexset::{DepthType, IndexSetBuilder};
///
/// // all (i, j) with i + j <= 2
/// let set = IndexSetBuilder::new(2, 2, DepthType::Level).build_levels().unwrap();
/// assert_eq!(set.len(), 6);
///
/// // anisotropic: 2 i + j <= 2
/// let set = IndexSetBuilder::new(2, 2, DepthType::Level)
///     .with_anisotropic_weights(vec![2, 1])
///     .build_levels()
///     .unwrap();
/// assert_eq!(set.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct IndexSetBuilder {
    dimension: usize,
    depth: usize,
    depth_type: DepthType,
    anisotropic_weights: Vec<usize>,
}

impl IndexSetBuilder {
    /// Isotropic builder; refine with [`IndexSetBuilder::with_anisotropic_weights`].
    pub fn new(dimension: usize, depth: usize, depth_type: DepthType) -> Self {
        Self {
            dimension,
            depth,
            depth_type,
            anisotropic_weights: Vec::new(),
        }
    }

    /// Per-dimension weights; an empty vector means all ones
    pub fn with_anisotropic_weights(mut self, weights: Vec<usize>) -> Self {
        self.anisotropic_weights = weights;
        self
    }

    fn validated_weights(&self) -> Result<Vec<usize>> {
        if self.dimension == 0 {
            return Err(IndexSetError::InvalidDimension(0));
        }
        if self.anisotropic_weights.is_empty() {
            return Ok(vec![1; self.dimension]);
        }
        if self.anisotropic_weights.len() != self.dimension {
            return Err(IndexSetError::WeightsLength {
                expected: self.dimension,
                got: self.anisotropic_weights.len(),
            });
        }
        if let Some(position) = self.anisotropic_weights.iter().position(|&w| w == 0) {
            return Err(IndexSetError::InvalidWeight {
                position,
                weight: 0,
            });
        }
        Ok(self.anisotropic_weights.clone())
    }

    /// Build the set, reading per-level exactness from `rule`.
    pub fn build(&self, rule: &GlobalRule) -> Result<MultiIndexSet> {
        let limit = DepthLimit::new(
            self.depth_type,
            Some(*rule),
            self.validated_weights()?,
            self.depth,
        )?;
        Ok(self.enumerate(&limit))
    }

    /// Build a set whose depth type depends only on the levels.
    ///
    /// Fails with [`IndexSetError::RuleRequired`] for exactness-based types.
    pub fn build_levels(&self) -> Result<MultiIndexSet> {
        let limit = DepthLimit::new(
            self.depth_type,
            None,
            self.validated_weights()?,
            self.depth,
        )?;
        Ok(self.enumerate(&limit))
    }

    fn enumerate(&self, limit: &DepthLimit) -> MultiIndexSet {
        let d = self.dimension;
        let mut admitted: HashSet<MultiIndex> = HashSet::new();
        let mut queued: HashSet<MultiIndex> = HashSet::new();
        let mut heap = BinaryHeap::new();

        let zero = vec![0; d];
        queued.insert(zero.clone());
        heap.push(Reverse(Candidate {
            metric: limit.metric(&zero).unwrap_or(0.0),
            index: zero,
        }));

        while let Some(Reverse(Candidate { index, .. })) = heap.pop() {
            for k in 0..d {
                let mut next = index.clone();
                next[k] += 1;
                if queued.contains(&next) {
                    continue;
                }
                if let Some(metric) = limit.metric(&next) {
                    queued.insert(next.clone());
                    heap.push(Reverse(Candidate {
                        metric,
                        index: next,
                    }));
                }
            }
            admitted.insert(index);
        }

        close_downward(&mut admitted);

        let mut indices: Vec<MultiIndex> = admitted.into_iter().collect();
        indices.sort();
        tracing::debug!(
            dimension = d,
            depth = self.depth,
            depth_type = %self.depth_type,
            num_indices = indices.len(),
            "built multi-index set"
        );
        MultiIndexSet::from_sorted(d, indices)
    }
}

/// Add every missing predecessor, recursively.
fn close_downward(set: &mut HashSet<MultiIndex>) {
    let mut stack: Vec<MultiIndex> = set.iter().cloned().collect();
    while let Some(index) = stack.pop() {
        for k in 0..index.len() {
            if index[k] > 0 {
                let mut pred = index.clone();
                pred[k] -= 1;
                if set.insert(pred.clone()) {
                    stack.push(pred);
                }
            }
        }
    }
}

/// Smolyak combination coefficients aligned with the positions of `set`.
///
/// `c(i) = sum over e in {0,1}^d with i + e in set of (-1)^|e|`. Since the set
/// is downward closed, `i + e` can only be present when every `i + e_k` with
/// `e_k = 1` is, so the sum walks the present corners and prunes the rest.
pub fn combination_weights(set: &MultiIndexSet) -> Vec<i64> {
    set.iter()
        .map(|index| {
            let mut corner = index.clone();
            let forward: Vec<usize> = (0..index.len())
                .filter(|&k| {
                    corner[k] += 1;
                    let found = set.contains(&corner);
                    corner[k] -= 1;
                    found
                })
                .collect();
            signed_corners(set, &mut corner, &forward, 1)
        })
        .collect()
}

/// Signed count of the corners `corner + e` in `set`, with `e` drawn from `forward`.
fn signed_corners(
    set: &MultiIndexSet,
    corner: &mut MultiIndex,
    forward: &[usize],
    sign: i64,
) -> i64 {
    let mut total = sign;
    for (n, &k) in forward.iter().enumerate() {
        corner[k] += 1;
        if set.contains(corner.as_slice()) {
            total += signed_corners(set, corner, &forward[n + 1..], -sign);
        }
        corner[k] -= 1;
    }
    total
}
