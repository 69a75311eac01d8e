//! Lexicographically ordered, downward-closed multi-index sets

use std::collections::HashMap;

use crate::error::{IndexSetError, Result};
use crate::MultiIndex;

/// An admissible set of multi-indices with position lookup.
///
/// Every index `i` in the set has all of its predecessors `i - e_k`
/// (for `i_k > 0`) in the set as well. Indices are kept in lexicographic
/// order, so positions are stable between two sets holding the same indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIndexSet {
    dimension: usize,
    indices: Vec<MultiIndex>,
    positions: HashMap<MultiIndex, usize>,
}

impl MultiIndexSet {
    /// The set `{(0, ..., 0)}`
    pub fn zero(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexSetError::InvalidDimension(0));
        }
        Ok(Self::from_sorted(dimension, vec![vec![0; dimension]]))
    }

    /// The box `{i : i_k <= levels[k]}`
    pub fn full_tensor(levels: &[usize]) -> Result<Self> {
        let dimension = levels.len();
        if dimension == 0 {
            return Err(IndexSetError::InvalidDimension(0));
        }
        let mut indices = Vec::with_capacity(levels.iter().map(|&l| l + 1).product());
        let mut index = vec![0; dimension];
        'odometer: loop {
            indices.push(index.clone());
            for k in (0..dimension).rev() {
                if index[k] < levels[k] {
                    index[k] += 1;
                    continue 'odometer;
                }
                index[k] = 0;
            }
            break;
        }
        Ok(Self::from_sorted(dimension, indices))
    }

    /// Build from arbitrary indices, rejecting sets that are not downward closed.
    pub fn from_indices(dimension: usize, mut indices: Vec<MultiIndex>) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexSetError::InvalidDimension(0));
        }
        if let Some(bad) = indices.iter().find(|i| i.len() != dimension) {
            return Err(IndexSetError::DimensionMismatch {
                expected: dimension,
                got: bad.len(),
            });
        }
        indices.sort();
        indices.dedup();
        let set = Self::from_sorted(dimension, indices);
        if let Some((index, dimension)) = set.first_missing_predecessor() {
            return Err(IndexSetError::NotAdmissible { index, dimension });
        }
        Ok(set)
    }

    /// Wrap indices that are already sorted and unique.
    pub(crate) fn from_sorted(dimension: usize, indices: Vec<MultiIndex>) -> Self {
        let positions = indices
            .iter()
            .enumerate()
            .map(|(p, i)| (i.clone(), p))
            .collect();
        Self {
            dimension,
            indices,
            positions,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: &[usize]) -> bool {
        self.positions.contains_key(index)
    }

    /// Position of `index` in lexicographic order
    pub fn position(&self, index: &[usize]) -> Option<usize> {
        self.positions.get(index).copied()
    }

    pub fn get(&self, position: usize) -> Option<&MultiIndex> {
        self.indices.get(position)
    }

    pub fn indices(&self) -> &[MultiIndex] {
        &self.indices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MultiIndex> {
        self.indices.iter()
    }

    /// Insert `index` if all of its predecessors are present.
    ///
    /// Returns `Ok(false)` if the index was already in the set.
    pub fn insert(&mut self, index: MultiIndex) -> Result<bool> {
        if index.len() != self.dimension {
            return Err(IndexSetError::DimensionMismatch {
                expected: self.dimension,
                got: index.len(),
            });
        }
        if self.contains(&index) {
            return Ok(false);
        }
        if let Some(k) = self.missing_predecessor(&index) {
            return Err(IndexSetError::NotAdmissible {
                index,
                dimension: k,
            });
        }
        let at = self.indices.partition_point(|i| *i < index);
        self.indices.insert(at, index);
        for (p, i) in self.indices.iter().enumerate().skip(at) {
            self.positions.insert(i.clone(), p);
        }
        Ok(true)
    }

    fn missing_predecessor(&self, index: &[usize]) -> Option<usize> {
        let mut pred = index.to_vec();
        for k in 0..index.len() {
            if index[k] > 0 {
                pred[k] -= 1;
                let found = self.contains(&pred);
                pred[k] += 1;
                if !found {
                    return Some(k);
                }
            }
        }
        None
    }

    fn first_missing_predecessor(&self) -> Option<(MultiIndex, usize)> {
        self.indices
            .iter()
            .find_map(|i| self.missing_predecessor(i).map(|k| (i.clone(), k)))
    }

    /// True if every predecessor of every member is a member
    pub fn is_admissible(&self) -> bool {
        self.first_missing_predecessor().is_none()
    }

    /// Largest level per dimension
    pub fn max_levels(&self) -> Vec<usize> {
        let mut levels = vec![0; self.dimension];
        for index in &self.indices {
            for (m, &l) in levels.iter_mut().zip(index) {
                *m = (*m).max(l);
            }
        }
        levels
    }
}

impl<'a> IntoIterator for &'a MultiIndexSet {
    type Item = &'a MultiIndex;
    type IntoIter = std::slice::Iter<'a, MultiIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_indices_sorts() {
        let set =
            MultiIndexSet::from_indices(2, vec![vec![1, 0], vec![0, 0], vec![0, 1], vec![0, 0]])
                .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.indices(), &[vec![0, 0], vec![0, 1], vec![1, 0]]);
        assert_eq!(set.position(&[1, 0]), Some(2));
        assert!(set.is_admissible());
    }

    #[test]
    fn test_from_indices_rejects_gap() {
        let err = MultiIndexSet::from_indices(2, vec![vec![0, 0], vec![2, 0]]).unwrap_err();
        assert_eq!(
            err,
            IndexSetError::NotAdmissible {
                index: vec![2, 0],
                dimension: 0
            }
        );
    }

    #[test]
    fn test_full_tensor() {
        let set = MultiIndexSet::full_tensor(&[1, 2]).unwrap();
        assert_eq!(set.len(), 6);
        assert!(set.indices().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(set.indices().last(), Some(&vec![1, 2]));
        assert_eq!(set.max_levels(), vec![1, 2]);
        assert!(set.is_admissible());
        assert_eq!(
            MultiIndexSet::full_tensor(&[]).unwrap_err(),
            IndexSetError::InvalidDimension(0)
        );
    }

    #[test]
    fn test_insert() {
        let mut set = MultiIndexSet::zero(2).unwrap();
        assert!(set.insert(vec![0, 1]).unwrap());
        assert!(!set.insert(vec![0, 1]).unwrap());
        assert!(matches!(
            set.insert(vec![1, 1]),
            Err(IndexSetError::NotAdmissible { dimension: 0, .. })
        ));
        assert!(set.insert(vec![1, 0]).unwrap());
        assert!(set.insert(vec![1, 1]).unwrap());
        assert_eq!(set.position(&[1, 1]), Some(3));
        assert_eq!(set.max_levels(), vec![1, 1]);
        assert!(matches!(
            set.insert(vec![0]),
            Err(IndexSetError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_insert_keeps_positions() {
        let mut set = MultiIndexSet::zero(2).unwrap();
        set.insert(vec![1, 0]).unwrap();
        set.insert(vec![0, 1]).unwrap();
        for (p, index) in set.iter().enumerate() {
            assert_eq!(set.position(index), Some(p));
        }
    }

    #[test]
    fn test_zero_dimension() {
        assert_eq!(
            MultiIndexSet::zero(0).unwrap_err(),
            IndexSetError::InvalidDimension(0)
        );
    }
}
