//! Affine map between the canonical domain `[-1, 1]^d` and a box `[a, b]`.

use crate::error::{Result, SparseGridError};

/// Linear transform from `[-1, 1]^d` onto `[low, high]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTransform {
    low: Vec<f64>,
    high: Vec<f64>,
}

impl DomainTransform {
    /// Requires `low[k] < high[k]`, both finite, for every dimension.
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(SparseGridError::shape(format!(
                "transform bounds have lengths {} and {}",
                low.len(),
                high.len()
            )));
        }
        for (k, (&a, &b)) in low.iter().zip(&high).enumerate() {
            if !(a.is_finite() && b.is_finite() && a < b) {
                return Err(SparseGridError::configuration(format!(
                    "transform bounds in dimension {} must satisfy low < high, got [{}, {}]",
                    k, a, b
                )));
            }
        }
        Ok(Self { low, high })
    }

    pub fn dimension(&self) -> usize {
        self.low.len()
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// Map a canonical point into the box
    pub fn to_physical(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(&x, (&a, &b))| a + 0.5 * (x + 1.0) * (b - a))
            .collect()
    }

    /// Map a point of the box back to `[-1, 1]^d`
    pub fn to_canonical(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(&x, (&a, &b))| 2.0 * (x - a) / (b - a) - 1.0)
            .collect()
    }

    /// Volume ratio between the box and the canonical domain
    pub fn jacobian(&self) -> f64 {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(&a, &b)| 0.5 * (b - a))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_roundtrip_and_jacobian() {
        let t = DomainTransform::new(vec![0.0, -2.0], vec![1.0, 6.0]).unwrap();
        let physical = t.to_physical(&[-1.0, 0.5]);
        assert_abs_diff_eq!(physical[0], 0.0);
        assert_abs_diff_eq!(physical[1], 4.0);
        let back = t.to_canonical(&physical);
        assert_abs_diff_eq!(back[0], -1.0);
        assert_abs_diff_eq!(back[1], 0.5);
        assert_abs_diff_eq!(t.jacobian(), 2.0);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(matches!(
            DomainTransform::new(vec![1.0], vec![1.0]),
            Err(SparseGridError::Configuration { .. })
        ));
        assert!(matches!(
            DomainTransform::new(vec![0.0], vec![f64::INFINITY]),
            Err(SparseGridError::Configuration { .. })
        ));
        assert!(matches!(
            DomainTransform::new(vec![0.0, 0.0], vec![1.0]),
            Err(SparseGridError::Shape { .. })
        ));
    }
}
