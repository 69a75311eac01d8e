//! Depth criteria selecting which multi-indices enter a set.

use std::fmt;
use std::str::FromStr;

use sparsegrids_rules::GlobalRule;

use crate::error::{IndexSetError, Result};

/// Relative slack of the hyperbolic limit, compared in log space
const HYPERBOLIC_SLACK: f64 = 1e-12;

/// How the per-dimension levels of a multi-index are weighed against the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthType {
    /// Total level: `sum a_k i_k`
    Level,
    /// Total degree of the interpolated polynomial space
    Basis,
    /// Total degree of exactly integrated polynomials
    Quadrature,
    /// Hyperbolic cross in the levels
    HyperbolicLevel,
    /// Hyperbolic cross in the interpolated degree
    HyperbolicBasis,
    /// Full tensor: `max_k a_k i_k`
    Tensor,
}

impl DepthType {
    pub const ALL: [DepthType; 6] = [
        DepthType::Level,
        DepthType::Basis,
        DepthType::Quadrature,
        DepthType::HyperbolicLevel,
        DepthType::HyperbolicBasis,
        DepthType::Tensor,
    ];

    pub fn is_hyperbolic(self) -> bool {
        matches!(self, DepthType::HyperbolicLevel | DepthType::HyperbolicBasis)
    }

    /// True if the per-level weight depends on the rule's exactness
    pub fn needs_rule(self) -> bool {
        !matches!(self, DepthType::Level | DepthType::HyperbolicLevel | DepthType::Tensor)
    }

    pub fn tag(self) -> &'static str {
        match self {
            DepthType::Level => "level",
            DepthType::Basis => "basis",
            DepthType::Quadrature => "quadrature",
            DepthType::HyperbolicLevel => "hyperbolic-level",
            DepthType::HyperbolicBasis => "hyperbolic-basis",
            DepthType::Tensor => "tensor",
        }
    }
}

impl fmt::Display for DepthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DepthType {
    type Err = IndexSetError;

    /// Accepts the canonical tags and the `type_*` spellings
    /// (`"type_level"`, `"type_basis"`, `"type_iptotal"`, `"type_hyperbolic"`, ...).
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("type_")
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "level" => Ok(DepthType::Level),
            "basis" | "iptotal" => Ok(DepthType::Basis),
            "quadrature" | "qptotal" => Ok(DepthType::Quadrature),
            "hyperboliclevel" | "hyperbolic" => Ok(DepthType::HyperbolicLevel),
            "hyperbolicbasis" | "iphyperbolic" => Ok(DepthType::HyperbolicBasis),
            "tensor" | "fulltensor" => Ok(DepthType::Tensor),
            _ => Err(IndexSetError::UnknownDepthType(s.to_string())),
        }
    }
}

/// Admission test of a multi-index under a depth criterion.
#[derive(Debug, Clone)]
pub(crate) struct DepthLimit {
    depth_type: DepthType,
    rule: Option<GlobalRule>,
    weights: Vec<usize>,
    min_weight: usize,
    depth: usize,
}

impl DepthLimit {
    pub(crate) fn new(
        depth_type: DepthType,
        rule: Option<GlobalRule>,
        weights: Vec<usize>,
        depth: usize,
    ) -> Result<Self> {
        if depth_type.needs_rule() && rule.is_none() {
            return Err(IndexSetError::RuleRequired(depth_type.to_string()));
        }
        let min_weight = weights.iter().copied().min().unwrap_or(1);
        Ok(Self {
            depth_type,
            rule,
            weights,
            min_weight,
            depth,
        })
    }

    /// Weight `w(level)` of one coordinate, `None` past the rule's last level
    fn level_weight(&self, level: usize) -> Option<usize> {
        if level == 0 {
            return Some(0);
        }
        match (self.depth_type, self.rule) {
            (_, Some(rule)) if level > rule.max_level() => None,
            (DepthType::Level | DepthType::HyperbolicLevel | DepthType::Tensor, _) => Some(level),
            (DepthType::Basis | DepthType::HyperbolicBasis, Some(rule)) => {
                Some(rule.interpolation_exactness(level - 1) + 1)
            }
            (DepthType::Quadrature, Some(rule)) => Some(rule.quadrature_exactness(level - 1) + 1),
            _ => None,
        }
    }

    /// Metric of `index`, `None` if it exceeds the limit
    pub(crate) fn metric(&self, index: &[usize]) -> Option<f64> {
        if self.depth_type.is_hyperbolic() {
            let limit = ((self.depth + 1) as f64).ln();
            let mut total = 0.0;
            for (&level, &a) in index.iter().zip(&self.weights) {
                let w = self.level_weight(level)?;
                total += (a as f64 / self.min_weight as f64) * ((w + 1) as f64).ln();
            }
            (total <= limit + HYPERBOLIC_SLACK * limit.max(1.0)).then_some(total)
        } else {
            let limit = self.depth.saturating_mul(self.min_weight);
            let mut total: usize = 0;
            for (&level, &a) in index.iter().zip(&self.weights) {
                let term = a.saturating_mul(self.level_weight(level)?);
                total = match self.depth_type {
                    DepthType::Tensor => total.max(term),
                    _ => total.saturating_add(term),
                };
            }
            (total <= limit).then_some(total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparsegrids_rules::RuleKind;

    #[test]
    fn test_depth_tags() {
        for depth_type in DepthType::ALL {
            assert_eq!(depth_type.tag().parse::<DepthType>().unwrap(), depth_type);
        }
        assert_eq!("type_level".parse::<DepthType>().unwrap(), DepthType::Level);
        assert_eq!("type_basis".parse::<DepthType>().unwrap(), DepthType::Basis);
        assert_eq!(
            "type_hyperbolic".parse::<DepthType>().unwrap(),
            DepthType::HyperbolicLevel
        );
        assert!(matches!(
            "type_curved".parse::<DepthType>(),
            Err(IndexSetError::UnknownDepthType(_))
        ));
    }

    #[test]
    fn test_level_metric() {
        let limit = DepthLimit::new(DepthType::Level, None, vec![1, 1], 3).unwrap();
        assert_eq!(limit.metric(&[1, 2]), Some(3.0));
        assert_eq!(limit.metric(&[2, 2]), None);
    }

    #[test]
    fn test_anisotropic_level_metric() {
        // 2 i_0 + i_1 <= 4
        let limit = DepthLimit::new(DepthType::Level, None, vec![2, 1], 4).unwrap();
        assert!(limit.metric(&[2, 0]).is_some());
        assert!(limit.metric(&[0, 4]).is_some());
        assert!(limit.metric(&[2, 1]).is_none());
    }

    #[test]
    fn test_basis_metric_uses_exactness() {
        let rule = GlobalRule::new(RuleKind::ClenshawCurtis, 0.0, 0.0).unwrap();
        let limit = DepthLimit::new(DepthType::Basis, Some(rule), vec![1], 4).unwrap();
        // w(1) = 1, w(2) = 3, w(3) = 5
        assert_eq!(limit.metric(&[1]), Some(1.0));
        assert_eq!(limit.metric(&[2]), Some(3.0));
        assert_eq!(limit.metric(&[3]), None);
    }

    #[test]
    fn test_hyperbolic_metric() {
        let limit = DepthLimit::new(DepthType::HyperbolicLevel, None, vec![1, 1], 5).unwrap();
        // (1 + 1)(2 + 1) = 6 <= 6
        assert!(limit.metric(&[1, 2]).is_some());
        // (2 + 1)(2 + 1) = 9 > 6
        assert!(limit.metric(&[2, 2]).is_none());
        assert!(limit.metric(&[5, 0]).is_some());
    }

    #[test]
    fn test_tensor_metric() {
        // 2 i_0 <= 4 and i_1 <= 4, independently
        let limit = DepthLimit::new(DepthType::Tensor, None, vec![2, 1], 4).unwrap();
        assert_eq!(limit.metric(&[2, 4]), Some(4.0));
        assert!(limit.metric(&[3, 0]).is_none());
        assert!(limit.metric(&[0, 5]).is_none());
        assert_eq!("type_tensor".parse::<DepthType>().unwrap(), DepthType::Tensor);
    }

    #[test]
    fn test_rule_cap_applies_to_every_depth_type() {
        // Clenshaw-Curtis stops at level 30 and Fejer at 29
        let cc = GlobalRule::new(RuleKind::ClenshawCurtis, 0.0, 0.0).unwrap();
        let fejer = GlobalRule::new(RuleKind::Fejer2, 0.0, 0.0).unwrap();
        for depth_type in DepthType::ALL {
            let limit = DepthLimit::new(depth_type, Some(cc), vec![1], 1 << 40).unwrap();
            assert!(limit.metric(&[30]).is_some(), "{depth_type}");
            assert!(limit.metric(&[31]).is_none(), "{depth_type}");

            let limit = DepthLimit::new(depth_type, Some(fejer), vec![1, 1], 1 << 40).unwrap();
            assert!(limit.metric(&[29, 0]).is_some(), "{depth_type}");
            assert!(limit.metric(&[0, 30]).is_none(), "{depth_type}");
        }
    }

    #[test]
    fn test_rule_required() {
        assert!(matches!(
            DepthLimit::new(DepthType::Basis, None, vec![1], 3),
            Err(IndexSetError::RuleRequired(_))
        ));
    }
}
