//! Hierarchical piecewise-polynomial rules on dyadic nodes.
//!
//! Nodes are addressed by `u32` ids ordered by level. The boundary rule
//! ([`LocalRule::Polynomial`]) numbers its nodes
//!
//! ```text
//! id     0 | 1   2 | 3     4   | 5      6      7     8    | ...
//! x      0 | -1  1 | -0.5  0.5 | -0.75  -0.25  0.25  0.75 | ...
//! level  0 | 1     | 2         | 3                        | ...
//! ```
//!
//! and the zero-boundary rule ([`LocalRule::ZeroBoundary`]) drops the two
//! boundary nodes, so level `l` holds ids `2^l - 1 .. 2^(l+1) - 1`.

use crate::error::{Result, RuleError};
use crate::RuleKind;

/// Largest level addressable with `u32` node ids
pub const MAX_LOCAL_LEVEL: u32 = 30;

/// Hierarchical node layout of a local rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalRule {
    /// Boundary points included, level 1 is `{-1, 1}`
    Polynomial,
    /// Basis functions vanish at `-1` and `1`
    ZeroBoundary,
}

impl LocalRule {
    /// Create from a tag, rejecting global families
    pub fn from_kind(kind: RuleKind) -> Result<Self> {
        match kind {
            RuleKind::LocalPolynomial => Ok(LocalRule::Polynomial),
            RuleKind::LocalPolynomialZero => Ok(LocalRule::ZeroBoundary),
            _ => Err(RuleError::WrongFamily {
                rule: kind,
                expected: "local",
            }),
        }
    }

    pub fn kind(self) -> RuleKind {
        match self {
            LocalRule::Polynomial => RuleKind::LocalPolynomial,
            LocalRule::ZeroBoundary => RuleKind::LocalPolynomialZero,
        }
    }

    /// Level of node `id`
    pub fn level(self, id: u32) -> u32 {
        match self {
            LocalRule::Polynomial => match id {
                0 => 0,
                1 | 2 => 1,
                _ => (id - 1).ilog2() + 1,
            },
            LocalRule::ZeroBoundary => (id + 1).ilog2(),
        }
    }

    /// Id of the leftmost node of `level`
    pub fn first_node(self, level: u32) -> u32 {
        match self {
            LocalRule::Polynomial => match level {
                0 => 0,
                1 => 1,
                _ => (1 << (level - 1)) + 1,
            },
            LocalRule::ZeroBoundary => (1 << level) - 1,
        }
    }

    /// Number of nodes on `level`
    pub fn num_nodes(self, level: u32) -> u32 {
        match self {
            LocalRule::Polynomial => match level {
                0 => 1,
                1 => 2,
                _ => 1 << (level - 1),
            },
            LocalRule::ZeroBoundary => 1 << level,
        }
    }

    /// Half the spacing of the nodes on the level of `id`
    pub fn half_width(self, id: u32) -> f64 {
        match self {
            LocalRule::Polynomial => match self.level(id) {
                0 | 1 => 1.0,
                level => 1.0 / f64::from(1u32 << (level - 1)),
            },
            LocalRule::ZeroBoundary => 1.0 / f64::from(1u32 << self.level(id)),
        }
    }

    /// Coordinate of node `id`
    pub fn node(self, id: u32) -> f64 {
        match (self, id) {
            (LocalRule::Polynomial, 0) => 0.0,
            (LocalRule::Polynomial, 1) => -1.0,
            (LocalRule::Polynomial, 2) => 1.0,
            _ => {
                let level = self.level(id);
                let j = id - self.first_node(level);
                -1.0 + f64::from(2 * j + 1) * self.half_width(id)
            }
        }
    }

    /// Parent of node `id` in the hierarchy, `None` for the root
    pub fn parent(self, id: u32) -> Option<u32> {
        if id == 0 {
            return None;
        }
        let level = self.level(id);
        let j = id - self.first_node(level);
        match self {
            LocalRule::Polynomial => match level {
                1 => Some(0),
                2 => Some(1 + j),
                _ => Some(self.first_node(level - 1) + j / 2),
            },
            LocalRule::ZeroBoundary => Some(self.first_node(level - 1) + j / 2),
        }
    }

    /// Children of node `id`; empty past [`MAX_LOCAL_LEVEL`]
    pub fn children(self, id: u32) -> Children {
        let level = self.level(id);
        if level >= MAX_LOCAL_LEVEL {
            return Children::new(&[]);
        }
        match (self, id) {
            (LocalRule::Polynomial, 0) => Children::new(&[1, 2]),
            (LocalRule::Polynomial, 1) => Children::new(&[3]),
            (LocalRule::Polynomial, 2) => Children::new(&[4]),
            _ => {
                let j = id - self.first_node(level);
                let first = self.first_node(level + 1) + 2 * j;
                Children::new(&[first, first + 1])
            }
        }
    }
}

/// Iterator over the (at most two) children of a node
#[derive(Debug, Clone)]
pub struct Children {
    ids: [u32; 2],
    len: usize,
    pos: usize,
}

impl Children {
    fn new(ids: &[u32]) -> Self {
        let mut buf = [0; 2];
        buf[..ids.len()].copy_from_slice(ids);
        Self {
            ids: buf,
            len: ids.len(),
            pos: 0,
        }
    }
}

impl Iterator for Children {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.pos < self.len {
            self.pos += 1;
            Some(self.ids[self.pos - 1])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Children {}

/// A local rule paired with the order of its basis functions.
///
/// Order 0 uses indicator functions, order 1 hats, order 2 local quadratics
/// and order 3 local cubics; low levels that do not have enough ancestors for
/// the requested order fall back to the highest order they support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalBasis {
    rule: LocalRule,
    order: usize,
}

impl LocalBasis {
    /// Highest supported basis order
    pub const MAX_ORDER: usize = 3;

    pub fn new(kind: RuleKind, order: usize) -> Result<Self> {
        let rule = LocalRule::from_kind(kind)?;
        if order > Self::MAX_ORDER {
            return Err(RuleError::InvalidOrder {
                order,
                max: Self::MAX_ORDER,
            });
        }
        Ok(Self { rule, order })
    }

    pub fn rule(&self) -> LocalRule {
        self.rule
    }

    pub fn order(&self) -> usize {
        self.order
    }

    fn is_boundary_quadratic(&self, id: u32) -> bool {
        self.rule == LocalRule::Polynomial && self.order >= 2 && (id == 1 || id == 2)
    }

    fn is_cubic(&self, level: u32) -> bool {
        self.order == 3
            && match self.rule {
                LocalRule::Polynomial => level >= 3,
                LocalRule::ZeroBoundary => level >= 2,
            }
    }

    /// Closed support `[left, right]` of basis function `id`
    pub fn support(&self, id: u32) -> (f64, f64) {
        if (self.rule == LocalRule::Polynomial && id == 0) || self.is_boundary_quadratic(id) {
            return (-1.0, 1.0);
        }
        let c = self.rule.node(id);
        let h = self.rule.half_width(id);
        ((c - h).max(-1.0), (c + h).min(1.0))
    }

    /// Value of basis function `id` at `x`, zero outside the support
    pub fn eval(&self, id: u32, x: f64) -> f64 {
        let (left, right) = self.support(id);
        if x < left || x > right {
            return 0.0;
        }
        if self.rule == LocalRule::Polynomial && id == 0 {
            return 1.0;
        }
        if self.is_boundary_quadratic(id) {
            return if id == 1 {
                0.5 * x * (x - 1.0)
            } else {
                0.5 * x * (x + 1.0)
            };
        }

        let level = self.rule.level(id);
        let t = (x - self.rule.node(id)) / self.rule.half_width(id);
        match self.order {
            0 => {
                if t.abs() < 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            1 => (1.0 - t.abs()).max(0.0),
            _ => {
                let quadratic = 1.0 - t * t;
                if self.is_cubic(level) {
                    // third root at the far end of the parent support
                    let j = id - self.rule.first_node(level);
                    let r = if j % 2 == 1 { -3.0 } else { 3.0 };
                    quadratic * (1.0 - t / r)
                } else {
                    quadratic
                }
            }
        }
    }

    /// Integral of basis function `id` over `[-1, 1]`
    pub fn integral(&self, id: u32) -> f64 {
        if self.rule == LocalRule::Polynomial {
            match id {
                0 => return 2.0,
                1 | 2 => {
                    return match self.order {
                        0 => 1.0,
                        1 => 0.5,
                        _ => 1.0 / 3.0,
                    }
                }
                _ => {}
            }
        }
        let h = self.rule.half_width(id);
        match self.order {
            0 => 2.0 * h,
            1 => h,
            _ => 4.0 * h / 3.0,
        }
    }

    /// Support and basis function of node `index` on `level`.
    pub fn basis_support(&self, level: usize, index: usize) -> Result<BasisSupport> {
        let level32 = u32::try_from(level)
            .ok()
            .filter(|&l| l <= MAX_LOCAL_LEVEL)
            .ok_or(RuleError::LevelTooLarge {
                rule: self.rule.kind(),
                level,
                max: MAX_LOCAL_LEVEL as usize,
            })?;
        let count = self.rule.num_nodes(level32) as usize;
        if index >= count {
            return Err(RuleError::NodeIndexOutOfRange {
                level,
                index,
                count,
            });
        }
        let id = self.rule.first_node(level32) + index as u32;
        let (left, right) = self.support(id);
        Ok(BasisSupport {
            left,
            right,
            id,
            basis: *self,
        })
    }
}

/// One basis function with its support interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisSupport {
    pub left: f64,
    pub right: f64,
    id: u32,
    basis: LocalBasis,
}

impl BasisSupport {
    /// Node id of the basis function
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Node coordinate of the basis function
    pub fn node(&self) -> f64 {
        self.basis.rule.node(self.id)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.basis.eval(self.id, x)
    }

    pub fn integral(&self) -> f64 {
        self.basis.integral(self.id)
    }
}
