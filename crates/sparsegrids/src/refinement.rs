//! Surplus-driven refinement of local polynomial grids.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use sparsegrids_rules::{LocalBasis, LocalRule};

use crate::error::{Result, SparseGridError};
use crate::local_grid::PointRecord;

/// How candidate children are admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefinementStrategy {
    /// Accept a child only if its parent in every dimension is in the grid
    #[default]
    Classic,
    /// Add missing parents, recursively, ahead of the child
    ParentsFirst,
    /// Like [`RefinementStrategy::Classic`], but a flagged point only gets
    /// children in the dimensions where its one-dimensional surplus along the
    /// grid line also exceeds the tolerance
    DirectionSelective,
    /// Direction-selective flags with parents-first admission
    Fds,
}

impl RefinementStrategy {
    /// True if children are only added along dimensions with a large
    /// one-dimensional surplus
    pub fn is_direction_selective(self) -> bool {
        matches!(self, RefinementStrategy::DirectionSelective | RefinementStrategy::Fds)
    }

    /// True if missing parents of a child are added instead of skipping it
    pub fn adds_parents(self) -> bool {
        matches!(self, RefinementStrategy::ParentsFirst | RefinementStrategy::Fds)
    }
}

impl fmt::Display for RefinementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefinementStrategy::Classic => f.write_str("classic"),
            RefinementStrategy::ParentsFirst => f.write_str("parents-first"),
            RefinementStrategy::DirectionSelective => f.write_str("direction-selective"),
            RefinementStrategy::Fds => f.write_str("fds"),
        }
    }
}

impl FromStr for RefinementStrategy {
    type Err = SparseGridError;

    /// Accepts the display tags and the `refine_*` spellings
    /// (`"refine_parents_first"`, `"refine_direction_selective"`, `"refine_fds"`)
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("refine_")
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "classic" => Ok(RefinementStrategy::Classic),
            "parentsfirst" => Ok(RefinementStrategy::ParentsFirst),
            "directionselective" => Ok(RefinementStrategy::DirectionSelective),
            "fds" => Ok(RefinementStrategy::Fds),
            _ => Err(SparseGridError::configuration(format!(
                "unknown refinement strategy '{}'",
                s
            ))),
        }
    }
}

/// Normalization of the surplus before comparing it with the tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurplusScaling {
    /// Divide by the largest absolute loaded value of the output
    #[default]
    Relative,
    /// Compare the raw surplus
    Absolute,
}

impl fmt::Display for SurplusScaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurplusScaling::Relative => f.write_str("relative"),
            SurplusScaling::Absolute => f.write_str("absolute"),
        }
    }
}

impl FromStr for SurplusScaling {
    type Err = SparseGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" => Ok(SurplusScaling::Relative),
            "absolute" => Ok(SurplusScaling::Absolute),
            _ => Err(SparseGridError::configuration(format!(
                "unknown surplus scaling '{}'",
                s
            ))),
        }
    }
}

/// Options for one refinement step.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementOptions {
    /// Points whose scaled surplus exceeds this get children
    pub tolerance: f64,
    pub strategy: RefinementStrategy,
    pub scaling: SurplusScaling,
    /// Restrict the indicator to one output (None = largest over all outputs)
    pub output: Option<usize>,
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            strategy: RefinementStrategy::Classic,
            scaling: SurplusScaling::Relative,
            output: None,
        }
    }
}

impl RefinementOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: RefinementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_scaling(mut self, scaling: SurplusScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Use only `output` when deciding which points to refine.
    pub fn with_output(mut self, output: usize) -> Self {
        self.output = Some(output);
        self
    }

    pub(crate) fn validate(&self, outputs: usize) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SparseGridError::configuration(format!(
                "refinement tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if let Some(output) = self.output {
            if output >= outputs {
                return Err(SparseGridError::configuration(format!(
                    "refinement output {} out of range for {} outputs",
                    output, outputs
                )));
            }
        }
        Ok(())
    }
}

/// Per-output divisor applied to the surpluses
fn surplus_scales(loaded: &[PointRecord], outputs: usize, scaling: SurplusScaling) -> Vec<f64> {
    match scaling {
        SurplusScaling::Absolute => vec![1.0; outputs],
        SurplusScaling::Relative => {
            let mut scales = vec![0.0f64; outputs];
            for record in loaded {
                for (s, v) in scales.iter_mut().zip(&record.values) {
                    *s = s.max(v.abs());
                }
            }
            scales
                .into_iter()
                .map(|s| if s > 0.0 { s } else { 1.0 })
                .collect()
        }
    }
}

fn parent_keys(rule: LocalRule, nodes: &[u32]) -> impl Iterator<Item = Vec<u32>> + '_ {
    nodes.iter().enumerate().filter_map(move |(k, &n)| {
        rule.parent(n).map(|p| {
            let mut key = nodes.to_vec();
            key[k] = p;
            key
        })
    })
}

/// Scaled surplus of every loaded point along each dimension.
///
/// The loaded points sharing all nodes but the one in dimension `k` form a
/// grid line. Entry `[p][k]` compares the value at `p` with the
/// one-dimensional hierarchical interpolant through the coarser points of its
/// line, using the largest selected output.
fn directional_indicators(
    basis: LocalBasis,
    loaded: &[PointRecord],
    selected: &[usize],
    scales: &[f64],
) -> Vec<Vec<f64>> {
    let rule = basis.rule();
    let dimension = loaded.first().map_or(0, |r| r.nodes.len());
    let mut indicators = vec![vec![0.0; dimension]; loaded.len()];
    for k in 0..dimension {
        let mut lines: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
        for (p, record) in loaded.iter().enumerate() {
            let mut key = record.nodes.clone();
            key.remove(k);
            lines.entry(key).or_default().push(p);
        }
        for mut line in lines.into_values() {
            line.sort_by_key(|&p| rule.level(loaded[p].nodes[k]));
            let mut done: Vec<(u32, Vec<f64>)> = Vec::with_capacity(line.len());
            for p in line {
                let node = loaded[p].nodes[k];
                let level = rule.level(node);
                let x = rule.node(node);
                let mut surplus = loaded[p].values.clone();
                for (coarse, coarse_surplus) in &done {
                    if rule.level(*coarse) >= level {
                        continue;
                    }
                    let phi = basis.eval(*coarse, x);
                    if phi != 0.0 {
                        for (s, c) in surplus.iter_mut().zip(coarse_surplus) {
                            *s -= phi * c;
                        }
                    }
                }
                indicators[p][k] = selected
                    .iter()
                    .map(|&o| surplus[o].abs() / scales[o])
                    .fold(0.0, f64::max);
                done.push((node, surplus));
            }
        }
    }
    indicators
}

fn exceeds(indicator: f64, tolerance: f64) -> bool {
    !indicator.is_nan() && indicator > tolerance
}

/// Collects new points, keeping each one after its parents
struct Proposal<'a> {
    rule: LocalRule,
    existing: &'a HashMap<Vec<u32>, usize>,
    points: Vec<Vec<u32>>,
    seen: HashSet<Vec<u32>>,
}

impl Proposal<'_> {
    fn is_known(&self, key: &[u32]) -> bool {
        self.existing.contains_key(key) || self.seen.contains(key)
    }

    fn push(&mut self, key: Vec<u32>) {
        self.seen.insert(key.clone());
        self.points.push(key);
    }

    fn add_with_parents(&mut self, key: Vec<u32>) {
        if self.is_known(&key) {
            return;
        }
        let parents: Vec<Vec<u32>> = parent_keys(self.rule, &key).collect();
        for parent in parents {
            self.add_with_parents(parent);
        }
        self.push(key);
    }
}

/// Node keys of the points a refinement step adds, in insertion order.
///
/// `loaded` are the loaded records and `existing` maps their node keys to
/// arena ids; pending points must already be discarded.
pub(crate) fn propose_points(
    basis: LocalBasis,
    loaded: &[PointRecord],
    existing: &HashMap<Vec<u32>, usize>,
    outputs: usize,
    options: &RefinementOptions,
) -> Vec<Vec<u32>> {
    let rule = basis.rule();
    let scales = surplus_scales(loaded, outputs, options.scaling);
    let selected: Vec<usize> = match options.output {
        Some(o) => vec![o],
        None => (0..outputs).collect(),
    };
    let directional = if options.strategy.is_direction_selective() {
        directional_indicators(basis, loaded, &selected, &scales)
    } else {
        Vec::new()
    };

    let mut proposal = Proposal {
        rule,
        existing,
        points: Vec::new(),
        seen: HashSet::new(),
    };
    let mut num_flagged = 0;

    for (p, record) in loaded.iter().enumerate() {
        let indicator = selected
            .iter()
            .map(|&o| record.surplus[o].abs() / scales[o])
            .fold(0.0, f64::max);
        if !exceeds(indicator, options.tolerance) {
            continue;
        }
        num_flagged += 1;

        for k in 0..record.nodes.len() {
            if !directional.is_empty() && !exceeds(directional[p][k], options.tolerance) {
                continue;
            }
            for child in rule.children(record.nodes[k]) {
                let mut candidate = record.nodes.clone();
                candidate[k] = child;
                if proposal.is_known(&candidate) {
                    continue;
                }
                if options.strategy.adds_parents() {
                    tracing::trace!(point = ?candidate, indicator, "accepted child");
                    proposal.add_with_parents(candidate);
                } else if parent_keys(rule, &candidate).all(|q| existing.contains_key(&q)) {
                    tracing::trace!(point = ?candidate, indicator, "accepted child");
                    proposal.push(candidate);
                } else {
                    tracing::trace!(point = ?candidate, "missing parent, child skipped");
                }
            }
        }
    }

    tracing::info!(
        tolerance = options.tolerance,
        strategy = %options.strategy,
        num_flagged,
        num_new = proposal.points.len(),
        "refinement proposed new points"
    );
    proposal.points
}
