//! Five classic sparse grid problems: quadrature, interpolation and
//! adaptive refinement.
//!
//! Run:
//!   cargo run -p sparsegrids --example classic_examples --release
//!
//! Set `RUST_LOG=sparsegrids=debug` to see construction and refinement events.

use anyhow::Result;
use sparsegrids::{
    make_global_grid, DepthType, GlobalGridBuilder, LocalGridBuilder, RefinementStrategy,
    RuleKind, SparseGrid,
};
use tracing_subscriber::EnvFilter;

const EXACT_INTEGRAL: f64 = 2.513723354063905;
const EXACT_AT_PROBE: f64 = 0.6990131267703512;

fn gaussian_cosine(x: &[f64]) -> f64 {
    (-x[0] * x[0]).exp() * x[1].cos()
}

fn load(grid: &mut SparseGrid, f: impl Fn(&[f64]) -> f64) -> Result<()> {
    let values: Vec<Vec<f64>> = grid
        .get_needed_points()
        .iter()
        .map(|x| vec![f(x)])
        .collect();
    grid.load_needed_points(&values)?;
    Ok(())
}

fn weighted_sum(grid: &SparseGrid, f: impl Fn(&[f64]) -> f64) -> Result<f64> {
    let weights = grid.get_weights()?;
    Ok(grid
        .get_points()
        .iter()
        .zip(&weights)
        .map(|(x, w)| w * f(x))
        .sum())
}

/// Quadrature of exp(-x^2) cos(y) over [-1, 1]^2 with Clenshaw-Curtis.
fn example_1() -> Result<()> {
    println!("Example 1: integrate exp(-x^2) cos(y) over [-1,1]^2");
    let grid = make_global_grid(
        2,
        0,
        7,
        DepthType::Level,
        RuleKind::ClenshawCurtis,
        &[],
        0.0,
        0.0,
    )?;
    let integral = weighted_sum(&grid, gaussian_cosine)?;
    println!(
        "  clenshaw-curtis level 7: {:>5} points, error {:.3e}",
        grid.num_points(),
        (integral - EXACT_INTEGRAL).abs()
    );
    Ok(())
}

/// Clenshaw-Curtis and Gauss-Legendre at matching polynomial precision.
fn example_2() -> Result<()> {
    println!("Example 2: basis-precision quadrature, two rule families");
    for rule in [RuleKind::ClenshawCurtis, RuleKind::GaussLegendre] {
        let grid = GlobalGridBuilder::new(2, 0, 10)
            .with_depth_type(DepthType::Basis)
            .with_rule(rule)
            .build()?;
        let integral = weighted_sum(&grid, gaussian_cosine)?;
        println!(
            "  {:<16} {:>5} points, error {:.3e}",
            rule.tag(),
            grid.num_points(),
            (integral - EXACT_INTEGRAL).abs()
        );
    }
    Ok(())
}

/// Interpolation at a probe point as the precision grows.
fn example_3() -> Result<()> {
    println!("Example 3: interpolate exp(-x^2) cos(y) at (0.3, 0.7)");
    for precision in [6, 10, 12] {
        let mut grid = GlobalGridBuilder::new(2, 1, precision)
            .with_depth_type(DepthType::Basis)
            .build()?;
        load(&mut grid, gaussian_cosine)?;
        let value = grid.evaluate(&[0.3, 0.7])?[0];
        println!(
            "  precision {:>2}: {:>4} points, error {:.3e}",
            precision,
            grid.num_points(),
            (value - EXACT_AT_PROBE).abs()
        );
    }
    Ok(())
}

/// Anisotropic Gauss-Gegenbauer quadrature of (x - 2)^3 exp(-y^2).
fn example_4() -> Result<()> {
    println!("Example 4: anisotropic Gauss-Gegenbauer, alpha = 0.4");
    let exact = -20.29979511486524;
    let grid = make_global_grid(
        2,
        0,
        16,
        DepthType::Level,
        RuleKind::GaussGegenbauer,
        &[8, 1],
        0.4,
        0.0,
    )?;
    let integral = weighted_sum(&grid, |x| (x[0] - 2.0).powi(3) * (-x[1] * x[1]).exp())?;
    println!(
        "  weights [8, 1]: {:>3} points, error {:.3e}",
        grid.num_points(),
        (integral - exact).abs()
    );
    Ok(())
}

/// Adaptive local refinement on [0, 1]^2 with every strategy.
fn example_5() -> Result<()> {
    println!("Example 5: adaptive local polynomial interpolation on [0,1]^2");
    let exact = 0.6284308385159763;
    let probe = [0.3, 0.7];
    let strategies = [
        RefinementStrategy::Classic,
        RefinementStrategy::ParentsFirst,
        RefinementStrategy::DirectionSelective,
        RefinementStrategy::Fds,
    ];
    for strategy in strategies {
        println!("  strategy {}", strategy);
        let mut grid = LocalGridBuilder::new(2, 1, 4).with_order(2).build()?;
        grid.set_transform_ab(&[0.0, 0.0], &[1.0, 1.0])?;
        let mut iteration = 0;
        while grid.num_needed_points() > 0 && iteration < 10 {
            load(&mut grid, gaussian_cosine)?;
            let value = grid.evaluate(&probe)?[0];
            let integral = grid.integrate()?[0];
            println!(
                "    iteration {}: {:>4} points, interpolation error {:.3e}, integral error {:.3e}",
                iteration,
                grid.num_loaded_points(),
                (value - gaussian_cosine(&probe)).abs(),
                (integral - exact).abs()
            );
            grid.set_refinement(1e-6, strategy)?;
            iteration += 1;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    example_1()?;
    example_2()?;
    example_3()?;
    example_4()?;
    example_5()?;
    Ok(())
}
