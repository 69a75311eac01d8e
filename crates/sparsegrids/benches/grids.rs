//! Benchmarks for grid construction, evaluation and loading

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sparsegrids::{DepthType, GlobalGridBuilder, LocalGridBuilder, RuleKind, SparseGrid};

fn gaussian(x: &[f64]) -> f64 {
    (-x.iter().map(|v| v * v).sum::<f64>()).exp()
}

fn loaded(mut grid: SparseGrid) -> SparseGrid {
    let values: Vec<Vec<f64>> = grid
        .get_needed_points()
        .iter()
        .map(|x| vec![gaussian(x)])
        .collect();
    grid.load_needed_points(&values)
        .expect("values match the needed points");
    grid
}

fn bench_global_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_construction");

    for depth in [4, 6, 8] {
        group.bench_with_input(
            BenchmarkId::new("clenshaw_curtis_3d", depth),
            &depth,
            |b, &depth| b.iter(|| GlobalGridBuilder::new(3, 1, black_box(depth)).build()),
        );
        group.bench_with_input(
            BenchmarkId::new("gauss_legendre_basis_3d", depth),
            &depth,
            |b, &depth| {
                b.iter(|| {
                    GlobalGridBuilder::new(3, 1, black_box(depth))
                        .with_rule(RuleKind::GaussLegendre)
                        .with_depth_type(DepthType::Basis)
                        .build()
                })
            },
        );
    }

    group.finish();
}

fn bench_global_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_evaluate");

    for depth in [4, 6] {
        let grid = loaded(GlobalGridBuilder::new(3, 1, depth).build().unwrap());
        group.bench_with_input(BenchmarkId::new("clenshaw_curtis_3d", depth), &grid, |b, g| {
            b.iter(|| g.evaluate(black_box(&[0.1, -0.3, 0.7])))
        });
    }

    group.finish();
}

fn bench_local(c: &mut Criterion) {
    let mut group = c.benchmark_group("local");

    for level in [4, 6] {
        let grid = LocalGridBuilder::new(2, 1, level)
            .with_order(2)
            .build()
            .unwrap();
        group.bench_with_input(BenchmarkId::new("load", level), &grid, |b, g| {
            b.iter(|| loaded(g.clone()))
        });

        let grid = loaded(grid);
        group.bench_with_input(BenchmarkId::new("evaluate", level), &grid, |b, g| {
            b.iter(|| g.evaluate(black_box(&[0.3, 0.7])))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_global_construction, bench_global_evaluate, bench_local);
criterion_main!(benches);
