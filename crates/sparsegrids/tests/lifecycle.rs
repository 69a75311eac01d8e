//! Needed/loaded bookkeeping and error behavior shared by both engines.

use approx::assert_abs_diff_eq;

use sparsegrids::{
    GlobalGridBuilder, LocalGridBuilder, RefinementOptions, RefinementStrategy, SparseGrid,
    SparseGridError,
};

fn grids(outputs: usize) -> Vec<SparseGrid> {
    vec![
        GlobalGridBuilder::new(2, outputs, 3).build().unwrap(),
        LocalGridBuilder::new(2, outputs, 3).build().unwrap(),
    ]
}

fn values_for(grid: &SparseGrid) -> Vec<Vec<f64>> {
    grid.get_needed_points()
        .iter()
        .map(|x| (0..grid.num_outputs()).map(|k| x[0] + k as f64 * x[1]).collect())
        .collect()
}

// ============================================================================
// Counts
// ============================================================================

#[test]
fn test_counts_before_and_after_load() {
    for mut grid in grids(2) {
        let total = grid.num_points();
        assert!(total > 0);
        assert_eq!(grid.num_needed_points(), total);
        assert_eq!(grid.num_loaded_points(), 0);
        assert!(grid.get_loaded_points().is_empty());

        let values = values_for(&grid);
        grid.load_needed_points(&values).unwrap();
        assert_eq!(grid.num_needed_points(), 0);
        assert_eq!(grid.num_loaded_points(), total);
        assert!(grid.get_needed_points().is_empty());
        assert_eq!(grid.get_loaded_points().len(), total);
    }
}

#[test]
fn test_loading_nothing_is_a_no_op() {
    for mut grid in grids(1) {
        let values = values_for(&grid);
        grid.load_needed_points(&values).unwrap();
        let before = grid.num_loaded_points();
        grid.load_needed_points(&[]).unwrap();
        assert_eq!(grid.num_loaded_points(), before);
    }
}

#[test]
fn test_refinement_appends_needed_points() {
    let mut grid = LocalGridBuilder::new(2, 1, 2).build().unwrap();
    let values: Vec<Vec<f64>> = grid
        .get_needed_points()
        .iter()
        .map(|x| vec![(3.0 * x[0]).exp() * x[1]])
        .collect();
    grid.load_needed_points(&values).unwrap();
    let loaded = grid.num_loaded_points();

    grid.set_refinement(1e-3, RefinementStrategy::Classic).unwrap();
    let needed = grid.num_needed_points();
    assert!(needed > 0);
    assert_eq!(grid.num_points(), loaded + needed);
    assert_eq!(grid.num_loaded_points(), loaded);
}

#[test]
fn test_refinement_before_load_does_nothing() {
    let mut grid = LocalGridBuilder::new(2, 1, 2).build().unwrap();
    let needed = grid.get_needed_points();
    grid.set_refinement(1e-3, RefinementStrategy::ParentsFirst).unwrap();
    assert_eq!(grid.get_needed_points(), needed);
    grid.clear_refinement();
    assert_eq!(grid.get_needed_points(), needed);
}

// ============================================================================
// Zero outputs
// ============================================================================

#[test]
fn test_zero_outputs() {
    for mut grid in grids(0) {
        assert_eq!(grid.num_needed_points(), 0);
        assert!(grid.get_needed_points().is_empty());
        assert!(!grid.get_points().is_empty());
        assert_eq!(grid.integrate().unwrap(), Vec::<f64>::new());
        assert!(matches!(
            grid.load_needed_points(&[vec![]]),
            Err(SparseGridError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            grid.evaluate(&[0.0, 0.0]),
            Err(SparseGridError::UnsupportedOperation { .. })
        ));
    }
}

#[test]
fn test_zero_output_global_grid_still_integrates_by_weights() {
    let grid = GlobalGridBuilder::new(2, 0, 2).build().unwrap();
    let total: f64 = grid.get_weights().unwrap().iter().sum();
    assert_abs_diff_eq!(total, 4.0, epsilon = 1e-14);
}

// ============================================================================
// Errors leave the grid unchanged
// ============================================================================

#[test]
fn test_not_ready_before_load() {
    for grid in grids(1) {
        assert!(matches!(
            grid.evaluate(&[0.0, 0.0]),
            Err(SparseGridError::NotReady { .. })
        ));
        assert!(matches!(
            grid.integrate(),
            Err(SparseGridError::NotReady { .. })
        ));
    }
}

#[test]
fn test_wrong_row_count_is_rejected() {
    for mut grid in grids(1) {
        let mut values = values_for(&grid);
        values.pop();
        assert!(matches!(
            grid.load_needed_points(&values),
            Err(SparseGridError::Shape { .. })
        ));
        assert_eq!(grid.num_loaded_points(), 0);
        assert_eq!(grid.num_needed_points(), grid.num_points());
    }
}

#[test]
fn test_wrong_row_width_is_rejected() {
    for mut grid in grids(2) {
        let mut values = values_for(&grid);
        values[0].push(1.0);
        assert!(matches!(
            grid.load_needed_points(&values),
            Err(SparseGridError::Shape { .. })
        ));
        assert_eq!(grid.num_loaded_points(), 0);
    }
}

#[test]
fn test_wrong_point_dimension_is_rejected() {
    for mut grid in grids(1) {
        let values = values_for(&grid);
        grid.load_needed_points(&values).unwrap();
        assert!(matches!(
            grid.evaluate(&[0.0]),
            Err(SparseGridError::Shape { .. })
        ));
        assert!(matches!(
            grid.evaluate(&[0.0, 0.0, 0.0]),
            Err(SparseGridError::Shape { .. })
        ));
    }
}

#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        GlobalGridBuilder::new(0, 1, 3).build(),
        Err(SparseGridError::Configuration { .. })
    ));
    assert!(matches!(
        GlobalGridBuilder::new(2, 1, 3)
            .with_anisotropic_weights(vec![1])
            .build(),
        Err(SparseGridError::Configuration { .. })
    ));
    assert!(matches!(
        LocalGridBuilder::new(2, 1, 3).with_order(4).build(),
        Err(SparseGridError::Configuration { .. })
    ));
}

#[test]
fn test_invalid_refinement_options() {
    let mut grid = LocalGridBuilder::new(2, 1, 2).build().unwrap();
    let values = values_for(&grid);
    grid.load_needed_points(&values).unwrap();

    let negative = RefinementOptions::default().with_tolerance(-1.0);
    assert!(matches!(
        grid.set_refinement_with(&negative),
        Err(SparseGridError::Configuration { .. })
    ));
    let bad_output = RefinementOptions::default().with_output(3);
    assert!(grid.set_refinement_with(&bad_output).is_err());
    assert_eq!(grid.num_needed_points(), 0);
}

// ============================================================================
// Domain transform
// ============================================================================

#[test]
fn test_transform_applies_to_every_engine() {
    for mut grid in grids(1) {
        let canonical = grid.get_points();
        grid.set_transform_ab(&[2.0, -3.0], &[4.0, 1.0]).unwrap();
        let physical = grid.get_points();
        for (c, p) in canonical.iter().zip(&physical) {
            assert_abs_diff_eq!(p[0], 3.0 + c[0], epsilon = 1e-15);
            assert_abs_diff_eq!(p[1], -1.0 + 2.0 * c[1], epsilon = 1e-15);
        }

        let values: Vec<Vec<f64>> = physical.iter().map(|x| vec![x[0] + x[1]]).collect();
        grid.load_needed_points(&values).unwrap();
        // int over [2,4] x [-3,1] of x + y = 8 * (3 - 1)
        assert_abs_diff_eq!(grid.integrate().unwrap()[0], 16.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.evaluate(&[3.5, 0.0]).unwrap()[0], 3.5, epsilon = 1e-12);
    }
}
