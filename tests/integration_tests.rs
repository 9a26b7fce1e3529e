//! Integration tests for the Tessera grid layout engine.

use tessera::{
    Config, Dataset, FeatureView, GridConfig, GridShape, ImageGrid, Lattice, ProjectionConfig,
    Projector, ReductionMethod, Result, TesseraError, EMPTY_CELL,
};

/// Creates `clusters` groups of `per_cluster` embeddings with small,
/// deterministic jitter around well-separated centers.
fn create_clustered_dataset(clusters: usize, per_cluster: usize, dim: usize) -> Dataset<String> {
    let mut dataset = Dataset::with_capacity(dim, clusters * per_cluster);
    for c in 0..clusters {
        for i in 0..per_cluster {
            let features: Vec<f64> = (0..dim)
                .map(|d| {
                    let center = if d % clusters == c { 10.0 } else { 0.0 };
                    let jitter = (((i + 1) * (d + 3) * 7919) % 101) as f64 / 1000.0;
                    center + jitter
                })
                .collect();
            dataset
                .push(&features, format!("img_{}_{}.jpg", c, i))
                .unwrap();
        }
    }
    dataset
}

/// Wraps precomputed 2D coordinates in a grid whose payloads are indices.
fn grid_from_points(points: &[[f64; 2]]) -> ImageGrid<usize> {
    let dataset =
        Dataset::from_rows(points.iter().enumerate().map(|(i, p)| (p.to_vec(), i))).unwrap();
    ImageGrid::from_projection(dataset, points.to_vec()).unwrap()
}

/// Minimal assignment cost by exhaustive search over injective maps.
fn brute_force_cost(cells: &[[f64; 2]], points: &[[f64; 2]]) -> f64 {
    fn search(
        cells: &[[f64; 2]],
        points: &[[f64; 2]],
        next: usize,
        used: &mut Vec<bool>,
        acc: f64,
        best: &mut f64,
    ) {
        if next == points.len() {
            *best = best.min(acc);
            return;
        }
        for c in 0..cells.len() {
            if used[c] {
                continue;
            }
            let dx = cells[c][0] - points[next][0];
            let dy = cells[c][1] - points[next][1];
            used[c] = true;
            search(cells, points, next + 1, used, acc + dx * dx + dy * dy, best);
            used[c] = false;
        }
    }

    let mut best = f64::INFINITY;
    search(cells, points, 0, &mut vec![false; cells.len()], 0.0, &mut best);
    best
}

#[test]
fn test_scenario_unit_square() {
    let grid = grid_from_points(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    let result = grid.process(&GridConfig::square()).unwrap();

    assert_eq!(result.shape(), GridShape::new(2, 2));
    assert_eq!(result.filled(), 4);
    assert_eq!(result.empty(), 0);

    // Every corner keeps its own cell, no crossings.
    assert_eq!(result.slots(), &[Some(0), Some(1), Some(2), Some(3)]);
    assert_eq!(result.position_of(3).unwrap().col, 1);
    assert_eq!(result.position_of(3).unwrap().row, 1);

    // Cells sit at lower-left corners: (0,0), (.5,0), (0,.5), (.5,.5).
    assert!((result.cost() - 1.0).abs() < 1e-12);
}

#[test]
fn test_scenario_five_points() {
    let grid = grid_from_points(&[[0.0, 0.0], [4.0, 1.0], [1.0, 3.0], [2.0, 2.0], [3.0, 4.0]]);
    let result = grid.process(&GridConfig::default()).unwrap();

    let shape = result.shape();
    assert!(shape.size_x >= 3 && shape.size_y >= 3);
    assert!(shape.cells() >= 9);
    assert_eq!(result.filled(), 5);
    assert_eq!(result.empty(), shape.cells() - 5);
    assert_eq!(
        result.grid_indices().iter().filter(|&&i| i == EMPTY_CELL).count(),
        shape.cells() - 5
    );
}

#[test]
fn test_scenario_empty_input() {
    let dataset: Dataset<String> = Dataset::new(16);
    let grid = ImageGrid::new(dataset, &ProjectionConfig::default()).unwrap();
    assert!(grid.is_empty());

    let result = grid.process(&GridConfig::default()).unwrap();
    assert_eq!(result.shape(), GridShape::new(1, 1));
    assert_eq!(result.filled(), 0);
    assert_eq!(result.cost(), 0.0);

    let result = grid.process(&GridConfig::with_size(0, 0)).unwrap();
    assert_eq!(result.shape(), GridShape::new(1, 1));

    let result = grid.process(&GridConfig::with_size(3, 2)).unwrap();
    assert_eq!(result.slots().len(), 6);
    assert!(result.slots().iter().all(|s| s.is_none()));
    assert_eq!(result.grid_indices(), vec![EMPTY_CELL; 6]);
    assert_eq!(result.cost(), 0.0);
}

#[test]
fn test_scenario_grid_too_small() {
    let grid = grid_from_points(&[[0.0, 0.0], [1.0, 1.0]]);
    let err = grid.process(&GridConfig::with_size(1, 1)).unwrap_err();
    assert_eq!(
        err,
        TesseraError::PreconditionViolation {
            cells: 1,
            points: 2
        }
    );
}

#[test]
fn test_computed_shape_always_fits() {
    for n in 0..40 {
        let points: Vec<[f64; 2]> = (0..n)
            .map(|i| [((i * 13) % 17) as f64, ((i * i) % 23) as f64])
            .collect();
        let grid = grid_from_points(&points);

        for square in [false, true] {
            let config = GridConfig {
                use_default_square: square,
                ..Default::default()
            };
            let shape = grid.resolve_shape(&config).unwrap();
            assert!(shape.size_x >= 1 && shape.size_y >= 1);
            assert!(shape.cells() >= n, "n={} shape={:?}", n, shape);
        }
    }
}

#[test]
fn test_one_sided_size() {
    let points: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, (i % 3) as f64]).collect();
    let grid = grid_from_points(&points);

    let config = GridConfig {
        size_x: Some(4),
        ..Default::default()
    };
    let result = grid.process(&config).unwrap();
    assert_eq!(result.shape(), GridShape::new(4, 3));
    assert_eq!(result.filled(), 10);
}

#[test]
fn test_cost_is_minimal() {
    let grid = grid_from_points(&[[0.3, 0.9], [0.1, 0.2], [0.8, 0.4], [0.5, 0.5], [0.95, 0.05]]);
    let result = grid.process(&GridConfig::with_size(3, 2)).unwrap();

    let cells = Lattice::new(result.shape()).coordinates();
    let best = brute_force_cost(&cells, grid.normalized_points());
    assert!((result.cost() - best).abs() < 1e-12, "{} vs {}", result.cost(), best);
}

#[test]
fn test_index_round_trip() {
    let dataset = create_clustered_dataset(3, 7, 6);
    let grid = ImageGrid::new(dataset, &ProjectionConfig::for_method(ReductionMethod::Pca)).unwrap();
    let result = grid.process(&GridConfig::default()).unwrap();
    let size_x = result.shape().size_x;

    for i in 0..grid.len() {
        let pos = result.position_of(i).unwrap();
        assert_eq!(result.slot(pos.col, pos.row), grid.dataset().payload(i));
    }
    for (cell, &index) in result.grid_indices().iter().enumerate() {
        if index != EMPTY_CELL {
            assert_eq!(result.position_of(index as usize).unwrap().to_linear(size_x), cell);
        }
    }

    let rows: Vec<_> = result.rows().collect();
    assert_eq!(rows.len(), result.shape().size_y);
    assert!(rows.iter().all(|r| r.len() == size_x));
}

#[test]
fn test_deterministic_for_every_method() {
    for method in ReductionMethod::ALL {
        let config = ProjectionConfig::for_method(method);
        let run = || {
            let grid = ImageGrid::new(create_clustered_dataset(3, 10, 8), &config).unwrap();
            grid.process(&GridConfig::default()).unwrap()
        };

        let a = run();
        let b = run();
        assert_eq!(a.shape(), b.shape(), "{}", method);
        assert_eq!(a.grid_indices(), b.grid_indices(), "{}", method);
        assert_eq!(a.slots(), b.slots(), "{}", method);
        assert_eq!(a.cost(), b.cost(), "{}", method);
        assert_eq!(a.filled(), 30, "{}", method);
    }
}

#[test]
fn test_similar_items_are_neighbors() {
    // Two tight groups. PCA puts them at opposite ends of the first axis and
    // collapses the second, so each group fills its own half of the columns.
    let mut dataset = Dataset::new(3);
    for i in 0..8 {
        dataset.push(&[0.0, 0.0, 0.0], ('a', i)).unwrap();
    }
    for i in 0..8 {
        dataset.push(&[10.0, 10.0, 10.0], ('b', i)).unwrap();
    }

    let grid = ImageGrid::new(dataset, &ProjectionConfig::for_method(ReductionMethod::Pca)).unwrap();
    let result = grid.process(&GridConfig::square()).unwrap();
    assert_eq!(result.shape(), GridShape::new(4, 4));

    let cols = |group: char| -> Vec<usize> {
        (0..16)
            .filter(|&i| grid.dataset().payload(i).unwrap().0 == group)
            .map(|i| result.position_of(i).unwrap().col)
            .collect()
    };
    let (a, b) = (cols('a'), cols('b'));
    let a_left = a.iter().max() < b.iter().min();
    let a_right = a.iter().min() > b.iter().max();
    assert!(a_left || a_right, "a={:?} b={:?}", a, b);
}

struct FirstTwoFeatures;

impl Projector for FirstTwoFeatures {
    fn name(&self) -> &'static str {
        "first-two"
    }

    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>> {
        Ok((0..data.rows())
            .map(|i| [data.row(i)[0], data.row(i)[1]])
            .collect())
    }
}

struct DropsOne;

impl Projector for DropsOne {
    fn name(&self) -> &'static str {
        "drops-one"
    }

    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>> {
        Ok(vec![[0.0, 0.0]; data.rows().saturating_sub(1)])
    }
}

#[test]
fn test_custom_projector() {
    let dataset = Dataset::from_rows(vec![
        (vec![0.0, 0.0, 5.0], "a"),
        (vec![2.0, 4.0, 5.0], "b"),
        (vec![1.0, 2.0, 5.0], "c"),
    ])
    .unwrap();
    let grid = ImageGrid::with_projector(dataset, &FirstTwoFeatures).unwrap();
    assert_eq!(
        grid.normalized_points(),
        &[[0.0, 0.0], [1.0, 1.0], [0.5, 0.5]]
    );

    let result = grid.process(&GridConfig::square()).unwrap();
    assert_eq!(result.slot(0, 0), Some(&"a"));
}

#[test]
fn test_projector_length_mismatch() {
    let dataset = create_clustered_dataset(2, 3, 4);
    let err = ImageGrid::with_projector(dataset, &DropsOne).unwrap_err();
    assert_eq!(
        err,
        TesseraError::ProjectionMismatch {
            expected: 6,
            actual: 5
        }
    );
}

#[test]
fn test_dimension_mismatch() {
    let mut dataset = Dataset::new(3);
    dataset.push(&[1.0, 2.0, 3.0], ()).unwrap();
    let err = dataset.push(&[1.0, 2.0], ()).unwrap_err();
    assert_eq!(
        err,
        TesseraError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "grid": { "size_x": 6, "use_default_square": false },
        "projection": { "method": "pca", "seed": 7 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    config.validate().unwrap();
    assert_eq!(config.projection.method, ReductionMethod::Pca);

    let grid = ImageGrid::new(create_clustered_dataset(2, 9, 4), &config.projection).unwrap();
    let result = grid.process(&config.grid).unwrap();
    assert_eq!(result.shape(), GridShape::new(6, 3));
    assert_eq!(result.filled(), 18);
}

#[test]
fn test_reprocess_with_different_shapes() {
    let grid = ImageGrid::new(create_clustered_dataset(2, 6, 5), &ProjectionConfig::default()).unwrap();

    let wide = grid.process(&GridConfig::with_size(12, 1)).unwrap();
    let tall = grid.process(&GridConfig::with_size(1, 12)).unwrap();
    let roomy = grid.process(&GridConfig::with_size(5, 5)).unwrap();

    assert_eq!(wide.filled(), 12);
    assert_eq!(tall.filled(), 12);
    assert_eq!(roomy.empty(), 13);
    assert_eq!(grid.len(), 12);
}
