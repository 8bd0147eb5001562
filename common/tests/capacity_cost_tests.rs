//! Capacity and cost format parsing.
//!
//! Covers:
//! - Row-major record order against the grid established by the placement
//! - Arity failure on short records (no partial grid escapes)
//! - Record-count and layer-count consistency checks
//! - Scalar command handling and positional layer blocks

use d2d_common::formats::{capacity, cost, FormatError};
use d2d_common::geom::point::Point;
use d2d_common::geom::rect::Rect;
use d2d_common::model::core::GcellGrid;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn grid_3x2() -> GcellGrid {
    let area = Rect::from_ll_size(Point::new(0, 0), 30, 20);
    GcellGrid::over(area, 10, 10).unwrap()
}

#[test]
fn parses_capacity_grid() {
    let content = "\
.ec
1 2
2 3
3 1
1 1
2 2
3 3
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "basic.gcl", content);

    let grid = capacity::parse(&path, &grid_3x2()).unwrap();
    assert_eq!(grid.cells.len(), 6);
    assert_eq!(grid.get(0, 0).left, 1);
    assert_eq!(grid.get(0, 0).bottom, 2);
    assert_eq!(grid.get(2, 0).left, 3);
    assert_eq!(grid.get(0, 1).left, 1);
    assert_eq!(grid.get(2, 1).bottom, 3);
}

#[test]
fn short_capacity_record_is_arity_error() {
    let content = "\
.ec
1 2
3
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "short.gcl", content);

    let err = capacity::parse(&path, &grid_3x2()).unwrap_err();
    assert!(
        matches!(
            err,
            FormatError::Arity {
                expected: 2,
                found: 1,
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[test]
fn capacity_record_count_must_match_grid() {
    let content = "\
.ec
1 2
2 3
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "count.gcl", content);

    let err = capacity::parse(&path, &grid_3x2()).unwrap_err();
    assert!(matches!(err, FormatError::Consistency { .. }), "{:?}", err);
}

#[test]
fn capacity_record_before_ec_is_structural() {
    let content = "\
1 2
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "noec.gcl", content);

    let err = capacity::parse(&path, &grid_3x2()).unwrap_err();
    assert!(matches!(err, FormatError::Structural { .. }), "{:?}", err);
}

#[test]
fn parses_cost_file() {
    let content = "\
.alpha 1.1
.beta 100
.gamma 1.1
.delta 0.7
.v
20
.l
1.00 2.00 3.00
4.00 5.00 6.00
.l
10.50 20.25 30.00
40.00 50.00 60.75
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "basic.cst", content);

    let (constants, layers) = cost::parse(&path, &grid_3x2()).unwrap();
    assert_eq!(constants.alpha, 1.1);
    assert_eq!(constants.beta, 100.0);
    assert_eq!(constants.gamma, 1.1);
    assert_eq!(constants.delta, 0.7);
    assert_eq!(constants.via_cost, 20.0);

    // Row 0 is the first emitted line; the first block is M1.
    assert_eq!(layers[0].get(0, 0), 1.0);
    assert_eq!(layers[0].get(2, 0), 3.0);
    assert_eq!(layers[0].get(1, 1), 5.0);
    assert_eq!(layers[1].get(1, 0), 20.25);
    assert_eq!(layers[1].get(2, 1), 60.75);
}

#[test]
fn short_cost_row_is_arity_error() {
    let content = "\
.alpha 1.1
.beta 100
.gamma 1.1
.delta 0.7
.v
20
.l
1.00 2.00
4.00 5.00 6.00
.l
1.00 2.00 3.00
4.00 5.00 6.00
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "short.cst", content);

    let err = cost::parse(&path, &grid_3x2()).unwrap_err();
    assert!(
        matches!(
            err,
            FormatError::Arity {
                expected: 3,
                found: 2,
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[test]
fn missing_layer_block_is_rejected() {
    let content = "\
.alpha 1.1
.beta 100
.gamma 1.1
.delta 0.7
.v
20
.l
1.00 2.00 3.00
4.00 5.00 6.00
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "onelayer.cst", content);

    let err = cost::parse(&path, &grid_3x2()).unwrap_err();
    assert!(matches!(err, FormatError::Consistency { .. }), "{:?}", err);
}

#[test]
fn third_layer_block_is_structural() {
    let content = "\
.alpha 1.1
.beta 100
.gamma 1.1
.delta 0.7
.v
20
.l
1.00 2.00 3.00
4.00 5.00 6.00
.l
1.00 2.00 3.00
4.00 5.00 6.00
.l
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "threelayers.cst", content);

    let err = cost::parse(&path, &grid_3x2()).unwrap_err();
    assert!(matches!(err, FormatError::Structural { .. }), "{:?}", err);
}

#[test]
fn missing_via_cost_is_rejected() {
    let content = "\
.alpha 1.1
.beta 100
.gamma 1.1
.delta 0.7
.l
1.00 2.00 3.00
4.00 5.00 6.00
.l
1.00 2.00 3.00
4.00 5.00 6.00
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "novia.cst", content);

    let err = cost::parse(&path, &grid_3x2()).unwrap_err();
    assert!(matches!(err, FormatError::Consistency { .. }), "{:?}", err);
}

#[test]
fn scalar_without_value_is_arity_error() {
    let content = "\
.alpha
";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "scalar.cst", content);

    let err = cost::parse(&path, &grid_3x2()).unwrap_err();
    assert!(
        matches!(
            err,
            FormatError::Arity {
                expected: 2,
                found: 1,
                ..
            }
        ),
        "{:?}",
        err
    );
}
