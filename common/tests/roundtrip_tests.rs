//! Synthesis properties and write/parse round trips.
//!
//! Covers:
//! - Synthesized costs, capacities and bumps honoring their configured
//!   bounds
//! - Bump indices forming exactly 1..=n per chip, snapped to the chip-local
//!   gcell grid
//! - Writing a synthesized problem and loading it back reproduces the model
//!   (exact for integers, two-decimal rounding for costs)

use d2d_common::model::core::RoutingProblem;
use d2d_common::synth;
use d2d_common::util::config::{
    AreaConfig, CapacityConfig, ChipConfig, CostConfig, GeneratorConfig, NetConfig,
};
use d2d_common::{formats, model};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn small_config() -> GeneratorConfig {
    GeneratorConfig {
        area: AreaConfig {
            x: 0,
            y: 0,
            width: 300,
            height: 200,
            gcell_width: 10,
            gcell_height: 10,
        },
        chip1: ChipConfig {
            x: 20,
            y: 20,
            width: 60,
            height: 60,
        },
        chip2: ChipConfig {
            x: 200,
            y: 120,
            width: 60,
            height: 60,
        },
        nets: NetConfig { count: 5 },
        cost: CostConfig {
            alpha: 1.1,
            beta: 100.0,
            gamma: 1.1,
            delta: 0.7,
            via_cost: 20.0,
            on_chip_base: 50.0,
        },
        capacity: CapacityConfig { min: 1, max: 3 },
    }
}

fn synthesized() -> RoutingProblem {
    let mut rng = StdRng::seed_from_u64(42);
    synth::synthesize_with(&small_config(), &mut rng).unwrap()
}

#[test]
fn costs_are_strictly_positive() {
    let problem = synthesized();
    // Off-chip costs are clamped to 1 before the 0.5..2.0 jitter; on-chip
    // costs sit near the base. Nothing may fall below half the clamp.
    for layer in &problem.layers {
        assert_eq!(layer.values.len(), problem.grid.len());
        for &value in &layer.values {
            assert!(value >= 0.5, "cost {} below floor", value);
        }
    }
}

#[test]
fn on_chip_cells_cost_near_base_on_both_layers() {
    let problem = synthesized();
    // A cell in the middle of chip1 is on-chip for both layers.
    let (col, row) = problem
        .grid
        .cell_of(d2d_common::geom::point::Point::new(50, 50))
        .unwrap();
    for layer in &problem.layers {
        let value = layer.get(col, row);
        assert!((45.0..=55.0).contains(&value), "on-chip cost {}", value);
    }
}

#[test]
fn capacities_stay_in_configured_interval() {
    let problem = synthesized();
    assert_eq!(problem.capacities.cells.len(), problem.grid.len());
    for cell in &problem.capacities.cells {
        assert!((1..=3).contains(&cell.left));
        assert!((1..=3).contains(&cell.bottom));
    }
}

#[test]
fn bump_indices_are_exactly_one_to_n() {
    let problem = synthesized();
    for chip in &problem.chips {
        let mut indices: Vec<u32> = chip.bumps.iter().map(|b| b.idx).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn bumps_snap_to_the_chip_local_grid() {
    let problem = synthesized();
    for chip in &problem.chips {
        for bump in &chip.bumps {
            let off = bump.position - chip.rect.min;
            assert_eq!(off.x % 10, 0);
            assert_eq!(off.y % 10, 0);
            assert!(chip.rect.contains(bump.position));
        }
    }
}

#[test]
fn write_then_load_reproduces_the_model() {
    let problem = synthesized();
    let dir = TempDir::new().unwrap();
    let gmp = dir.path().join("t.gmp").display().to_string();
    let gcl = dir.path().join("t.gcl").display().to_string();
    let cst = dir.path().join("t.cst").display().to_string();

    formats::placement::write(&problem, &gmp).unwrap();
    formats::capacity::write(&problem, &gcl).unwrap();
    formats::cost::write(&problem, &cst).unwrap();

    let loaded = RoutingProblem::load(&gmp, &gcl, &cst, None).unwrap();

    assert_eq!(loaded.area, problem.area);
    assert_eq!(loaded.grid, problem.grid);
    for i in 0..2 {
        assert_eq!(loaded.chips[i].rect, problem.chips[i].rect);
        assert_eq!(loaded.chips[i].bumps, problem.chips[i].bumps);
    }
    assert_eq!(loaded.capacities.cells, problem.capacities.cells);
    assert_eq!(loaded.constants, problem.constants);

    for layer in 0..model::core::NUM_LAYERS {
        for (parsed, original) in loaded.layers[layer]
            .values
            .iter()
            .zip(problem.layers[layer].values.iter())
        {
            assert!(
                (parsed - original).abs() < 0.006,
                "cost {} drifted to {}",
                original,
                parsed
            );
        }
    }
}
