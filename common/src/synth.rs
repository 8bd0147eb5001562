use crate::geom::point::Point;
use crate::geom::rect::Rect;
use crate::model::core::{
    Bump, CapacityGrid, Chip, CostConstants, CostLayer, EdgeCapacity, GcellGrid, Layer,
    RoutingProblem,
};
use crate::util::config::{CapacityConfig, ChipConfig, CostConfig, GeneratorConfig};
use rand::Rng;
use std::collections::BTreeMap;

pub fn synthesize(config: &GeneratorConfig) -> Result<RoutingProblem, String> {
    let mut rng = rand::thread_rng();
    synthesize_with(config, &mut rng)
}

pub fn synthesize_with<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<RoutingProblem, String> {
    let area = Rect::from_ll_size(
        Point::new(config.area.x, config.area.y),
        config.area.width,
        config.area.height,
    );
    let grid = GcellGrid::over(area, config.area.gcell_width, config.area.gcell_height)?;

    let net_count = config.nets.count;
    if net_count == 0 {
        return Err("net count must be at least 1".to_string());
    }

    log::info!(
        "Synthesizing testcase: {}x{} area, {}x{} grid, {} nets",
        area.width(),
        area.height(),
        grid.width,
        grid.height,
        net_count
    );

    let chips = [
        place_chip(&config.chip1, area, &grid, net_count, rng)?,
        place_chip(&config.chip2, area, &grid, net_count, rng)?,
    ];
    let layers = synthesize_costs(&grid, &chips, &config.cost, rng);
    let capacities = synthesize_capacities(&grid, &config.capacity, rng)?;

    let constants = CostConstants {
        alpha: config.cost.alpha,
        beta: config.cost.beta,
        gamma: config.cost.gamma,
        delta: config.cost.delta,
        via_cost: config.cost.via_cost,
    };

    Ok(RoutingProblem {
        area,
        grid,
        chips,
        constants,
        layers,
        capacities,
        nets: BTreeMap::new(),
    })
}

/// Places one chip and scatters its bumps. Bump offsets snap to the
/// chip-local gcell grid, both bounds inclusive, so a bump can sit on the
/// chip's far edge.
fn place_chip<R: Rng>(
    config: &ChipConfig,
    area: Rect,
    grid: &GcellGrid,
    net_count: usize,
    rng: &mut R,
) -> Result<Chip, String> {
    if config.width <= 0 || config.height <= 0 {
        return Err(format!(
            "non-positive chip size {}x{}",
            config.width, config.height
        ));
    }
    let rect = Rect::from_ll_size(
        area.min + Point::new(config.x, config.y),
        config.width,
        config.height,
    );
    if rect.min.x < area.min.x
        || rect.min.y < area.min.y
        || rect.max.x > area.max.x
        || rect.max.y > area.max.y
    {
        return Err(format!(
            "chip at ({}, {}) extends outside the routing area",
            config.x, config.y
        ));
    }

    let cells_w = config.width / grid.cell_w;
    let cells_h = config.height / grid.cell_h;
    let mut bumps = Vec::with_capacity(net_count);
    for idx in 1..=net_count as u32 {
        let dx = rng.gen_range(0..=cells_w) * grid.cell_w;
        let dy = rng.gen_range(0..=cells_h) * grid.cell_h;
        bumps.push(Bump {
            idx,
            position: rect.min + Point::new(dx, dy),
        });
    }
    Ok(Chip { rect, bumps })
}

fn synthesize_costs<R: Rng>(
    grid: &GcellGrid,
    chips: &[Chip; 2],
    cost: &CostConfig,
    rng: &mut R,
) -> [CostLayer; 2] {
    // Distances are taken in gcell-index space so the on-chip plateau
    // coincides with the chip footprint.
    let footprints = [
        grid_footprint(grid, &chips[0].rect),
        grid_footprint(grid, &chips[1].rect),
    ];
    [
        synthesize_layer(grid, &footprints, Layer::M1, cost, rng),
        synthesize_layer(grid, &footprints, Layer::M2, cost, rng),
    ]
}

fn grid_footprint(grid: &GcellGrid, rect: &Rect) -> Rect {
    Rect::new(
        Point::new(
            (rect.min.x - grid.origin.x) / grid.cell_w,
            (rect.min.y - grid.origin.y) / grid.cell_h,
        ),
        Point::new(
            (rect.max.x - grid.origin.x) / grid.cell_w,
            (rect.max.y - grid.origin.y) / grid.cell_h,
        ),
    )
}

/// On-chip cells cost `on_chip_base` with a narrow jitter on both layers;
/// everywhere else the cost decays linearly with the distance to the
/// layer's home chip, clamped to 1 before a wide jitter. One independent
/// draw per cell per layer.
fn synthesize_layer<R: Rng>(
    grid: &GcellGrid,
    footprints: &[Rect; 2],
    layer: Layer,
    cost: &CostConfig,
    rng: &mut R,
) -> CostLayer {
    let mut values = Vec::with_capacity(grid.len());
    for row in 0..grid.height {
        for col in 0..grid.width {
            let cell = Point::new(col as i32, row as i32);
            let d1 = footprints[0].manhattan_distance(cell);
            let d2 = footprints[1].manhattan_distance(cell);
            let value = if d1 == 0 || d2 == 0 {
                cost.on_chip_base * rng.gen_range(0.9..1.1)
            } else {
                let d = match layer {
                    Layer::M1 => d1,
                    Layer::M2 => d2,
                };
                (cost.on_chip_base - d as f64).max(1.0) * rng.gen_range(0.5..2.0)
            };
            values.push(value);
        }
    }
    CostLayer {
        width: grid.width,
        height: grid.height,
        values,
    }
}

fn synthesize_capacities<R: Rng>(
    grid: &GcellGrid,
    config: &CapacityConfig,
    rng: &mut R,
) -> Result<CapacityGrid, String> {
    if config.min > config.max {
        return Err(format!(
            "capacity interval [{}, {}] is empty",
            config.min, config.max
        ));
    }
    let cells = (0..grid.len())
        .map(|_| EdgeCapacity {
            left: rng.gen_range(config.min..=config.max),
            bottom: rng.gen_range(config.min..=config.max),
        })
        .collect();
    Ok(CapacityGrid {
        width: grid.width,
        height: grid.height,
        cells,
    })
}
