use crate::formats;
use crate::formats::FormatError;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use crate::model::indices::NetId;
use std::collections::BTreeMap;

pub const NUM_LAYERS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    M1,
    M2,
}

impl Layer {
    pub fn index(self) -> usize {
        match self {
            Layer::M1 => 0,
            Layer::M2 => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bump {
    pub idx: u32,
    /// Absolute position; the placement file stores the offset from the
    /// owning chip's lower-left corner.
    pub position: Point<i32>,
}

#[derive(Clone, Debug)]
pub struct Chip {
    pub rect: Rect,
    pub bumps: Vec<Bump>,
}

impl Chip {
    pub fn bump(&self, idx: u32) -> Option<&Bump> {
        self.bumps.iter().find(|b| b.idx == idx)
    }
}

/// The uniform gcell grid overlaid on the routing area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GcellGrid {
    pub origin: Point<i32>,
    pub cell_w: i32,
    pub cell_h: i32,
    /// Grid dimensions in cells.
    pub width: usize,
    pub height: usize,
}

impl GcellGrid {
    /// Fails unless the area divides into whole gcells.
    pub fn over(area: Rect, cell_w: i32, cell_h: i32) -> Result<Self, String> {
        if cell_w <= 0 || cell_h <= 0 {
            return Err(format!("non-positive gcell size {}x{}", cell_w, cell_h));
        }
        if area.width() % cell_w != 0 || area.height() % cell_h != 0 {
            return Err(format!(
                "routing area {}x{} is not a whole multiple of the gcell size {}x{}",
                area.width(),
                area.height(),
                cell_w,
                cell_h
            ));
        }
        Ok(Self {
            origin: area.min,
            cell_w,
            cell_h,
            width: (area.width() / cell_w) as usize,
            height: (area.height() / cell_h) as usize,
        })
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_origin(&self, col: usize, row: usize) -> Point<i32> {
        Point::new(
            self.origin.x + col as i32 * self.cell_w,
            self.origin.y + row as i32 * self.cell_h,
        )
    }

    /// Grid coordinates of the cell containing `p`, if any.
    pub fn cell_of(&self, p: Point<i32>) -> Option<(usize, usize)> {
        let dx = p.x - self.origin.x;
        let dy = p.y - self.origin.y;
        if dx < 0 || dy < 0 {
            return None;
        }
        let col = (dx / self.cell_w) as usize;
        let row = (dy / self.cell_h) as usize;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some((col, row))
    }
}

/// One per-cell cost map, row-major with row 0 at the first emitted line.
#[derive(Clone, Debug)]
pub struct CostLayer {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl CostLayer {
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.width + col]
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::MIN, f64::max)
    }
}

/// Routing capacities of a cell's left and bottom edges. The left edge is
/// crossed by horizontal (M2) wires, the bottom edge by vertical (M1) wires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeCapacity {
    pub left: u32,
    pub bottom: u32,
}

#[derive(Clone, Debug)]
pub struct CapacityGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<EdgeCapacity>,
}

impl CapacityGrid {
    pub fn get(&self, col: usize, row: usize) -> EdgeCapacity {
        self.cells[row * self.width + col]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostConstants {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub via_cost: f64,
}

/// A reconstructed net route: the chip1 bump position followed by every
/// segment endpoint in file order. Via markers contribute no point but are
/// counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Net {
    pub id: NetId,
    pub points: Vec<Point<i32>>,
    pub vias: u32,
}

/// The fully loaded test problem. Owns every sub-entity; constructed whole
/// by `load` or by synthesis, never exposed partially populated.
#[derive(Clone, Debug)]
pub struct RoutingProblem {
    pub area: Rect,
    pub grid: GcellGrid,
    pub chips: [Chip; 2],
    pub constants: CostConstants,
    pub layers: [CostLayer; NUM_LAYERS],
    pub capacities: CapacityGrid,
    pub nets: BTreeMap<NetId, Net>,
}

impl RoutingProblem {
    /// Loads a problem from its three input files plus an optional routing
    /// result. The placement file must be parsed first: the grid dimensions
    /// and chip frames it establishes are what the other files are checked
    /// against.
    pub fn load(
        gmp: &str,
        gcl: &str,
        cst: &str,
        lg: Option<&str>,
    ) -> Result<Self, FormatError> {
        let placement = formats::placement::parse(gmp)?;
        let capacities = formats::capacity::parse(gcl, &placement.grid)?;
        let (constants, layers) = formats::cost::parse(cst, &placement.grid)?;

        let nets = match lg {
            Some(path) => {
                let traces = formats::route::parse(path)?;
                formats::route::reconstruct(path, &traces, &placement.chips[0])?
            }
            None => BTreeMap::new(),
        };

        Ok(Self {
            area: placement.area,
            grid: placement.grid,
            chips: placement.chips,
            constants,
            layers,
            capacities,
            nets,
        })
    }

    pub fn net_count(&self) -> usize {
        self.chips[0].bumps.len()
    }
}
