use crate::formats::route::{NetTrace, RouteEvent};
use crate::geom::point::Point;
use crate::model::core::{Layer, RoutingProblem};
use crate::model::indices::NetId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NetScore {
    pub wirelength: i64,
    pub overflow: u32,
    pub cell_cost: f64,
    pub via_count: u32,
    pub total_cost: f64,
}

#[derive(Clone, Debug, Default)]
pub struct EvalReport {
    pub nets: Vec<(NetId, NetScore)>,
    pub total: NetScore,
    pub violations: Vec<String>,
}

/// Scores a parsed route set against the loaded problem.
///
/// Wirelength is alpha-weighted in the total; every entered gcell adds its
/// layer cost (gamma-weighted); each via costs `delta * via_cost` and splits
/// the turn cell's cost between both layers; edge crossings beyond the
/// configured capacity add a `beta * max_cell_cost / 2` penalty each.
/// Congestion accumulates across nets in file order, so an edge's first
/// crossings are free and later nets pay for the overflow they cause.
pub fn evaluate(problem: &RoutingProblem, traces: &[NetTrace]) -> EvalReport {
    log::info!("Evaluating {} route blocks", traces.len());

    let max_cell_cost = problem.layers[0]
        .max_value()
        .max(problem.layers[1].max_value());

    let mut ctx = EvalContext {
        problem,
        overflow_penalty: problem.constants.beta * 0.5 * max_cell_cost,
        via_cost: problem.constants.delta * problem.constants.via_cost,
        left_used: vec![0; problem.grid.len()],
        bottom_used: vec![0; problem.grid.len()],
        violations: Vec::new(),
    };

    let mut report = EvalReport::default();
    for trace in traces {
        if let Some(score) = ctx.score_net(trace) {
            report.nets.push((trace.id, score));
        }
    }

    for (_, score) in &report.nets {
        report.total.wirelength += score.wirelength;
        report.total.overflow += score.overflow;
        report.total.cell_cost += score.cell_cost;
        report.total.via_count += score.via_count;
        report.total.total_cost += score.total_cost;
    }
    report.violations = ctx.violations;
    report
}

struct EvalContext<'a> {
    problem: &'a RoutingProblem,
    overflow_penalty: f64,
    via_cost: f64,
    left_used: Vec<u32>,
    bottom_used: Vec<u32>,
    violations: Vec<String>,
}

impl EvalContext<'_> {
    fn cost(&self, layer: Layer, col: usize, row: usize) -> f64 {
        self.problem.layers[layer.index()].get(col, row)
    }

    fn score_net(&mut self, trace: &NetTrace) -> Option<NetScore> {
        let problem = self.problem;
        let grid = &problem.grid;
        let idx = trace.id.0;
        let alpha = problem.constants.alpha;
        let gamma = problem.constants.gamma;

        let Some(start) = problem.chips[0].bump(idx) else {
            self.violations
                .push(format!("[net {}] no chip1 bump with this index", idx));
            return None;
        };
        let Some(end) = problem.chips[1].bump(idx) else {
            self.violations
                .push(format!("[net {}] no chip2 bump with this index", idx));
            return None;
        };
        let Some((mut col, mut row)) = grid.cell_of(start.position) else {
            self.violations
                .push(format!("[net {}] start bump outside the routing area", idx));
            return None;
        };

        let mut score = NetScore::default();
        let mut at_start = true;
        let mut pass_via = false;
        let mut last_layer = Layer::M1;

        for event in &trace.events {
            match *event {
                RouteEvent::Segment { layer, from, to } => {
                    if at_start && from != start.position {
                        self.violations.push(format!(
                            "[net {}] route starts at ({}, {}) instead of the chip1 bump",
                            idx, from.x, from.y
                        ));
                    }
                    at_start = false;

                    if !self.check_segment(idx, layer, from, to) {
                        return Some(score);
                    }
                    let Some((c1, r1)) = grid.cell_of(from) else {
                        self.violations.push(format!(
                            "[net {}] segment endpoint ({}, {}) outside the routing area",
                            idx, from.x, from.y
                        ));
                        return Some(score);
                    };
                    let Some((c2, r2)) = grid.cell_of(to) else {
                        self.violations.push(format!(
                            "[net {}] segment endpoint ({}, {}) outside the routing area",
                            idx, to.x, to.y
                        ));
                        return Some(score);
                    };

                    let length = ((to.x - from.x).abs() + (to.y - from.y).abs()) as i64;
                    score.wirelength += length;
                    score.total_cost += alpha * length as f64;

                    // The segment's first cell is charged unless a via at
                    // the same spot already paid for it.
                    if !pass_via {
                        let c = self.cost(layer, c1, r1);
                        score.cell_cost += c;
                        score.total_cost += gamma * c;
                    }
                    pass_via = false;

                    match layer {
                        Layer::M1 => self.walk_vertical(c1, r1, r2, gamma, &mut score),
                        Layer::M2 => self.walk_horizontal(r1, c1, c2, gamma, &mut score),
                    }
                    col = c2;
                    row = r2;
                    last_layer = layer;
                }
                RouteEvent::Via => {
                    let m1 = self.cost(Layer::M1, col, row);
                    let m2 = self.cost(Layer::M2, col, row);
                    // A layer change splits the turn cell's charge between
                    // both layers.
                    if !at_start {
                        let last = match last_layer {
                            Layer::M1 => m1,
                            Layer::M2 => m2,
                        };
                        score.cell_cost -= last;
                        score.total_cost -= gamma * last;
                    }
                    score.cell_cost += 0.5 * (m1 + m2);
                    score.total_cost += gamma * 0.5 * (m1 + m2);
                    score.via_count += 1;
                    score.total_cost += self.via_cost;
                    pass_via = true;
                }
            }
        }

        let final_cell = grid.cell_origin(col, row);
        if final_cell != end.position {
            self.violations.push(format!(
                "[net {}] route ends at ({}, {}) instead of the chip2 bump",
                idx, final_cell.x, final_cell.y
            ));
        }
        // After the trailing via (or without one) the route must sit on M1.
        let ends_on_m1 = if pass_via {
            last_layer == Layer::M2
        } else {
            last_layer == Layer::M1
        };
        if !ends_on_m1 {
            self.violations
                .push(format!("[net {}] route does not end on M1", idx));
        }

        Some(score)
    }

    /// Direction, length and alignment rules: M1 runs vertically, M2
    /// horizontally, no zero-length segments, endpoints on gcell corners.
    fn check_segment(&mut self, idx: u32, layer: Layer, from: Point<i32>, to: Point<i32>) -> bool {
        let grid = &self.problem.grid;
        let mut ok = true;
        match layer {
            Layer::M1 => {
                if from.x != to.x {
                    self.violations
                        .push(format!("[net {}] M1 segments must be vertical", idx));
                    ok = false;
                }
                if from.y == to.y {
                    self.violations
                        .push(format!("[net {}] zero-length M1 segment", idx));
                    ok = false;
                }
            }
            Layer::M2 => {
                if from.y != to.y {
                    self.violations
                        .push(format!("[net {}] M2 segments must be horizontal", idx));
                    ok = false;
                }
                if from.x == to.x {
                    self.violations
                        .push(format!("[net {}] zero-length M2 segment", idx));
                    ok = false;
                }
            }
        }
        for p in [from, to] {
            if (p.x - grid.origin.x) % grid.cell_w != 0 || (p.y - grid.origin.y) % grid.cell_h != 0
            {
                self.violations.push(format!(
                    "[net {}] segment endpoint ({}, {}) not on a gcell corner",
                    idx, p.x, p.y
                ));
                ok = false;
            }
        }
        ok
    }

    /// Walks an M1 segment from its first cell (exclusive) to its last,
    /// charging each entered cell and the bottom edge it crosses.
    fn walk_vertical(&mut self, col: usize, r1: usize, r2: usize, gamma: f64, score: &mut NetScore) {
        let width = self.problem.grid.width;
        if r2 > r1 {
            for r in (r1 + 1)..=r2 {
                let c = self.cost(Layer::M1, col, r);
                score.cell_cost += c;
                score.total_cost += gamma * c;
                self.cross_bottom_edge(col, r, width, score);
            }
        } else {
            for r in (r2..r1).rev() {
                let c = self.cost(Layer::M1, col, r);
                score.cell_cost += c;
                score.total_cost += gamma * c;
                self.cross_bottom_edge(col, r + 1, width, score);
            }
        }
    }

    /// Walks an M2 segment, charging each entered cell and the left edge it
    /// crosses.
    fn walk_horizontal(
        &mut self,
        row: usize,
        c1: usize,
        c2: usize,
        gamma: f64,
        score: &mut NetScore,
    ) {
        let width = self.problem.grid.width;
        if c2 > c1 {
            for c in (c1 + 1)..=c2 {
                let cost = self.cost(Layer::M2, c, row);
                score.cell_cost += cost;
                score.total_cost += gamma * cost;
                self.cross_left_edge(c, row, width, score);
            }
        } else {
            for c in (c2..c1).rev() {
                let cost = self.cost(Layer::M2, c, row);
                score.cell_cost += cost;
                score.total_cost += gamma * cost;
                self.cross_left_edge(c + 1, row, width, score);
            }
        }
    }

    fn cross_bottom_edge(&mut self, col: usize, row: usize, width: usize, score: &mut NetScore) {
        let e = row * width + col;
        if self.bottom_used[e] >= self.problem.capacities.get(col, row).bottom {
            score.overflow += 1;
            score.total_cost += self.overflow_penalty;
        }
        self.bottom_used[e] += 1;
    }

    fn cross_left_edge(&mut self, col: usize, row: usize, width: usize, score: &mut NetScore) {
        let e = row * width + col;
        if self.left_used[e] >= self.problem.capacities.get(col, row).left {
            score.overflow += 1;
            score.total_cost += self.overflow_penalty;
        }
        self.left_used[e] += 1;
    }
}
