use crate::formats::cursor::LineCursor;
use crate::formats::{consistency, num, require, structural, FormatError};
use crate::geom::point::Point;
use crate::model::core::{Chip, Layer, Net};
use crate::model::indices::NetId;
use std::collections::BTreeMap;

/// One parsed route record. Via markers are surfaced rather than dropped so
/// consumers that care about layer changes (the evaluator does) can see
/// them; reconstruction simply contributes no planar point for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteEvent {
    Segment {
        layer: Layer,
        from: Point<i32>,
        to: Point<i32>,
    },
    Via,
}

/// The event sequence of one `n<idx>` block, in file order.
#[derive(Clone, Debug)]
pub struct NetTrace {
    pub id: NetId,
    /// Header line number, for diagnostics.
    pub line: usize,
    pub events: Vec<RouteEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Command,
    Route,
}

/// Parses a routing-result file: repeated `n<idx>` headers, each followed by
/// `M1|M2 x1 y1 x2 y2` segment records and bare `via` markers, closed by
/// `.end`. End of input and a fresh header both close an open block.
pub fn parse(filename: &str) -> Result<Vec<NetTrace>, FormatError> {
    log::info!("Loading routes from {}", filename);
    let mut cursor = LineCursor::open(filename)?;

    let mut traces: Vec<NetTrace> = Vec::new();
    let mut state = State::Command;

    loop {
        let next_is_header = match cursor.peek()? {
            Some(line) => line
                .split_whitespace()
                .next()
                .is_some_and(|t| t.starts_with('n')),
            None => break,
        };
        if state == State::Route && next_is_header {
            state = State::Command;
            continue;
        }
        let Some((no, line)) = cursor.advance()? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match state {
            State::Command => {
                let Some(idx_str) = tokens[0].strip_prefix('n') else {
                    return Err(structural(filename, no, tokens[0]));
                };
                let idx: u32 = num(filename, no, idx_str)?;
                traces.push(NetTrace {
                    id: NetId(idx),
                    line: no,
                    events: Vec::new(),
                });
                state = State::Route;
            }
            State::Route => {
                let Some(trace) = traces.last_mut() else {
                    return Err(structural(filename, no, tokens[0]));
                };
                match tokens[0] {
                    ".end" => state = State::Command,
                    "via" => trace.events.push(RouteEvent::Via),
                    "M1" | "M2" => {
                        require(filename, no, &line, &tokens, 5)?;
                        let layer = if tokens[0] == "M1" { Layer::M1 } else { Layer::M2 };
                        let x1: i32 = num(filename, no, tokens[1])?;
                        let y1: i32 = num(filename, no, tokens[2])?;
                        let x2: i32 = num(filename, no, tokens[3])?;
                        let y2: i32 = num(filename, no, tokens[4])?;
                        trace.events.push(RouteEvent::Segment {
                            layer,
                            from: Point::new(x1, y1),
                            to: Point::new(x2, y2),
                        });
                    }
                    other => return Err(structural(filename, no, other)),
                }
            }
        }
    }

    log::trace!("Parsed {} route blocks", traces.len());
    Ok(traces)
}

/// Rebuilds each net's point sequence. Every chip1 bump seeds a route with
/// its absolute position (unrouted nets stay a single point); each segment
/// appends its trailing endpoint, vias are counted but add no point.
pub fn reconstruct(
    filename: &str,
    traces: &[NetTrace],
    chip1: &Chip,
) -> Result<BTreeMap<NetId, Net>, FormatError> {
    let mut nets: BTreeMap<NetId, Net> = chip1
        .bumps
        .iter()
        .map(|bump| {
            (
                NetId(bump.idx),
                Net {
                    id: NetId(bump.idx),
                    points: vec![bump.position],
                    vias: 0,
                },
            )
        })
        .collect();

    for trace in traces {
        let Some(net) = nets.get_mut(&trace.id) else {
            return Err(consistency(
                filename,
                trace.line,
                format!("route block for net {} has no chip1 bump", trace.id.0),
            ));
        };
        for event in &trace.events {
            match event {
                RouteEvent::Segment { to, .. } => net.points.push(*to),
                RouteEvent::Via => net.vias += 1,
            }
        }
    }
    Ok(nets)
}
