use crate::formats::cursor::LineCursor;
use crate::formats::{consistency, num, require, structural, FormatError};
use crate::model::core::{CapacityGrid, EdgeCapacity, GcellGrid, RoutingProblem};
use std::fs::File;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Command,
    Records,
}

/// Parses an edge-capacity file: a single `.ec` block with one
/// `left bottom` pair per gcell, row-major, exactly `width * height` lines.
pub fn parse(filename: &str, grid: &GcellGrid) -> Result<CapacityGrid, FormatError> {
    log::info!("Loading edge capacities from {}", filename);
    let mut cursor = LineCursor::open(filename)?;

    let expected = grid.len();
    let mut cells: Vec<EdgeCapacity> = Vec::with_capacity(expected);
    let mut seen_ec = false;
    let mut state = State::Command;

    loop {
        let next_is_command = match cursor.peek()? {
            Some(line) => line.starts_with('.'),
            None => break,
        };
        if state == State::Records && next_is_command {
            state = State::Command;
            continue;
        }
        let Some((no, line)) = cursor.advance()? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match state {
            State::Command => match tokens[0] {
                ".ec" if !seen_ec => {
                    seen_ec = true;
                    state = State::Records;
                }
                other => return Err(structural(filename, no, other)),
            },
            State::Records => {
                require(filename, no, &line, &tokens, 2)?;
                let left: u32 = num(filename, no, tokens[0])?;
                let bottom: u32 = num(filename, no, tokens[1])?;
                cells.push(EdgeCapacity { left, bottom });
            }
        }
    }

    if cells.len() != expected {
        return Err(consistency(
            filename,
            cursor.last_line(),
            format!(
                "expected {} capacity records for a {}x{} grid, found {}",
                expected,
                grid.width,
                grid.height,
                cells.len()
            ),
        ));
    }

    Ok(CapacityGrid {
        width: grid.width,
        height: grid.height,
        cells,
    })
}

pub fn write(problem: &RoutingProblem, filename: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, ".ec")?;
    for cell in &problem.capacities.cells {
        writeln!(file, "{} {}", cell.left, cell.bottom)?;
    }
    Ok(())
}
