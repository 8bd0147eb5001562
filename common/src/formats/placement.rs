use crate::formats::cursor::LineCursor;
use crate::formats::{consistency, num, require, structural, FormatError};
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use crate::model::core::{Bump, Chip, GcellGrid, RoutingProblem};
use std::fs::File;
use std::io::Write;

/// Everything the placement file establishes: the routing area, the gcell
/// grid over it, and both chips with their bumps in absolute coordinates.
#[derive(Clone, Debug)]
pub struct Placement {
    pub area: Rect,
    pub grid: GcellGrid,
    pub chips: [Chip; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Command,
    RoutingArea,
    GridSize,
    ChipRect,
    Bumps,
}

pub fn parse(filename: &str) -> Result<Placement, FormatError> {
    log::info!("Loading placement from {}", filename);
    let mut cursor = LineCursor::open(filename)?;

    let mut area: Option<Rect> = None;
    let mut gcell: Option<(i32, i32)> = None;
    let mut chips: Vec<Chip> = Vec::new();
    let mut state = State::Command;

    loop {
        let next_is_command = match cursor.peek()? {
            Some(line) => line.starts_with('.'),
            None => break,
        };
        // A bump list ends at the next command token; hand the line back to
        // the dispatcher unconsumed.
        if state == State::Bumps && next_is_command {
            state = State::Command;
            continue;
        }
        let Some((no, line)) = cursor.advance()? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match state {
            State::Command => match tokens[0] {
                ".ra" => state = State::RoutingArea,
                ".g" => state = State::GridSize,
                ".c" => {
                    if chips.len() == 2 {
                        return Err(structural(filename, no, tokens[0]));
                    }
                    state = State::ChipRect;
                }
                ".b" => {
                    if chips.is_empty() {
                        return Err(structural(filename, no, tokens[0]));
                    }
                    state = State::Bumps;
                }
                other => return Err(structural(filename, no, other)),
            },
            State::RoutingArea => {
                require(filename, no, &line, &tokens, 4)?;
                let x: i32 = num(filename, no, tokens[0])?;
                let y: i32 = num(filename, no, tokens[1])?;
                let w: i32 = num(filename, no, tokens[2])?;
                let h: i32 = num(filename, no, tokens[3])?;
                if w <= 0 || h <= 0 {
                    return Err(consistency(
                        filename,
                        no,
                        format!("non-positive routing area {}x{}", w, h),
                    ));
                }
                area = Some(Rect::from_ll_size(Point::new(x, y), w, h));
                state = State::Command;
            }
            State::GridSize => {
                require(filename, no, &line, &tokens, 2)?;
                let w: i32 = num(filename, no, tokens[0])?;
                let h: i32 = num(filename, no, tokens[1])?;
                gcell = Some((w, h));
                state = State::Command;
            }
            State::ChipRect => {
                require(filename, no, &line, &tokens, 4)?;
                let base = area.ok_or_else(|| {
                    consistency(filename, no, "chip rectangle before .ra".to_string())
                })?;
                let x: i32 = num(filename, no, tokens[0])?;
                let y: i32 = num(filename, no, tokens[1])?;
                let w: i32 = num(filename, no, tokens[2])?;
                let h: i32 = num(filename, no, tokens[3])?;
                if w <= 0 || h <= 0 {
                    return Err(consistency(
                        filename,
                        no,
                        format!("non-positive chip size {}x{}", w, h),
                    ));
                }
                // Chip coordinates are relative to the routing-area corner.
                let lower_left = base.min + Point::new(x, y);
                chips.push(Chip {
                    rect: Rect::from_ll_size(lower_left, w, h),
                    bumps: Vec::new(),
                });
                state = State::Command;
            }
            State::Bumps => {
                require(filename, no, &line, &tokens, 3)?;
                let idx: u32 = num(filename, no, tokens[0])?;
                let dx: i32 = num(filename, no, tokens[1])?;
                let dy: i32 = num(filename, no, tokens[2])?;
                let Some(chip) = chips.last_mut() else {
                    return Err(structural(filename, no, tokens[0]));
                };
                // Bump offsets are relative to the owning chip.
                chip.bumps.push(Bump {
                    idx,
                    position: chip.rect.min + Point::new(dx, dy),
                });
            }
        }
    }

    finish(filename, cursor.last_line(), area, gcell, chips)
}

fn finish(
    filename: &str,
    line: usize,
    area: Option<Rect>,
    gcell: Option<(i32, i32)>,
    chips: Vec<Chip>,
) -> Result<Placement, FormatError> {
    let area =
        area.ok_or_else(|| consistency(filename, line, "missing .ra block".to_string()))?;
    let (cell_w, cell_h) =
        gcell.ok_or_else(|| consistency(filename, line, "missing .g block".to_string()))?;
    let grid = GcellGrid::over(area, cell_w, cell_h)
        .map_err(|message| consistency(filename, line, message))?;

    if chips.len() != 2 {
        return Err(consistency(
            filename,
            line,
            format!("expected two chip blocks, found {}", chips.len()),
        ));
    }
    if chips[0].bumps.len() != chips[1].bumps.len() {
        return Err(consistency(
            filename,
            line,
            format!(
                "chip bump counts differ: {} vs {}",
                chips[0].bumps.len(),
                chips[1].bumps.len()
            ),
        ));
    }
    for (which, chip) in chips.iter().enumerate() {
        check_bump_indices(filename, line, which + 1, chip)?;
    }

    let Ok(chips) = <[Chip; 2]>::try_from(chips) else {
        return Err(consistency(filename, line, "expected two chips".to_string()));
    };
    log::trace!(
        "Placement: area {}x{}, grid {}x{}, {} nets",
        area.width(),
        area.height(),
        grid.width,
        grid.height,
        chips[0].bumps.len()
    );
    Ok(Placement { area, grid, chips })
}

/// Bump indices per chip must be exactly 1..=n, no duplicates or gaps.
fn check_bump_indices(
    filename: &str,
    line: usize,
    which: usize,
    chip: &Chip,
) -> Result<(), FormatError> {
    let n = chip.bumps.len();
    if n == 0 {
        return Err(consistency(
            filename,
            line,
            format!("chip {} has no bumps", which),
        ));
    }
    let mut seen = vec![false; n];
    for bump in &chip.bumps {
        let idx = bump.idx as usize;
        if idx == 0 || idx > n {
            return Err(consistency(
                filename,
                line,
                format!("chip {} bump index {} out of range 1..={}", which, idx, n),
            ));
        }
        if seen[idx - 1] {
            return Err(consistency(
                filename,
                line,
                format!("chip {} has duplicate bump index {}", which, idx),
            ));
        }
        seen[idx - 1] = true;
    }
    Ok(())
}

pub fn write(problem: &RoutingProblem, filename: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    let area = problem.area;

    writeln!(file, ".ra")?;
    writeln!(
        file,
        "{} {} {} {}",
        area.min.x,
        area.min.y,
        area.width(),
        area.height()
    )?;
    writeln!(file, ".g")?;
    writeln!(file, "{} {}", problem.grid.cell_w, problem.grid.cell_h)?;

    for chip in &problem.chips {
        let rel = chip.rect.min - area.min;
        writeln!(file, ".c")?;
        writeln!(
            file,
            "{} {} {} {}",
            rel.x,
            rel.y,
            chip.rect.width(),
            chip.rect.height()
        )?;
        writeln!(file, ".b")?;
        for bump in &chip.bumps {
            let off = bump.position - chip.rect.min;
            writeln!(file, "{} {} {}", bump.idx, off.x, off.y)?;
        }
        writeln!(file)?;
    }
    Ok(())
}
