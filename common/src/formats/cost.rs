use crate::formats::cursor::LineCursor;
use crate::formats::{consistency, num, require, structural, FormatError};
use crate::model::core::{CostConstants, CostLayer, GcellGrid, RoutingProblem, NUM_LAYERS};
use std::fs::File;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Command,
    ViaCost,
    LayerRows,
}

/// Parses a cost file: four scalar commands, a via-cost block, then exactly
/// two positional layer blocks of `height` rows by `width` floats (M1 first,
/// M2 second).
pub fn parse(
    filename: &str,
    grid: &GcellGrid,
) -> Result<(CostConstants, [CostLayer; NUM_LAYERS]), FormatError> {
    log::info!("Loading costs from {}", filename);
    let mut cursor = LineCursor::open(filename)?;

    let mut alpha: Option<f64> = None;
    let mut beta: Option<f64> = None;
    let mut gamma: Option<f64> = None;
    let mut delta: Option<f64> = None;
    let mut via_cost: Option<f64> = None;
    let mut layers: Vec<Vec<f64>> = Vec::new();
    let mut state = State::Command;

    loop {
        let next_is_command = match cursor.peek()? {
            Some(line) => line.starts_with('.'),
            None => break,
        };
        if state == State::LayerRows && next_is_command {
            state = State::Command;
            continue;
        }
        let Some((no, line)) = cursor.advance()? else {
            break;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match state {
            State::Command => match tokens[0] {
                ".alpha" => {
                    require(filename, no, &line, &tokens, 2)?;
                    alpha = Some(num(filename, no, tokens[1])?);
                }
                ".beta" => {
                    require(filename, no, &line, &tokens, 2)?;
                    beta = Some(num(filename, no, tokens[1])?);
                }
                ".gamma" => {
                    require(filename, no, &line, &tokens, 2)?;
                    gamma = Some(num(filename, no, tokens[1])?);
                }
                ".delta" => {
                    require(filename, no, &line, &tokens, 2)?;
                    delta = Some(num(filename, no, tokens[1])?);
                }
                ".v" => state = State::ViaCost,
                ".l" => {
                    if layers.len() == NUM_LAYERS {
                        return Err(structural(filename, no, tokens[0]));
                    }
                    layers.push(Vec::with_capacity(grid.len()));
                    state = State::LayerRows;
                }
                other => return Err(structural(filename, no, other)),
            },
            State::ViaCost => {
                require(filename, no, &line, &tokens, 1)?;
                via_cost = Some(num(filename, no, tokens[0])?);
                state = State::Command;
            }
            State::LayerRows => {
                require(filename, no, &line, &tokens, grid.width)?;
                let Some(layer) = layers.last_mut() else {
                    return Err(structural(filename, no, tokens[0]));
                };
                for token in &tokens {
                    layer.push(num(filename, no, token)?);
                }
            }
        }
    }

    let line = cursor.last_line();
    let constants = CostConstants {
        alpha: scalar(filename, line, ".alpha", alpha)?,
        beta: scalar(filename, line, ".beta", beta)?,
        gamma: scalar(filename, line, ".gamma", gamma)?,
        delta: scalar(filename, line, ".delta", delta)?,
        via_cost: scalar(filename, line, ".v", via_cost)?,
    };

    if layers.len() != NUM_LAYERS {
        return Err(consistency(
            filename,
            line,
            format!("expected {} layer blocks, found {}", NUM_LAYERS, layers.len()),
        ));
    }
    for (i, layer) in layers.iter().enumerate() {
        let rows = layer.len() / grid.width;
        if layer.len() != grid.len() {
            return Err(consistency(
                filename,
                line,
                format!(
                    "layer {} has {} rows, expected {}",
                    i + 1,
                    rows,
                    grid.height
                ),
            ));
        }
    }

    let mut layers = layers.into_iter();
    let Some(m1) = layers.next() else {
        return Err(consistency(filename, line, "missing M1 layer".to_string()));
    };
    let Some(m2) = layers.next() else {
        return Err(consistency(filename, line, "missing M2 layer".to_string()));
    };
    Ok((
        constants,
        [
            CostLayer {
                width: grid.width,
                height: grid.height,
                values: m1,
            },
            CostLayer {
                width: grid.width,
                height: grid.height,
                values: m2,
            },
        ],
    ))
}

fn scalar(
    filename: &str,
    line: usize,
    command: &str,
    value: Option<f64>,
) -> Result<f64, FormatError> {
    value.ok_or_else(|| consistency(filename, line, format!("missing {} block", command)))
}

pub fn write(problem: &RoutingProblem, filename: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    let c = problem.constants;
    writeln!(file, ".alpha {}", c.alpha)?;
    writeln!(file, ".beta {}", c.beta)?;
    writeln!(file, ".gamma {}", c.gamma)?;
    writeln!(file, ".delta {}", c.delta)?;
    writeln!(file, ".v")?;
    writeln!(file, "{}", c.via_cost)?;
    for layer in &problem.layers {
        writeln!(file, ".l")?;
        for row in 0..layer.height {
            for col in 0..layer.width {
                write!(file, "{:.2} ", layer.get(col, row))?;
            }
            writeln!(file)?;
        }
    }
    Ok(())
}
