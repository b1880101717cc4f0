use std::io::{self, BufRead, Read};

use log::{debug, warn};
use nalgebra::Point2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read input: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse json input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads rings of `x y` lines. A blank line ends the current ring, the first
/// ring is the outer boundary and every following ring a hole. Lines that do
/// not hold two numbers are skipped.
pub fn read_rings(reader: impl BufRead) -> Result<Vec<Vec<Point2<f64>>>, InputError> {
    let mut rings: Vec<Vec<Point2<f64>>> = vec![Vec::new()];
    for (line_nr, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if rings.last().is_some_and(|ring| !ring.is_empty()) {
                rings.push(Vec::new());
            }
            continue
        }
        match (parse_point(trimmed), rings.last_mut()) {
            (Some(point), Some(ring)) => ring.push(point),
            _ => warn!("Bad input line {}: {:?}", line_nr + 1, line),
        }
    }
    rings.retain(|ring| !ring.is_empty());
    debug!("read {} rings with {} points", rings.len(), rings.iter().map(Vec::len).sum::<usize>());
    Ok(rings)
}

fn parse_point(line: &str) -> Option<Point2<f64>> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .map(str::parse::<f64>);
    let (Some(Ok(x)), Some(Ok(y)), None) = (fields.next(), fields.next(), fields.next()) else {
        return None
    };
    (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
}

/// Reads rings as nested json arrays: `[[[x, y], ...], ...]`
pub fn read_json_rings(reader: impl Read) -> Result<Vec<Vec<Point2<f64>>>, InputError> {
    let rings: Vec<Vec<[f64; 2]>> = serde_json::from_reader(reader)?;
    Ok(rings.into_iter()
        .map(|ring| ring.into_iter().map(|[x, y]| Point2::new(x, y)).collect())
        .collect())
}
