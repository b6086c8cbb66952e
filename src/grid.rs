//! Discrete search grids.
//!
//! Every optimization in this crate is an exhaustive scan over an evenly spaced grid.

use crate::error::{Result, WelfareError};

/// `n` evenly spaced points on `[lower, upper]`.
///
/// The last point is pinned to `upper` so the grid always contains both
/// endpoints. A single-point grid is `[lower]`.
pub fn linspace(lower: f64, upper: f64, n: usize) -> Result<Vec<f64>> {
    match n {
        0 => Err(WelfareError::empty("grid")),
        1 => Ok(vec![lower]),
        _ => {
            let step = (upper - lower) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| lower + step * i as f64).collect();
            points[n - 1] = upper;
            Ok(points)
        }
    }
}

/// Index of the largest value; ties resolve to the lowest index.
///
/// NaN entries are only selected when every entry is NaN.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            if best.is_none() {
                best = Some((index, value));
            }
            continue;
        }
        match best {
            Some((_, current)) if !current.is_nan() && value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
