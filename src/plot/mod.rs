//! Charts of simulated trajectories against the observed series.
//!
//! - `ascii`: fixed-size terminal plot (deterministic, golden-testable)
//! - `svg`: vector chart via plotters

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::{ObservedRecord, SourceRun};

/// Min/max over every finite run output and observed TPOD value.
pub(crate) fn value_range(runs: &[SourceRun], observed: &[ObservedRecord]) -> Option<(f64, f64)> {
    let values = runs
        .iter()
        .flat_map(|r| r.trajectory.rows.iter().map(|row| row.output))
        .chain(observed.iter().map(|r| r.tpod))
        .filter(|v| v.is_finite());

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in values {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat data: give the axis some height around the single level.
        Some((min_y - 0.5, max_y + 0.5))
    } else {
        None
    }
}

pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
