//! Circle-area estimation benchmark.
//!
//! The circle of radius 0.5 inscribed in the unit square has area `pi / 4`.
//! Each method estimates it as the fraction of points falling inside; the
//! error of that estimate measures how evenly the method covers the square.

use std::f64::consts::PI;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Point2, SamplingMethod};
use crate::domain::SampleConfig;
use crate::error::AppError;

/// Exact area of the inscribed circle.
pub const TRUE_AREA: f64 = PI / 4.0;

pub fn inside_circle(p: &Point2) -> bool {
    let dx = p[0] - 0.5;
    let dy = p[1] - 0.5;
    dx * dx + dy * dy <= 0.25
}

/// Area estimate: fraction of points inside the circle (the square has area 1).
pub fn estimate_area(points: &[Point2]) -> f64 {
    if points.is_empty() {
        return f64::NAN;
    }
    let hits = points.iter().filter(|p| inside_circle(p)).count();
    hits as f64 / points.len() as f64
}

/// Aggregated result of one (method, sample size) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub method: SamplingMethod,
    pub n: usize,
    pub reps: usize,
    pub mean_estimate: f64,
    pub mean_abs_error: f64,
    pub rmse: f64,
}

impl BenchmarkRow {
    /// `4 * mean_estimate`, the implied value of pi.
    pub fn pi_estimate(&self) -> f64 {
        4.0 * self.mean_estimate
    }
}

fn run_cell(method: SamplingMethod, n: usize, reps: usize, seed: u64, sobol_skip: u64) -> BenchmarkRow {
    // A single Sobol repetition is the plain sequence; repeats need scrambling
    // or they would all be identical.
    let scramble = reps > 1;
    let estimates: Vec<f64> = (0..reps)
        .map(|rep| {
            let mut sampler = method.sampler(seed.wrapping_add(rep as u64), scramble, sobol_skip);
            estimate_area(&sampler.sample(n))
        })
        .collect();

    let k = estimates.len() as f64;
    let mean_estimate = estimates.iter().sum::<f64>() / k;
    let mean_abs_error = estimates.iter().map(|e| (e - TRUE_AREA).abs()).sum::<f64>() / k;
    let rmse = (estimates.iter().map(|e| (e - TRUE_AREA).powi(2)).sum::<f64>() / k).sqrt();

    debug!(method = method.display_name(), n, mean_abs_error, "benchmark cell");
    BenchmarkRow {
        method,
        n,
        reps,
        mean_estimate,
        mean_abs_error,
        rmse,
    }
}

/// Run every method at every sample size.
///
/// Rows come back ordered by sample size, then method, regardless of how the
/// cells were scheduled.
pub fn run_benchmark(config: &SampleConfig) -> Result<Vec<BenchmarkRow>, AppError> {
    if config.methods.is_empty() {
        return Err(AppError::new(2, "At least one sampling method is required."));
    }
    if config.sizes.is_empty() || config.sizes.contains(&0) {
        return Err(AppError::new(2, "Sample sizes must be a non-empty list of positive integers."));
    }
    if config.reps == 0 {
        return Err(AppError::new(2, "Repetitions must be >= 1."));
    }

    let cells: Vec<(usize, SamplingMethod)> = config
        .sizes
        .iter()
        .flat_map(|&n| config.methods.iter().map(move |&m| (n, m)))
        .collect();
    info!(cells = cells.len(), reps = config.reps, seed = config.seed, "sampling benchmark");

    Ok(cells
        .par_iter()
        .map(|&(n, method)| run_cell(method, n, config.reps, config.seed, config.sobol_skip))
        .collect())
}
