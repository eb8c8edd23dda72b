//! Synthetic observed datasets.
//!
//! A dataset is produced by simulating known parameters and perturbing the
//! derived output with multiplicative log-normal noise. It gives the `demo`
//! command something to calibrate against and lets tests check parameter
//! recovery.

use std::f64::consts::PI;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Horizon, ObservedRecord, Params};
use crate::error::AppError;
use crate::math::{Exogenous, Interpolator};
use crate::sim::simulate_checked;

/// Weeks of input data kept on either side of the horizon.
const INPUT_MARGIN: i64 = 4;

/// Period of the demo order cycle, in weeks.
const ORDER_PERIOD: f64 = 26.0;

/// Demo exogenous inputs: a seasonal order cycle around 100 and a capacity
/// step from 90 to 110 halfway through the horizon.
pub fn demo_inputs(horizon: &Horizon) -> Result<Exogenous, AppError> {
    let weeks: Vec<i64> = (horizon.start - INPUT_MARGIN..=horizon.end + INPUT_MARGIN).collect();
    let mid = horizon.start + (horizon.end - horizon.start) / 2;

    let co = Interpolator::new(
        "co",
        weeks
            .iter()
            .map(|&w| (w as f64, 100.0 + 15.0 * (2.0 * PI * w as f64 / ORDER_PERIOD).sin())),
    )?;
    let sc = Interpolator::new(
        "sc",
        weeks
            .iter()
            .map(|&w| (w as f64, if w < mid { 90.0 } else { 110.0 })),
    )?;
    Ok(Exogenous { co, sc })
}

/// Simulate `params` and return one noisy observation per reported week.
///
/// Noise is `exp(sigma * z - sigma^2 / 2)` with `z ~ N(0, 1)`, so the
/// observations are unbiased in expectation. `noise_sigma == 0` reproduces
/// the simulated output exactly.
pub fn generate_observed(
    params: &Params,
    inputs: &Exogenous,
    horizon: &Horizon,
    noise_sigma: f64,
    seed: u64,
) -> Result<Vec<ObservedRecord>, AppError> {
    if !(noise_sigma.is_finite() && noise_sigma >= 0.0) {
        return Err(AppError::new(2, format!("Noise sigma must be finite and >= 0, got {noise_sigma}.")));
    }

    let trajectory = simulate_checked(params, inputs, horizon)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let correction = 0.5 * noise_sigma * noise_sigma;

    Ok(trajectory
        .rows
        .iter()
        .map(|row| {
            let z: f64 = normal.sample(&mut rng);
            ObservedRecord {
                week: row.time as i64,
                tpod: row.output * (noise_sigma * z - correction).exp(),
                co: inputs.co.eval(row.time),
                sc: inputs.sc.eval(row.time),
            }
        })
        .collect())
}
