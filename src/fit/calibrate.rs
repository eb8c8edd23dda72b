//! Grid-search calibration of the workload model.
//!
//! Given:
//! - the observed weekly TPOD series
//! - the exogenous inputs built from the same dataset
//! - a parameter grid
//!
//! we simulate every candidate (in parallel), score it by SSE on matched weeks,
//! and keep the best. Optionally the winner is polished by Gauss-Newton.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{Horizon, ObservedRecord, Params};
use crate::error::AppError;
use crate::fit::grid::ParamGrid;
use crate::fit::refine::refine;
use crate::math::Exogenous;
use crate::metrics::{paired_series, sse};
use crate::sim::simulate_checked;

/// Number of free model parameters.
pub const PARAM_COUNT: usize = 4;

/// Minimum number of extra observations beyond parameter count.
const MIN_N_BUFFER: usize = 5;

#[derive(Debug, Clone)]
pub struct CalibrationOptions {
    /// Gauss-Newton iterations after the grid search (0 disables refinement).
    pub refine_iters: usize,
}

/// Calibration output.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub best: Params,
    pub sse: f64,
    pub rmse: f64,
    /// Matched weeks used in the objective.
    pub n: usize,
    /// Best grid point before refinement.
    pub grid_best: Params,
    pub grid_sse: f64,
    /// Grid candidates scored.
    pub evaluated: usize,
    /// Grid candidates that failed (zero time constant, non-finite output).
    pub skipped: usize,
    /// Accepted Gauss-Newton steps.
    pub refine_steps: usize,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: Params,
    sse: f64,
}

/// Shared inputs of every objective evaluation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Objective<'a> {
    pub observed: &'a [ObservedRecord],
    pub inputs: &'a Exogenous,
    pub horizon: &'a Horizon,
}

impl Objective<'_> {
    /// `simulated - observed` on matched weeks, or `None` if the run fails.
    pub(crate) fn residuals(&self, params: &Params) -> Option<Vec<f64>> {
        let trajectory = simulate_checked(params, self.inputs, self.horizon).ok()?;
        let (obs, sim) = paired_series(&trajectory, self.observed);
        Some(sim.iter().zip(&obs).map(|(s, o)| s - o).collect())
    }

    pub(crate) fn sse(&self, params: &Params) -> Option<f64> {
        let trajectory = simulate_checked(params, self.inputs, self.horizon).ok()?;
        let (obs, sim) = paired_series(&trajectory, self.observed);
        let value = sse(&obs, &sim);
        value.is_finite().then_some(value)
    }
}

/// Calibrate the model against the observed series.
pub fn calibrate(
    observed: &[ObservedRecord],
    inputs: &Exogenous,
    horizon: &Horizon,
    grid: &ParamGrid,
    opts: &CalibrationOptions,
) -> Result<Calibration, AppError> {
    let n = observed.iter().filter(|r| horizon.contains(r.week)).count();
    if n < PARAM_COUNT + MIN_N_BUFFER {
        return Err(AppError::new(
            3,
            format!(
                "Underdetermined: {n} observed weeks inside {}..={} < {}",
                horizon.start,
                horizon.end,
                PARAM_COUNT + MIN_N_BUFFER
            ),
        ));
    }
    if grid.is_empty() {
        return Err(AppError::new(4, "Parameter grid is empty."));
    }

    let objective = Objective {
        observed,
        inputs,
        horizon,
    };

    let params = grid.candidates();
    info!(candidates = params.len(), weeks = n, "calibration grid search");

    // Evaluate each candidate independently (parallel).
    let candidates: Vec<Candidate> = params
        .par_iter()
        .enumerate()
        .filter_map(|(idx, p)| {
            objective.sse(p).map(|sse| Candidate {
                idx,
                params: *p,
                sse,
            })
        })
        .collect();

    let skipped = params.len() - candidates.len();
    if skipped > 0 {
        debug!(skipped, "grid candidates failed to simulate");
    }

    // Deterministic selection: pick the minimum SSE; break ties by original grid index.
    let Some(first) = candidates.first() else {
        return Err(AppError::new(4, "No valid calibration candidates."));
    };
    let mut best = first;
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    info!(sse = best.sse, idx = best.idx, "best grid candidate");

    let refined = refine(&objective, best.params, best.sse, opts.refine_iters);
    if refined.steps > 0 {
        info!(sse = refined.sse, steps = refined.steps, "refinement improved fit");
    }

    Ok(Calibration {
        best: refined.params,
        sse: refined.sse,
        rmse: (refined.sse / n as f64).sqrt(),
        n,
        grid_best: best.params,
        grid_sse: best.sse,
        evaluated: params.len(),
        skipped,
        refine_steps: refined.steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Interpolator;
    use crate::sim::simulate;

    fn seasonal_inputs() -> Exogenous {
        Exogenous {
            co: Interpolator::new(
                "co",
                (40..=110).map(|w| (w as f64, 100.0 + 20.0 * (w as f64 / 6.0).sin())),
            )
            .unwrap(),
            sc: Interpolator::new("sc", (40..=110).map(|w| (w as f64, if w < 75 { 90.0 } else { 120.0 })))
                .unwrap(),
        }
    }

    fn observed_from(params: &Params, inputs: &Exogenous, horizon: &Horizon) -> Vec<ObservedRecord> {
        let traj = simulate(params, inputs, horizon).unwrap();
        traj.rows
            .iter()
            .map(|r| {
                let week = r.time as i64;
                ObservedRecord {
                    week,
                    tpod: r.output,
                    co: inputs.co.eval(r.time),
                    sc: inputs.sc.eval(r.time),
                }
            })
            .collect()
    }

    #[test]
    fn recovers_true_params_when_on_grid() {
        let horizon = Horizon::default();
        let inputs = seasonal_inputs();
        let truth = Params::new(-0.64, 18.83, 40.0, 1.08);
        let observed = observed_from(&truth, &inputs, &horizon);

        let grid = ParamGrid {
            alpha: vec![-1.0, -0.64, -0.3],
            tau_decrease: vec![5.0, 18.83, 60.0],
            tau_increase: vec![10.0, 40.0, 1e6],
            tpod0: vec![1.0, 1.08],
        };
        let cal = calibrate(&observed, &inputs, &horizon, &grid, &CalibrationOptions { refine_iters: 0 }).unwrap();

        assert_eq!(cal.best, truth);
        assert_eq!(cal.sse, 0.0);
        assert_eq!(cal.n, 52);
        assert_eq!(cal.evaluated, 54);
        assert_eq!(cal.skipped, 0);
    }

    #[test]
    fn refinement_never_worsens_the_grid_winner() {
        let horizon = Horizon::default();
        let inputs = seasonal_inputs();
        let truth = Params::new(-0.7, 22.0, 35.0, 1.08);
        let observed = observed_from(&truth, &inputs, &horizon);

        let grid = ParamGrid {
            alpha: vec![-1.0, -0.5],
            tau_decrease: vec![10.0, 30.0],
            tau_increase: vec![20.0, 60.0],
            tpod0: vec![1.08],
        };
        let cal = calibrate(&observed, &inputs, &horizon, &grid, &CalibrationOptions { refine_iters: 20 }).unwrap();

        assert!(cal.grid_sse > 0.0);
        assert!(cal.refine_steps > 0);
        assert!(cal.sse < cal.grid_sse);
    }

    #[test]
    fn failing_candidates_are_skipped() {
        let horizon = Horizon::default();
        let inputs = Exogenous::constant(100.0, 50.0);
        let truth = Params::new(-0.64, 18.83, 1e6, 1.08);
        let observed = observed_from(&truth, &inputs, &horizon);

        let grid = ParamGrid {
            alpha: vec![-0.64],
            tau_decrease: vec![0.0, 18.83],
            tau_increase: vec![1e6],
            tpod0: vec![1.08],
        };
        let cal = calibrate(&observed, &inputs, &horizon, &grid, &CalibrationOptions { refine_iters: 0 }).unwrap();
        assert_eq!(cal.skipped, 1);
        assert_eq!(cal.best, truth);
    }

    #[test]
    fn too_few_weeks_is_underdetermined() {
        let horizon = Horizon::default();
        let observed: Vec<ObservedRecord> = (53..58)
            .map(|w| ObservedRecord { week: w, tpod: 1.0, co: 100.0, sc: 100.0 })
            .collect();
        let inputs = Exogenous::from_observed(&observed).unwrap();
        let grid = ParamGrid {
            alpha: vec![-0.64],
            tau_decrease: vec![18.83],
            tau_increase: vec![1e6],
            tpod0: vec![1.0],
        };
        let err = calibrate(&observed, &inputs, &horizon, &grid, &CalibrationOptions { refine_iters: 0 }).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
