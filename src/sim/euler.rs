//! Fixed-step explicit Euler integration of the TPOD stock.
//!
//! The integrator walks `horizon.substeps()` sub-steps of size `1/steps_per_unit`
//! and keeps a row only on whole reporting units. Intermediate states are used
//! for integration and then dropped.

use crate::domain::{Horizon, Params, Trajectory, TrajectoryRow};
use crate::error::SimError;
use crate::math::Exogenous;
use crate::models::evaluate;

/// Simulate one parameter vector over the horizon.
///
/// Pure function of its inputs. Non-finite values coming from the exogenous
/// series are not sanitised here; see [`simulate_checked`].
pub fn simulate(params: &Params, inputs: &Exogenous, horizon: &Horizon) -> Result<Trajectory, SimError> {
    let h = horizon.dt();
    let per_unit = horizon.steps_per_unit as u64;
    let n = horizon.substeps();

    let mut rows = Vec::with_capacity(horizon.row_count());
    let mut tpod = params.tpod0;

    for i in 0..=n {
        let time = horizon.time_at(i);
        let step = evaluate(params, tpod, inputs.co.eval(time), inputs.sc.eval(time), time)?;

        if i % per_unit == 0 {
            rows.push(TrajectoryRow {
                time,
                state: tpod,
                output: step.output,
            });
        }
        if i < n {
            tpod += h * step.rate;
        }
    }

    Ok(Trajectory { rows })
}

/// [`simulate`], then reject trajectories that contain NaN or infinity.
pub fn simulate_checked(params: &Params, inputs: &Exogenous, horizon: &Horizon) -> Result<Trajectory, SimError> {
    let trajectory = simulate(params, inputs, horizon)?;
    if let Some(time) = trajectory.first_non_finite() {
        return Err(SimError::NonFinite { time });
    }
    Ok(trajectory)
}
