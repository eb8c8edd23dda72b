//! Gauss-Newton polishing of a grid-search winner.
//!
//! Works in a transformed space `θ = [alpha, ln tau_decrease, ln tau_increase, tpod0]`
//! so the time constants stay positive and their steps are relative. The
//! Jacobian is a forward difference of the residual vector; each step is a
//! least squares solve followed by step halving until SSE drops.
//!
//! The feedback law switches branches, so the objective has kinks. A step is
//! only accepted if it strictly improves SSE, which keeps the result no worse
//! than the starting point.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::Params;
use crate::fit::calibrate::{Objective, PARAM_COUNT};
use crate::math::solve_least_squares;

/// Maximum number of step halvings per iteration.
const MAX_HALVINGS: usize = 12;

/// Relative SSE improvement under which iteration stops.
const REL_TOL: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
pub struct Refinement {
    pub params: Params,
    pub sse: f64,
    /// Accepted steps.
    pub steps: usize,
}

fn to_theta(p: &Params) -> Option<[f64; PARAM_COUNT]> {
    if !(p.tau_decrease > 0.0 && p.tau_increase > 0.0) {
        return None;
    }
    Some([p.alpha, p.tau_decrease.ln(), p.tau_increase.ln(), p.tpod0])
}

fn from_theta(theta: &[f64; PARAM_COUNT]) -> Params {
    Params::new(theta[0], theta[1].exp(), theta[2].exp(), theta[3])
}

pub(crate) fn refine(objective: &Objective<'_>, start: Params, start_sse: f64, max_iters: usize) -> Refinement {
    let mut current = Refinement {
        params: start,
        sse: start_sse,
        steps: 0,
    };
    let Some(mut theta) = to_theta(&start) else {
        return current;
    };

    for iter in 0..max_iters {
        let Some(r) = objective.residuals(&current.params) else {
            break;
        };
        let Some(jac) = jacobian(objective, &theta, &r) else {
            break;
        };
        let rhs = DVector::from_iterator(r.len(), r.iter().map(|v| -v));
        let Some(delta) = solve_least_squares(&jac, &rhs) else {
            break;
        };

        let mut lambda = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_HALVINGS {
            let mut trial = theta;
            for j in 0..PARAM_COUNT {
                trial[j] += lambda * delta[j];
            }
            let params = from_theta(&trial);
            if let Some(sse) = objective.sse(&params) {
                if sse < current.sse {
                    accepted = Some((trial, params, sse));
                    break;
                }
            }
            lambda *= 0.5;
        }

        let Some((trial, params, sse)) = accepted else {
            debug!(iter, "no improving step");
            break;
        };
        let improvement = (current.sse - sse) / current.sse.max(f64::MIN_POSITIVE);
        theta = trial;
        current = Refinement {
            params,
            sse,
            steps: current.steps + 1,
        };
        debug!(iter, sse, lambda, "accepted step");
        if improvement < REL_TOL {
            break;
        }
    }

    current
}

fn jacobian(objective: &Objective<'_>, theta: &[f64; PARAM_COUNT], r: &[f64]) -> Option<DMatrix<f64>> {
    let mut jac = DMatrix::<f64>::zeros(r.len(), PARAM_COUNT);
    for j in 0..PARAM_COUNT {
        let h = 1e-6 * theta[j].abs().max(1.0);
        let mut bumped = *theta;
        bumped[j] += h;
        let rb = objective.residuals(&from_theta(&bumped))?;
        if rb.len() != r.len() {
            return None;
        }
        for i in 0..r.len() {
            jac[(i, j)] = (rb[i] - r[i]) / h;
        }
    }
    Some(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Horizon, ObservedRecord};
    use crate::math::Exogenous;
    use crate::sim::simulate;

    #[test]
    fn theta_round_trip_keeps_taus_positive() {
        let p = Params::new(-0.5, 12.0, 3e6, 1.1);
        let back = from_theta(&to_theta(&p).unwrap());
        assert!((back.tau_decrease - 12.0).abs() < 1e-9);
        assert!((back.tau_increase - 3e6).abs() < 1e-3);
        assert!(to_theta(&Params::new(-0.5, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn moves_toward_the_generating_alpha() {
        let horizon = Horizon::default();
        let inputs = Exogenous::constant(100.0, 50.0);
        let truth = Params::new(-0.64, 18.83, 1e6, 1.08);
        let traj = simulate(&truth, &inputs, &horizon).unwrap();
        let observed: Vec<ObservedRecord> = traj
            .rows
            .iter()
            .map(|r| ObservedRecord { week: r.time as i64, tpod: r.output, co: 100.0, sc: 50.0 })
            .collect();
        let objective = Objective {
            observed: &observed,
            inputs: &inputs,
            horizon: &horizon,
        };

        let start = Params::new(-0.5, 18.83, 1e6, 1.08);
        let start_sse = objective.sse(&start).unwrap();
        let out = refine(&objective, start, start_sse, 10);

        assert!(out.steps > 0);
        assert!(out.sse < start_sse);
        assert!((out.params.alpha + 0.64).abs() < (start.alpha + 0.64).abs());
    }

    #[test]
    fn zero_iterations_returns_start() {
        let horizon = Horizon::default();
        let inputs = Exogenous::constant(100.0, 100.0);
        let observed = [ObservedRecord { week: 53, tpod: 1.0, co: 100.0, sc: 100.0 }];
        let objective = Objective {
            observed: &observed,
            inputs: &inputs,
            horizon: &horizon,
        };
        let start = Params::reference();
        let out = refine(&objective, start, 0.5, 0);
        assert_eq!(out.params, start);
        assert_eq!(out.steps, 0);
    }
}
