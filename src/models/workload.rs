//! Workload feedback law for time per order (TPOD).
//!
//! At every sub-step the model turns the current stock and the two exogenous
//! inputs into an indicated TPOD and a rate of change:
//!
//! ```text
//! desired  = tpod * co
//! wp_mult  = (desired / sc)^alpha          (1e6 when desired == 0)
//! output   = max(0.1, qp * wp_mult * tpod) (qp = 1.0)
//! tau      = tau_increase if output > tpod else tau_decrease
//! rate     = (output - tpod) / tau
//! ```

use crate::domain::Params;
use crate::error::{SimError, TimeConstant};

/// Work-pressure multiplier used when desired capacity is exactly zero.
pub const WORK_PRESSURE_SENTINEL: f64 = 1_000_000.0;

/// Lower bound on indicated TPOD.
pub const OUTPUT_FLOOR: f64 = 0.1;

/// Quality-pressure factor (held constant in this model).
pub const QUALITY_PRESSURE: f64 = 1.0;

/// Everything computed for one sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEval {
    pub desired: f64,
    pub wp_mult: f64,
    pub output: f64,
    pub branch: TimeConstant,
    pub rate: f64,
}

/// `(desired / sc)^alpha`, with the zero-desired guard applied first.
pub fn work_pressure_multiplier(desired: f64, sc: f64, alpha: f64) -> f64 {
    if desired == 0.0 {
        return WORK_PRESSURE_SENTINEL;
    }
    (desired / sc).powf(alpha)
}

/// Indicated TPOD, clamped to [`OUTPUT_FLOOR`].
///
/// NaN is passed through rather than clamped so that malformed inputs stay
/// visible in the trajectory.
pub fn indicated_output(tpod: f64, wp_mult: f64) -> f64 {
    let raw = QUALITY_PRESSURE * wp_mult * tpod;
    if raw < OUTPUT_FLOOR { OUTPUT_FLOOR } else { raw }
}

/// Evaluate the feedback law at one point in time.
pub fn evaluate(params: &Params, tpod: f64, co: f64, sc: f64, time: f64) -> Result<StepEval, SimError> {
    let desired = tpod * co;
    let wp_mult = work_pressure_multiplier(desired, sc, params.alpha);
    let output = indicated_output(tpod, wp_mult);

    let (branch, tau) = if output > tpod {
        (TimeConstant::Increase, params.tau_increase)
    } else {
        (TimeConstant::Decrease, params.tau_decrease)
    };
    if tau == 0.0 {
        return Err(SimError::ZeroTimeConstant { time, which: branch });
    }

    Ok(StepEval {
        desired,
        wp_mult,
        output,
        branch,
        rate: (output - tpod) / tau,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_desired_uses_sentinel() {
        assert_eq!(work_pressure_multiplier(0.0, 100.0, -0.64), WORK_PRESSURE_SENTINEL);
        // Even with zero capacity: the guard precedes the ratio.
        assert_eq!(work_pressure_multiplier(0.0, 0.0, -0.64), WORK_PRESSURE_SENTINEL);
        let step = evaluate(&Params::reference(), 1.08, 0.0, 100.0, 53.0).unwrap();
        assert_eq!(step.wp_mult, WORK_PRESSURE_SENTINEL);
        assert!(step.wp_mult.is_finite());
    }

    #[test]
    fn balanced_capacity_is_a_fixed_point() {
        let step = evaluate(&Params::reference(), 1.0, 100.0, 100.0, 53.0).unwrap();
        assert_eq!(step.wp_mult, 1.0);
        assert_eq!(step.output, 1.0);
        assert_eq!(step.rate, 0.0);
        assert_eq!(step.branch, TimeConstant::Decrease);
    }

    #[test]
    fn overload_selects_decrease_branch() {
        let params = Params::reference();
        let step = evaluate(&params, 1.08, 100.0, 50.0, 53.0).unwrap();
        assert_relative_eq!(step.wp_mult, 2.16f64.powf(-0.64), epsilon = 1e-12);
        assert!(step.output < 1.08);
        assert_eq!(step.branch, TimeConstant::Decrease);
        assert_relative_eq!(step.rate, (step.output - 1.08) / 18.83, epsilon = 1e-12);
    }

    #[test]
    fn slack_selects_increase_branch() {
        let step = evaluate(&Params::reference(), 1.0, 100.0, 200.0, 53.0).unwrap();
        assert!(step.output > 1.0);
        assert_eq!(step.branch, TimeConstant::Increase);
    }

    #[test]
    fn zero_time_constant_fails_only_when_selected() {
        let params = Params::new(-0.64, 0.0, 10.0, 1.0);
        // Increase branch: tau_decrease = 0 is never touched.
        assert!(evaluate(&params, 1.0, 100.0, 200.0, 53.0).is_ok());
        let err = evaluate(&params, 1.0, 100.0, 50.0, 53.25).unwrap_err();
        assert_eq!(
            err,
            SimError::ZeroTimeConstant { time: 53.25, which: TimeConstant::Decrease }
        );
    }

    #[test]
    fn output_is_floored() {
        // Huge overload drives the multiplier toward zero.
        let step = evaluate(&Params::reference(), 1.0, 1e9, 1.0, 53.0).unwrap();
        assert_eq!(step.output, OUTPUT_FLOOR);
    }

    #[test]
    fn nan_input_is_not_clamped_away() {
        let step = evaluate(&Params::reference(), 1.0, f64::NAN, 100.0, 53.0).unwrap();
        assert!(step.output.is_nan());
    }

    proptest! {
        #[test]
        fn output_never_below_floor(
            tpod in -10.0f64..10.0,
            co in 0.0f64..1e4,
            sc in 0.0f64..1e4,
            alpha in -5.0f64..5.0,
        ) {
            let wp = work_pressure_multiplier(tpod * co, sc, alpha);
            let out = indicated_output(tpod, wp);
            if !out.is_nan() {
                prop_assert!(out >= OUTPUT_FLOOR);
            }
        }
    }
}
