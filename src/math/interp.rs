//! Piecewise-linear interpolation with flat extrapolation.
//!
//! Both exogenous inputs (customer orders and service capacity) are weekly
//! tables that the integrator queries at every sub-step. Between breakpoints we
//! blend linearly; outside the table we hold the nearest endpoint value.

use crate::domain::ObservedRecord;
use crate::error::SimError;

/// A sorted table of `(time, value)` breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    name: String,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl Interpolator {
    /// Build from unsorted breakpoints.
    ///
    /// Breakpoints are sorted by time (stable, so duplicate times keep input
    /// order). Values are not checked: a NaN value flows through to whatever
    /// queries land near it.
    pub fn new(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, SimError> {
        let name = name.into();
        let mut points: Vec<(f64, f64)> = points.into_iter().collect();
        if points.is_empty() {
            return Err(SimError::EmptySeries { name });
        }
        if points.iter().any(|(t, _)| !t.is_finite()) {
            return Err(SimError::NonFiniteBreakpoint { name });
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (times, values) = points.into_iter().unzip();
        Ok(Self {
            name,
            times,
            values,
        })
    }

    /// A series that evaluates to `value` everywhere.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            times: vec![0.0],
            values: vec![value],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time range covered by breakpoints.
    pub fn domain(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Evaluate at `t`.
    pub fn eval(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.values[0];
        }
        if t >= self.times[last] {
            return self.values[last];
        }

        // First breakpoint strictly after `t`; in range 1..=last here.
        let hi = self.times.partition_point(|&x| x <= t);
        let lo = hi - 1;
        let (t0, t1) = (self.times[lo], self.times[hi]);
        let (v0, v1) = (self.values[lo], self.values[hi]);
        let u = (t - t0) / (t1 - t0);
        v0 + u * (v1 - v0)
    }
}

/// The two exogenous drivers of the workload model.
#[derive(Debug, Clone, PartialEq)]
pub struct Exogenous {
    /// Customer orders.
    pub co: Interpolator,
    /// Service capacity.
    pub sc: Interpolator,
}

impl Exogenous {
    /// Build both series from weekly observed records.
    pub fn from_observed(records: &[ObservedRecord]) -> Result<Self, SimError> {
        let co = Interpolator::new("co", records.iter().map(|r| (r.week as f64, r.co)))?;
        let sc = Interpolator::new("sc", records.iter().map(|r| (r.week as f64, r.sc)))?;
        Ok(Self { co, sc })
    }

    pub fn constant(co: f64, sc: f64) -> Self {
        Self {
            co: Interpolator::constant("co", co),
            sc: Interpolator::constant("sc", sc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blends_linearly_between_breakpoints() {
        let s = Interpolator::new("x", [(0.0, 0.0), (10.0, 100.0)]).unwrap();
        assert_eq!(s.eval(2.5), 25.0);
        assert_eq!(s.eval(10.0), 100.0);
    }

    #[test]
    fn clamps_outside_domain() {
        let s = Interpolator::new("x", [(53.0, 4.0), (54.0, 8.0), (60.0, 2.0)]).unwrap();
        assert_eq!(s.eval(-1e9), 4.0);
        assert_eq!(s.eval(52.999), 4.0);
        assert_eq!(s.eval(61.0), 2.0);
        assert_eq!(s.eval(f64::INFINITY), 2.0);
    }

    #[test]
    fn sorts_unordered_breakpoints() {
        let s = Interpolator::new("x", [(2.0, 20.0), (0.0, 0.0), (1.0, 10.0)]).unwrap();
        assert_eq!(s.domain(), (0.0, 2.0));
        assert_eq!(s.eval(1.5), 15.0);
    }

    #[test]
    fn single_point_is_constant() {
        let s = Interpolator::new("x", [(7.0, 3.5)]).unwrap();
        assert_eq!(s.eval(-100.0), 3.5);
        assert_eq!(s.eval(7.0), 3.5);
        assert_eq!(s.eval(100.0), 3.5);
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = Interpolator::new("co", std::iter::empty()).unwrap_err();
        assert_eq!(err, SimError::EmptySeries { name: "co".to_string() });
    }

    #[test]
    fn nan_query_propagates() {
        let s = Interpolator::constant("x", 1.0);
        assert!(s.eval(f64::NAN).is_nan());
    }

    #[test]
    fn exogenous_from_observed_uses_weeks_as_time() {
        let records = [
            ObservedRecord { week: 53, tpod: 1.0, co: 100.0, sc: 50.0 },
            ObservedRecord { week: 55, tpod: 1.0, co: 200.0, sc: 70.0 },
        ];
        let exo = Exogenous::from_observed(&records).unwrap();
        assert_eq!(exo.co.eval(54.0), 150.0);
        assert_eq!(exo.sc.eval(54.0), 60.0);
    }
}
