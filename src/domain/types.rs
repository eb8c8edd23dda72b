//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during simulation and calibration
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sampling::SamplingMethod;

/// First reported week of the default horizon.
pub const DEFAULT_START_WEEK: i64 = 53;
/// Last reported week of the default horizon.
pub const DEFAULT_END_WEEK: i64 = 104;
/// Integration sub-steps per reported week (h = 1/64).
pub const DEFAULT_STEPS_PER_UNIT: u32 = 64;

/// Model parameter vector.
///
/// No range validation is performed: a zero time constant only fails when the
/// integrator actually divides by it, and a non-positive `tpod0` simulates
/// without complaint. Callers own the meaning of the numbers they pass in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Elasticity of TPOD to work pressure (any real, typically negative).
    pub alpha: f64,
    /// Adjustment time when indicated TPOD is at or below the current value.
    pub tau_decrease: f64,
    /// Adjustment time when indicated TPOD is above the current value.
    pub tau_increase: f64,
    /// Initial time per order.
    pub tpod0: f64,
}

impl Params {
    pub fn new(alpha: f64, tau_decrease: f64, tau_increase: f64, tpod0: f64) -> Self {
        Self {
            alpha,
            tau_decrease,
            tau_increase,
            tpod0,
        }
    }

    /// Parameter values published with the original service-quality model.
    pub fn reference() -> Self {
        Self::new(-0.64, 18.83, 8_140_000.0, 1.08)
    }
}

/// A labelled parameter vector (one row of the params table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSource {
    pub label: String,
    pub params: Params,
}

/// Fixed integration horizon.
///
/// Reported rows fall on every integer week in `start..=end`; the integrator
/// takes `steps_per_unit` Euler sub-steps between consecutive rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub start: i64,
    pub end: i64,
    pub steps_per_unit: u32,
}

/// Upper bound on reported rows of one run.
pub const MAX_HORIZON_ROWS: u64 = 1_000_000;

/// Upper bound on Euler sub-steps of one run.
pub const MAX_HORIZON_SUBSTEPS: u64 = 1 << 32;

impl Horizon {
    pub fn new(start: i64, end: i64, steps_per_unit: u32) -> Result<Self, SimError> {
        if end < start {
            return Err(SimError::InvalidHorizon(format!(
                "end week {end} is before start week {start}"
            )));
        }
        if steps_per_unit == 0 {
            return Err(SimError::InvalidHorizon(
                "steps per unit must be >= 1".to_string(),
            ));
        }
        let span = end
            .checked_sub(start)
            .and_then(|span| u64::try_from(span).ok())
            .filter(|span| *span < MAX_HORIZON_ROWS)
            .ok_or_else(|| {
                SimError::InvalidHorizon(format!(
                    "{start}..={end} spans more than {MAX_HORIZON_ROWS} weeks"
                ))
            })?;
        if span
            .checked_mul(steps_per_unit as u64)
            .is_none_or(|n| n > MAX_HORIZON_SUBSTEPS)
        {
            return Err(SimError::InvalidHorizon(format!(
                "{span} weeks at {steps_per_unit} steps per week exceed {MAX_HORIZON_SUBSTEPS} sub-steps"
            )));
        }
        Ok(Self {
            start,
            end,
            steps_per_unit,
        })
    }

    /// Build a horizon from an explicit step size.
    ///
    /// `1/dt` must be a positive integer so that reported weeks land exactly on
    /// sub-step boundaries.
    pub fn from_step(start: i64, end: i64, dt: f64) -> Result<Self, SimError> {
        if !(dt.is_finite() && dt > 0.0 && dt <= 1.0) {
            return Err(SimError::InvalidHorizon(format!(
                "step size must be in (0, 1], got {dt}"
            )));
        }
        let per_unit = (1.0 / dt).round();
        if (per_unit * dt - 1.0).abs() > 1e-9 || per_unit > u32::MAX as f64 {
            return Err(SimError::InvalidHorizon(format!(
                "step size {dt} does not divide the reporting unit"
            )));
        }
        Self::new(start, end, per_unit as u32)
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.steps_per_unit as f64
    }

    /// Number of reported rows, `end - start + 1`.
    pub fn row_count(&self) -> usize {
        self.end.abs_diff(self.start) as usize + 1
    }

    /// Total number of Euler sub-steps.
    pub fn substeps(&self) -> u64 {
        self.end.abs_diff(self.start).saturating_mul(self.steps_per_unit as u64)
    }

    /// Time at sub-step index `i`.
    ///
    /// Computed from the index rather than by accumulating `dt`, so every
    /// `i` that is a multiple of `steps_per_unit` maps to an exact integer.
    pub fn time_at(&self, i: u64) -> f64 {
        let per_unit = self.steps_per_unit as u64;
        let whole = self.start as f64 + (i / per_unit) as f64;
        whole + (i % per_unit) as f64 * self.dt()
    }

    pub fn contains(&self, week: i64) -> bool {
        week >= self.start && week <= self.end
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_WEEK,
            end: DEFAULT_END_WEEK,
            steps_per_unit: DEFAULT_STEPS_PER_UNIT,
        }
    }
}

/// One weekly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedRecord {
    pub week: i64,
    /// Observed time per order (the derived output the model reproduces).
    pub tpod: f64,
    /// Customer orders.
    pub co: f64,
    /// Service capacity.
    pub sc: f64,
}

/// One reported row of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub time: f64,
    /// Stock value (TPOD) at `time`.
    pub state: f64,
    /// Indicated TPOD (floor-clamped derived output) at `time`.
    pub output: f64,
}

/// Reported rows of a single run, strictly increasing in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub rows: Vec<TrajectoryRow>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.time).collect()
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.output).collect()
    }

    /// `(time, output)` pairs, the form handed to plotting.
    pub fn output_points(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (r.time, r.output)).collect()
    }

    /// Derived output at an integer week, if the week is inside the horizon.
    pub fn output_at(&self, week: i64) -> Option<f64> {
        let first = self.rows.first()?.time as i64;
        let idx = usize::try_from(week - first).ok()?;
        self.rows.get(idx).map(|r| r.output)
    }

    /// Time of the first row holding a NaN or infinite value.
    pub fn first_non_finite(&self) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| !(r.state.is_finite() && r.output.is_finite()))
            .map(|r| r.time)
    }
}

/// Goodness-of-fit between a trajectory and the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// Number of matched weeks.
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Mean absolute percentage error, in percent. `None` if every observation is zero.
    pub mape: Option<f64>,
    /// Mean of `simulated - observed`.
    pub bias: f64,
    /// Nash-Sutcliffe efficiency. `None` if the observed series is constant.
    pub nse: Option<f64>,
}

/// Pipeline output for one parameter source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRun {
    pub label: String,
    pub params: Params,
    pub trajectory: Trajectory,
    pub metrics: Option<FitMetrics>,
}

/// A saved run file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub horizon: Horizon,
    pub observed: Vec<ObservedRecord>,
    pub runs: Vec<SourceRun>,
}

/// How the calibration treats the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tpod0Mode {
    /// Pin `tpod0` to the first observed TPOD inside the horizon.
    Observed,
    /// Search `tpod0` on a linear grid like the other parameters.
    Grid,
}

/// Configuration of a `simulate` run, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub params_path: PathBuf,
    pub observed_path: PathBuf,
    pub horizon: Horizon,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Axis ranges of the calibration grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub alpha_min: f64,
    pub alpha_max: f64,
    pub alpha_steps: usize,

    pub tau_decrease_min: f64,
    pub tau_decrease_max: f64,
    pub tau_decrease_steps: usize,

    pub tau_increase_min: f64,
    pub tau_increase_max: f64,
    pub tau_increase_steps: usize,

    pub tpod0_mode: Tpod0Mode,
    pub tpod0_min: f64,
    pub tpod0_max: f64,
    pub tpod0_steps: usize,
}

/// Configuration of a `calibrate` run.
#[derive(Debug, Clone)]
pub struct CalibConfig {
    pub observed_path: PathBuf,
    pub horizon: Horizon,
    pub grid: GridConfig,

    /// Gauss-Newton iterations after the grid search (0 disables refinement).
    pub refine_iters: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_params: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Configuration of the synthetic end-to-end `demo` run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    /// Log-normal noise level applied to the synthetic observations.
    pub noise_sigma: f64,
    pub horizon: Horizon,
    pub grid: GridConfig,
    pub refine_iters: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Configuration of the sampling benchmark.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub methods: Vec<SamplingMethod>,
    pub sizes: Vec<usize>,
    pub reps: usize,
    pub seed: u64,
    /// Leading Sobol points to drop (1 skips the origin).
    pub sobol_skip: u64,
    pub export_csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_horizon_reports_52_weeks() {
        let h = Horizon::default();
        assert_eq!(h.row_count(), 52);
        assert_eq!(h.substeps(), 51 * 64);
        assert_eq!(h.dt(), 1.0 / 64.0);
    }

    #[test]
    fn time_at_is_exact_on_unit_boundaries() {
        let h = Horizon::new(53, 104, 64).unwrap();
        for k in 0..=51u64 {
            assert_eq!(h.time_at(k * 64), 53.0 + k as f64);
        }
        assert_eq!(h.time_at(32), 53.5);
    }

    #[test]
    fn from_step_rejects_non_dividing_steps() {
        assert!(Horizon::from_step(0, 10, 0.3).is_err());
        assert!(Horizon::from_step(0, 10, 0.0).is_err());
        let h = Horizon::from_step(0, 10, 0.015625).unwrap();
        assert_eq!(h.steps_per_unit, 64);
    }

    #[test]
    fn horizon_rejects_reversed_range() {
        assert!(Horizon::new(10, 5, 4).is_err());
        assert!(Horizon::new(5, 5, 0).is_err());
    }

    #[test]
    fn horizon_rejects_ranges_too_long_to_simulate() {
        assert!(matches!(
            Horizon::new(i64::MIN, i64::MAX, 1),
            Err(SimError::InvalidHorizon(_))
        ));
        assert!(Horizon::new(0, MAX_HORIZON_ROWS as i64, 1).is_err());
        assert!(Horizon::new(0, 1_000, u32::MAX).is_err());

        let widest = Horizon::new(-5, MAX_HORIZON_ROWS as i64 - 6, 1).unwrap();
        assert_eq!(widest.row_count() as u64, MAX_HORIZON_ROWS);
        assert!(Horizon::from_step(0, 1, 1.0 / u32::MAX as f64).is_ok());
    }

    #[test]
    fn output_at_indexes_by_week() {
        let traj = Trajectory {
            rows: vec![
                TrajectoryRow { time: 53.0, state: 1.0, output: 1.1 },
                TrajectoryRow { time: 54.0, state: 1.0, output: 1.2 },
            ],
        };
        assert_eq!(traj.output_at(54), Some(1.2));
        assert_eq!(traj.output_at(52), None);
        assert_eq!(traj.output_at(55), None);
    }
}
