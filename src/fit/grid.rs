//! Parameter grid generation.
//!
//! Calibration starts with a deterministic grid search over the four model
//! parameters:
//! - `alpha`: linear spacing (it may be negative)
//! - `tau_decrease`, `tau_increase`: log spacing (they span orders of magnitude)
//! - `tpod0`: linear spacing, or a single pinned value

use crate::domain::{GridConfig, Params, Tpod0Mode};
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max >= min) {
        return Err(AppError::new(
            2,
            format!("Invalid log range: min={min}, max={max} (must be finite, >0, and max>=min)."),
        ));
    }
    if steps == 0 {
        return Err(AppError::new(2, "Grid steps must be >= 1."));
    }
    if steps == 1 || min == max {
        return Ok(vec![min]);
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    // Pin the endpoints exactly; exp(ln(x)) can be off by an ulp.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max >= min) {
        return Err(AppError::new(
            2,
            format!("Invalid range: min={min}, max={max} (must be finite and max>=min)."),
        ));
    }
    if steps == 0 {
        return Err(AppError::new(2, "Grid steps must be >= 1."));
    }
    if steps == 1 || min == max {
        return Ok(vec![min]);
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    out[steps - 1] = max;
    Ok(out)
}

/// Axis values for each parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub alpha: Vec<f64>,
    pub tau_decrease: Vec<f64>,
    pub tau_increase: Vec<f64>,
    pub tpod0: Vec<f64>,
}

impl ParamGrid {
    /// Build the grid described by a config.
    ///
    /// `observed_tpod0` is the first observed TPOD inside the horizon; it is
    /// required when the config pins `tpod0` to the data.
    pub fn from_config(config: &GridConfig, observed_tpod0: Option<f64>) -> Result<Self, AppError> {
        let tpod0 = match config.tpod0_mode {
            Tpod0Mode::Observed => {
                let Some(v) = observed_tpod0 else {
                    return Err(AppError::new(3, "No observation inside the horizon to pin tpod0 to."));
                };
                vec![v]
            }
            Tpod0Mode::Grid => lin_space(config.tpod0_min, config.tpod0_max, config.tpod0_steps)?,
        };

        Ok(Self {
            alpha: lin_space(config.alpha_min, config.alpha_max, config.alpha_steps)?,
            tau_decrease: log_space(
                config.tau_decrease_min,
                config.tau_decrease_max,
                config.tau_decrease_steps,
            )?,
            tau_increase: log_space(
                config.tau_increase_min,
                config.tau_increase_max,
                config.tau_increase_steps,
            )?,
            tpod0,
        })
    }

    pub fn len(&self) -> usize {
        self.alpha.len() * self.tau_decrease.len() * self.tau_increase.len() * self.tpod0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product in a fixed order (alpha outermost, tpod0 innermost).
    ///
    /// The order defines the tie-break index used by calibration.
    pub fn candidates(&self) -> Vec<Params> {
        let mut out = Vec::with_capacity(self.len());
        for &alpha in &self.alpha {
            for &tau_decrease in &self.tau_decrease {
                for &tau_increase in &self.tau_increase {
                    for &tpod0 in &self.tpod0 {
                        out.push(Params::new(alpha, tau_decrease, tau_increase, tpod0));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert_eq!(v[0], 0.1);
        assert_eq!(v[v.len() - 1], 10.0);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_non_positive() {
        assert!(log_space(0.0, 10.0, 5).is_err());
        assert!(log_space(-1.0, 10.0, 5).is_err());
        assert_eq!(log_space(1.0, 10.0, 0).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn lin_space_handles_negative_ranges() {
        let v = lin_space(-1.0, 0.0, 5).unwrap();
        assert_eq!(v, vec![-1.0, -0.75, -0.5, -0.25, 0.0]);
    }

    #[test]
    fn single_step_collapses_to_min() {
        assert_eq!(lin_space(2.0, 3.0, 1).unwrap(), vec![2.0]);
        assert_eq!(log_space(2.0, 2.0, 7).unwrap(), vec![2.0]);
    }

    fn grid_config(tpod0_mode: Tpod0Mode) -> GridConfig {
        GridConfig {
            alpha_min: -1.0,
            alpha_max: 0.0,
            alpha_steps: 5,
            tau_decrease_min: 1.0,
            tau_decrease_max: 100.0,
            tau_decrease_steps: 3,
            tau_increase_min: 10.0,
            tau_increase_max: 1e7,
            tau_increase_steps: 7,
            tpod0_mode,
            tpod0_min: 0.5,
            tpod0_max: 1.5,
            tpod0_steps: 3,
        }
    }

    #[test]
    fn from_config_pins_tpod0_to_observation() {
        let grid = ParamGrid::from_config(&grid_config(Tpod0Mode::Observed), Some(1.08)).unwrap();
        assert_eq!(grid.tpod0, vec![1.08]);
        assert_eq!(grid.tau_decrease.len(), 3);
        assert_eq!(grid.tau_decrease[2], 100.0);
        assert!((grid.tau_decrease[1] - 10.0).abs() < 1e-9);
        assert_eq!(grid.len(), 5 * 3 * 7);

        let err = ParamGrid::from_config(&grid_config(Tpod0Mode::Observed), None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn from_config_can_search_tpod0() {
        let grid = ParamGrid::from_config(&grid_config(Tpod0Mode::Grid), None).unwrap();
        assert_eq!(grid.tpod0, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn candidates_cover_the_cartesian_product() {
        let grid = ParamGrid {
            alpha: vec![-1.0, -0.5],
            tau_decrease: vec![10.0, 20.0, 40.0],
            tau_increase: vec![1e6],
            tpod0: vec![1.0, 1.1],
        };
        let c = grid.candidates();
        assert_eq!(c.len(), grid.len());
        assert_eq!(c.len(), 12);
        assert_eq!(c[0], Params::new(-1.0, 10.0, 1e6, 1.0));
        assert_eq!(c[1], Params::new(-1.0, 10.0, 1e6, 1.1));
        assert_eq!(c[11], Params::new(-0.5, 40.0, 1e6, 1.1));
    }
}
