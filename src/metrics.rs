//! Goodness-of-fit metrics between observed and simulated TPOD.
//!
//! All scalar metrics take observed and simulated slices of equal length.

use crate::domain::{FitMetrics, ObservedRecord, Trajectory};

/// Pair each observed week with the simulated output at that week.
///
/// Weeks outside the trajectory are skipped. Returns `(observed, simulated)`.
pub fn paired_series(trajectory: &Trajectory, observed: &[ObservedRecord]) -> (Vec<f64>, Vec<f64>) {
    observed
        .iter()
        .filter_map(|r| trajectory.output_at(r.week).map(|sim| (r.tpod, sim)))
        .unzip()
}

/// Sum of squared errors.
pub fn sse(observed: &[f64], simulated: &[f64]) -> f64 {
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum()
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    (sse(observed, simulated) / observed.len() as f64).sqrt()
}

/// Mean Absolute Error. Range: [0, inf), 0 = perfect.
pub fn mae(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).abs())
        .sum::<f64>()
        / n
}

/// Mean Absolute Percentage Error, in percent.
///
/// Observations equal to zero are skipped; if all are zero the result is infinite.
pub fn mape(observed: &[f64], simulated: &[f64]) -> f64 {
    let terms: Vec<f64> = observed
        .iter()
        .zip(simulated)
        .filter(|(o, _)| **o != 0.0)
        .map(|(o, s)| ((o - s) / o).abs())
        .collect();
    if terms.is_empty() {
        return f64::INFINITY;
    }
    100.0 * terms.iter().sum::<f64>() / terms.len() as f64
}

/// Mean of `simulated - observed`. Positive = overestimation.
pub fn bias(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len() as f64;
    simulated
        .iter()
        .zip(observed)
        .map(|(s, o)| s - o)
        .sum::<f64>()
        / n
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let n = observed.len();
    let mean_obs: f64 = observed.iter().sum::<f64>() / n as f64;
    let numerator = sse(observed, simulated);
    let denominator: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - numerator / denominator
}

/// Compute every metric at once. `None` when no weeks overlap.
pub fn fit_metrics(trajectory: &Trajectory, observed: &[ObservedRecord]) -> Option<FitMetrics> {
    let (obs, sim) = paired_series(trajectory, observed);
    if obs.is_empty() {
        return None;
    }
    let sse = sse(&obs, &sim);
    Some(FitMetrics {
        n: obs.len(),
        sse,
        rmse: (sse / obs.len() as f64).sqrt(),
        mae: mae(&obs, &sim),
        mape: Some(mape(&obs, &sim)).filter(|v| v.is_finite()),
        bias: bias(&obs, &sim),
        nse: Some(nse(&obs, &sim)).filter(|v| v.is_finite()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrajectoryRow;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_match_scores() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(rmse(&obs, &obs), 0.0);
        assert_relative_eq!(mae(&obs, &obs), 0.0);
        assert_relative_eq!(mape(&obs, &obs), 0.0);
        assert_relative_eq!(nse(&obs, &obs), 1.0);
    }

    #[test]
    fn constant_offset() {
        let obs = [1.0, 2.0, 4.0];
        let sim = [1.5, 2.5, 4.5];
        assert_relative_eq!(sse(&obs, &sim), 0.75);
        assert_relative_eq!(rmse(&obs, &sim), 0.5);
        assert_relative_eq!(mae(&obs, &sim), 0.5);
        assert_relative_eq!(bias(&obs, &sim), 0.5);
        assert_relative_eq!(mape(&obs, &sim), 100.0 * (0.5 + 0.25 + 0.125) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_simulation_gives_zero_nse() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [3.0; 5];
        assert_relative_eq!(nse(&obs, &sim), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn constant_observed_nse_is_neg_infinity() {
        let obs = [2.0; 4];
        let sim = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(nse(&obs, &sim), f64::NEG_INFINITY);
    }

    #[test]
    fn mape_skips_zero_observations() {
        assert_relative_eq!(mape(&[0.0, 2.0], &[1.0, 3.0]), 50.0);
        assert_eq!(mape(&[0.0], &[1.0]), f64::INFINITY);
    }

    #[test]
    fn pairs_by_week_and_skips_outside_horizon() {
        let traj = Trajectory {
            rows: (53..=55)
                .map(|w| TrajectoryRow { time: w as f64, state: 1.0, output: w as f64 / 10.0 })
                .collect(),
        };
        let observed = [
            ObservedRecord { week: 52, tpod: 9.0, co: 1.0, sc: 1.0 },
            ObservedRecord { week: 54, tpod: 5.0, co: 1.0, sc: 1.0 },
            ObservedRecord { week: 55, tpod: 5.5, co: 1.0, sc: 1.0 },
            ObservedRecord { week: 56, tpod: 9.0, co: 1.0, sc: 1.0 },
        ];
        let (obs, sim) = paired_series(&traj, &observed);
        assert_eq!(obs, vec![5.0, 5.5]);
        assert_eq!(sim, vec![5.4, 5.5]);

        let m = fit_metrics(&traj, &observed).unwrap();
        assert_eq!(m.n, 2);
        assert!(m.nse.is_some());
        assert_relative_eq!(m.rmse, (0.16f64 / 2.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn undefined_scores_are_none() {
        let traj = Trajectory {
            rows: vec![TrajectoryRow { time: 53.0, state: 1.0, output: 1.0 }],
        };
        let observed = [ObservedRecord { week: 53, tpod: 0.0, co: 1.0, sc: 1.0 }];
        let m = fit_metrics(&traj, &observed).unwrap();
        assert_eq!(m.mape, None);
        assert_eq!(m.nse, None);
        assert_relative_eq!(m.bias, 1.0);
    }

    #[test]
    fn no_overlap_gives_none() {
        let traj = Trajectory::default();
        let observed = [ObservedRecord { week: 1, tpod: 1.0, co: 1.0, sc: 1.0 }];
        assert!(fit_metrics(&traj, &observed).is_none());
    }
}
