//! Shared pipeline logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load inputs -> simulate each source (parallel) -> metrics -> [calibrate]
//!
//! The command handlers in `app` then only deal with presentation and exports.

use rayon::prelude::*;
use tracing::info;

use crate::data::{demo_inputs, generate_observed};
use crate::domain::{
    CalibConfig, DemoConfig, GridConfig, Horizon, ObservedRecord, ParamSource, Params, SimConfig, SourceRun,
};
use crate::error::AppError;
use crate::fit::{Calibration, CalibrationOptions, ParamGrid, calibrate};
use crate::io::{load_observed, load_params_table};
use crate::math::Exogenous;
use crate::metrics::fit_metrics;
use crate::sim::simulate_checked;

/// Label given to calibrated parameters in reports and exports.
pub const CALIBRATED_LABEL: &str = "calibrated";

/// Outputs of a `simulate` run.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub observed: Vec<ObservedRecord>,
    pub runs: Vec<SourceRun>,
}

/// Outputs of a `calibrate` or `demo` run.
#[derive(Debug, Clone)]
pub struct CalibrationOutput {
    pub observed: Vec<ObservedRecord>,
    pub calibration: Calibration,
    /// Compared sources; the calibrated run is always last.
    pub runs: Vec<SourceRun>,
}

/// Simulate every source against shared inputs, in parallel.
///
/// Results keep the order of `sources`. A source whose run fails aborts the
/// whole batch with that source's error.
pub fn simulate_sources(
    sources: &[ParamSource],
    inputs: &Exogenous,
    observed: &[ObservedRecord],
    horizon: &Horizon,
) -> Result<Vec<SourceRun>, AppError> {
    sources
        .par_iter()
        .map(|source| {
            let trajectory = simulate_checked(&source.params, inputs, horizon)
                .map_err(|e| AppError::from(e).context(&format!("source '{}'", source.label)))?;
            let metrics = fit_metrics(&trajectory, observed);
            Ok(SourceRun {
                label: source.label.clone(),
                params: source.params,
                trajectory,
                metrics,
            })
        })
        .collect()
}

/// Load the params table and observed series, then simulate every source.
pub fn run_simulation(config: &SimConfig) -> Result<SimulationOutput, AppError> {
    let sources = load_params_table(&config.params_path)?;
    let observed = load_observed(&config.observed_path)?;
    let inputs = Exogenous::from_observed(&observed)?;
    info!(sources = sources.len(), weeks = observed.len(), "inputs loaded");

    let runs = simulate_sources(&sources, &inputs, &observed, &config.horizon)?;
    info!(runs = runs.len(), rows = config.horizon.row_count(), "simulation complete");
    Ok(SimulationOutput { observed, runs })
}

/// Load the observed series and calibrate against it.
pub fn run_calibration(config: &CalibConfig) -> Result<CalibrationOutput, AppError> {
    let observed = load_observed(&config.observed_path)?;
    let inputs = Exogenous::from_observed(&observed)?;
    info!(weeks = observed.len(), "observed series loaded");

    calibrate_and_compare(
        observed,
        &inputs,
        &config.horizon,
        &config.grid,
        config.refine_iters,
        Vec::new(),
    )
}

/// Synthetic end-to-end run: known parameters -> noisy observations -> calibration.
///
/// The report compares the generating parameters, the reference parameters
/// and the calibrated ones.
pub fn run_demo(config: &DemoConfig) -> Result<CalibrationOutput, AppError> {
    let truth = demo_truth();
    let inputs = demo_inputs(&config.horizon)?;
    let observed = generate_observed(&truth, &inputs, &config.horizon, config.noise_sigma, config.seed)?;
    info!(weeks = observed.len(), sigma = config.noise_sigma, seed = config.seed, "synthetic observations generated");

    let baseline = vec![
        ParamSource {
            label: "truth".to_string(),
            params: truth,
        },
        ParamSource {
            label: "reference".to_string(),
            params: Params::reference(),
        },
    ];
    calibrate_and_compare(
        observed,
        &inputs,
        &config.horizon,
        &config.grid,
        config.refine_iters,
        baseline,
    )
}

/// Parameters the demo dataset is generated from.
pub fn demo_truth() -> Params {
    Params::new(-0.55, 14.0, 45.0, 1.05)
}

fn calibrate_and_compare(
    observed: Vec<ObservedRecord>,
    inputs: &Exogenous,
    horizon: &Horizon,
    grid_config: &GridConfig,
    refine_iters: usize,
    mut sources: Vec<ParamSource>,
) -> Result<CalibrationOutput, AppError> {
    let first_in_horizon = observed
        .iter()
        .find(|r| horizon.contains(r.week))
        .map(|r| r.tpod);
    let grid = ParamGrid::from_config(grid_config, first_in_horizon)?;

    let calibration = calibrate(&observed, inputs, horizon, &grid, &CalibrationOptions { refine_iters })?;

    sources.push(ParamSource {
        label: CALIBRATED_LABEL.to_string(),
        params: calibration.best,
    });
    let runs = simulate_sources(&sources, inputs, &observed, horizon)?;

    Ok(CalibrationOutput {
        observed,
        calibration,
        runs,
    })
}
