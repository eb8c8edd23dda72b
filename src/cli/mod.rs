//! Command-line parsing for the workload-model simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{DEFAULT_END_WEEK, DEFAULT_START_WEEK, DEFAULT_STEPS_PER_UNIT, Tpod0Mode};
use crate::sampling::SamplingMethod;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sdc",
    version,
    about = "System-dynamics workload model: simulate, calibrate, compare samplers"
)]
pub struct Cli {
    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate every source in a params table and compare against observed data.
    Simulate(SimulateArgs),
    /// Calibrate the four model parameters against an observed series.
    Calibrate(CalibrateArgs),
    /// Run the circle-area benchmark for uniform, LHS and Sobol sampling.
    Sample(SampleArgs),
    /// Plot a previously exported run JSON.
    Plot(PlotArgs),
    /// Generate a synthetic dataset, calibrate against it and report (no input files).
    Demo(DemoArgs),
}

/// Integration horizon.
#[derive(Debug, Args, Clone)]
pub struct HorizonArgs {
    /// First reported week.
    #[arg(long, default_value_t = DEFAULT_START_WEEK, allow_negative_numbers = true)]
    pub start: i64,

    /// Last reported week.
    #[arg(long, default_value_t = DEFAULT_END_WEEK, allow_negative_numbers = true)]
    pub end: i64,

    /// Euler sub-steps per reported week.
    #[arg(long, default_value_t = DEFAULT_STEPS_PER_UNIT)]
    pub steps_per_unit: u32,

    /// Sub-step size instead of `--steps-per-unit` (1/dt must be an integer).
    #[arg(long, conflicts_with = "steps_per_unit")]
    pub dt: Option<f64>,
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotOpts {
    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Calibration grid.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Minimum elasticity.
    #[arg(long, default_value_t = -1.2, allow_negative_numbers = true)]
    pub alpha_min: f64,

    /// Maximum elasticity.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub alpha_max: f64,

    /// Elasticity grid steps (linear spacing).
    #[arg(long, default_value_t = 13)]
    pub alpha_steps: usize,

    /// Minimum decrease time constant (weeks).
    #[arg(long, default_value_t = 1.0)]
    pub tau_decrease_min: f64,

    /// Maximum decrease time constant (weeks).
    #[arg(long, default_value_t = 200.0)]
    pub tau_decrease_max: f64,

    /// Decrease time constant grid steps (log spacing).
    #[arg(long, default_value_t = 12)]
    pub tau_decrease_steps: usize,

    /// Minimum increase time constant (weeks).
    #[arg(long, default_value_t = 1.0)]
    pub tau_increase_min: f64,

    /// Maximum increase time constant (weeks).
    #[arg(long, default_value_t = 1e7)]
    pub tau_increase_max: f64,

    /// Increase time constant grid steps (log spacing).
    #[arg(long, default_value_t = 15)]
    pub tau_increase_steps: usize,

    /// Initial state: pin to the first observation or search a grid.
    #[arg(long, value_enum, default_value_t = Tpod0Mode::Observed)]
    pub tpod0: Tpod0Mode,

    /// Minimum initial TPOD (with `--tpod0 grid`).
    #[arg(long, default_value_t = 0.5)]
    pub tpod0_min: f64,

    /// Maximum initial TPOD (with `--tpod0 grid`).
    #[arg(long, default_value_t = 2.0)]
    pub tpod0_max: f64,

    /// Initial TPOD grid steps (with `--tpod0 grid`).
    #[arg(long, default_value_t = 7)]
    pub tpod0_steps: usize,

    /// Gauss-Newton refinement iterations after the grid search (0 disables).
    #[arg(long, default_value_t = 25)]
    pub refine_iters: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Params table CSV (`source,alpha,tau_decrease,tau_increase,tpod0`).
    #[arg(long, value_name = "CSV")]
    pub params: PathBuf,

    /// Observed series CSV (`week,tpod,co,sc`).
    #[arg(long, value_name = "CSV")]
    pub observed: PathBuf,

    #[command(flatten)]
    pub horizon: HorizonArgs,

    #[command(flatten)]
    pub plot: PlotOpts,

    /// Export every trajectory to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the run (trajectories + metrics + observed) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write an SVG comparison chart.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CalibrateArgs {
    /// Observed series CSV (`week,tpod,co,sc`).
    #[arg(long, value_name = "CSV")]
    pub observed: PathBuf,

    #[command(flatten)]
    pub horizon: HorizonArgs,

    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub plot: PlotOpts,

    /// Write the calibrated parameters as a one-row params table.
    #[arg(long = "export-params", value_name = "CSV")]
    pub export_params: Option<PathBuf>,

    /// Export the calibrated run to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write an SVG comparison chart.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Sampling methods to compare (comma-separated).
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = SamplingMethod::ALL)]
    pub methods: Vec<SamplingMethod>,

    /// Sample sizes (comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = [100usize, 1000, 10000])]
    pub sizes: Vec<usize>,

    /// Repetitions per (method, size).
    #[arg(long, default_value_t = 20)]
    pub reps: usize,

    /// Base seed; repetition `k` uses `seed + k`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Leading Sobol points to drop (`1` skips the origin).
    #[arg(long, default_value_t = 0)]
    pub sobol_skip: u64,

    /// Export benchmark rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for plotting a saved run.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Run JSON file produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write an SVG chart.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Seed for the synthetic observation noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Log-normal noise level of the synthetic observations.
    #[arg(long, default_value_t = 0.03)]
    pub noise: f64,

    #[command(flatten)]
    pub horizon: HorizonArgs,

    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub plot: PlotOpts,

    /// Export the demo run to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write an SVG comparison chart.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}
