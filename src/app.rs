//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initialises logging
//! - runs the simulation / calibration / benchmark pipelines
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    CalibrateArgs, Cli, Command, DemoArgs, GridArgs, HorizonArgs, PlotArgs, PlotOpts, SampleArgs, SimulateArgs,
};
use crate::domain::{CalibConfig, DemoConfig, GridConfig, Horizon, ParamSource, SampleConfig, SimConfig};
use crate::error::AppError;
use crate::io::{
    build_run_file, read_run_json, write_benchmark_csv, write_params_csv, write_run_json, write_trajectories_csv,
};
use crate::plot::{render_ascii_plot, render_ascii_plot_from_run_file, write_svg_chart};
use crate::report::{format_benchmark, format_calibration, format_metrics_table, format_run_summary};

pub mod pipeline;

/// Entry point for the `sdc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Simulate(args) => handle_simulate(&args),
        Command::Calibrate(args) => handle_calibrate(&args),
        Command::Sample(args) => handle_sample(&args),
        Command::Plot(args) => handle_plot(&args),
        Command::Demo(args) => handle_demo(&args),
    }
}

/// Logs go to stderr so stdout carries only reports.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(args)?;
    let out = pipeline::run_simulation(&config)?;

    println!("{}", format_run_summary(&config.horizon, &out.observed, &out.runs));
    println!("{}", format_metrics_table(&out.runs));

    if config.plot {
        let plot = render_ascii_plot(
            &out.runs,
            &out.observed,
            &config.horizon,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        write_trajectories_csv(path, &out.runs, &out.observed)?;
        info!(path = %path.display(), "trajectories exported");
    }
    if let Some(path) = &config.export_json {
        write_run_json(path, &build_run_file(config.horizon, &out.observed, &out.runs))?;
        info!(path = %path.display(), "run JSON exported");
    }
    if let Some(path) = &config.svg {
        write_svg_chart(path, &out.runs, &out.observed, &config.horizon)?;
        info!(path = %path.display(), "SVG chart written");
    }

    Ok(())
}

fn handle_calibrate(args: &CalibrateArgs) -> Result<(), AppError> {
    let config = calib_config_from_args(args)?;
    let out = pipeline::run_calibration(&config)?;

    println!("{}", format_calibration(&out.calibration));
    println!("{}", format_metrics_table(&out.runs));

    if config.plot {
        let plot = render_ascii_plot(
            &out.runs,
            &out.observed,
            &config.horizon,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_params {
        let calibrated = ParamSource {
            label: pipeline::CALIBRATED_LABEL.to_string(),
            params: out.calibration.best,
        };
        write_params_csv(path, &[calibrated])?;
        info!(path = %path.display(), "calibrated params exported");
    }
    if let Some(path) = &config.export_json {
        write_run_json(path, &build_run_file(config.horizon, &out.observed, &out.runs))?;
        info!(path = %path.display(), "run JSON exported");
    }
    if let Some(path) = &config.svg {
        write_svg_chart(path, &out.runs, &out.observed, &config.horizon)?;
        info!(path = %path.display(), "SVG chart written");
    }

    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(args);
    let rows = crate::sampling::run_benchmark(&config)?;

    println!("{}", format_benchmark(&rows));

    if let Some(path) = &config.export_csv {
        write_benchmark_csv(path, &rows)?;
        info!(path = %path.display(), "benchmark rows exported");
    }
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let run = read_run_json(&args.run)?;
    info!(tool = %run.tool, generated_at = %run.generated_at, runs = run.runs.len(), "run file loaded");

    println!("{}", render_ascii_plot_from_run_file(&run, args.width, args.height));

    if let Some(path) = &args.svg {
        write_svg_chart(path, &run.runs, &run.observed, &run.horizon)?;
        info!(path = %path.display(), "SVG chart written");
    }
    Ok(())
}

fn handle_demo(args: &DemoArgs) -> Result<(), AppError> {
    let config = demo_config_from_args(args)?;
    let out = pipeline::run_demo(&config)?;

    println!("{}", format_run_summary(&config.horizon, &out.observed, &out.runs));
    println!("{}", format_calibration(&out.calibration));
    println!("{}", format_metrics_table(&out.runs));

    if config.plot {
        let plot = render_ascii_plot(
            &out.runs,
            &out.observed,
            &config.horizon,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_json {
        write_run_json(path, &build_run_file(config.horizon, &out.observed, &out.runs))?;
        info!(path = %path.display(), "run JSON exported");
    }
    if let Some(path) = &config.svg {
        write_svg_chart(path, &out.runs, &out.observed, &config.horizon)?;
        info!(path = %path.display(), "SVG chart written");
    }
    Ok(())
}

pub fn horizon_from_args(args: &HorizonArgs) -> Result<Horizon, AppError> {
    let horizon = match args.dt {
        Some(dt) => Horizon::from_step(args.start, args.end, dt)?,
        None => Horizon::new(args.start, args.end, args.steps_per_unit)?,
    };
    Ok(horizon)
}

pub fn grid_config_from_args(args: &GridArgs) -> GridConfig {
    GridConfig {
        alpha_min: args.alpha_min,
        alpha_max: args.alpha_max,
        alpha_steps: args.alpha_steps,
        tau_decrease_min: args.tau_decrease_min,
        tau_decrease_max: args.tau_decrease_max,
        tau_decrease_steps: args.tau_decrease_steps,
        tau_increase_min: args.tau_increase_min,
        tau_increase_max: args.tau_increase_max,
        tau_increase_steps: args.tau_increase_steps,
        tpod0_mode: args.tpod0,
        tpod0_min: args.tpod0_min,
        tpod0_max: args.tpod0_max,
        tpod0_steps: args.tpod0_steps,
    }
}

fn plot_enabled(opts: &PlotOpts) -> bool {
    opts.plot && !opts.no_plot
}

pub fn sim_config_from_args(args: &SimulateArgs) -> Result<SimConfig, AppError> {
    Ok(SimConfig {
        params_path: args.params.clone(),
        observed_path: args.observed.clone(),
        horizon: horizon_from_args(&args.horizon)?,
        plot: plot_enabled(&args.plot),
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        svg: args.svg.clone(),
    })
}

pub fn calib_config_from_args(args: &CalibrateArgs) -> Result<CalibConfig, AppError> {
    Ok(CalibConfig {
        observed_path: args.observed.clone(),
        horizon: horizon_from_args(&args.horizon)?,
        grid: grid_config_from_args(&args.grid),
        refine_iters: args.grid.refine_iters,
        plot: plot_enabled(&args.plot),
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_params: args.export_params.clone(),
        export_json: args.export_json.clone(),
        svg: args.svg.clone(),
    })
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        methods: args.methods.clone(),
        sizes: args.sizes.clone(),
        reps: args.reps,
        seed: args.seed,
        sobol_skip: args.sobol_skip,
        export_csv: args.export.clone(),
    }
}

pub fn demo_config_from_args(args: &DemoArgs) -> Result<DemoConfig, AppError> {
    Ok(DemoConfig {
        seed: args.seed,
        noise_sigma: args.noise,
        horizon: horizon_from_args(&args.horizon)?,
        grid: grid_config_from_args(&args.grid),
        refine_iters: args.grid.refine_iters,
        plot: plot_enabled(&args.plot),
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_json: args.export_json.clone(),
        svg: args.svg.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Command {
        Cli::parse_from(argv).command
    }

    #[test]
    fn no_plot_wins_over_plot_default() {
        let Command::Simulate(args) = parse(&["sdc", "simulate", "--params", "p", "--observed", "o", "--no-plot"])
        else {
            panic!("expected simulate");
        };
        let config = sim_config_from_args(&args).unwrap();
        assert!(!config.plot);
        assert_eq!(config.horizon, Horizon::default());
    }

    #[test]
    fn dt_flag_builds_the_horizon() {
        let Command::Calibrate(args) = parse(&["sdc", "calibrate", "--observed", "o", "--dt", "0.25"]) else {
            panic!("expected calibrate");
        };
        let config = calib_config_from_args(&args).unwrap();
        assert_eq!(config.horizon.steps_per_unit, 4);
        assert_eq!(config.refine_iters, 25);
    }

    #[test]
    fn reversed_horizon_is_a_config_error() {
        let Command::Demo(args) = parse(&["sdc", "demo", "--start", "90", "--end", "60"]) else {
            panic!("expected demo");
        };
        assert_eq!(demo_config_from_args(&args).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn extreme_week_range_is_a_config_error() {
        let min = i64::MIN.to_string();
        let max = i64::MAX.to_string();
        let argv = ["sdc", "simulate", "--params", "p", "--observed", "o", "--start", &min, "--end", &max];
        let Command::Simulate(args) = parse(&argv) else {
            panic!("expected simulate");
        };
        assert_eq!(sim_config_from_args(&args).unwrap_err().exit_code(), 2);
    }
}
