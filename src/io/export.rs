//! CSV exports.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; the params export is readable by `load_params_table`.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::domain::{ObservedRecord, ParamSource, SourceRun};
use crate::error::AppError;
use crate::sampling::BenchmarkRow;

fn create(path: &Path, what: &str) -> Result<Writer<File>, AppError> {
    Writer::from_path(path).map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn write_err(what: &'static str) -> impl Fn(csv::Error) -> AppError {
    move |e| AppError::new(2, format!("Failed to write {what}: {e}"))
}

/// Write every run's reported rows, one line per (source, week).
///
/// The `observed` column is empty for weeks without an observation.
pub fn write_trajectories_csv(path: &Path, runs: &[SourceRun], observed: &[ObservedRecord]) -> Result<(), AppError> {
    let mut wtr = create(path, "trajectory CSV")?;
    let err = write_err("trajectory CSV");

    wtr.write_record(["source", "week", "state", "output", "observed"])
        .map_err(&err)?;
    for run in runs {
        for row in &run.trajectory.rows {
            let week = row.time as i64;
            let obs = observed
                .binary_search_by_key(&week, |r| r.week)
                .ok()
                .map(|i| format!("{:.10}", observed[i].tpod))
                .unwrap_or_default();
            wtr.write_record([
                run.label.clone(),
                week.to_string(),
                format!("{:.10}", row.state),
                format!("{:.10}", row.output),
                obs,
            ])
            .map_err(&err)?;
        }
    }
    wtr.flush().map_err(csv::Error::from).map_err(&err)?;
    Ok(())
}

/// Write a params table (`source,alpha,tau_decrease,tau_increase,tpod0`).
pub fn write_params_csv(path: &Path, sources: &[ParamSource]) -> Result<(), AppError> {
    let mut wtr = create(path, "params CSV")?;
    let err = write_err("params CSV");

    wtr.write_record(["source", "alpha", "tau_decrease", "tau_increase", "tpod0"])
        .map_err(&err)?;
    for s in sources {
        let p = &s.params;
        // `to_string` on f64 prints the shortest representation that round-trips.
        wtr.write_record([
            s.label.clone(),
            p.alpha.to_string(),
            p.tau_decrease.to_string(),
            p.tau_increase.to_string(),
            p.tpod0.to_string(),
        ])
        .map_err(&err)?;
    }
    wtr.flush().map_err(csv::Error::from).map_err(&err)?;
    Ok(())
}

/// Write sampling benchmark rows.
pub fn write_benchmark_csv(path: &Path, rows: &[BenchmarkRow]) -> Result<(), AppError> {
    let mut wtr = create(path, "benchmark CSV")?;
    let err = write_err("benchmark CSV");

    wtr.write_record(["method", "n", "reps", "mean_estimate", "pi_estimate", "mean_abs_error", "rmse"])
        .map_err(&err)?;
    for r in rows {
        wtr.write_record([
            r.method.display_name().to_string(),
            r.n.to_string(),
            r.reps.to_string(),
            format!("{:.8}", r.mean_estimate),
            format!("{:.8}", r.pi_estimate()),
            format!("{:.8}", r.mean_abs_error),
            format!("{:.8}", r.rmse),
        ])
        .map_err(&err)?;
    }
    wtr.flush().map_err(csv::Error::from).map_err(&err)?;
    Ok(())
}
