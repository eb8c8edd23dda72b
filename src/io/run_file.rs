//! Read/write run JSON files.
//!
//! A run file is the portable record of a `simulate`, `calibrate` or `demo`
//! invocation: horizon, observed series and every source's trajectory and
//! metrics. The `plot` subcommand redraws charts from it without re-running
//! the model. The schema is `domain::TrajectoryFile`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Horizon, ObservedRecord, SourceRun, TrajectoryFile};
use crate::error::AppError;

pub const TOOL_NAME: &str = "sdc";

/// Assemble a run file stamped with the current time.
pub fn build_run_file(horizon: Horizon, observed: &[ObservedRecord], runs: &[SourceRun]) -> TrajectoryFile {
    TrajectoryFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        horizon,
        observed: observed.to_vec(),
        runs: runs.to_vec(),
    }
}

pub fn write_run_json(path: &Path, run: &TrajectoryFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, run).map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;
    Ok(())
}

pub fn read_run_json(path: &Path) -> Result<TrajectoryFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: TrajectoryFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid run JSON: {e}")))?;
    if run.runs.is_empty() {
        return Err(AppError::new(3, format!("Run JSON '{}' contains no runs.", path.display())));
    }
    Ok(run)
}
