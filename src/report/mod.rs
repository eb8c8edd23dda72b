//! Reporting utilities: source rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::SourceRun;

/// Runs ordered by RMSE against the observed series (best first).
///
/// Ties keep input order; runs without metrics (no overlapping weeks) go last.
pub fn rank_by_rmse(runs: &[SourceRun]) -> Vec<&SourceRun> {
    let mut ranked: Vec<&SourceRun> = runs.iter().collect();
    ranked.sort_by(|a, b| {
        let ka = a.metrics.map(|m| m.rmse).unwrap_or(f64::INFINITY);
        let kb = b.metrics.map(|m| m.rmse).unwrap_or(f64::INFINITY);
        ka.total_cmp(&kb)
    });
    ranked
}
