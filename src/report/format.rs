//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation/calibration code stays clean and testable
//! - output changes are localized

use crate::domain::{Horizon, ObservedRecord, Params, SourceRun};
use crate::fit::Calibration;
use crate::report::rank_by_rmse;
use crate::sampling::{BenchmarkRow, TRUE_AREA};

/// Header block of a simulation run: horizon, dataset, sources.
pub fn format_run_summary(horizon: &Horizon, observed: &[ObservedRecord], runs: &[SourceRun]) -> String {
    let mut out = String::new();

    out.push_str("=== sdc - workload model simulation ===\n");
    out.push_str(&format!(
        "Horizon: weeks {}..={} | dt=1/{} | rows={}\n",
        horizon.start,
        horizon.end,
        horizon.steps_per_unit,
        horizon.row_count()
    ));

    let in_horizon = observed.iter().filter(|r| horizon.contains(r.week)).count();
    if let (Some(first), Some(last)) = (observed.first(), observed.last()) {
        out.push_str(&format!(
            "Observed: n={} | weeks=[{}, {}] | in horizon={}\n",
            observed.len(),
            first.week,
            last.week,
            in_horizon
        ));
    }

    out.push_str("\nSources:\n");
    for run in runs {
        out.push_str(&format!("- {:<16} {}\n", truncate(&run.label, 16), fmt_params(&run.params)));
    }
    out.push('\n');
    out
}

/// Goodness-of-fit table, best source first.
pub fn format_metrics_table(runs: &[SourceRun]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:>4} {:>10} {:>10} {:>10} {:>9} {:>10} {:>8}",
            "source", "n", "sse", "rmse", "mae", "mape%", "bias", "nse"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<16} {:-<4} {:-<10} {:-<10} {:-<10} {:-<9} {:-<10} {:-<8}\n",
        "", "", "", "", "", "", "", ""
    ));

    for run in rank_by_rmse(runs) {
        let label = truncate(&run.label, 16);
        let line = match run.metrics {
            Some(m) => format!(
                "{:<16} {:>4} {:>10.4} {:>10.4} {:>10.4} {:>9} {:>10.4} {:>8}",
                label,
                m.n,
                m.sse,
                m.rmse,
                m.mae,
                fmt_opt(m.mape, 2),
                m.bias,
                fmt_opt(m.nse, 3)
            ),
            None => format!("{label:<16} (no observed weeks inside the horizon)"),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Calibration summary: search size, grid winner, refined parameters.
pub fn format_calibration(cal: &Calibration) -> String {
    let mut out = String::new();
    out.push_str("=== sdc - calibration ===\n");
    out.push_str(&format!(
        "Grid: {} candidates | {} skipped | n={} weeks\n",
        cal.evaluated, cal.skipped, cal.n
    ));
    out.push_str(&format!("Grid best : {} SSE={:.6}\n", fmt_params(&cal.grid_best), cal.grid_sse));
    if cal.refine_steps > 0 {
        out.push_str(&format!(
            "Refined   : {} SSE={:.6} ({} steps)\n",
            fmt_params(&cal.best),
            cal.sse,
            cal.refine_steps
        ));
    }
    out.push_str(&format!("RMSE: {:.6}\n\n", cal.rmse));
    out
}

/// Sampling benchmark table.
pub fn format_benchmark(rows: &[BenchmarkRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== sdc - circle area benchmark (true area {TRUE_AREA:.6}) ===\n"));
    out.push_str(
        format!(
            "{:<8} {:>8} {:>5} {:>12} {:>10} {:>12} {:>12}",
            "method", "n", "reps", "mean_area", "pi_est", "mean_abs_err", "rmse"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<8} {:-<8} {:-<5} {:-<12} {:-<10} {:-<12} {:-<12}\n",
        "", "", "", "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<8} {:>8} {:>5} {:>12.6} {:>10.6} {:>12.3e} {:>12.3e}\n",
            r.method.display_name(),
            r.n,
            r.reps,
            r.mean_estimate,
            r.pi_estimate(),
            r.mean_abs_error,
            r.rmse
        ));
    }
    out
}

pub fn fmt_params(p: &Params) -> String {
    format!(
        "alpha={:.4} tau_dec={} tau_inc={} tpod0={:.4}",
        p.alpha,
        fmt_tau(p.tau_decrease),
        fmt_tau(p.tau_increase),
        p.tpod0
    )
}

/// Time constants span 1 to 1e7; switch to scientific notation for the big ones.
fn fmt_tau(v: f64) -> String {
    if v.abs() >= 1e4 { format!("{v:.3e}") } else { format!("{v:.3}") }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
