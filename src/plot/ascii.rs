//! Terminal plot of simulated TPOD against observed weeks.
//!
//! A fixed character grid: weeks on the x axis, TPOD on the y axis. Each
//! source gets its own glyph (`-`, `*`, `+`, ...) and observed weeks are
//! drawn last as `o`. The output is deterministic, so it is golden-tested.

use crate::domain::{Horizon, ObservedRecord, SourceRun, TrajectoryFile};
use crate::plot::{pad_range, value_range};

/// Line glyphs, cycled through in source order.
const SERIES_GLYPHS: [char; 6] = ['-', '*', '+', '#', '~', '='];
const OBSERVED_GLYPH: char = 'o';

pub fn series_glyph(idx: usize) -> char {
    SERIES_GLYPHS[idx % SERIES_GLYPHS.len()]
}

/// Render every run's derived output over the horizon, plus observations.
pub fn render_ascii_plot(
    runs: &[SourceRun],
    observed: &[ObservedRecord],
    horizon: &Horizon,
    width: usize,
    height: usize,
) -> String {
    let x_min = horizon.start as f64;
    let x_max = (horizon.end as f64).max(x_min + 1.0);
    render_plot(runs, observed, x_min, x_max, width, height)
}

/// Render a plot from a saved run file.
pub fn render_ascii_plot_from_run_file(file: &TrajectoryFile, width: usize, height: usize) -> String {
    render_ascii_plot(&file.runs, &file.observed, &file.horizon, width, height)
}

fn render_plot(
    runs: &[SourceRun],
    observed: &[ObservedRecord],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = value_range(runs, observed).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first (so points can overlay); earlier sources win shared cells.
    for (idx, run) in runs.iter().enumerate() {
        let points: Vec<(f64, f64)> = run
            .trajectory
            .output_points()
            .into_iter()
            .filter(|(_, y)| y.is_finite())
            .collect();
        draw_curve(&mut grid, &points, series_glyph(idx), (x_min, x_max), (y_min, y_max));
    }

    for r in observed {
        let t = r.week as f64;
        if t < x_min || t > x_max || !r.tpod.is_finite() {
            continue;
        }
        let x = map_x(t, x_min, x_max, width);
        let y = map_y(r.tpod, y_min, y_max, height);
        grid[y][x] = OBSERVED_GLYPH;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: week=[{x_min:.0}, {x_max:.0}] | tpod=[{y_min:.3}, {y_max:.3}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, run) in runs.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", series_glyph(idx), run.label));
    }
    if !observed.is_empty() {
        out.push_str(&format!("  {OBSERVED_GLYPH} observed\n"));
    }

    out
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, x: (f64, f64), y: (f64, f64)) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, v) in curve {
        let cx = map_x(t, x.0, x.1, width);
        let cy = map_y(v, y.0, y.1, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, cx, cy, ch),
            None => {
                if grid[cy][cx] == ' ' {
                    grid[cy][cx] = ch;
                }
            }
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are painted.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Params, Trajectory, TrajectoryRow};

    fn flat_run(label: &str, level: f64) -> SourceRun {
        SourceRun {
            label: label.to_string(),
            params: Params::reference(),
            trajectory: Trajectory {
                rows: (0..=9)
                    .map(|w| TrajectoryRow { time: w as f64, state: level, output: level })
                    .collect(),
            },
            metrics: None,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let runs = vec![flat_run("flat", 1.0)];
        let observed = vec![
            ObservedRecord { week: 0, tpod: 0.0, co: 1.0, sc: 1.0 },
            ObservedRecord { week: 9, tpod: 2.0, co: 1.0, sc: 1.0 },
        ];
        let horizon = Horizon::new(0, 9, 1).unwrap();

        let txt = render_ascii_plot(&runs, &observed, &horizon, 10, 5);
        let expected = concat!(
            "Plot: week=[0, 9] | tpod=[-0.100, 2.100]\n",
            "         o\n",
            "          \n",
            "----------\n",
            "          \n",
            "o         \n",
            "  - flat\n",
            "  o observed\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn each_source_gets_its_own_glyph() {
        let runs = vec![flat_run("low", 1.0), flat_run("high", 3.0)];
        let horizon = Horizon::new(0, 9, 1).unwrap();
        let txt = render_ascii_plot(&runs, &[], &horizon, 20, 8);
        assert!(txt.contains("--------------------"));
        assert!(txt.contains("********************"));
        assert!(txt.ends_with("  - low\n  * high\n"));
        assert!(!txt.contains("observed"));
    }

    #[test]
    fn glyphs_cycle() {
        assert_eq!(series_glyph(0), '-');
        assert_eq!(series_glyph(6), '-');
        assert_eq!(series_glyph(7), '*');
    }
}
