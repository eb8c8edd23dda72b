//! SVG comparison chart (plotters).
//!
//! One line per source (palette colour, legend entry by label) and the
//! observed series as filled dots, over the simulation horizon.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{Horizon, ObservedRecord, SourceRun};
use crate::error::AppError;
use crate::plot::{pad_range, value_range};

pub const SVG_SIZE: (u32, u32) = (1024, 640);

fn plot_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(2, format!("Failed to render SVG chart: {e}"))
}

pub fn write_svg_chart(
    path: &Path,
    runs: &[SourceRun],
    observed: &[ObservedRecord],
    horizon: &Horizon,
) -> Result<(), AppError> {
    let x0 = horizon.start as f64;
    let x1 = (horizon.end as f64).max(x0 + 1.0);
    let (y0, y1) = value_range(runs, observed).unwrap_or((0.0, 1.0));
    let (y0, y1) = pad_range(y0, y1, 0.05);

    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Time per order: simulated vs observed", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Week")
        .y_desc("TPOD")
        .draw()
        .map_err(plot_err)?;

    for (idx, run) in runs.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(
                run.trajectory
                    .output_points()
                    .into_iter()
                    .filter(|(_, y)| y.is_finite()),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(run.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], color.stroke_width(3)));
    }

    if !observed.is_empty() {
        chart
            .draw_series(
                observed
                    .iter()
                    .filter(|r| horizon.contains(r.week) && r.tpod.is_finite())
                    .map(|r| Circle::new((r.week as f64, r.tpod), 3, BLACK.filled())),
            )
            .map_err(plot_err)?
            .label("observed")
            .legend(|(x, y)| Circle::new((x + 12, y), 3, BLACK.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Params;
    use crate::math::Exogenous;
    use crate::sim::simulate;

    #[test]
    fn writes_an_svg_document() {
        let horizon = Horizon::default();
        let trajectory = simulate(&Params::reference(), &Exogenous::constant(100.0, 50.0), &horizon).unwrap();
        let runs = vec![SourceRun {
            label: "paper".into(),
            params: Params::reference(),
            trajectory,
            metrics: None,
        }];
        let observed = vec![ObservedRecord { week: 60, tpod: 0.6, co: 100.0, sc: 50.0 }];

        let path = std::env::temp_dir().join(format!("sd-calib-chart-{}.svg", std::process::id()));
        write_svg_chart(&path, &runs, &observed, &horizon).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("paper"));
        let _ = std::fs::remove_file(path);
    }
}
