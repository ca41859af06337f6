use anyhow::Result;
use beatmark_lib::landmarks::TickRange;
use beatmark_lib::plot::{self as model, Figure, Panel, PlotBackend, Tick, TICK_COUNT};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

// Normalized data units per dash unit.
const DASH_SCALE: f64 = 0.01;
const BADGE_RADIUS: i32 = 11;

/// Renders a `Figure` to a PNG file: stacked panels on the left, legend on the right.
pub struct PngBackend {
    path: PathBuf,
    size: (u32, u32),
}

impl PngBackend {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

impl PlotBackend for PngBackend {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let plot_width = (self.size.0 as f64 * 0.65) as i32;
        let (plots, legend) = root.split_horizontally(plot_width);
        let areas = plots.split_evenly((fig.panels.len().max(1), 1));
        for (panel, area) in fig.panels.iter().zip(areas.iter()) {
            draw_panel(area, panel)?;
        }
        let legend_top = self.size.1 as i32 / 4;
        for (i, line) in fig.legend.iter().enumerate() {
            legend.draw(&Text::new(
                line.clone(),
                (10, legend_top + 26 * i as i32),
                ("sans-serif", 18).into_font(),
            ))?;
        }
        root.present()?;
        Ok(())
    }
}

fn tick_label(ticks: &[Tick], value: f64) -> String {
    ticks
        .iter()
        .find(|tick| (tick.position - value).abs() < 1e-9)
        .map(|tick| tick.label.clone())
        .unwrap_or_default()
}

fn rgb(color: model::Color) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

/// Split a polyline into dash segments of `on` length separated by `off` gaps.
fn dash_segments(points: &[[f64; 2]], on: f64, off: f64) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
        if length == 0.0 {
            continue;
        }
        let at = |s: f64| (a[0] + (b[0] - a[0]) * s / length, a[1] + (b[1] - a[1]) * s / length);
        let mut s = 0.0;
        while s < length {
            let end = (s + on).min(length);
            segments.push(vec![at(s), at(end)]);
            s = end + off;
        }
    }
    segments
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &Panel) -> Result<()> {
    let positions = TickRange::positions(TICK_COUNT);
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(if panel.x.ticks.is_empty() { 10 } else { 40 })
        .y_label_area_size(60)
        .build_cartesian_2d(
            (-0.05f64..1.05f64).with_key_points(positions.clone()),
            (-0.1f64..1.1f64).with_key_points(positions),
        )?;

    let x_fmt = |v: &f64| tick_label(&panel.x.ticks, *v);
    let y_fmt = |v: &f64| tick_label(&panel.y.ticks, *v);
    chart
        .configure_mesh()
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(panel.x.label.clone().unwrap_or_default())
        .y_desc(panel.y.label.clone().unwrap_or_default())
        .draw()?;

    for series in &panel.series {
        match series {
            model::Series::Line(line) => {
                let style = rgb(line.style.color).stroke_width(line.style.width.round().max(1.0) as u32);
                match line.style.dash {
                    None => {
                        chart.draw_series(LineSeries::new(
                            line.points.iter().map(|p| (p[0], p[1])),
                            style,
                        ))?;
                    }
                    Some([on, off]) => {
                        let segments = dash_segments(
                            &line.points,
                            on as f64 * DASH_SCALE,
                            off as f64 * DASH_SCALE,
                        );
                        chart.draw_series(
                            segments
                                .into_iter()
                                .map(|segment| PathElement::new(segment, style)),
                        )?;
                    }
                }
            }
        }
    }

    for arrow in &panel.arrows {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(arrow.x_start, arrow.y), (arrow.x_end, arrow.y)],
            &BLACK,
        )))?;
        chart.draw_series([arrow.x_start, arrow.x_end].iter().zip([1, -1]).map(
            |(&x, dir)| {
                EmptyElement::at((x, arrow.y))
                    + PathElement::new(vec![(8 * dir, -4), (0, 0), (8 * dir, 4)], &BLACK)
            },
        ))?;
    }

    let badges = panel
        .markers
        .iter()
        .map(|m| (m.label.as_str(), m.x, m.y))
        .chain(
            panel
                .arrows
                .iter()
                .map(|a| (a.label.as_str(), a.midpoint(), a.y)),
        );
    chart.draw_series(badges.map(|(label, x, y)| {
        EmptyElement::at((x, y))
            + Circle::new((0, 0), BADGE_RADIUS, WHITE.filled())
            + Circle::new((0, 0), BADGE_RADIUS, &BLACK)
            + Text::new(
                label.to_string(),
                (-4 * label.len() as i32, -7),
                ("sans-serif", 14).into_font(),
            )
    }))?;
    Ok(())
}
