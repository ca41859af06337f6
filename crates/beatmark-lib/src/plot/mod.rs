use crate::landmarks::{
    landmark, AnnotationBundle, AxisAnnotation, Interval, IntervalKind, LandmarkRole, TickRange,
};
use crate::signal::Axis as TraceAxis;
use serde::{Deserialize, Serialize};

/// Ticks per axis, at 0, 0.25, 0.5, 0.75 and 1 in normalized units.
pub const TICK_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    /// Normalized position on the axis.
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    pub ticks: Vec<Tick>,
}

impl Axis {
    fn hidden() -> Self {
        Self {
            label: None,
            ticks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

/// Numbered circle placed on a landmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Double-headed arrow with a circled label at its midpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub label: String,
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
}

impl Arrow {
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.x_start + self.x_end)
    }
}

/// One of the stacked, time-aligned plots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
    pub markers: Vec<Marker>,
    pub arrows: Vec<Arrow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub panels: Vec<Panel>,
    pub legend: Vec<String>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
            legend: Vec::new(),
        }
    }

    pub fn add_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

const TRACE_COLOR: u32 = 0x1F77B4;
const GUIDE_COLOR: u32 = 0x000000;

/// Normalized height at which each interval arrow is drawn.
pub fn arrow_height(kind: IntervalKind) -> f64 {
    match kind {
        IntervalKind::BeatDuration => 0.0,
        IntervalKind::TimeToPeakAmplitude => 0.7,
        IntervalKind::TimeToPeakContractionVelocity => 0.3,
        IntervalKind::TimeToPeakRelaxationVelocity => 0.5,
        IntervalKind::WidthAtHalfHeight => 0.5,
    }
}

// Landmark joined to its interval arrow by a dotted guide.
fn guide_role(kind: IntervalKind) -> Option<LandmarkRole> {
    match kind {
        IntervalKind::TimeToPeakAmplitude => Some(LandmarkRole::PeakAmplitude),
        IntervalKind::TimeToPeakContractionVelocity => Some(LandmarkRole::MaxRiseVelocity),
        IntervalKind::TimeToPeakRelaxationVelocity => Some(LandmarkRole::MaxRelaxationVelocity),
        _ => None,
    }
}

/// Fixed legend mapping the numbered labels to their meaning.
pub fn legend_entries() -> Vec<String> {
    let landmarks = LandmarkRole::ALL
        .iter()
        .map(|role| format!("{}. {}", role.label(), role.description()));
    let intervals = IntervalKind::ALL
        .iter()
        .map(|kind| format!("{}. {}", kind.label(), kind.description()));
    landmarks.chain(intervals).collect()
}

fn amplitude_ticks(range: &TickRange, precision: usize) -> Vec<Tick> {
    TickRange::positions(TICK_COUNT)
        .into_iter()
        .map(|position| Tick {
            position,
            label: format!("{:.*}", precision, range.relative(position)),
        })
        .collect()
}

fn time_ticks(range: &TickRange) -> Vec<Tick> {
    TickRange::positions(TICK_COUNT)
        .into_iter()
        .map(|position| Tick {
            position,
            label: format!("{:.0}", range.absolute(position)),
        })
        .collect()
}

fn guide(interval: &Interval, axis: &AxisAnnotation) -> Option<Series> {
    let role = guide_role(interval.kind)?;
    let anchor = landmark(&axis.landmarks, role);
    Some(Series::Line(LineSeries {
        name: format!("guide {}", interval.kind.label()),
        points: vec![
            [anchor.time, anchor.value],
            [anchor.time, arrow_height(interval.kind)],
        ],
        style: Style {
            width: 1.0,
            dash: Some([2.0, 3.0]),
            color: Color(GUIDE_COLOR),
        },
    }))
}

fn panel_for(
    bundle: &AnnotationBundle,
    axis: TraceAxis,
    y_label: &str,
    precision: usize,
    x: Axis,
) -> Panel {
    let annotation = bundle.axis(axis);
    let mut series = vec![Series::Line(LineSeries {
        name: y_label.into(),
        points: annotation
            .time
            .iter()
            .zip(&annotation.values)
            .map(|(&t, &v)| [t, v])
            .collect(),
        style: Style {
            width: 3.0,
            dash: None,
            color: Color(TRACE_COLOR),
        },
    })];
    let markers = annotation
        .landmarks
        .iter()
        .map(|lm| Marker {
            label: lm.role.label().into(),
            x: lm.time,
            y: lm.value,
        })
        .collect();
    let mut arrows = Vec::new();
    for interval in bundle.intervals.iter().filter(|i| i.kind.axis() == axis) {
        series.extend(guide(interval, annotation));
        arrows.push(Arrow {
            label: interval.kind.label().into(),
            y: arrow_height(interval.kind),
            x_start: interval.t_start,
            x_end: interval.t_end,
        });
    }
    Panel {
        x,
        y: Axis {
            label: Some(y_label.into()),
            ticks: amplitude_ticks(&annotation.range, precision),
        },
        series,
        markers,
        arrows,
    }
}

/// Lay out the two-panel annotated beat figure.
///
/// Coordinates stay normalized; tick labels carry the physical scale.
pub fn figure_from_bundle(bundle: &AnnotationBundle) -> Figure {
    let mut fig = Figure::new(None);
    fig.add_panel(panel_for(
        bundle,
        TraceAxis::Primary,
        "Displacement [\u{00B5}m]",
        1,
        Axis::hidden(),
    ));
    fig.add_panel(panel_for(
        bundle,
        TraceAxis::Secondary,
        "Velocity [\u{00B5}m / s]",
        0,
        Axis {
            label: Some("Time [ms]".into()),
            ticks: time_ticks(&bundle.time_range),
        },
    ));
    fig.legend = legend_entries();
    fig
}
