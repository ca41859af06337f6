use super::locate::{landmark, Landmarks, ZeroCrossingPair};
use super::normalize::TickRange;
use super::LandmarkRole;
use crate::signal::Axis;
use serde::{Deserialize, Serialize};

/// The derived intervals drawn as arrows, labelled 6 through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    BeatDuration,
    TimeToPeakAmplitude,
    TimeToPeakContractionVelocity,
    TimeToPeakRelaxationVelocity,
    WidthAtHalfHeight,
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 5] = [
        IntervalKind::BeatDuration,
        IntervalKind::TimeToPeakAmplitude,
        IntervalKind::TimeToPeakContractionVelocity,
        IntervalKind::TimeToPeakRelaxationVelocity,
        IntervalKind::WidthAtHalfHeight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IntervalKind::BeatDuration => "6",
            IntervalKind::TimeToPeakAmplitude => "7",
            IntervalKind::TimeToPeakContractionVelocity => "8",
            IntervalKind::TimeToPeakRelaxationVelocity => "9",
            IntervalKind::WidthAtHalfHeight => "10",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IntervalKind::BeatDuration => "Beat duration",
            IntervalKind::TimeToPeakAmplitude => "Time to peak twitch amplitude",
            IntervalKind::TimeToPeakContractionVelocity => "Time to peak contraction velocity",
            IntervalKind::TimeToPeakRelaxationVelocity => "Time to peak relaxation velocity",
            IntervalKind::WidthAtHalfHeight => "Width at half height",
        }
    }

    /// Axis the interval is measured and drawn on.
    pub fn axis(&self) -> Axis {
        match self {
            IntervalKind::TimeToPeakContractionVelocity
            | IntervalKind::TimeToPeakRelaxationVelocity => Axis::Secondary,
            _ => Axis::Primary,
        }
    }
}

/// A named span between two normalized time points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub kind: IntervalKind,
    pub t_start: f64,
    pub t_end: f64,
    /// Span in physical time units of the primary window.
    pub duration: f64,
}

impl Interval {
    pub fn new(kind: IntervalKind, t_start: f64, t_end: f64, time_range: &TickRange) -> Self {
        Self {
            kind,
            t_start,
            t_end,
            duration: time_range.relative(t_end - t_start),
        }
    }

    /// Where the circled label sits.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.t_start + self.t_end)
    }

    pub fn width(&self) -> f64 {
        self.t_end - self.t_start
    }
}

pub type Intervals = [Interval; 5];

/// Derive the five intervals from located landmarks and the crossing pair.
pub fn derive_intervals(
    primary: &Landmarks,
    secondary: &Landmarks,
    crossings: &ZeroCrossingPair,
    time_range: &TickRange,
) -> Intervals {
    let u = |role| landmark(primary, role).time;
    let v = |role| landmark(secondary, role).time;
    [
        Interval::new(
            IntervalKind::BeatDuration,
            u(LandmarkRole::BeatStart),
            u(LandmarkRole::BeatEnd),
            time_range,
        ),
        Interval::new(
            IntervalKind::TimeToPeakAmplitude,
            u(LandmarkRole::BeatStart),
            u(LandmarkRole::PeakAmplitude),
            time_range,
        ),
        Interval::new(
            IntervalKind::TimeToPeakContractionVelocity,
            v(LandmarkRole::BeatStart),
            v(LandmarkRole::MaxRiseVelocity),
            time_range,
        ),
        Interval::new(
            IntervalKind::TimeToPeakRelaxationVelocity,
            v(LandmarkRole::BeatStart),
            v(LandmarkRole::MaxRelaxationVelocity),
            time_range,
        ),
        Interval::new(
            IntervalKind::WidthAtHalfHeight,
            crossings.times[0],
            crossings.times[1],
            time_range,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::locate::Landmark;

    fn landmarks(times: [f64; 5]) -> Landmarks {
        let mut out = [Landmark {
            role: LandmarkRole::BeatStart,
            index: 0,
            time: 0.0,
            value: 0.0,
        }; 5];
        for ((slot, role), time) in out.iter_mut().zip(LandmarkRole::ALL).zip(times) {
            slot.role = role;
            slot.time = time;
        }
        out
    }

    #[test]
    fn intervals_follow_landmarks() {
        let primary = landmarks([0.1, 0.2, 0.3, 0.45, 0.6]);
        let secondary = landmarks([0.1, 0.15, 0.3, 0.4, 0.6]);
        let crossings = ZeroCrossingPair {
            indices: [20, 40],
            times: [0.22, 0.4],
        };
        let range = TickRange { min: 0.0, max: 200.0 };
        let intervals = derive_intervals(&primary, &secondary, &crossings, &range);

        for (interval, kind) in intervals.iter().zip(IntervalKind::ALL) {
            assert_eq!(interval.kind, kind);
        }
        assert_eq!(intervals[0].t_start, 0.1);
        assert_eq!(intervals[0].t_end, 0.6);
        assert_eq!(intervals[2].t_end, 0.15);
        assert_eq!(intervals[3].t_end, 0.4);
        assert_eq!(intervals[4].t_start, 0.22);
        assert!((intervals[0].duration - 100.0).abs() < 1e-9);
        assert!((intervals[4].midpoint() - 0.31).abs() < 1e-12);
    }

    #[test]
    fn beat_duration_covers_time_to_peak() {
        let primary = landmarks([0.05, 0.1, 0.3, 0.35, 0.5]);
        let crossings = ZeroCrossingPair {
            indices: [1, 2],
            times: [0.2, 0.4],
        };
        let range = TickRange { min: 10.0, max: 20.0 };
        let intervals = derive_intervals(&primary, &primary, &crossings, &range);
        assert!(intervals[0].width() >= intervals[1].width());
        assert!(intervals[4].width() > 0.0);
    }

    #[test]
    fn velocity_intervals_live_on_secondary_axis() {
        assert_eq!(
            IntervalKind::TimeToPeakContractionVelocity.axis(),
            Axis::Secondary
        );
        assert_eq!(IntervalKind::WidthAtHalfHeight.axis(), Axis::Primary);
        assert_eq!(IntervalKind::WidthAtHalfHeight.label(), "10");
    }
}
