//! Beat landmark annotation for a displacement/velocity trace pair.
//!
//! The pipeline runs in a fixed order: the pair is aligned onto a shared
//! normalized time base, both windows are normalized, the landmark indices
//! are resolved on each axis, the half-height crossings are found on the
//! primary axis and the derived intervals are computed from all of that.

pub mod align;
pub mod intervals;
pub mod locate;
pub mod normalize;

pub use align::{align, translate_indices, AlignedWindow, OffsetPolicy};
pub use intervals::{derive_intervals, Interval, IntervalKind, Intervals};
pub use locate::{
    crossing_indices, half_height_crossings, landmark, locate_landmarks, Landmark, Landmarks,
    ZeroCrossingPair, HALF_HEIGHT,
};
pub use normalize::{min_max, normalize, normalize_window, TickRange};

use crate::error::LandmarkError;
use crate::signal::{Axis, SeriesPair};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Empirical assay calibration for the five landmark positions.
pub const DEFAULT_INDICES: [usize; 5] = [7, 16, 31, 43, 56];

/// Physiological meaning of each landmark slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkRole {
    BeatStart,
    MaxRiseVelocity,
    PeakAmplitude,
    MaxRelaxationVelocity,
    BeatEnd,
}

impl LandmarkRole {
    pub const ALL: [LandmarkRole; 5] = [
        LandmarkRole::BeatStart,
        LandmarkRole::MaxRiseVelocity,
        LandmarkRole::PeakAmplitude,
        LandmarkRole::MaxRelaxationVelocity,
        LandmarkRole::BeatEnd,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LandmarkRole::BeatStart => "1",
            LandmarkRole::MaxRiseVelocity => "2",
            LandmarkRole::PeakAmplitude => "3",
            LandmarkRole::MaxRelaxationVelocity => "4",
            LandmarkRole::BeatEnd => "5",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LandmarkRole::BeatStart => "Start of beat",
            LandmarkRole::MaxRiseVelocity => "Maximum rise velocity",
            LandmarkRole::PeakAmplitude => "Peak twitch amplitude",
            LandmarkRole::MaxRelaxationVelocity => "Maximum relaxation velocity",
            LandmarkRole::BeatEnd => "End of beat",
        }
    }
}

impl fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandmarkRole::BeatStart => "beat-start",
            LandmarkRole::MaxRiseVelocity => "max-rise-velocity",
            LandmarkRole::PeakAmplitude => "peak-amplitude",
            LandmarkRole::MaxRelaxationVelocity => "max-relaxation-velocity",
            LandmarkRole::BeatEnd => "beat-end",
        };
        f.write_str(name)
    }
}

/// Five window indices, one per `LandmarkRole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkIndex([usize; 5]);

impl Default for LandmarkIndex {
    fn default() -> Self {
        Self(DEFAULT_INDICES)
    }
}

impl From<[usize; 5]> for LandmarkIndex {
    fn from(indices: [usize; 5]) -> Self {
        Self(indices)
    }
}

impl LandmarkIndex {
    pub const fn new(indices: [usize; 5]) -> Self {
        Self(indices)
    }

    pub fn get(&self, role: LandmarkRole) -> usize {
        self.0[role as usize]
    }

    pub fn as_array(&self) -> [usize; 5] {
        self.0
    }
}

/// Analysis window and landmark configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// First primary index of the window.
    pub start: usize,
    /// One past the last primary index; `None` means the whole series.
    pub end: Option<usize>,
    /// Landmark indices relative to `start`; `None` uses `DEFAULT_INDICES`.
    pub indices: Option<LandmarkIndex>,
    pub offset_policy: OffsetPolicy,
}

impl WindowConfig {
    pub fn landmark_indices(&self) -> LandmarkIndex {
        self.indices.unwrap_or_default()
    }
}

/// Everything needed to draw one axis of the annotated figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisAnnotation {
    pub axis: Axis,
    /// Normalized time of each window sample.
    pub time: Vec<f64>,
    /// Normalized window values.
    pub values: Vec<f64>,
    pub landmarks: Landmarks,
    /// Physical amplitude range of the window.
    pub range: TickRange,
}

/// Render-ready result of annotating one trace pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBundle {
    pub start: usize,
    pub end: usize,
    pub offset: usize,
    pub shift: usize,
    /// Physical time span of the primary window.
    pub time_range: TickRange,
    pub primary: AxisAnnotation,
    pub secondary: AxisAnnotation,
    pub crossings: ZeroCrossingPair,
    pub intervals: Intervals,
}

impl AnnotationBundle {
    pub fn interval(&self, kind: IntervalKind) -> &Interval {
        &self.intervals[kind as usize]
    }

    pub fn axis(&self, axis: Axis) -> &AxisAnnotation {
        match axis {
            Axis::Primary => &self.primary,
            Axis::Secondary => &self.secondary,
        }
    }
}

/// Run the full landmark pipeline on one pair.
pub fn annotate_pair(
    pair: &SeriesPair,
    config: &WindowConfig,
) -> Result<AnnotationBundle, LandmarkError> {
    let end = config.end.unwrap_or_else(|| pair.primary().len());
    let aligned = align(pair, config.start, end, config.offset_policy)?;

    let (u, u_range) = normalize_window(&pair.primary().values()[aligned.primary_range()])?;
    let (v, v_range) = normalize_window(&pair.secondary().values()[aligned.secondary_range()])?;

    let indices = config.landmark_indices();
    let primary_landmarks = locate_landmarks(&aligned.time, &u, &indices, Axis::Primary)?;
    let indices_v = translate_indices(&indices, aligned.shift, v.len())?;
    let secondary_landmarks =
        locate_landmarks(&aligned.time_secondary, &v, &indices_v, Axis::Secondary)?;

    let crossings = half_height_crossings(&aligned.time, &u)?;
    let intervals = derive_intervals(
        &primary_landmarks,
        &secondary_landmarks,
        &crossings,
        &aligned.time_range,
    );
    debug!(
        "landmarks {:?} -> secondary {:?}, crossings {:?}",
        indices.as_array(),
        indices_v.as_array(),
        crossings.indices
    );

    Ok(AnnotationBundle {
        start: aligned.start,
        end: aligned.end,
        offset: aligned.offset,
        shift: aligned.shift,
        time_range: aligned.time_range,
        primary: AxisAnnotation {
            axis: Axis::Primary,
            time: aligned.time,
            values: u,
            landmarks: primary_landmarks,
            range: u_range,
        },
        secondary: AxisAnnotation {
            axis: Axis::Secondary,
            time: aligned.time_secondary,
            values: v,
            landmarks: secondary_landmarks,
            range: v_range,
        },
        crossings,
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Series;

    // Gaussian twitch peaking at primary index 31, with its derivative
    // sampled `n_p - n_v` samples shorter and centred on the same beat.
    fn synthetic_pair(n_p: usize, n_v: usize) -> SeriesPair {
        let dt = 2.0;
        let shape = |i: f64| (-((i - 31.0) / 10.0).powi(2)).exp();
        let slope = |i: f64| -2.0 * (i - 31.0) / 100.0 * shape(i);
        let shift = (n_p - n_v) / 2;
        let u: Vec<f64> = (0..n_p).map(|i| 1.5 + 4.0 * shape(i as f64)).collect();
        let v: Vec<f64> = (0..n_v)
            .map(|j| 4.0 * slope((j + shift) as f64) / (dt / 1000.0))
            .collect();
        let primary = Series::uniform(u, dt).unwrap();
        let secondary = Series::uniform(v, dt).unwrap();
        SeriesPair::new(primary, secondary).unwrap()
    }

    #[test]
    fn end_to_end_default_indices() {
        let pair = synthetic_pair(100, 90);
        let bundle = annotate_pair(&pair, &WindowConfig::default()).unwrap();

        assert_eq!(bundle.offset, 10);
        assert_eq!(bundle.shift, 5);
        let secondary: Vec<usize> = bundle.secondary.landmarks.iter().map(|l| l.index).collect();
        assert_eq!(secondary, vec![2, 11, 26, 38, 51]);
        assert_eq!(bundle.crossings.indices, [22, 39]);

        let width = bundle.interval(IntervalKind::WidthAtHalfHeight);
        assert!(width.width() > 0.0);
        assert!((width.duration - 34.0).abs() < 1e-9);
        let beat = bundle.interval(IntervalKind::BeatDuration);
        assert!((beat.duration - 98.0).abs() < 1e-9);
        assert!(beat.width() >= bundle.interval(IntervalKind::TimeToPeakAmplitude).width());
    }

    #[test]
    fn axes_share_the_time_scale() {
        let pair = synthetic_pair(100, 90);
        let bundle = annotate_pair(&pair, &WindowConfig::default()).unwrap();
        assert_eq!(bundle.secondary.time.len(), bundle.secondary.values.len());
        for (u, v) in bundle
            .primary
            .landmarks
            .iter()
            .zip(bundle.secondary.landmarks.iter())
        {
            assert_eq!(u.time, v.time, "{}", u.role);
        }
    }

    #[test]
    fn keeps_physical_ranges() {
        let pair = synthetic_pair(100, 90);
        let bundle = annotate_pair(&pair, &WindowConfig::default()).unwrap();
        assert!((bundle.primary.range.max - 5.5).abs() < 1e-12);
        assert!((bundle.primary.range.min - 1.5).abs() < 1e-6);
        assert_eq!(bundle.time_range, TickRange { min: 0.0, max: 198.0 });
        assert!(bundle.secondary.range.span() > 0.0);
    }

    #[test]
    fn peak_landmark_is_window_maximum() {
        let pair = synthetic_pair(100, 90);
        let bundle = annotate_pair(&pair, &WindowConfig::default()).unwrap();
        let peak = landmark(&bundle.primary.landmarks, LandmarkRole::PeakAmplitude);
        assert!(bundle.primary.values.iter().all(|&v| v <= peak.value));
    }

    #[test]
    fn flat_primary_is_division_by_zero() {
        let primary = Series::uniform(vec![3.0; 100], 2.0).unwrap();
        let secondary = Series::uniform((0..90).map(|i| i as f64).collect(), 2.0).unwrap();
        let pair = SeriesPair::new(primary, secondary).unwrap();
        assert_eq!(
            annotate_pair(&pair, &WindowConfig::default()).unwrap_err(),
            LandmarkError::DivisionByZero
        );
    }

    #[test]
    fn nan_sample_fails_instead_of_adding_crossings() {
        let pair = synthetic_pair(100, 90);
        let mut u = pair.primary().values().to_vec();
        u[3] = f64::NAN;
        let primary = Series::uniform(u, 2.0).unwrap();
        let pair = SeriesPair::new(primary, pair.secondary().clone()).unwrap();
        assert_eq!(
            annotate_pair(&pair, &WindowConfig::default()).unwrap_err(),
            LandmarkError::NonFiniteSample { index: 3 }
        );
    }

    #[test]
    fn landmark_outside_window_is_index_out_of_range() {
        let pair = synthetic_pair(100, 90);
        let config = WindowConfig {
            start: 0,
            end: Some(80),
            indices: Some(LandmarkIndex::new([7, 16, 31, 43, 99])),
            ..WindowConfig::default()
        };
        let err = annotate_pair(&pair, &config).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::IndexOutOfRange {
                role: LandmarkRole::BeatEnd,
                index: 99,
                ..
            }
        ));
    }

    #[test]
    fn windowed_annotation_uses_relative_indices() {
        let pair = synthetic_pair(100, 90);
        let config = WindowConfig {
            start: 10,
            end: Some(100),
            indices: Some(LandmarkIndex::new([6, 8, 21, 33, 46])),
            ..WindowConfig::default()
        };
        let bundle = annotate_pair(&pair, &config).unwrap();
        let peak = landmark(&bundle.primary.landmarks, LandmarkRole::PeakAmplitude);
        assert_eq!(peak.value, 1.0);
        assert_eq!(bundle.crossings.indices, [12, 29]);
        assert_eq!(bundle.time_range, TickRange { min: 20.0, max: 198.0 });
    }

    #[test]
    fn config_reads_partial_overrides() {
        let config: WindowConfig =
            serde_json::from_str(r#"{"start": 40, "indices": [1, 2, 3, 4, 5]}"#).unwrap();
        assert_eq!(config.start, 40);
        assert_eq!(config.end, None);
        assert_eq!(config.landmark_indices().as_array(), [1, 2, 3, 4, 5]);
        assert_eq!(config.offset_policy, OffsetPolicy::Floor);
        assert_eq!(
            WindowConfig::default().landmark_indices().as_array(),
            DEFAULT_INDICES
        );
    }
}
