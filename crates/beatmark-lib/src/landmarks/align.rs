use super::normalize::{normalize_window, TickRange};
use super::{LandmarkIndex, LandmarkRole};
use crate::error::LandmarkError;
use crate::signal::{Axis, SeriesPair};
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How to treat pairs whose sample offset is odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetPolicy {
    /// Shift indices by `offset / 2` and trim the remainder from the tail.
    #[default]
    Floor,
    /// Fail with `OddOffset`.
    Reject,
}

/// Offset-corrected time bases for one analysis window of a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedWindow {
    pub start: usize,
    pub end: usize,
    pub offset: usize,
    /// Primary index matching the first secondary sample.
    pub shift: usize,
    /// Primary window time, normalized to [0, 1].
    pub time: Vec<f64>,
    /// `time` with the head shift and tail trim removed; same length as the
    /// secondary window.
    pub time_secondary: Vec<f64>,
    /// Physical time span of the primary window.
    pub time_range: TickRange,
}

impl AlignedWindow {
    pub fn primary_range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn secondary_range(&self) -> Range<usize> {
        self.start..self.end - self.offset
    }
}

/// Build the shared time base for `[start, end)` on the primary axis.
///
/// Time is normalized over the primary window first and only then sliced
/// for the secondary axis, so both axes share one time scale.
pub fn align(
    pair: &SeriesPair,
    start: usize,
    end: usize,
    policy: OffsetPolicy,
) -> Result<AlignedWindow, LandmarkError> {
    let offset = pair.offset();
    if policy == OffsetPolicy::Reject && pair.is_odd() {
        return Err(LandmarkError::OddOffset { offset });
    }
    let len = pair.primary().len();
    if start >= end || end > len || end - start <= offset {
        return Err(LandmarkError::InvalidWindow {
            start,
            end,
            len,
            offset,
        });
    }

    let (time, time_range) = normalize_window(&pair.primary().time()[start..end])?;
    let shift = pair.head_shift();
    let time_secondary = time[shift..time.len() - pair.tail_trim()].to_vec();
    debug!(
        "aligned window [{}, {}): offset {}, shift {}, secondary samples {}",
        start,
        end,
        offset,
        shift,
        time_secondary.len()
    );

    Ok(AlignedWindow {
        start,
        end,
        offset,
        shift,
        time,
        time_secondary,
        time_range,
    })
}

/// Map primary landmark indices onto the secondary window.
///
/// Indices that land outside `[0, len)` are reported rather than clamped.
pub fn translate_indices(
    indices: &LandmarkIndex,
    shift: usize,
    len: usize,
) -> Result<LandmarkIndex, LandmarkError> {
    let translate = |role: LandmarkRole| -> Result<usize, LandmarkError> {
        let primary = indices.get(role);
        match primary.checked_sub(shift) {
            Some(index) if index < len => Ok(index),
            _ => Err(LandmarkError::IndexOutOfRange {
                role,
                index: primary as isize - shift as isize,
                len,
                axis: Axis::Secondary,
            }),
        }
    };
    Ok(LandmarkIndex::new([
        translate(LandmarkRole::BeatStart)?,
        translate(LandmarkRole::MaxRiseVelocity)?,
        translate(LandmarkRole::PeakAmplitude)?,
        translate(LandmarkRole::MaxRelaxationVelocity)?,
        translate(LandmarkRole::BeatEnd)?,
    ]))
}
