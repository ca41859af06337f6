use crate::landmarks::LandmarkRole;
use crate::signal::Axis;
use thiserror::Error;

/// Data-quality failures raised while locating beat landmarks.
///
/// None of these are recovered internally: a flat window, a landmark
/// outside the window or a missing half-height crossing all point at input
/// that needs a closer look.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("cannot normalize a flat window (max == min)")]
    DivisionByZero,
    #[error("sample {index} of the window is not a finite number")]
    NonFiniteSample { index: usize },
    #[error("{role} index {index} is out of range for the {axis} window of length {len}")]
    IndexOutOfRange {
        role: LandmarkRole,
        index: isize,
        len: usize,
        axis: Axis,
    },
    #[error("expected two half-height crossings, found {found}")]
    InsufficientCrossings { found: usize },
    #[error("time base has {times} samples but the series has {values}")]
    LengthMismatch { times: usize, values: usize },
    #[error("series has no samples")]
    EmptySeries,
    #[error("time values must be strictly increasing (sample {index})")]
    NonMonotonicTime { index: usize },
    #[error("secondary series ({secondary} samples) is longer than the primary ({primary})")]
    NegativeOffset { primary: usize, secondary: usize },
    #[error("sample offset {offset} is odd and the offset policy rejects odd offsets")]
    OddOffset { offset: usize },
    #[error("window [{start}, {end}) is invalid for a primary series of {len} samples with offset {offset}")]
    InvalidWindow {
        start: usize,
        end: usize,
        len: usize,
        offset: usize,
    },
}
