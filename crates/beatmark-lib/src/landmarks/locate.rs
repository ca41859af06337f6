use super::{LandmarkIndex, LandmarkRole};
use crate::error::LandmarkError;
use crate::signal::Axis;
use serde::{Deserialize, Serialize};

/// Normalized level whose crossings bound the width at half height.
pub const HALF_HEIGHT: f64 = 0.5;

/// A resolved landmark on one normalized axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub role: LandmarkRole,
    /// Index into the analysis window of its axis.
    pub index: usize,
    /// Normalized time.
    pub time: f64,
    /// Normalized value.
    pub value: f64,
}

/// The five landmarks of one axis, in `LandmarkRole::ALL` order.
pub type Landmarks = [Landmark; 5];

/// Look up a landmark by role.
pub fn landmark(landmarks: &Landmarks, role: LandmarkRole) -> &Landmark {
    &landmarks[role as usize]
}

/// First and second half-height crossings, ordered by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroCrossingPair {
    pub indices: [usize; 2],
    pub times: [f64; 2],
}

impl ZeroCrossingPair {
    pub fn width(&self) -> f64 {
        self.times[1] - self.times[0]
    }
}

fn check_lengths(time: &[f64], values: &[f64]) -> Result<(), LandmarkError> {
    if time.len() == values.len() {
        Ok(())
    } else {
        Err(LandmarkError::LengthMismatch {
            times: time.len(),
            values: values.len(),
        })
    }
}

/// Resolve the (time, value) pair of every landmark index on one axis.
pub fn locate_landmarks(
    time: &[f64],
    values: &[f64],
    indices: &LandmarkIndex,
    axis: Axis,
) -> Result<Landmarks, LandmarkError> {
    check_lengths(time, values)?;
    let len = values.len();
    let resolve = |role: LandmarkRole| -> Result<Landmark, LandmarkError> {
        let index = indices.get(role);
        if index >= len {
            return Err(LandmarkError::IndexOutOfRange {
                role,
                index: index as isize,
                len,
                axis,
            });
        }
        Ok(Landmark {
            role,
            index,
            time: time[index],
            value: values[index],
        })
    };
    Ok([
        resolve(LandmarkRole::BeatStart)?,
        resolve(LandmarkRole::MaxRiseVelocity)?,
        resolve(LandmarkRole::PeakAmplitude)?,
        resolve(LandmarkRole::MaxRelaxationVelocity)?,
        resolve(LandmarkRole::BeatEnd)?,
    ])
}

// Exact zeros get their own sign so touching the level counts on both sides.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Indices `i` where `values[i] - level` and `values[i + 1] - level` differ in sign.
pub fn crossing_indices(values: &[f64], level: f64) -> impl Iterator<Item = usize> + '_ {
    values
        .windows(2)
        .enumerate()
        .filter(move |(_, w)| sign(w[0] - level) != sign(w[1] - level))
        .map(|(i, _)| i)
}

/// First two crossings of the half-height level in a normalized window.
pub fn half_height_crossings(
    time: &[f64],
    values: &[f64],
) -> Result<ZeroCrossingPair, LandmarkError> {
    check_lengths(time, values)?;
    let mut crossings = crossing_indices(values, HALF_HEIGHT);
    match (crossings.next(), crossings.next()) {
        (Some(first), Some(second)) => Ok(ZeroCrossingPair {
            indices: [first, second],
            times: [time[first], time[second]],
        }),
        (first, _) => Err(LandmarkError::InsufficientCrossings {
            found: usize::from(first.is_some()),
        }),
    }
}
