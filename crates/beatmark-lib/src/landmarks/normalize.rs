use crate::error::LandmarkError;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Physical extent of a window before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRange {
    pub min: f64,
    pub max: f64,
}

impl TickRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Amplitude shown at a normalized position: `t * (max - min)`.
    pub fn relative(&self, t: f64) -> f64 {
        t * self.span()
    }

    /// Absolute physical value at a normalized position, used for time axes.
    pub fn absolute(&self, t: f64) -> f64 {
        self.min + t * self.span()
    }

    /// `count` evenly spaced normalized positions over [0, 1].
    pub fn positions(count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![0.0],
            n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
        }
    }
}

/// Minimum and maximum of `values`, skipping NaN samples.
pub fn min_max<T: Float>(values: &[T]) -> Option<(T, T)> {
    let mut iter = values.iter().copied().filter(|v| !v.is_nan());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn checked_range<T: Float>(values: &[T]) -> Result<(T, T), LandmarkError> {
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(LandmarkError::NonFiniteSample { index });
    }
    let (lo, hi) = min_max(values).ok_or(LandmarkError::DivisionByZero)?;
    let span = hi - lo;
    if span.is_finite() && span > T::zero() {
        Ok((lo, hi))
    } else {
        Err(LandmarkError::DivisionByZero)
    }
}

/// Rescale a window to [0, 1] using its own min and max.
///
/// Fails on NaN or infinite samples rather than normalizing around them.
pub fn normalize<T: Float>(values: &[T]) -> Result<Vec<T>, LandmarkError> {
    let (lo, hi) = checked_range(values)?;
    let span = hi - lo;
    Ok(values.iter().map(|&v| (v - lo) / span).collect())
}

/// Normalize a window and keep its physical range for tick labels.
pub fn normalize_window(values: &[f64]) -> Result<(Vec<f64>, TickRange), LandmarkError> {
    let (min, max) = checked_range(values)?;
    let normalized = normalize(values)?;
    Ok((normalized, TickRange { min, max }))
}
