use crate::error::LandmarkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two stacked axes a quantity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Displacement-like trace.
    Primary,
    /// Velocity-like trace, shorter than the primary by the pair offset.
    Secondary,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Primary => f.write_str("primary"),
            Axis::Secondary => f.write_str("secondary"),
        }
    }
}

/// Samples with an explicit, strictly increasing time base.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    time: Vec<f64>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(time: Vec<f64>, values: Vec<f64>) -> Result<Self, LandmarkError> {
        if time.len() != values.len() {
            return Err(LandmarkError::LengthMismatch {
                times: time.len(),
                values: values.len(),
            });
        }
        if values.is_empty() {
            return Err(LandmarkError::EmptySeries);
        }
        if let Some(index) = time.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(LandmarkError::NonMonotonicTime { index: index + 1 });
        }
        Ok(Self { time, values })
    }

    /// Build a series on a uniform grid `0, dt, 2*dt, ...`.
    pub fn uniform(values: Vec<f64>, dt: f64) -> Result<Self, LandmarkError> {
        let time = (0..values.len()).map(|i| i as f64 * dt).collect();
        Self::new(time, values)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A displacement-like trace and its shorter derivative trace.
///
/// The secondary series is `offset` samples shorter than the primary and
/// its first sample lines up with primary index `offset / 2`.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPair {
    primary: Series,
    secondary: Series,
    offset: usize,
}

impl SeriesPair {
    pub fn new(primary: Series, secondary: Series) -> Result<Self, LandmarkError> {
        let offset = primary.len().checked_sub(secondary.len()).ok_or(
            LandmarkError::NegativeOffset {
                primary: primary.len(),
                secondary: secondary.len(),
            },
        )?;
        Ok(Self {
            primary,
            secondary,
            offset,
        })
    }

    pub fn primary(&self) -> &Series {
        &self.primary
    }

    pub fn secondary(&self) -> &Series {
        &self.secondary
    }

    /// `len(primary) - len(secondary)`.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Primary index of the first secondary sample (floor of `offset / 2`).
    pub fn head_shift(&self) -> usize {
        self.offset / 2
    }

    /// Samples trimmed from the end of the primary time base so it matches
    /// the secondary length. Equals `head_shift` for even offsets.
    pub fn tail_trim(&self) -> usize {
        self.offset - self.head_shift()
    }

    pub fn is_odd(&self) -> bool {
        self.offset % 2 == 1
    }
}
