use ndarray::{Array1, ArrayView1};

use crate::prelude::{ResampleError, ResampleResult};

/// Fixed-step, strictly increasing axis that instruments are resampled onto.
#[derive(Debug, Clone)]
pub struct ReferenceGrid {
    positions: Array1<f64>,
    step: f64,
}

impl ReferenceGrid {
    /// Builds the grid covering `start..=end` at a fixed `step`.
    ///
    /// The resulting length is `floor((end - start) / step) + 1`, so the last
    /// position never exceeds `end`.
    pub fn build(start: f64, end: f64, step: f64) -> ResampleResult<Self> {
        if !start.is_finite() || !end.is_finite() || !step.is_finite() {
            return Err(ResampleError::Config(format!(
                "non-finite grid bounds: start {} end {} step {}",
                start, end, step
            )));
        }
        if step <= 0.0 {
            return Err(ResampleError::Config(format!(
                "grid step must be positive, got {}",
                step
            )));
        }
        if end < start {
            return Err(ResampleError::Config(format!(
                "grid end {} precedes start {}",
                end, start
            )));
        }

        let count = ((end - start) / step).floor() as usize + 1;
        let positions = Array1::from_iter((0..count).map(|k| start + k as f64 * step));

        Ok(Self { positions, step })
    }

    pub fn positions(&self) -> ArrayView1<'_, f64> {
        self.positions.view()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}
