//! Rolling spectrum history for waterfall displays
//!
//! Rows live in a fixed `history_size x fft_size` grid used as a ring: a
//! push overwrites the oldest row and moves the head, so row 0 is always
//! the newest spectrum and exactly `history_size` rows are retained.

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProcessingErrorKind, Result, SpectrumError};

/// Waterfall configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallConfig {
    /// Number of rows kept
    pub history_size: usize,

    /// Number of columns (must match the engine's FFT size)
    pub fft_size: usize,

    /// Lower display bound in dB, also the fill value of empty rows
    pub intensity_min: f64,

    /// Upper display bound in dB
    pub intensity_max: f64,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            history_size: 800,
            fft_size: 1024,
            intensity_min: -80.0,
            intensity_max: -20.0,
        }
    }
}

impl WaterfallConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            return Err(SpectrumError::invalid("history_size", 0, "at least 1 row"));
        }
        if self.fft_size == 0 {
            return Err(SpectrumError::invalid("fft_size", 0, "at least 1 column"));
        }
        check_bounds(self.intensity_min, self.intensity_max)
    }
}

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(SpectrumError::invalid(
            "intensity_range",
            format!("[{min}, {max}]"),
            "finite bounds with max > min",
        ));
    }
    Ok(())
}

/// One stored row with its arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallFrame<'a> {
    /// 0 for the first spectrum ever pushed, counting up
    pub sequence: u64,

    /// dB values, one per bin
    pub values: ArrayView1<'a, f64>,
}

/// Fixed-depth, most-recent-first spectrum history
#[derive(Debug, Clone)]
pub struct WaterfallBuffer {
    config: WaterfallConfig,

    /// Physical storage; logical row r lives at (head + r) % history_size
    data: Array2<f64>,
    head: usize,

    /// Rows written since the last clear, capped at history_size
    filled: usize,

    /// Pushes since construction
    total_pushed: u64,
}

impl WaterfallBuffer {
    /// Create a waterfall with default intensity bounds
    pub fn new(history_size: usize, fft_size: usize) -> Result<Self> {
        Self::from_config(WaterfallConfig {
            history_size,
            fft_size,
            ..WaterfallConfig::default()
        })
    }

    pub fn from_config(config: WaterfallConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            history_size = config.history_size,
            fft_size = config.fft_size,
            "waterfall created"
        );

        Ok(Self {
            data: Array2::from_elem((config.history_size, config.fft_size), config.intensity_min),
            config,
            head: 0,
            filled: 0,
            total_pushed: 0,
        })
    }

    /// Push a new spectrum as row 0, evicting the oldest row
    ///
    /// Fails with `LengthMismatch` unless `values.len() == fft_size`, and
    /// with `NonFiniteInput` if any value is NaN or infinite. A rejected row
    /// leaves the history unchanged.
    pub fn push(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.config.fft_size {
            return Err(SpectrumError::processing(
                ProcessingErrorKind::LengthMismatch,
                values.len(),
                self.config.fft_size,
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            warn!(fft_size = self.config.fft_size, "rejecting waterfall row with non-finite values");
            return Err(SpectrumError::processing(
                ProcessingErrorKind::NonFiniteInput,
                values.len(),
                self.config.fft_size,
            ));
        }

        let history = self.config.history_size;
        self.head = (self.head + history - 1) % history;

        for (dst, &src) in self.data.row_mut(self.head).iter_mut().zip(values.iter()) {
            *dst = src;
        }

        self.filled = (self.filled + 1).min(history);
        self.total_pushed += 1;
        Ok(())
    }

    /// Row `index` (0 = newest) as dB values
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        if index >= self.config.history_size {
            return None;
        }
        let physical = (self.head + index) % self.config.history_size;
        Some(self.data.row(physical))
    }

    /// Stored frame at `index` with its sequence number, if that row was filled
    pub fn frame(&self, index: usize) -> Option<WaterfallFrame<'_>> {
        if index >= self.filled {
            return None;
        }
        let values = self.row(index)?;
        Some(WaterfallFrame {
            sequence: self.total_pushed - 1 - index as u64,
            values,
        })
    }

    /// Copy of the dB grid, newest row first
    pub fn to_array(&self) -> Array2<f64> {
        let order: Vec<usize> = (0..self.config.history_size)
            .map(|r| (self.head + r) % self.config.history_size)
            .collect();
        self.data.select(Axis(0), &order)
    }

    /// Grid rescaled into [0, 1] for rendering, newest row first
    ///
    /// Values at or below `intensity_min` map to 0, at or above
    /// `intensity_max` to 1. The stored history is not modified.
    pub fn to_normalized_image(&self, intensity_min: f64, intensity_max: f64) -> Result<Array2<f64>> {
        check_bounds(intensity_min, intensity_max)?;

        let span = intensity_max - intensity_min;
        let mut image = self.to_array();
        image.mapv_inplace(|v| ((v - intensity_min) / span).clamp(0.0, 1.0));
        Ok(image)
    }

    /// Normalized image using the configured intensity bounds
    pub fn to_normalized_image_default(&self) -> Array2<f64> {
        let span = self.config.intensity_max - self.config.intensity_min;
        let min = self.config.intensity_min;
        let mut image = self.to_array();
        image.mapv_inplace(|v| ((v - min) / span).clamp(0.0, 1.0));
        image
    }

    /// Refill every row with the floor value
    ///
    /// Peak-hold lives in the spectrum engine; callers reset it separately
    /// (or go through `SpectrumMonitor::clear`).
    pub fn clear(&mut self) {
        debug!("waterfall cleared");
        self.data.fill(self.config.intensity_min);
        self.head = 0;
        self.filled = 0;
    }

    /// Fill value for unwritten rows
    pub fn floor(&self) -> f64 {
        self.config.intensity_min
    }

    pub fn history_size(&self) -> usize {
        self.config.history_size
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Rows holding real data since the last clear
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Pushes since construction (not reset by `clear`)
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }
}
