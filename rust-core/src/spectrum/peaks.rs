//! Peak detection over a dB spectrum
//!
//! Candidates are strict local maxima at or above a height threshold that
//! also clear a prominence test. Survivors closer than `min_distance` bins
//! to a stronger accepted peak are dropped.

use super::frame::Spectrum;
use crate::error::{Result, SpectrumError};
use crate::units::format_frequency;

/// Minimum prominence in dB used when none is given
pub const DEFAULT_PEAK_PROMINENCE_DB: f64 = 5.0;

/// Minimum separation in bins used when none is given
pub const DEFAULT_PEAK_DISTANCE_BINS: usize = 10;

/// Default threshold sits this far above the noise floor
pub const PEAK_THRESHOLD_OFFSET_DB: f64 = 20.0;

/// A detected spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakRecord {
    /// Frequency in Hz
    pub frequency: f64,

    /// Amplitude in dB
    pub amplitude: f64,

    /// Height above the higher of the two surrounding valley floors, in dB
    pub prominence: f64,

    /// Bin index in the spectrum
    pub index: usize,
}

/// Peak search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSearch {
    /// Minimum peak height in dB; `None` means noise floor + 20 dB
    pub height_threshold: Option<f64>,

    /// Minimum prominence in dB
    pub prominence: f64,

    /// Minimum distance between accepted peaks in bins
    pub min_distance: usize,
}

impl Default for PeakSearch {
    fn default() -> Self {
        Self {
            height_threshold: None,
            prominence: DEFAULT_PEAK_PROMINENCE_DB,
            min_distance: DEFAULT_PEAK_DISTANCE_BINS,
        }
    }
}

impl PeakSearch {
    pub fn with_height_threshold(mut self, height_db: f64) -> Self {
        self.height_threshold = Some(height_db);
        self
    }

    pub fn with_prominence(mut self, prominence_db: f64) -> Self {
        self.prominence = prominence_db;
        self
    }

    pub fn with_min_distance(mut self, bins: usize) -> Self {
        self.min_distance = bins;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.prominence.is_finite() && self.prominence >= 0.0) {
            return Err(SpectrumError::invalid(
                "prominence",
                self.prominence,
                "a finite, non-negative value in dB",
            ));
        }
        if self.min_distance == 0 {
            return Err(SpectrumError::invalid("min_distance", 0, "at least 1 bin"));
        }
        if let Some(height) = self.height_threshold {
            if height.is_nan() {
                return Err(SpectrumError::invalid("height_threshold", height, "a number in dB"));
            }
        }
        Ok(())
    }
}

/// Find peaks in a spectrum, sorted by amplitude (highest first)
pub fn find_peaks(spectrum: &Spectrum, search: &PeakSearch) -> Result<Vec<PeakRecord>> {
    search.validate()?;
    spectrum.check_bins()?;

    let x = &spectrum.magnitude_db;
    if x.len() < 3 {
        return Ok(Vec::new());
    }

    let threshold = search
        .height_threshold
        .unwrap_or(spectrum.noise_floor + PEAK_THRESHOLD_OFFSET_DB);

    let mut candidates: Vec<(usize, f64)> = (1..x.len() - 1)
        .filter(|&i| x[i] > x[i - 1] && x[i] > x[i + 1] && x[i] >= threshold)
        .map(|i| (i, prominence(x, i)))
        .filter(|&(_, prom)| prom >= search.prominence)
        .collect();

    // Strongest first; ties resolved toward the lower bin
    candidates.sort_by(|a, b| x[b.0].total_cmp(&x[a.0]).then(a.0.cmp(&b.0)));

    let mut accepted: Vec<(usize, f64)> = Vec::with_capacity(candidates.len());
    for (idx, prom) in candidates {
        let clear = accepted
            .iter()
            .all(|&(kept, _)| idx.abs_diff(kept) >= search.min_distance);
        if clear {
            accepted.push((idx, prom));
        }
    }

    Ok(accepted
        .into_iter()
        .map(|(index, prominence)| PeakRecord {
            frequency: spectrum.frequencies[index],
            amplitude: x[index],
            prominence,
            index,
        })
        .collect())
}

/// Prominence of the peak at `peak`
///
/// Each base is the lowest point between the peak and either the first
/// sample higher than the peak or the array boundary.
fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_base = height;
    for &v in x[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_base = left_base.min(v);
    }

    let mut right_base = height;
    for &v in &x[peak + 1..] {
        if v > height {
            break;
        }
        right_base = right_base.min(v);
    }

    height - left_base.max(right_base)
}

/// Human-readable listing of the strongest peaks
pub fn peak_summary(peaks: &[PeakRecord], max_peaks: usize) -> String {
    if peaks.is_empty() {
        return "No peaks detected".to_string();
    }

    let mut summary = format!("Detected {} peaks:\n", peaks.len());
    for (i, peak) in peaks.iter().take(max_peaks).enumerate() {
        summary.push_str(&format!(
            "  {:2}. {:>13}: {:6.1} dB\n",
            i + 1,
            format_frequency(peak.frequency),
            peak.amplitude
        ));
    }

    if peaks.len() > max_peaks {
        summary.push_str(&format!("  ... and {} more\n", peaks.len() - max_peaks));
    }

    summary
}
