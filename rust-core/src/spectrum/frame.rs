//! Sample blocks in, spectra out

use num_complex::Complex64;

use super::metrics;
use super::peaks::{self, PeakRecord, PeakSearch};
use crate::error::{ProcessingErrorKind, Result, SpectrumError};

/// One captured block of IQ samples
///
/// Borrowed from the caller for the duration of a processing call.
#[derive(Debug, Clone, Copy)]
pub struct SampleBlock<'a> {
    /// Complex baseband samples (I + jQ)
    pub samples: &'a [Complex64],

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Tuned center frequency in Hz, if known
    pub center_frequency: Option<f64>,
}

impl<'a> SampleBlock<'a> {
    pub fn new(samples: &'a [Complex64], sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
            center_frequency: None,
        }
    }

    /// Attach a center frequency so the spectrum axis is absolute
    pub fn with_center_frequency(mut self, center_frequency: f64) -> Self {
        self.center_frequency = Some(center_frequency);
        self
    }
}

/// Calibrated power spectrum for one block
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Frequency of each bin in Hz (ascending, centered)
    pub frequencies: Vec<f64>,

    /// Magnitude of each bin in dB
    pub magnitude_db: Vec<f64>,

    /// Sample rate the block was captured at
    pub sample_rate: f64,

    /// FFT size used
    pub fft_size: usize,

    /// Center frequency the axis is offset by (0 when unknown)
    pub center_frequency: f64,

    /// 10th percentile of the magnitudes
    pub noise_floor: f64,

    /// max - min of the magnitudes
    pub dynamic_range: f64,
}

impl Spectrum {
    /// Build a spectrum and derive its scalar metrics
    ///
    /// Fails with `LengthMismatch` unless there is one frequency per magnitude.
    pub fn new(
        frequencies: Vec<f64>,
        magnitude_db: Vec<f64>,
        sample_rate: f64,
        fft_size: usize,
        center_frequency: f64,
    ) -> Result<Self> {
        if frequencies.len() != magnitude_db.len() {
            return Err(SpectrumError::processing(
                ProcessingErrorKind::LengthMismatch,
                magnitude_db.len(),
                frequencies.len(),
            ));
        }

        let noise_floor = metrics::noise_floor(&magnitude_db);
        let dynamic_range = metrics::dynamic_range(&magnitude_db);

        Ok(Self {
            frequencies,
            magnitude_db,
            sample_rate,
            fft_size,
            center_frequency,
            noise_floor,
            dynamic_range,
        })
    }

    /// Fields are public, so searches re-check the axis against the magnitudes
    pub(crate) fn check_bins(&self) -> Result<()> {
        if self.frequencies.len() != self.magnitude_db.len() {
            return Err(SpectrumError::processing(
                ProcessingErrorKind::LengthMismatch,
                self.magnitude_db.len(),
                self.frequencies.len(),
            ));
        }
        Ok(())
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.magnitude_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude_db.is_empty()
    }

    /// Bin spacing in Hz
    pub fn freq_resolution(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Index of the bin whose frequency is nearest to `frequency`
    pub fn bin_of(&self, frequency: f64) -> Option<usize> {
        self.frequencies
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - frequency).abs().total_cmp(&(*b - frequency).abs())
            })
            .map(|(i, _)| i)
    }

    /// Strongest bin as (frequency Hz, magnitude dB)
    ///
    /// `None` when empty or when the axis and magnitudes disagree in length.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.check_bins().ok()?;
        self.frequencies
            .iter()
            .zip(self.magnitude_db.iter())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(&freq, &mag)| (freq, mag))
    }

    /// Detect peaks, strongest first
    pub fn find_peaks(&self, search: &PeakSearch) -> Result<Vec<PeakRecord>> {
        peaks::find_peaks(self, search)
    }

    /// Estimate SNR of a signal at `signal_frequency` spanning `signal_bandwidth` Hz
    pub fn estimate_snr(&self, signal_frequency: f64, signal_bandwidth: f64) -> Result<f64> {
        metrics::estimate_snr(self, signal_frequency, signal_bandwidth)
    }
}
