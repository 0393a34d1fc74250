//! High-level spectrum engine
//!
//! Combines the FFT engine with windowing, dB calibration, exponential
//! averaging and peak-hold for real-time IQ spectrum analysis.
//!
//! Blocks longer than the FFT size are truncated to their first `fft_size`
//! samples rather than averaged in chunks; shorter blocks are zero-padded.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::fft::FftEngine;
use super::frame::{SampleBlock, Spectrum};
use super::peaks::{PeakRecord, PeakSearch};
use super::windowing::{apply_window_inplace, coherent_gain, WindowFunction};
use crate::error::{ProcessingErrorKind, Result, SpectrumError};

/// FFT sizes the engine accepts
pub const SUPPORTED_FFT_SIZES: [usize; 5] = [256, 512, 1024, 2048, 4096];

/// Added to linear magnitudes before taking the log so zeros stay finite
pub const NOISE_FLOOR_OFFSET: f64 = 1e-12;

/// Spectrum engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// FFT size (one of `SUPPORTED_FFT_SIZES`)
    pub fft_size: usize,

    /// Window applied before the FFT
    pub window: WindowFunction,

    /// Exponential averaging weight of the newest spectrum, in [0, 1]
    pub averaging_factor: f64,

    /// Return the running average instead of the raw spectrum
    pub averaging: bool,

    /// Track the elementwise maximum across calls
    pub peak_hold: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            window: WindowFunction::Hann,
            averaging_factor: 0.1,
            averaging: true,
            peak_hold: false,
        }
    }
}

impl EngineConfig {
    /// Check FFT size and averaging factor
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_FFT_SIZES.contains(&self.fft_size) {
            return Err(SpectrumError::invalid(
                "fft_size",
                self.fft_size,
                "one of 256, 512, 1024, 2048, 4096",
            ));
        }
        if !(0.0..=1.0).contains(&self.averaging_factor) {
            return Err(SpectrumError::invalid(
                "averaging_factor",
                self.averaging_factor,
                "a value in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Real-time IQ spectrum engine
///
/// Holds averaging and peak-hold state between calls, so one instance
/// serves one acquisition stream from one caller at a time.
#[derive(Debug)]
pub struct SpectrumEngine {
    config: EngineConfig,
    fft_engine: FftEngine,

    /// Precomputed window coefficients for `fft_size`
    window: Vec<f64>,

    /// Amplitude correction over the window's summed coefficients
    scale: f64,

    averaged: Option<Vec<f64>>,
    peak_hold: Option<Vec<f64>>,
}

impl SpectrumEngine {
    /// Create new spectrum engine
    ///
    /// Fails with `InvalidParameter` for unsupported FFT sizes or an
    /// averaging factor outside [0, 1].
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let fft_engine = FftEngine::new(config.fft_size);
        let window = config.window.coefficients(config.fft_size);
        let gain = coherent_gain(config.window, config.fft_size);
        let scale = config.window.amplitude_correction() / (gain * config.fft_size as f64);

        debug!(
            fft_size = config.fft_size,
            window = %config.window,
            averaging_factor = config.averaging_factor,
            "spectrum engine created"
        );

        Ok(Self {
            config,
            fft_engine,
            window,
            scale,
            averaged: None,
            peak_hold: None,
        })
    }

    /// Engine with the given FFT size and window, other settings default
    pub fn with_size(fft_size: usize, window: WindowFunction) -> Result<Self> {
        Self::new(EngineConfig {
            fft_size,
            window,
            ..EngineConfig::default()
        })
    }

    /// Process a block of IQ samples centered about zero
    pub fn process(&mut self, samples: &[Complex64], sample_rate: f64) -> Result<Spectrum> {
        self.process_block(&SampleBlock::new(samples, sample_rate))
    }

    /// Process a sample block into a calibrated dB spectrum
    ///
    /// Validation and the FFT run before any averaging or peak-hold state is
    /// touched, so a failed call leaves that state as it was.
    pub fn process_block(&mut self, block: &SampleBlock<'_>) -> Result<Spectrum> {
        let raw = self.raw_spectrum_db(block.samples, block.sample_rate)?;

        let values = if self.config.averaging {
            self.update_average(raw)
        } else {
            raw
        };

        if self.config.peak_hold {
            self.update_peak_hold(&values);
        }

        let center = block.center_frequency.unwrap_or(0.0);
        let frequencies = self
            .fft_engine
            .frequency_axis(block.sample_rate)
            .into_iter()
            .map(|f| f + center)
            .collect();

        Spectrum::new(
            frequencies,
            values,
            block.sample_rate,
            self.config.fft_size,
            center,
        )
    }

    /// Windowed, corrected, normalized magnitude in dB without any state
    fn raw_spectrum_db(&mut self, samples: &[Complex64], sample_rate: f64) -> Result<Vec<f64>> {
        let fft_size = self.config.fft_size;

        if samples.is_empty() {
            return Err(SpectrumError::processing(
                ProcessingErrorKind::EmptyInput,
                0,
                fft_size,
            ));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SpectrumError::invalid(
                "sample_rate",
                sample_rate,
                "a finite rate above 0 Hz",
            ));
        }
        if samples.iter().any(|s| !(s.re.is_finite() && s.im.is_finite())) {
            warn!(input_len = samples.len(), "rejecting block with non-finite samples");
            return Err(SpectrumError::processing(
                ProcessingErrorKind::NonFiniteInput,
                samples.len(),
                fft_size,
            ));
        }

        trace!(input_len = samples.len(), fft_size, "processing block");

        apply_window_inplace(self.fft_engine.load(samples), &self.window);

        let scale = self.scale;
        let spectrum_db: Vec<f64> = self
            .fft_engine
            .transform_centered()
            .iter()
            .map(|c| 20.0 * (c.norm() * scale + NOISE_FLOOR_OFFSET).log10())
            .collect();

        if spectrum_db.iter().any(|v| !v.is_finite()) {
            return Err(SpectrumError::processing(
                ProcessingErrorKind::FftFailure,
                samples.len(),
                fft_size,
            ));
        }

        Ok(spectrum_db)
    }

    fn update_average(&mut self, raw: Vec<f64>) -> Vec<f64> {
        let alpha = self.config.averaging_factor;
        match self.averaged.as_mut() {
            Some(avg) => {
                for (a, &r) in avg.iter_mut().zip(raw.iter()) {
                    *a = alpha * r + (1.0 - alpha) * *a;
                }
                avg.clone()
            }
            None => {
                self.averaged = Some(raw.clone());
                raw
            }
        }
    }

    fn update_peak_hold(&mut self, values: &[f64]) {
        match self.peak_hold.as_mut() {
            Some(hold) => {
                for (h, &v) in hold.iter_mut().zip(values.iter()) {
                    *h = h.max(v);
                }
            }
            None => self.peak_hold = Some(values.to_vec()),
        }
    }

    /// Find peaks in a spectrum produced by this engine
    ///
    /// # Arguments
    /// * `spectrum` - Spectrum to search
    /// * `height_threshold` - Minimum height in dB (default: noise floor + 20 dB)
    /// * `prominence` - Minimum prominence in dB
    /// * `min_distance` - Minimum separation in bins
    pub fn find_peaks(
        &self,
        spectrum: &Spectrum,
        height_threshold: Option<f64>,
        prominence: f64,
        min_distance: usize,
    ) -> Result<Vec<PeakRecord>> {
        spectrum.find_peaks(&PeakSearch {
            height_threshold,
            prominence,
            min_distance,
        })
    }

    /// Estimate SNR in dB of a signal in a spectrum
    pub fn estimate_snr(
        &self,
        spectrum: &Spectrum,
        signal_frequency: f64,
        signal_bandwidth: f64,
    ) -> Result<f64> {
        spectrum.estimate_snr(signal_frequency, signal_bandwidth)
    }

    /// Discard the running average; the next call starts fresh
    pub fn reset_averaging(&mut self) {
        debug!("averaging reset");
        self.averaged = None;
    }

    /// Discard the peak-hold trace
    pub fn reset_peak_hold(&mut self) {
        debug!("peak hold reset");
        self.peak_hold = None;
    }

    /// Enable or disable averaging (state is kept until `reset_averaging`)
    pub fn set_averaging(&mut self, enabled: bool) {
        self.config.averaging = enabled;
    }

    /// Enable or disable peak-hold (state is kept until `reset_peak_hold`)
    pub fn set_peak_hold(&mut self, enabled: bool) {
        self.config.peak_hold = enabled;
    }

    /// Current running average, if any
    pub fn averaged_spectrum(&self) -> Option<&[f64]> {
        self.averaged.as_deref()
    }

    /// Current peak-hold trace, if any
    pub fn peak_hold_spectrum(&self) -> Option<&[f64]> {
        self.peak_hold.as_deref()
    }

    /// Frequency axis in Hz (relative to center) for a sample rate
    pub fn frequency_axis(&self, sample_rate: f64) -> Vec<f64> {
        self.fft_engine.frequency_axis(sample_rate)
    }

    /// Bin spacing in Hz for a sample rate
    pub fn freq_resolution(&self, sample_rate: f64) -> f64 {
        sample_rate / self.config.fft_size as f64
    }

    /// Get current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::generator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(fft_size: usize, averaging: bool, peak_hold: bool) -> SpectrumEngine {
        SpectrumEngine::new(EngineConfig {
            fft_size,
            averaging,
            peak_hold,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_unsupported_fft_size() {
        for bad in [0, 100, 300, 8192] {
            let err = SpectrumEngine::with_size(bad, WindowFunction::Hann).unwrap_err();
            assert!(matches!(err, SpectrumError::InvalidParameter { name: "fft_size", .. }));
        }
        for size in SUPPORTED_FFT_SIZES {
            assert!(SpectrumEngine::with_size(size, WindowFunction::Blackman).is_ok());
        }
    }

    #[test]
    fn test_rejects_bad_averaging_factor() {
        for alpha in [-0.1, 1.5, f64::NAN] {
            let config = EngineConfig {
                averaging_factor: alpha,
                ..EngineConfig::default()
            };
            assert!(matches!(
                SpectrumEngine::new(config),
                Err(SpectrumError::InvalidParameter { name: "averaging_factor", .. })
            ));
        }
    }

    #[test]
    fn test_empty_input_fails() {
        let mut engine = engine(1024, true, true);
        let err = engine.process(&[], 1e6).unwrap_err();
        assert_eq!(
            err,
            SpectrumError::DataProcessing {
                kind: ProcessingErrorKind::EmptyInput,
                input_len: 0,
                fft_size: 1024,
            }
        );
    }

    #[test]
    fn test_bad_sample_rate_and_non_finite_input() {
        let mut engine = engine(256, false, false);
        let samples = vec![Complex64::new(0.1, 0.0); 256];
        assert!(engine.process(&samples, 0.0).is_err());
        assert!(engine.process(&samples, f64::INFINITY).is_err());

        let mut bad = samples.clone();
        bad[17] = Complex64::new(f64::NAN, 0.0);
        let err = engine.process(&bad, 1e6).unwrap_err();
        assert_eq!(err.processing_kind(), Some(ProcessingErrorKind::NonFiniteInput));
    }

    #[test]
    fn test_zero_input_sits_at_floor() {
        let floor = 20.0 * NOISE_FLOOR_OFFSET.log10();
        for size in SUPPORTED_FFT_SIZES {
            let mut engine = engine(size, false, false);
            let spectrum = engine.process(&vec![Complex64::new(0.0, 0.0); size], 1e6).unwrap();

            assert_eq!(spectrum.len(), size);
            assert_eq!(spectrum.frequencies.len(), size);
            assert!(spectrum
                .magnitude_db
                .iter()
                .all(|&v| v.is_finite() && (v - floor).abs() < 1e-9));
            assert_eq!(spectrum.dynamic_range, 0.0);
        }
    }

    #[test]
    fn test_calibrated_tone_level() {
        // Complex tone of amplitude 0.5 on an exact bin: Hann correction
        // of 2 over the coefficient sum gives 2 * 0.5 = 1.0, i.e. 0 dB
        let mut engine = engine(1024, false, false);
        let fs = 1024e3;
        let samples = generator::tone(100e3, 0.5, fs, 1024).unwrap();
        let spectrum = engine.process(&samples, fs).unwrap();

        let (freq, level) = spectrum.peak().unwrap();
        assert!((freq - 100e3).abs() < 1e-6);
        assert!(level.abs() < 0.01, "level {level}");
    }

    #[test]
    fn test_process_is_idempotent_without_averaging() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = generator::awgn(1024, 1.0, &mut rng).unwrap();

        let mut engine = engine(1024, false, false);
        let a = engine.process(&samples, 2.4e6).unwrap();
        let b = engine.process(&samples, 2.4e6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_pad_and_truncate() {
        let mut engine = engine(256, false, false);
        let fs = 256e3;
        let tone = generator::tone(32e3, 0.5, fs, 512).unwrap();

        // The second half is replaced by a much louder tone; truncation
        // means it never shows up
        let mut long = tone[..256].to_vec();
        long.extend(generator::tone(-64e3, 1.0, fs, 256).unwrap());
        let truncated = engine.process(&long, fs).unwrap();
        let exact = engine.process(&tone[..256], fs).unwrap();
        assert_eq!(truncated, exact);

        let short = engine.process(&tone[..100], fs).unwrap();
        assert_eq!(short.len(), 256);
        assert_eq!(short.peak().map(|(f, _)| f), Some(32e3));
    }

    #[test]
    fn test_frequency_axis_and_center() {
        let mut engine = engine(1024, false, false);
        let samples = vec![Complex64::new(0.0, 0.0); 1024];

        let spectrum = engine.process(&samples, 2.4e6).unwrap();
        assert_eq!(spectrum.frequencies[512], 0.0);
        assert!((spectrum.frequencies[0] + 1.2e6).abs() < 1e-6);
        assert!((spectrum.freq_resolution() - 2343.75).abs() < 1e-9);
        assert!(spectrum.frequencies.windows(2).all(|w| w[1] > w[0]));

        let block = SampleBlock::new(&samples, 2.4e6).with_center_frequency(100e6);
        let spectrum = engine.process_block(&block).unwrap();
        assert_eq!(spectrum.frequencies[512], 100e6);
        assert_eq!(spectrum.center_frequency, 100e6);
    }

    #[test]
    fn test_first_average_equals_raw() {
        let mut rng = StdRng::seed_from_u64(11);
        let samples = generator::awgn(512, 1.0, &mut rng).unwrap();

        let mut raw = engine(512, false, false);
        let mut avg = engine(512, true, false);
        assert_eq!(raw.process(&samples, 1e6).unwrap(), avg.process(&samples, 1e6).unwrap());
        assert!(avg.averaged_spectrum().is_some());
        assert!(raw.averaged_spectrum().is_none());
    }

    #[test]
    fn test_averaging_converges_geometrically() {
        let mut rng = StdRng::seed_from_u64(3);
        let first = generator::awgn(1024, 1.0, &mut rng).unwrap();
        let steady = generator::tone(200e3, 0.5, 1e6, 1024).unwrap();

        let mut plain = engine(1024, false, false);
        let target = plain.process(&steady, 1e6).unwrap().magnitude_db;
        let start = plain.process(&first, 1e6).unwrap().magnitude_db;
        let initial_gap = target
            .iter()
            .zip(start.iter())
            .map(|(t, s)| (t - s).abs())
            .fold(0.0, f64::max);

        let alpha: f64 = 0.1;
        let mut avg = engine(1024, true, false);
        avg.process(&first, 1e6).unwrap();

        for k in 1..=100 {
            let out = avg.process(&steady, 1e6).unwrap().magnitude_db;
            let gap = target
                .iter()
                .zip(out.iter())
                .map(|(t, o)| (t - o).abs())
                .fold(0.0, f64::max);
            let bound = (1.0 - alpha).powi(k) * initial_gap + 1e-9;
            assert!(gap <= bound, "iteration {k}: gap {gap} > bound {bound}");
        }
    }

    #[test]
    fn test_reset_averaging() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = generator::awgn(256, 1.0, &mut rng).unwrap();
        let b = generator::awgn(256, 1.0, &mut rng).unwrap();

        let mut avg = engine(256, true, false);
        avg.process(&a, 1e6).unwrap();
        avg.reset_averaging();
        assert!(avg.averaged_spectrum().is_none());

        let mut raw = engine(256, false, false);
        assert_eq!(avg.process(&b, 1e6).unwrap(), raw.process(&b, 1e6).unwrap());
    }

    #[test]
    fn test_peak_hold_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = engine(512, false, true);

        let mut previous: Option<Vec<f64>> = None;
        for _ in 0..20 {
            let samples = generator::awgn(512, 0.5, &mut rng).unwrap();
            let spectrum = engine.process(&samples, 1e6).unwrap();
            let hold = engine.peak_hold_spectrum().unwrap().to_vec();

            assert_eq!(hold.len(), spectrum.len());
            assert!(hold.iter().zip(spectrum.magnitude_db.iter()).all(|(h, v)| h >= v));
            if let Some(prev) = &previous {
                assert!(hold.iter().zip(prev.iter()).all(|(h, p)| h >= p));
            }
            previous = Some(hold);
        }

        engine.reset_peak_hold();
        assert!(engine.peak_hold_spectrum().is_none());
    }

    #[test]
    fn test_failed_call_leaves_state_untouched() {
        let mut rng = StdRng::seed_from_u64(9);
        let samples = generator::awgn(256, 1.0, &mut rng).unwrap();

        let mut engine = engine(256, true, true);
        engine.process(&samples, 1e6).unwrap();
        let avg_before = engine.averaged_spectrum().unwrap().to_vec();
        let hold_before = engine.peak_hold_spectrum().unwrap().to_vec();

        assert!(engine.process(&[], 1e6).is_err());
        assert!(engine.process(&samples, -1.0).is_err());

        assert_eq!(engine.averaged_spectrum().unwrap(), avg_before.as_slice());
        assert_eq!(engine.peak_hold_spectrum().unwrap(), hold_before.as_slice());
    }

    #[test]
    fn test_single_tone_round_trip() {
        let fs = 2.4e6;
        let f0 = 1e6;
        let mut engine = engine(1024, true, false);
        let samples = generator::tone(f0, 0.5, fs, 1024).unwrap();

        let spectrum = engine.process(&samples, fs).unwrap();
        let peaks = engine
            .find_peaks(&spectrum, None, 5.0, 10)
            .unwrap();

        assert_eq!(peaks.len(), 1, "peaks: {peaks:?}");
        assert!((peaks[0].frequency - f0).abs() <= spectrum.freq_resolution());
    }

    #[test]
    fn test_tone_well_above_noise_floor() {
        let fs = 1e6;
        let mut engine = engine(1024, true, false);
        let samples = generator::tone(100e3, 0.5, fs, 1024).unwrap();

        let spectrum = engine.process(&samples, fs).unwrap();
        let peaks = spectrum.find_peaks(&PeakSearch::default()).unwrap();

        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].frequency - 100e3).abs() <= spectrum.freq_resolution());
        assert!(peaks[0].amplitude - spectrum.noise_floor >= 20.0);
    }

    #[test]
    fn test_snr_on_pure_noise_is_near_zero() {
        let mut rng = StdRng::seed_from_u64(1234);
        let fs = 1e6;
        let mut engine = engine(1024, false, false);
        let samples = generator::awgn(1024, 1.0, &mut rng).unwrap();
        let spectrum = engine.process(&samples, fs).unwrap();

        // Five-bin window somewhere in the band with nothing in it
        let bandwidth = 5.0 * spectrum.freq_resolution();
        let snr = engine.estimate_snr(&spectrum, 150e3, bandwidth).unwrap();
        assert!(snr.is_finite());
        assert!(snr.abs() < 20.0, "snr {snr}");
    }

    #[test]
    fn test_snr_of_tone_in_noise() {
        let mut rng = StdRng::seed_from_u64(99);
        let fs = 1e6;
        let mut samples = generator::tone(250e3, 0.5, fs, 1024).unwrap();
        generator::add_awgn(&mut samples, 1e-4, &mut rng).unwrap();

        let mut engine = engine(1024, false, false);
        let spectrum = engine.process(&samples, fs).unwrap();
        let snr = engine.estimate_snr(&spectrum, 250e3, 5e3).unwrap();
        assert!(snr > 30.0, "snr {snr}");
    }
}
