//! Scalar spectrum metrics: noise floor, dynamic range, SNR

use super::frame::Spectrum;
use crate::error::{ProcessingErrorKind, Result, SpectrumError};

/// Percentile with linear interpolation between closest ranks
///
/// `p` is in percent (0..=100). Returns NaN for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Noise floor estimate: 10th percentile of the dB values
pub fn noise_floor(magnitude_db: &[f64]) -> f64 {
    percentile(magnitude_db, 10.0)
}

/// Spread between the strongest and weakest bin in dB
pub fn dynamic_range(magnitude_db: &[f64]) -> f64 {
    if magnitude_db.is_empty() {
        return 0.0;
    }
    let max = magnitude_db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = magnitude_db.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Estimate the signal-to-noise ratio of a signal in a spectrum
///
/// The signal window is `round(bandwidth / resolution)` bins (at least one)
/// centered on the bin nearest `signal_frequency`, clipped to the spectrum.
/// Signal power is the window maximum, noise power the mean of every bin
/// outside it, both in dB.
///
/// # Arguments
/// * `spectrum` - Spectrum to measure
/// * `signal_frequency` - Expected signal frequency in Hz, on the spectrum's axis
/// * `signal_bandwidth` - Signal bandwidth in Hz
pub fn estimate_snr(spectrum: &Spectrum, signal_frequency: f64, signal_bandwidth: f64) -> Result<f64> {
    if !signal_frequency.is_finite() {
        return Err(SpectrumError::invalid(
            "signal_frequency",
            signal_frequency,
            "a finite frequency in Hz",
        ));
    }
    if !(signal_bandwidth.is_finite() && signal_bandwidth >= 0.0) {
        return Err(SpectrumError::invalid(
            "signal_bandwidth",
            signal_bandwidth,
            "a finite, non-negative bandwidth in Hz",
        ));
    }

    spectrum.check_bins()?;

    let len = spectrum.len();
    let region_error =
        |kind| SpectrumError::processing(kind, len, spectrum.fft_size);

    let signal_bin = spectrum
        .bin_of(signal_frequency)
        .ok_or_else(|| region_error(ProcessingErrorKind::EmptySignalRegion))?;

    let bandwidth_bins = ((signal_bandwidth / spectrum.freq_resolution()).round() as usize).max(1);
    let start = signal_bin.saturating_sub(bandwidth_bins / 2);
    let end = (signal_bin + bandwidth_bins / 2 + 1).min(len);

    if start >= end {
        return Err(region_error(ProcessingErrorKind::EmptySignalRegion));
    }

    let signal_power = spectrum.magnitude_db[start..end]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let noise_bins = len - (end - start);
    if noise_bins == 0 {
        return Err(region_error(ProcessingErrorKind::EmptyNoiseRegion));
    }

    let noise_sum: f64 = spectrum.magnitude_db[..start]
        .iter()
        .chain(spectrum.magnitude_db[end..].iter())
        .sum();
    let noise_power = noise_sum / noise_bins as f64;

    Ok(signal_power - noise_power)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spectrum_with_tone(len: usize, tone_bin: usize) -> Spectrum {
        let freqs: Vec<f64> = (0..len).map(|i| i as f64 * 100.0).collect();
        let mut mags = vec![-80.0; len];
        mags[tone_bin] = -20.0;
        Spectrum::new(freqs, mags, 100.0 * len as f64, len, 0.0).unwrap()
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert!((percentile(&values, 10.0) - 1.4).abs() < 1e-12);
        assert!(percentile(&[], 10.0).is_nan());
    }

    #[test]
    fn test_dynamic_range() {
        assert_eq!(dynamic_range(&[-10.0, -50.0, -30.0]), 40.0);
        assert_eq!(dynamic_range(&[]), 0.0);
    }

    #[test]
    fn test_snr_single_tone() {
        let spectrum = flat_spectrum_with_tone(64, 20);
        let snr = estimate_snr(&spectrum, 2000.0, 500.0).unwrap();
        assert!((snr - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_snr_snaps_to_nearest_bin() {
        let spectrum = flat_spectrum_with_tone(64, 20);
        // 2040 Hz is nearest to bin 20; a 1-bin window still finds the tone
        let snr = estimate_snr(&spectrum, 2040.0, 0.0).unwrap();
        assert!((snr - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_snr_window_clipped_at_edges() {
        let spectrum = flat_spectrum_with_tone(64, 0);
        let snr = estimate_snr(&spectrum, 0.0, 1000.0).unwrap();
        assert!((snr - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_snr_fails_when_noise_region_is_empty() {
        let spectrum = flat_spectrum_with_tone(16, 8);
        let err = estimate_snr(&spectrum, 800.0, 1e9).unwrap_err();
        assert_eq!(err.processing_kind(), Some(ProcessingErrorKind::EmptyNoiseRegion));
    }

    #[test]
    fn test_snr_fails_on_empty_spectrum() {
        let spectrum = Spectrum::new(vec![], vec![], 1000.0, 16, 0.0).unwrap();
        let err = estimate_snr(&spectrum, 0.0, 100.0).unwrap_err();
        assert_eq!(err.processing_kind(), Some(ProcessingErrorKind::EmptySignalRegion));
    }

    #[test]
    fn test_snr_rejects_bad_bandwidth() {
        let spectrum = flat_spectrum_with_tone(16, 8);
        assert!(matches!(
            estimate_snr(&spectrum, 800.0, -1.0),
            Err(SpectrumError::InvalidParameter { name: "signal_bandwidth", .. })
        ));
    }
}
