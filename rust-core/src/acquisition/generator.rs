//! Synthetic IQ sources
//!
//! Stand-ins for a radio when exercising the processing chain: tones,
//! linear chirps, a triangle test pattern and complex white Gaussian noise.

use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use crate::error::{Result, SpectrumError};

fn check_amplitude(amplitude: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&amplitude) {
        return Err(SpectrumError::invalid("amplitude", amplitude, "a value in [0, 1]"));
    }
    Ok(())
}

fn check_sample_rate(sample_rate: f64) -> Result<()> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(SpectrumError::invalid(
            "sample_rate",
            sample_rate,
            "a finite rate above 0 Hz",
        ));
    }
    Ok(())
}

/// Complex exponential at `frequency` Hz (negative frequencies allowed)
///
/// # Arguments
/// * `frequency` - Tone frequency in Hz relative to the center
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
/// * `sample_rate` - Sample rate in Hz
/// * `len` - Number of samples
pub fn tone(frequency: f64, amplitude: f64, sample_rate: f64, len: usize) -> Result<Vec<Complex64>> {
    check_amplitude(amplitude)?;
    check_sample_rate(sample_rate)?;
    if !frequency.is_finite() {
        return Err(SpectrumError::invalid("frequency", frequency, "a finite frequency in Hz"));
    }

    let omega = 2.0 * PI * frequency / sample_rate;
    Ok((0..len)
        .map(|n| Complex64::from_polar(amplitude, omega * n as f64))
        .collect())
}

/// Linear frequency sweep from `start` to `end` Hz over `len` samples
///
/// Phase is accumulated sample by sample so the sweep stays continuous.
pub fn chirp(
    start: f64,
    end: f64,
    amplitude: f64,
    sample_rate: f64,
    len: usize,
) -> Result<Vec<Complex64>> {
    check_amplitude(amplitude)?;
    check_sample_rate(sample_rate)?;
    if !(start.is_finite() && end.is_finite()) {
        return Err(SpectrumError::invalid(
            "chirp",
            format!("{start}..{end}"),
            "finite start and end frequencies",
        ));
    }

    let mut phase = 0.0;
    Ok((0..len)
        .map(|n| {
            let freq = start + (end - start) * n as f64 / len as f64;
            phase += 2.0 * PI * freq / sample_rate;
            Complex64::from_polar(amplitude, phase)
        })
        .collect())
}

/// Triangle test pattern: integer ramp up then down, scaled by 16, I = Q
pub fn triangle(len: usize) -> Vec<Complex64> {
    let half = len / 2;
    (0..half)
        .chain((0..half).rev())
        .map(|v| {
            let level = (v << 4) as f64;
            Complex64::new(level, level)
        })
        .collect()
}

/// Circular white Gaussian noise with total power `noise_power`
pub fn awgn<R: Rng + ?Sized>(len: usize, noise_power: f64, rng: &mut R) -> Result<Vec<Complex64>> {
    let mut samples = vec![Complex64::new(0.0, 0.0); len];
    add_awgn(&mut samples, noise_power, rng)?;
    Ok(samples)
}

/// Add circular white Gaussian noise with total power `noise_power` in place
pub fn add_awgn<R: Rng + ?Sized>(
    samples: &mut [Complex64],
    noise_power: f64,
    rng: &mut R,
) -> Result<()> {
    // Split evenly between I and Q
    let noise_std = (noise_power / 2.0).sqrt();
    let noise_dist = Normal::new(0.0, noise_std).map_err(|_| {
        SpectrumError::invalid("noise_power", noise_power, "a finite, non-negative power")
    })?;

    for s in samples.iter_mut() {
        *s += Complex64::new(noise_dist.sample(rng), noise_dist.sample(rng));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tone_is_unit_circle_scaled() {
        let samples = tone(1e3, 0.5, 48e3, 480).unwrap();
        assert_eq!(samples.len(), 480);
        assert!(samples.iter().all(|s| (s.norm() - 0.5).abs() < 1e-12));
        assert_eq!(samples[0], Complex64::new(0.5, 0.0));

        // Positive frequency: phase advances counter-clockwise
        let step = (samples[1] / samples[0]).arg();
        assert!((step - 2.0 * PI * 1e3 / 48e3).abs() < 1e-12);
    }

    #[test]
    fn test_tone_validation() {
        assert!(tone(1e3, 1.5, 48e3, 10).is_err());
        assert!(tone(1e3, 0.5, 0.0, 10).is_err());
        assert!(tone(f64::NAN, 0.5, 48e3, 10).is_err());
        assert!(tone(-1e3, 0.5, 48e3, 10).is_ok());
    }

    #[test]
    fn test_chirp_sweeps_upward() {
        let fs = 1e6;
        let samples = chirp(0.0, 100e3, 0.9, fs, 1000).unwrap();
        assert_eq!(samples.len(), 1000);
        assert!(samples.iter().all(|s| (s.norm() - 0.9).abs() < 1e-12));

        let early = (samples[11] / samples[10]).arg();
        let late = (samples[901] / samples[900]).arg();
        assert!(late > early);
        assert!((late - 2.0 * PI * 90.1e3 / fs).abs() < 1e-9);
    }

    #[test]
    fn test_triangle_pattern() {
        let samples = triangle(8);
        let levels: Vec<f64> = samples.iter().map(|s| s.re).collect();
        assert_eq!(levels, vec![0.0, 16.0, 32.0, 48.0, 48.0, 32.0, 16.0, 0.0]);
        assert!(samples.iter().all(|s| s.re == s.im));
    }

    #[test]
    fn test_awgn_power() {
        let mut rng = StdRng::seed_from_u64(2024);
        let noise = awgn(100_000, 0.25, &mut rng).unwrap();
        let power = noise.iter().map(|s| s.norm_sqr()).sum::<f64>() / noise.len() as f64;
        assert!((power - 0.25).abs() < 0.01, "power {power}");

        assert!(awgn(10, -1.0, &mut rng).is_err());
    }
}
