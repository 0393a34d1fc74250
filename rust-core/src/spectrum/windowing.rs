//! Window functions for spectral analysis
//!
//! Applied to IQ blocks before the FFT to reduce spectral leakage.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::SpectrumError;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// Rectangular window (no windowing)
    Rectangular,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~31 dB, rolls off quickly
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~43 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Sidelobe attenuation: ~58 dB, widest mainlobe
    Blackman,
}

impl WindowFunction {
    /// All supported windows
    pub const ALL: [WindowFunction; 4] = [
        WindowFunction::Rectangular,
        WindowFunction::Hann,
        WindowFunction::Hamming,
        WindowFunction::Blackman,
    ];

    /// Amplitude correction factor compensating for window power loss
    ///
    /// Multiplied into the FFT magnitude before normalization by the
    /// coefficient sum.
    pub fn amplitude_correction(&self) -> f64 {
        match self {
            WindowFunction::Rectangular => 1.0,
            WindowFunction::Hann => 2.0,
            WindowFunction::Hamming => 1.85,
            WindowFunction::Blackman => 2.8,
        }
    }

    /// Lowercase name, as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::Rectangular => "rectangular",
            WindowFunction::Hann => "hann",
            WindowFunction::Hamming => "hamming",
            WindowFunction::Blackman => "blackman",
        }
    }

    /// Generate `length` coefficients for this window
    pub fn coefficients(&self, length: usize) -> Vec<f64> {
        generate_window(*self, length)
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowFunction {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "boxcar" => Ok(WindowFunction::Rectangular),
            "hann" | "hanning" => Ok(WindowFunction::Hann),
            "hamming" => Ok(WindowFunction::Hamming),
            "blackman" => Ok(WindowFunction::Blackman),
            _ => Err(SpectrumError::invalid(
                "window_function",
                s,
                "one of rectangular, hann, hamming, blackman",
            )),
        }
    }
}

/// Generate window coefficients
///
/// Symmetric definitions (denominator M-1), so both endpoints are equal.
/// A single-sample window is `[1.0]`.
///
/// # Arguments
/// * `window` - Type of window function
/// * `length` - Number of samples (M)
pub fn generate_window(window: WindowFunction, length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }

    let denom = (length - 1) as f64;

    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / denom;
            match window {
                WindowFunction::Rectangular => 1.0,
                WindowFunction::Hann => 0.5 - 0.5 * angle.cos(),
                WindowFunction::Hamming => 0.54 - 0.46 * angle.cos(),
                WindowFunction::Blackman => {
                    0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos()
                }
            }
        })
        .collect()
}

/// Multiply a complex block by precomputed window coefficients in-place
pub fn apply_window_inplace(samples: &mut [Complex64], coefficients: &[f64]) {
    for (s, &w) in samples.iter_mut().zip(coefficients.iter()) {
        *s *= w;
    }
}

/// Coherent gain of a window (mean coefficient value)
pub fn coherent_gain(window: WindowFunction, length: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    let window = generate_window(window, length);
    window.iter().sum::<f64>() / length as f64
}
