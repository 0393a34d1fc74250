//! FFT engine using rustfft for complex IQ blocks
//!
//! Output is centered: zero frequency sits at index `fft_size / 2`.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward FFT with reusable buffers
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Complex FFT processor
    fft: Arc<dyn Fft<f64>>,

    /// Working buffer, transformed in place
    buffer: Vec<Complex64>,

    /// Scratch space required by the planned algorithm
    scratch: Vec<Complex64>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        let buffer = vec![Complex64::new(0.0, 0.0); fft_size];
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft_size,
            fft,
            buffer,
            scratch,
        }
    }

    /// Copy a block into the working buffer
    ///
    /// Short blocks are zero-padded and long ones truncated to their first
    /// `fft_size` samples. The returned slice can be windowed in place
    /// before `transform_centered`.
    pub fn load(&mut self, block: &[Complex64]) -> &mut [Complex64] {
        let copy_len = block.len().min(self.fft_size);
        self.buffer[..copy_len].copy_from_slice(&block[..copy_len]);
        self.buffer[copy_len..].fill(Complex64::new(0.0, 0.0));
        &mut self.buffer
    }

    /// Transform the loaded buffer in place
    ///
    /// # Returns
    /// Complex spectrum with bins reordered so that index `fft_size / 2` is DC
    pub fn transform_centered(&mut self) -> &[Complex64] {
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        // fftshift
        self.buffer.rotate_right(self.fft_size / 2);

        &self.buffer
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Centered frequency of a bin in Hz, relative to the tuned center
    pub fn bin_to_frequency(&self, bin: usize, sample_rate: f64) -> f64 {
        let offset = bin as f64 - (self.fft_size / 2) as f64;
        offset * sample_rate / self.fft_size as f64
    }

    /// Frequency axis in Hz, equivalent to `fftshift(fftfreq(n, 1/fs))`
    pub fn frequency_axis(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.fft_size)
            .map(|bin| self.bin_to_frequency(bin, sample_rate))
            .collect()
    }
}

impl std::fmt::Debug for FftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftEngine")
            .field("fft_size", &self.fft_size)
            .finish()
    }
}
