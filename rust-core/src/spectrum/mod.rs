//! Spectral analysis of IQ blocks

pub mod fft;
pub mod windowing;
pub mod frame;
pub mod engine;
pub mod peaks;
pub mod metrics;

pub use fft::FftEngine;
pub use windowing::{generate_window, WindowFunction};
pub use frame::{SampleBlock, Spectrum};
pub use engine::{EngineConfig, SpectrumEngine, NOISE_FLOOR_OFFSET, SUPPORTED_FFT_SIZES};
pub use peaks::{find_peaks, peak_summary, PeakRecord, PeakSearch};
pub use metrics::estimate_snr;
