//! Pluto Spectrum - IQ Spectrum and Waterfall Core
//! 
//! Windowed FFT spectra with averaging, peak-hold, peak detection and a
//! rolling waterfall history, with optional Python bindings.

#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod spectrum;
pub mod waterfall;
pub mod acquisition;
pub mod units;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{ProcessingErrorKind, Result, SpectrumError};
pub use spectrum::{EngineConfig, PeakRecord, PeakSearch, SampleBlock, Spectrum, SpectrumEngine, WindowFunction};
pub use waterfall::{WaterfallBuffer, WaterfallConfig};
pub use acquisition::SpectrumMonitor;
