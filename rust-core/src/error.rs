//! Error types for spectrum processing
//!
//! Two families: bad arguments rejected up front, and per-call processing
//! failures. Neither is ever swallowed into a default spectrum.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SpectrumError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("Invalid parameter `{name}`: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: String,
    },

    #[error("Data processing failed: {kind} (input length {input_len}, FFT size {fft_size})")]
    DataProcessing {
        kind: ProcessingErrorKind,
        input_len: usize,
        fft_size: usize,
    },
}

/// What went wrong while processing a block or spectrum
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingErrorKind {
    #[error("empty input")]
    EmptyInput,

    #[error("input contains NaN or infinite samples")]
    NonFiniteInput,

    #[error("FFT produced non-finite output")]
    FftFailure,

    #[error("input length does not match FFT size")]
    LengthMismatch,

    #[error("signal region collapsed to zero bins")]
    EmptySignalRegion,

    #[error("noise region collapsed to zero bins")]
    EmptyNoiseRegion,
}

impl SpectrumError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        SpectrumError::InvalidParameter {
            name,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub(crate) fn processing(kind: ProcessingErrorKind, input_len: usize, fft_size: usize) -> Self {
        SpectrumError::DataProcessing {
            kind,
            input_len,
            fft_size,
        }
    }

    /// Processing error kind, if this is a processing failure
    pub fn processing_kind(&self) -> Option<ProcessingErrorKind> {
        match self {
            SpectrumError::DataProcessing { kind, .. } => Some(*kind),
            SpectrumError::InvalidParameter { .. } => None,
        }
    }
}
