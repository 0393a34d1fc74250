//! Python bindings for the spectrum engine

use numpy::{Complex64, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::spectrum::{EngineConfig, SampleBlock, Spectrum, SpectrumEngine, WindowFunction};

/// Window function enum exposed to Python
#[pyclass(name = "WindowFunction")]
#[derive(Clone)]
pub enum PyWindowFunction {
    Rectangular,
    Hann,
    Hamming,
    Blackman,
}

impl From<PyWindowFunction> for WindowFunction {
    fn from(py_win: PyWindowFunction) -> Self {
        match py_win {
            PyWindowFunction::Rectangular => WindowFunction::Rectangular,
            PyWindowFunction::Hann => WindowFunction::Hann,
            PyWindowFunction::Hamming => WindowFunction::Hamming,
            PyWindowFunction::Blackman => WindowFunction::Blackman,
        }
    }
}

/// Spectrum engine exposed to Python
///
/// Keeps the last spectrum so peak and SNR queries work on it directly.
#[pyclass(name = "SpectrumEngine")]
pub struct PySpectrumEngine {
    engine: SpectrumEngine,
    last: Option<Spectrum>,
}

impl PySpectrumEngine {
    fn last_spectrum(&self) -> PyResult<&Spectrum> {
        self.last
            .as_ref()
            .ok_or_else(|| PyValueError::new_err("no spectrum processed yet"))
    }
}

#[pymethods]
impl PySpectrumEngine {
    /// Create a new spectrum engine
    ///
    /// Args:
    ///     fft_size: FFT size (256, 512, 1024, 2048 or 4096)
    ///     window: Window function
    ///     averaging_factor: Exponential averaging weight in [0, 1]
    ///     averaging: Return the running average
    ///     peak_hold: Track the elementwise maximum
    #[new]
    #[pyo3(signature = (fft_size=1024, window=PyWindowFunction::Hann, averaging_factor=0.1, averaging=true, peak_hold=false))]
    fn new(
        fft_size: usize,
        window: PyWindowFunction,
        averaging_factor: f64,
        averaging: bool,
        peak_hold: bool,
    ) -> PyResult<Self> {
        let engine = SpectrumEngine::new(EngineConfig {
            fft_size,
            window: window.into(),
            averaging_factor,
            averaging,
            peak_hold,
        })?;

        Ok(Self { engine, last: None })
    }

    /// Process complex IQ samples
    ///
    /// Args:
    ///     samples: complex128 numpy array
    ///     sample_rate: Sample rate in Hz
    ///     center_frequency: Optional center frequency in Hz
    ///
    /// Returns:
    ///     (frequencies, magnitude_db) as numpy arrays
    #[pyo3(signature = (samples, sample_rate, center_frequency=None))]
    fn process<'py>(
        &mut self,
        py: Python<'py>,
        samples: PyReadonlyArray1<Complex64>,
        sample_rate: f64,
        center_frequency: Option<f64>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let samples = samples
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let block = SampleBlock {
            samples,
            sample_rate,
            center_frequency,
        };
        let spectrum = self.engine.process_block(&block)?;

        let freqs = PyArray1::from_slice(py, &spectrum.frequencies);
        let mags = PyArray1::from_slice(py, &spectrum.magnitude_db);
        self.last = Some(spectrum);

        Ok((freqs, mags))
    }

    /// Find peaks in the last processed spectrum
    ///
    /// Returns:
    ///     List of dicts with frequency, amplitude, prominence and index
    #[pyo3(signature = (height_threshold=None, prominence=5.0, min_distance=10))]
    fn find_peaks<'py>(
        &self,
        py: Python<'py>,
        height_threshold: Option<f64>,
        prominence: f64,
        min_distance: usize,
    ) -> PyResult<Vec<&'py PyDict>> {
        let spectrum = self.last_spectrum()?;
        let peaks = self
            .engine
            .find_peaks(spectrum, height_threshold, prominence, min_distance)?;

        peaks
            .iter()
            .map(|peak| {
                let dict = PyDict::new(py);
                dict.set_item("frequency", peak.frequency)?;
                dict.set_item("amplitude", peak.amplitude)?;
                dict.set_item("prominence", peak.prominence)?;
                dict.set_item("index", peak.index)?;
                Ok(dict)
            })
            .collect()
    }

    /// Estimate SNR (dB) of a signal in the last processed spectrum
    #[pyo3(signature = (signal_frequency, signal_bandwidth=1000.0))]
    fn estimate_snr(&self, signal_frequency: f64, signal_bandwidth: f64) -> PyResult<f64> {
        let spectrum = self.last_spectrum()?;
        Ok(self
            .engine
            .estimate_snr(spectrum, signal_frequency, signal_bandwidth)?)
    }

    /// Noise floor (10th percentile, dB) of the last spectrum
    fn noise_floor(&self) -> PyResult<f64> {
        Ok(self.last_spectrum()?.noise_floor)
    }

    /// Peak-hold trace, or None
    fn peak_hold<'py>(&self, py: Python<'py>) -> Option<&'py PyArray1<f64>> {
        self.engine
            .peak_hold_spectrum()
            .map(|hold| PyArray1::from_slice(py, hold))
    }

    fn reset_averaging(&mut self) {
        self.engine.reset_averaging();
    }

    fn reset_peak_hold(&mut self) {
        self.engine.reset_peak_hold();
    }

    fn set_averaging(&mut self, enabled: bool) {
        self.engine.set_averaging(enabled);
    }

    fn set_peak_hold(&mut self, enabled: bool) {
        self.engine.set_peak_hold(enabled);
    }

    /// Get FFT size
    fn get_fft_size(&self) -> usize {
        self.engine.fft_size()
    }
}
