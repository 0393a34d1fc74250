//! Python bindings for the waterfall history

use numpy::{PyArray2, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::waterfall::{WaterfallBuffer, WaterfallConfig};

/// Waterfall buffer exposed to Python
#[pyclass(name = "WaterfallBuffer")]
pub struct PyWaterfallBuffer {
    buffer: WaterfallBuffer,
}

#[pymethods]
impl PyWaterfallBuffer {
    /// Create a new waterfall
    ///
    /// Args:
    ///     history_size: Number of rows kept
    ///     fft_size: Number of bins per row
    ///     intensity_min: Lower display bound (dB), fill value of empty rows
    ///     intensity_max: Upper display bound (dB)
    #[new]
    #[pyo3(signature = (history_size=800, fft_size=1024, intensity_min=-80.0, intensity_max=-20.0))]
    fn new(
        history_size: usize,
        fft_size: usize,
        intensity_min: f64,
        intensity_max: f64,
    ) -> PyResult<Self> {
        let buffer = WaterfallBuffer::from_config(WaterfallConfig {
            history_size,
            fft_size,
            intensity_min,
            intensity_max,
        })?;
        Ok(Self { buffer })
    }

    /// Push a spectrum (dB) as the newest row
    fn push(&mut self, values: PyReadonlyArray1<f64>) -> PyResult<()> {
        let values = values
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.buffer.push(values)?)
    }

    /// Image in [0, 1], newest row first
    ///
    /// Bounds default to the configured intensity range.
    #[pyo3(signature = (intensity_min=None, intensity_max=None))]
    fn to_normalized_image<'py>(
        &self,
        py: Python<'py>,
        intensity_min: Option<f64>,
        intensity_max: Option<f64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let config = self.buffer.config();
        let image = self.buffer.to_normalized_image(
            intensity_min.unwrap_or(config.intensity_min),
            intensity_max.unwrap_or(config.intensity_max),
        )?;
        Ok(PyArray2::from_owned_array(py, image))
    }

    /// Raw dB grid, newest row first
    fn to_array<'py>(&self, py: Python<'py>) -> &'py PyArray2<f64> {
        PyArray2::from_owned_array(py, self.buffer.to_array())
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn filled(&self) -> usize {
        self.buffer.filled()
    }

    fn history_size(&self) -> usize {
        self.buffer.history_size()
    }
}
