//! PyO3 bindings for Python integration

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::SpectrumError;

mod spectrum_bindings;
mod waterfall_bindings;

impl From<SpectrumError> for PyErr {
    fn from(err: SpectrumError) -> Self {
        match err {
            SpectrumError::InvalidParameter { .. } => PyValueError::new_err(err.to_string()),
            SpectrumError::DataProcessing { .. } => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn pluto_spectrum(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PySpectrumEngine>()?;
    m.add_class::<waterfall_bindings::PyWaterfallBuffer>()?;

    // Add WindowFunction enum
    m.add_class::<spectrum_bindings::PyWindowFunction>()?;

    Ok(())
}
