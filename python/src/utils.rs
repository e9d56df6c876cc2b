use ntcca::{CcaError, LinalgError};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Map an engine error to the matching Python exception.
///
/// Argument errors raise `ValueError`; structural and numerical failures
/// raise `RuntimeError`.
pub fn cca_err(e: CcaError) -> PyErr {
    match e {
        CcaError::InvalidArgument(msg) => PyValueError::new_err(msg),
        CcaError::InvalidState(msg) => PyRuntimeError::new_err(msg),
        CcaError::NumericalFailure(inner) => linalg_err(inner),
    }
}

pub fn linalg_err(e: LinalgError) -> PyErr {
    PyRuntimeError::new_err(format!("LinalgError: {}", e))
}
