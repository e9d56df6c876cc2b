//! Python bindings for the whitening transforms.

use numpy::{PyArray2, PyReadonlyArray2, PyUntypedArrayMethods};
use ntcca::{DEFAULT_FUDGE, DEFAULT_THRESH};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::utils::linalg_err;

fn require_square(c: &PyReadonlyArray2<f64>) -> PyResult<()> {
    let shape = c.shape();
    if shape[0] != shape[1] {
        return Err(PyValueError::new_err(format!(
            "Expected a square covariance matrix, got shape ({}, {})",
            shape[0], shape[1]
        )));
    }
    Ok(())
}

/// Full-rank whitening matrix of a covariance.
///
/// Args:
///     c (np.ndarray): Symmetric covariance of shape (n, n), float64.
///     fudge (float): Added to each eigenvalue before inversion. Default: 1e-18.
///
/// Returns:
///     np.ndarray: Whitening matrix W of shape (n, n); whitened data is X @ W.
#[pyfunction]
#[pyo3(signature = (c, fudge = DEFAULT_FUDGE))]
fn whiten<'py>(
    py: Python<'py>,
    c: PyReadonlyArray2<'py, f64>,
    fudge: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    require_square(&c)?;
    let w = ntcca::whiten(c.as_array(), fudge).map_err(linalg_err)?;
    Ok(PyArray2::from_owned_array(py, w))
}

/// Rank-reducing whitening matrix.
///
/// Args:
///     c (np.ndarray): Symmetric covariance of shape (n, n), float64.
///     thresh (float): Drop directions with eigenvalue ratio <= thresh. Default: 1e-12.
///
/// Returns:
///     np.ndarray: Whitening matrix of shape (n, n_retained).
///
/// Example:
///     >>> import pyntcca
///     >>> import numpy as np
///     >>> w = pyntcca.whiten_nt(np.diag([1.0, 1e-15, 4.0]))
///     >>> w.shape
///     (3, 2)
#[pyfunction]
#[pyo3(signature = (c, thresh = DEFAULT_THRESH))]
fn whiten_nt<'py>(
    py: Python<'py>,
    c: PyReadonlyArray2<'py, f64>,
    thresh: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    require_square(&c)?;
    let w = ntcca::whiten_nt(c.as_array(), thresh).map_err(linalg_err)?;
    Ok(PyArray2::from_owned_array(py, w))
}

/// SVD whitening of a data matrix.
///
/// Args:
///     x (np.ndarray): Data of shape (n_observations, n_channels), float64.
///
/// Returns:
///     np.ndarray: Whitened data U @ Vt, same shape as `x`.
#[pyfunction]
fn whiten_svd<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let w = ntcca::whiten_svd(x.as_array()).map_err(linalg_err)?;
    Ok(PyArray2::from_owned_array(py, w))
}

/// ZCA (Mahalanobis) whitening matrix.
///
/// Args:
///     c (np.ndarray): Symmetric covariance of shape (n, n), float64.
///     epsilon (float): Added to each singular value before inversion. Default: 1e-18.
///
/// Returns:
///     np.ndarray: Symmetric whitening matrix of shape (n, n).
#[pyfunction]
#[pyo3(signature = (c, epsilon = DEFAULT_FUDGE))]
fn whiten_zca<'py>(
    py: Python<'py>,
    c: PyReadonlyArray2<'py, f64>,
    epsilon: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    require_square(&c)?;
    let w = ntcca::whiten_zca(c.as_array(), epsilon).map_err(linalg_err)?;
    Ok(PyArray2::from_owned_array(py, w))
}

/// Register whitening functions with the module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(whiten, m)?)?;
    m.add_function(wrap_pyfunction!(whiten_nt, m)?)?;
    m.add_function(wrap_pyfunction!(whiten_svd, m)?)?;
    m.add_function(wrap_pyfunction!(whiten_zca, m)?)?;
    Ok(())
}
