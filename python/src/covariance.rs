//! Python bindings for lagged covariance.

use numpy::{PyArray3, PyReadonlyArrayDyn};
use pyo3::prelude::*;

use crate::utils::cca_err;

/// Lagged cross-products of `[x, y]`, summed over trials.
///
/// Args:
///     x (np.ndarray): (n_times, mx) or (n_times, mx, n_trials), float64.
///     y (np.ndarray): (n_times, my) or (n_times, my, n_trials), float64.
///     lags (list[int]): Lags in samples, positive means y delayed. Default: [0].
///
/// Returns:
///     tuple: (C, total_weight, m) with C of shape (mx + my, mx + my, n_lags),
///         the number of samples accumulated per lag, and m = mx.
#[pyfunction]
#[pyo3(signature = (x, y, lags=None))]
fn cov_lags<'py>(
    py: Python<'py>,
    x: PyReadonlyArrayDyn<'py, f64>,
    y: PyReadonlyArrayDyn<'py, f64>,
    lags: Option<Vec<isize>>,
) -> PyResult<(Bound<'py, PyArray3<f64>>, Vec<usize>, usize)> {
    let shifts = ntcca::check_shifts(lags.as_deref());
    let lagged = ntcca::cov_lags(x.as_array(), y.as_array(), &shifts).map_err(cca_err)?;
    Ok((PyArray3::from_owned_array(py, lagged.cov), lagged.total_weight, lagged.m))
}

/// Register covariance functions with the module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(cov_lags, m)?)?;
    Ok(())
}
