//! Python bindings for covariance-based CCA.

use numpy::{PyArrayDyn, PyReadonlyArrayDyn};
use ntcca::{nt_cca as ntcca_nt_cca, CcaRequest};
use pyo3::prelude::*;

use crate::utils::cca_err;

type CcaTriple<'py> = (
    Bound<'py, PyArrayDyn<f64>>,
    Bound<'py, PyArrayDyn<f64>>,
    Bound<'py, PyArrayDyn<f64>>,
);

/// Canonical correlation analysis from data or from a covariance matrix.
///
/// Pass either `x` and `y` (optionally with `lags`), or the joint covariance
/// `c` of `[x, y]` together with `m`, the number of x channels.
///
/// Args:
///     x (np.ndarray): (n_times, mx) or (n_times, mx, n_trials), float64.
///     y (np.ndarray): (n_times, my) or (n_times, my, n_trials), float64.
///     lags (list[int]): Lags in samples, positive means y delayed. Optional.
///     c (np.ndarray): Covariance, (n, n) or (n, n, n_pages), float64.
///     m (int): Number of x channels in `c`.
///     thresh (float): Whitening eigenvalue ratio threshold. Default: 1e-12.
///
/// Returns:
///     tuple: (A, B, R). With several lags or a 3D `c`, A is (mx, N, n_pages),
///         B is (my, N, n_pages) and R is (N, n_pages); otherwise
///         A is (mx, N), B is (my, N) and R is (N,).
///
/// Raises:
///     ValueError: inconsistent arguments.
///     RuntimeError: malformed covariance or numerical failure.
///
/// Example:
///     >>> import pyntcca
///     >>> import numpy as np
///     >>> x = np.random.randn(1000, 4)
///     >>> y = x[:, :2] + 0.1 * np.random.randn(1000, 2)
///     >>> A, B, R = pyntcca.nt_cca(x, y)
///     >>> assert R[0] > 0.9
#[pyfunction]
#[pyo3(signature = (x=None, y=None, lags=None, c=None, m=None, thresh=None))]
fn nt_cca<'py>(
    py: Python<'py>,
    x: Option<PyReadonlyArrayDyn<'py, f64>>,
    y: Option<PyReadonlyArrayDyn<'py, f64>>,
    lags: Option<Vec<isize>>,
    c: Option<PyReadonlyArrayDyn<'py, f64>>,
    m: Option<usize>,
    thresh: Option<f64>,
) -> PyResult<CcaTriple<'py>> {
    let mut request = CcaRequest::new();
    if let Some(x) = x.as_ref() {
        request = request.with_x(x.as_array());
    }
    if let Some(y) = y.as_ref() {
        request = request.with_y(y.as_array());
    }
    if let Some(lags) = lags.as_deref() {
        request = request.with_lags(lags);
    }
    if let Some(c) = c.as_ref() {
        request = request.with_covariance(c.as_array());
    }
    if let Some(m) = m {
        request = request.with_m(m);
    }
    if let Some(thresh) = thresh {
        request = request.with_thresh(thresh);
    }

    let (a, b, r) = ntcca_nt_cca(request).map_err(cca_err)?.into_dyn();
    Ok((
        PyArrayDyn::from_owned_array(py, a),
        PyArrayDyn::from_owned_array(py, b),
        PyArrayDyn::from_owned_array(py, r),
    ))
}

/// Register CCA functions with the module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(nt_cca, m)?)?;
    Ok(())
}
