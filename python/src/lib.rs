use pyo3::prelude::*;

mod cca;
mod covariance;
mod utils;
mod whiten;

/// Covariance-based canonical correlation analysis.
///
/// # Example
/// ```python
/// import pyntcca
/// import numpy as np
///
/// x = np.random.randn(2000, 8)
/// y = np.random.randn(2000, 4)
/// A, B, R = pyntcca.nt_cca(x, y, lags=list(range(-5, 6)))
/// ```
#[pymodule]
fn pyntcca(m: &Bound<'_, PyModule>) -> PyResult<()> {
    cca::register(m)?;
    covariance::register(m)?;
    whiten::register(m)?;
    Ok(())
}
