//! Principal component analysis of a covariance matrix.
//!
//! The joint PCA stage of CCA: returns principal directions already ranked
//! by variance, so callers can truncate with a plain column slice.

use ndarray::{s, Array1, Array2, ArrayView2};
use tracing::trace;

use crate::linalg::{eigen_symmetric, JacobiConfig, LinalgError};

/// Truncation options for [`pca`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcaOptions {
    /// Keep at most this many components (None = all)
    pub max_comps: Option<usize>,

    /// Drop components whose eigenvalue-to-largest ratio is `<= thresh` (None = keep all)
    pub thresh: Option<f64>,

    /// Iteration budget of the eigendecomposition
    pub jacobi: JacobiConfig,
}

/// Eigenvectors and eigenvalues of a symmetric covariance, sorted descending.
///
/// Returns `(V, d)` where the columns of `V` are unit-norm, mutually
/// orthogonal and ordered by descending `d`. With default options nothing is
/// truncated and `V` is square.
///
/// # Errors
///
/// Returns [`LinalgError`] if the eigendecomposition fails.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ntcca::pca::{pca, PcaOptions};
///
/// let c = array![[1.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 3.0]];
/// let opts = PcaOptions { max_comps: Some(2), ..PcaOptions::default() };
/// let (v, d) = pca(c.view(), &opts).unwrap();
/// assert_eq!(v.dim(), (3, 2));
/// assert_eq!(d.to_vec(), vec![5.0, 3.0]);
/// ```
pub fn pca(
    cov: ArrayView2<f64>,
    options: &PcaOptions,
) -> Result<(Array2<f64>, Array1<f64>), LinalgError> {
    let eig = eigen_symmetric(cov, options.jacobi.max_sweeps, options.jacobi.tol)?;
    let total = eig.eigenvalues.len();

    let mut n_keep = options.max_comps.map_or(total, |k| k.min(total));
    if let (Some(thresh), Some(&top)) = (options.thresh, eig.eigenvalues.get(0)) {
        let above = eig
            .eigenvalues
            .iter()
            .take_while(|&&d| top > 0.0 && d / top > thresh)
            .count();
        n_keep = n_keep.min(above);
    }
    trace!(total, n_keep, "pca truncation");

    let v = eig.eigenvectors.slice(s![.., ..n_keep]).to_owned();
    let d = eig.eigenvalues.slice(s![..n_keep]).to_owned();
    Ok((v, d))
}
