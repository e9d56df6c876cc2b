//! Whitening transforms for covariance matrices and data.
//!
//! A whitening transform `W` maps data `X` to `X · W` with identity
//! covariance. The strategies here differ in what they take, what they
//! return and how they treat weak directions:
//!
//! | Function | Input | Output | Weak directions |
//! |----------|-------|--------|-----------------|
//! | [`whiten`] | covariance `C` | `V D Vᵀ`, `(n, n)` | damped by `fudge` |
//! | [`whiten_nt`] | covariance `C` | `V D`, `(n, rank)` | dropped below `thresh` |
//! | [`whiten_svd`] | data `X` | whitened data `U Vᵀ` | discarded with `S` |
//! | [`whiten_zca`] | covariance `C` | `U D Uᵀ`, `(n, n)` | damped by `epsilon` |
//!
//! [`whiten_nt`] is the rank-reducing variant used by CCA: the number of
//! columns it keeps decides how many canonical pairs exist.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ntcca::whiten::whiten_nt;
//!
//! let c = array![[4.0, 0.0], [0.0, 1.0]];
//! let w = whiten_nt(c.view(), 1e-12).unwrap();
//! let white = w.t().dot(&c).dot(&w);
//! assert!((white[[0, 0]] - 1.0).abs() < 1e-9);
//! assert!((white[[1, 1]] - 1.0).abs() < 1e-9);
//! ```

use ndarray::{Array2, ArrayView2};
use tracing::trace;

use crate::linalg::{eigen_symmetric, svd, JacobiConfig, LinalgError};

/// Default eigenvalue-retention ratio for rank-reducing whitening and CCA.
pub const DEFAULT_THRESH: f64 = 1e-12;

/// Default additive guard against division by a zero eigenvalue.
pub const DEFAULT_FUDGE: f64 = 1e-18;

/// Numerical policy of the whitening strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhitenConfig {
    /// Added to every eigenvalue before inversion in [`whiten`]
    pub fudge: f64,

    /// Eigenvalue-to-maximum ratio at or below which [`whiten_nt`] drops a direction
    pub thresh: f64,

    /// Added to every singular value before inversion in [`whiten_zca`]
    pub zca_epsilon: f64,

    /// Iteration budget of the underlying decompositions
    pub jacobi: JacobiConfig,
}

impl Default for WhitenConfig {
    fn default() -> Self {
        Self {
            fudge: DEFAULT_FUDGE,
            thresh: DEFAULT_THRESH,
            zca_epsilon: DEFAULT_FUDGE,
            jacobi: JacobiConfig::default(),
        }
    }
}

/// Whitening matrix `V · diag(1/sqrt(λ + fudge)) · Vᵀ` of a symmetric covariance.
///
/// No rank reduction: the output has the same size as `c`. For `X` of shape
/// `(observations, channels)` the whitened data is `X · W`.
///
/// Eigenvalues are clamped at zero before `fudge` is added, so a
/// rank-deficient covariance is whitened without error whenever `fudge > 0`.
///
/// # Errors
///
/// Returns [`LinalgError`] if the eigendecomposition fails.
pub fn whiten(c: ArrayView2<f64>, fudge: f64) -> Result<Array2<f64>, LinalgError> {
    whiten_with(c, &WhitenConfig { fudge, ..WhitenConfig::default() })
}

/// [`whiten`] with an explicit configuration.
pub fn whiten_with(c: ArrayView2<f64>, config: &WhitenConfig) -> Result<Array2<f64>, LinalgError> {
    let eig = eigen_symmetric(c, config.jacobi.max_sweeps, config.jacobi.tol)?;

    // Null directions of a PSD matrix may come back slightly negative.
    let scale = eig
        .eigenvalues
        .mapv(|d| 1.0 / libm::sqrt(d.max(0.0) + config.fudge));
    let vd = &eig.eigenvectors * &scale;
    let w = vd.dot(&eig.eigenvectors.t());

    ensure_finite(&w)?;
    Ok(w)
}

/// Rank-reducing whitening transform `V · diag(sqrt(1/d))`.
///
/// Eigen-directions whose eigenvalue-to-maximum ratio is `<= thresh` are
/// dropped, so the result has shape `(n, n_retained)`. Retained eigenvalues
/// are raised to `1 - thresh` before inversion; when X and Y are perfectly
/// correlated this keeps the columns of `X·A` and `Y·B` orthogonal.
///
/// A covariance with no positive eigenvalue retains nothing and yields an
/// `(n, 0)` transform.
///
/// # Errors
///
/// Returns [`LinalgError`] if the eigendecomposition fails.
pub fn whiten_nt(c: ArrayView2<f64>, thresh: f64) -> Result<Array2<f64>, LinalgError> {
    whiten_nt_with(c, &WhitenConfig { thresh, ..WhitenConfig::default() })
}

/// [`whiten_nt`] with an explicit configuration.
pub fn whiten_nt_with(
    c: ArrayView2<f64>,
    config: &WhitenConfig,
) -> Result<Array2<f64>, LinalgError> {
    let n = c.nrows();
    let eig = eigen_symmetric(c, config.jacobi.max_sweeps, config.jacobi.tol)?;

    let max = match eig.eigenvalues.get(0) {
        Some(&d) if d > 0.0 => d,
        _ => return Ok(Array2::zeros((n, 0))),
    };

    // Eigenvalues are sorted, so the retained directions are a prefix.
    let keep = eig
        .eigenvalues
        .iter()
        .take_while(|&&d| d / max > config.thresh)
        .count();
    trace!(n, keep, max, "rank-reducing whitening");

    let mut w = Array2::zeros((n, keep));
    for k in 0..keep {
        let d = libm::pow(eig.eigenvalues[k], 1.0 - config.thresh);
        let gain = libm::sqrt(1.0 / d);
        w.column_mut(k).assign(&(&eig.eigenvectors.column(k) * gain));
    }

    ensure_finite(&w)?;
    Ok(w)
}

/// SVD whitening of a data matrix: returns `U · Vᵀ` from `X = U S Vᵀ`.
///
/// The rows of `U` and `Vᵀ` are orthonormal, so the product is white. Unlike
/// the other strategies this returns the whitened data itself, not a
/// transform.
///
/// # Errors
///
/// Returns [`LinalgError`] if the decomposition fails.
pub fn whiten_svd(x: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    whiten_svd_with(x, &WhitenConfig::default())
}

/// [`whiten_svd`] with an explicit configuration.
pub fn whiten_svd_with(
    x: ArrayView2<f64>,
    config: &WhitenConfig,
) -> Result<Array2<f64>, LinalgError> {
    let dec = svd(x, config.jacobi.max_sweeps, config.jacobi.tol)?;
    Ok(dec.u.dot(&dec.vt))
}

/// ZCA (Mahalanobis) whitening matrix `U · diag(1/sqrt(S + epsilon)) · Uᵀ`.
///
/// The transform stays in the original channel basis: whitened channels
/// remain as close as possible to the input channels.
///
/// # Errors
///
/// Returns [`LinalgError`] if the decomposition fails.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ntcca::whiten::whiten_zca;
///
/// let c = array![[2.0, 1.0], [1.0, 2.0]];
/// let zca = whiten_zca(c.view(), 1e-18).unwrap();
/// // Symmetric, and whitens C
/// assert!((zca[[0, 1]] - zca[[1, 0]]).abs() < 1e-12);
/// let white = zca.dot(&c).dot(&zca);
/// assert!((white[[0, 0]] - 1.0).abs() < 1e-9);
/// assert!(white[[0, 1]].abs() < 1e-9);
/// ```
pub fn whiten_zca(c: ArrayView2<f64>, epsilon: f64) -> Result<Array2<f64>, LinalgError> {
    whiten_zca_with(c, &WhitenConfig { zca_epsilon: epsilon, ..WhitenConfig::default() })
}

/// [`whiten_zca`] with an explicit configuration.
pub fn whiten_zca_with(
    c: ArrayView2<f64>,
    config: &WhitenConfig,
) -> Result<Array2<f64>, LinalgError> {
    let dec = svd(c, config.jacobi.max_sweeps, config.jacobi.tol)?;

    let scale = dec
        .singular_values
        .mapv(|s| 1.0 / libm::sqrt(s + config.zca_epsilon));
    let ud = &dec.u * &scale;
    let zca = ud.dot(&dec.u.t());

    ensure_finite(&zca)?;
    Ok(zca)
}

fn ensure_finite(w: &Array2<f64>) -> Result<(), LinalgError> {
    if w.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LinalgError::NonFinite)
    }
}
