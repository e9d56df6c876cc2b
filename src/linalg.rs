//! Dense linear algebra for covariance whitening and CCA.
//!
//! Provides the decompositions the whitening strategies and the joint PCA
//! stage are built on. Matrices are `ndarray` arrays of `f64` sized at run
//! time, since the retained rank of a whitening transform is only known
//! after thresholding.
//!
//! # Decompositions
//!
//! - [`eigen_symmetric`] - cyclic Jacobi eigendecomposition of a real
//!   symmetric matrix, eigenvalues sorted in descending order
//! - [`svd`] - one-sided (Hestenes) Jacobi thin SVD of a rectangular matrix
//! - [`block_diag`] - embed blocks along the diagonal of a zero matrix
//!
//! # Numerical Stability
//!
//! Jacobi methods are slower than tridiagonal QR but compute small
//! eigenvalues to high relative accuracy, which matters here: rank reduction
//! compares every eigenvalue against the largest one at ratios down to
//! `1e-12`. Non-finite input is rejected up front with
//! [`LinalgError::NonFinite`].
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ntcca::linalg::{eigen_symmetric, JacobiConfig};
//!
//! let a = array![[3.0, 1.0], [1.0, 3.0]];
//! let cfg = JacobiConfig::default();
//! let eig = eigen_symmetric(a.view(), cfg.max_sweeps, cfg.tol).unwrap();
//! assert!((eig.eigenvalues[0] - 4.0).abs() < 1e-12);
//! assert!((eig.eigenvalues[1] - 2.0).abs() < 1e-12);
//! ```

use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur during matrix decompositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// Jacobi iteration did not reach the tolerance within the sweep budget
    #[error("decomposition did not converge within the sweep budget")]
    ConvergenceFailed,

    /// Input or output contains NaN or infinity
    #[error("matrix contains non-finite values")]
    NonFinite,

    /// Matrix dimensions incompatible with the operation
    #[error("matrix dimensions are incompatible")]
    DimensionMismatch,
}

/// Iteration budget shared by the Jacobi decompositions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JacobiConfig {
    /// Maximum number of full sweeps over all off-diagonal pairs
    pub max_sweeps: usize,

    /// Relative convergence tolerance (off-diagonal norm over matrix norm)
    pub tol: f64,
}

impl Default for JacobiConfig {
    fn default() -> Self {
        Self {
            max_sweeps: 60, // cyclic Jacobi typically settles in 6-12 sweeps
            tol: 1e-14,     // a few ulps above f64 round-off
        }
    }
}

/// Result of a symmetric eigenvalue decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    /// Eigenvalues in descending order
    pub eigenvalues: Array1<f64>,

    /// Unit-norm eigenvectors as columns, in the order of `eigenvalues`
    pub eigenvectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Get the k-th eigenvector as an owned vector.
    pub fn eigenvector(&self, k: usize) -> Array1<f64> {
        self.eigenvectors.column(k).to_owned()
    }
}

/// Result of a thin singular value decomposition `X = U diag(S) Vᵀ`.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdDecomposition {
    /// Left singular vectors, shape `(n_rows, k)` with `k = min(n_rows, n_cols)`
    pub u: Array2<f64>,

    /// Singular values in descending order, length `k`
    pub singular_values: Array1<f64>,

    /// Right singular vectors transposed, shape `(k, n_cols)`
    pub vt: Array2<f64>,
}

fn ensure_finite(a: ArrayView2<f64>) -> Result<(), LinalgError> {
    if a.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LinalgError::NonFinite)
    }
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let v = a[[i, j]];
            sum += 2.0 * v * v;
        }
    }
    libm::sqrt(sum)
}

fn frobenius_norm(a: &Array2<f64>) -> f64 {
    libm::sqrt(a.iter().map(|v| v * v).sum::<f64>())
}

/// Compute Jacobi rotation parameters to annihilate A[i,j].
fn compute_jacobi_rotation(a_ii: f64, a_jj: f64, a_ij: f64) -> (f64, f64) {
    if a_ii == a_jj {
        let c = core::f64::consts::FRAC_1_SQRT_2;
        return (c, c);
    }

    let tau = (a_jj - a_ii) / (2.0 * a_ij);
    let t = if tau >= 0.0 {
        1.0 / (tau + libm::sqrt(1.0 + tau * tau))
    } else {
        -1.0 / (-tau + libm::sqrt(1.0 + tau * tau))
    };

    let cos_theta = 1.0 / libm::sqrt(1.0 + t * t);
    (cos_theta, t * cos_theta)
}

/// Apply the rotation `A' = Rᵀ A R` in the (i, j) plane, keeping A symmetric.
fn apply_jacobi_rotation(a: &mut Array2<f64>, i: usize, j: usize, cos_theta: f64, sin_theta: f64) {
    let n = a.nrows();
    let a_ii = a[[i, i]];
    let a_jj = a[[j, j]];
    let a_ij = a[[i, j]];

    let cc = cos_theta * cos_theta;
    let ss = sin_theta * sin_theta;
    let cs = cos_theta * sin_theta;

    a[[i, i]] = cc * a_ii - 2.0 * cs * a_ij + ss * a_jj;
    a[[j, j]] = ss * a_ii + 2.0 * cs * a_ij + cc * a_jj;
    a[[i, j]] = 0.0;
    a[[j, i]] = 0.0;

    for k in 0..n {
        if k != i && k != j {
            let a_ki = a[[k, i]];
            let a_kj = a[[k, j]];

            let new_a_ki = cos_theta * a_ki - sin_theta * a_kj;
            let new_a_kj = sin_theta * a_ki + cos_theta * a_kj;

            a[[k, i]] = new_a_ki;
            a[[i, k]] = new_a_ki;
            a[[k, j]] = new_a_kj;
            a[[j, k]] = new_a_kj;
        }
    }
}

/// Apply the same rotation to the columns of an accumulator matrix.
fn rotate_columns(v: &mut Array2<f64>, i: usize, j: usize, cos_theta: f64, sin_theta: f64) {
    for k in 0..v.nrows() {
        let v_ki = v[[k, i]];
        let v_kj = v[[k, j]];

        v[[k, i]] = cos_theta * v_ki - sin_theta * v_kj;
        v[[k, j]] = sin_theta * v_ki + cos_theta * v_kj;
    }
}

/// Indices that sort `values` in descending order. Ties keep their input order.
fn descending_order(values: &Array1<f64>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    idx
}

/// Eigenvalue decomposition of a real symmetric matrix by cyclic Jacobi sweeps.
///
/// Only the lower triangle of `a` is read; it is mirrored before iterating so
/// slightly asymmetric products such as `Wᵀ C W` decompose cleanly.
///
/// # Arguments
///
/// * `a` - Square symmetric matrix
/// * `max_sweeps` - Maximum number of sweeps over all off-diagonal pairs
/// * `tol` - Stop once the off-diagonal norm is below `tol` times the matrix norm
///
/// # Returns
///
/// Eigenvalues in descending order with corresponding unit-norm eigenvectors.
///
/// # Errors
///
/// - [`LinalgError::DimensionMismatch`] if `a` is not square
/// - [`LinalgError::NonFinite`] if `a` contains NaN or infinity
/// - [`LinalgError::ConvergenceFailed`] if the tolerance is not reached
///
/// # Performance
///
/// O(n³) per sweep.
pub fn eigen_symmetric(
    a: ArrayView2<f64>,
    max_sweeps: usize,
    tol: f64,
) -> Result<EigenDecomposition, LinalgError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LinalgError::DimensionMismatch);
    }
    ensure_finite(a)?;

    let mut m = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            m[[i, j]] = a[[i, j]];
            m[[j, i]] = a[[i, j]];
        }
    }
    let mut v = Array2::eye(n);

    let scale = frobenius_norm(&m);
    let mut converged = false;

    for sweep in 0..max_sweeps {
        let off = off_diagonal_norm(&m);
        if off <= tol * scale {
            trace!(sweep, off, "jacobi eigendecomposition converged");
            converged = true;
            break;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let a_ij = m[[i, j]];
                if a_ij == 0.0 {
                    continue;
                }

                // Past the first sweeps, drop elements that no longer move the diagonal.
                let g = 100.0 * a_ij.abs();
                let a_ii = m[[i, i]];
                let a_jj = m[[j, j]];
                if sweep > 3 && a_ii.abs() + g == a_ii.abs() && a_jj.abs() + g == a_jj.abs() {
                    m[[i, j]] = 0.0;
                    m[[j, i]] = 0.0;
                    continue;
                }

                let (c, s) = compute_jacobi_rotation(a_ii, a_jj, a_ij);
                apply_jacobi_rotation(&mut m, i, j, c, s);
                rotate_columns(&mut v, i, j, c, s);
            }
        }
    }

    if !converged && off_diagonal_norm(&m) > tol * scale {
        return Err(LinalgError::ConvergenceFailed);
    }

    let diag = m.diag().to_owned();
    let order = descending_order(&diag);
    let eigenvalues = Array1::from_iter(order.iter().map(|&k| diag[k]));
    let eigenvectors = v.select(Axis(1), &order);

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// Thin singular value decomposition by one-sided Jacobi rotations.
///
/// Columns of a working copy of `x` are orthogonalised pairwise; their norms
/// become the singular values. Left singular vectors of null directions are
/// an orthonormal completion, so `U` always has orthonormal columns.
///
/// # Errors
///
/// - [`LinalgError::NonFinite`] if `x` contains NaN or infinity
/// - [`LinalgError::ConvergenceFailed`] if the columns do not orthogonalise
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ntcca::linalg::{svd, JacobiConfig};
///
/// let x = array![[3.0, 0.0], [0.0, -2.0], [0.0, 0.0]];
/// let cfg = JacobiConfig::default();
/// let dec = svd(x.view(), cfg.max_sweeps, cfg.tol).unwrap();
/// assert!((dec.singular_values[0] - 3.0).abs() < 1e-12);
/// assert!((dec.singular_values[1] - 2.0).abs() < 1e-12);
/// ```
pub fn svd(
    x: ArrayView2<f64>,
    max_sweeps: usize,
    tol: f64,
) -> Result<SvdDecomposition, LinalgError> {
    ensure_finite(x)?;

    if x.nrows() < x.ncols() {
        // X = U S Vᵀ  <=>  Xᵀ = V S Uᵀ
        let t = svd(x.t(), max_sweeps, tol)?;
        return Ok(SvdDecomposition {
            u: t.vt.t().to_owned(),
            singular_values: t.singular_values,
            vt: t.u.t().to_owned(),
        });
    }

    let p = x.ncols();
    let mut w = x.to_owned();
    let mut v: Array2<f64> = Array2::eye(p);
    let mut converged = p < 2;

    for sweep in 0..max_sweeps {
        let mut rotated = false;

        for i in 0..p {
            for j in (i + 1)..p {
                let (alpha, beta, gamma) = {
                    let ci = w.column(i);
                    let cj = w.column(j);
                    (ci.dot(&ci), cj.dot(&cj), ci.dot(&cj))
                };
                if alpha == 0.0 || beta == 0.0 || gamma.abs() <= tol * libm::sqrt(alpha * beta) {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + libm::sqrt(1.0 + zeta * zeta));
                let c = 1.0 / libm::sqrt(1.0 + t * t);
                let s = c * t;

                rotate_columns(&mut w, i, j, c, s);
                rotate_columns(&mut v, i, j, c, s);
            }
        }

        if !rotated {
            trace!(sweep, "jacobi svd converged");
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(LinalgError::ConvergenceFailed);
    }

    let norms = Array1::from_iter(w.columns().into_iter().map(|c| libm::sqrt(c.dot(&c))));
    let order = descending_order(&norms);
    let largest = order.first().map(|&k| norms[k]).unwrap_or(0.0);
    let cutoff = largest * f64::EPSILON * p as f64;

    let mut u = Array2::zeros((x.nrows(), p));
    let mut singular_values = Array1::zeros(p);
    let mut vt = Array2::zeros((p, p));
    for (dst, &src) in order.iter().enumerate() {
        let sigma = norms[src];
        singular_values[dst] = sigma;
        if sigma > cutoff && sigma > 0.0 {
            u.column_mut(dst).assign(&(&w.column(src) / sigma));
        }
        vt.row_mut(dst).assign(&v.column(src));
    }

    complete_orthonormal(&mut u, &singular_values, cutoff);

    ensure_finite(u.view())?;
    Ok(SvdDecomposition {
        u,
        singular_values,
        vt,
    })
}

/// Fill the left singular vectors of null directions with an orthonormal completion.
///
/// Null columns sit at the end because singular values are sorted. Each one is
/// built from the unit vector with the largest residual against the columns
/// already set, orthogonalised twice.
fn complete_orthonormal(u: &mut Array2<f64>, singular_values: &Array1<f64>, cutoff: f64) {
    let n = u.nrows();
    for dst in 0..u.ncols() {
        let sigma = singular_values[dst];
        if sigma > cutoff && sigma > 0.0 {
            continue;
        }

        let mut best: Option<(f64, Array1<f64>)> = None;
        for k in 0..n {
            let mut cand = Array1::zeros(n);
            cand[k] = 1.0;
            for _ in 0..2 {
                for prev in 0..dst {
                    let col = u.column(prev);
                    let proj = col.dot(&cand);
                    cand.scaled_add(-proj, &col);
                }
            }
            let norm = libm::sqrt(cand.dot(&cand));
            if best.as_ref().map_or(true, |(b, _)| norm > *b) {
                best = Some((norm, cand));
            }
        }

        if let Some((norm, cand)) = best {
            if norm > 0.0 {
                u.column_mut(dst).assign(&(cand / norm));
            }
        }
    }
}

/// Embed matrices along the diagonal of a zero matrix.
///
/// The result has as many rows as all blocks together and as many columns
/// as all blocks together; off-diagonal blocks are exactly zero.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ntcca::linalg::block_diag;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
/// let b = array![[7.0]];
/// let w = block_diag(&[a.view(), b.view()]);
/// assert_eq!(w.dim(), (4, 3));
/// assert_eq!(w[[3, 2]], 7.0);
/// assert_eq!(w[[0, 2]], 0.0);
/// ```
pub fn block_diag(blocks: &[ArrayView2<f64>]) -> Array2<f64> {
    let rows: usize = blocks.iter().map(|b| b.nrows()).sum();
    let cols: usize = blocks.iter().map(|b| b.ncols()).sum();

    let mut out = Array2::zeros((rows, cols));
    let (mut r, mut c) = (0, 0);
    for block in blocks {
        let (br, bc) = block.dim();
        out.slice_mut(s![r..r + br, c..c + bc]).assign(block);
        r += br;
        c += bc;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn default_eigen(a: ArrayView2<f64>) -> EigenDecomposition {
        let cfg = JacobiConfig::default();
        eigen_symmetric(a, cfg.max_sweeps, cfg.tol).unwrap()
    }

    fn default_svd(x: ArrayView2<f64>) -> SvdDecomposition {
        let cfg = JacobiConfig::default();
        svd(x, cfg.max_sweeps, cfg.tol).unwrap()
    }

    #[test]
    fn test_eigen_identity() {
        let eye: Array2<f64> = Array2::eye(3);
        let eigen = default_eigen(eye.view());

        for i in 0..3 {
            assert_abs_diff_eq!(eigen.eigenvalues[i], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eigen_sorting() {
        let a = Array2::from_diag(&array![1.0, 4.0, 2.0, 3.0]);
        let eigen = default_eigen(a.view());

        let expected = [4.0, 3.0, 2.0, 1.0];
        for (got, want) in eigen.eigenvalues.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
        // Column 0 must be the axis of the largest entry
        assert_abs_diff_eq!(eigen.eigenvectors[[1, 0]].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eigen_symmetric_2x2() {
        // Eigenvalues 4 and 2, eigenvectors [1, 1]/√2 and [1, -1]/√2
        let a = array![[3.0, 1.0], [1.0, 3.0]];
        let eigen = default_eigen(a.view());

        assert_abs_diff_eq!(eigen.eigenvalues[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eigen.eigenvalues[1], 2.0, epsilon = 1e-12);

        let v0 = eigen.eigenvector(0);
        let av0 = a.dot(&v0);
        for k in 0..2 {
            assert_abs_diff_eq!(av0[k], 4.0 * v0[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eigen_reconstruction() {
        let a = array![
            [4.0, 1.0, 0.5, 0.0],
            [1.0, 3.0, 0.2, 0.1],
            [0.5, 0.2, 2.0, 0.7],
            [0.0, 0.1, 0.7, 1.0]
        ];
        let eigen = default_eigen(a.view());

        let d = Array2::from_diag(&eigen.eigenvalues);
        let rebuilt = eigen.eigenvectors.dot(&d).dot(&eigen.eigenvectors.t());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }

        let gram = eigen.eigenvectors.t().dot(&eigen.eigenvectors);
        for i in 0..4 {
            for j in 0..4 {
                let want = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[[i, j]], want, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_eigen_reads_lower_triangle() {
        let a = array![[2.0, 100.0], [1.0, 2.0]];
        let eigen = default_eigen(a.view());
        assert_abs_diff_eq!(eigen.eigenvalues[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eigen.eigenvalues[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eigen_rank_deficient() {
        // u uᵀ with u = [1, 2, 2]: one eigenvalue 9, two zeros
        let u = array![1.0, 2.0, 2.0];
        let a = Array2::from_shape_fn((3, 3), |(i, j)| u[i] * u[j]);
        let eigen = default_eigen(a.view());

        assert_abs_diff_eq!(eigen.eigenvalues[0], 9.0, epsilon = 1e-12);
        assert!(eigen.eigenvalues[1].abs() < 1e-12);
        assert!(eigen.eigenvalues[2].abs() < 1e-12);
    }

    #[test]
    fn test_eigen_empty_and_zero() {
        let empty: Array2<f64> = Array2::zeros((0, 0));
        let eigen = default_eigen(empty.view());
        assert_eq!(eigen.eigenvalues.len(), 0);

        let zero: Array2<f64> = Array2::zeros((3, 3));
        let eigen = default_eigen(zero.view());
        assert!(eigen.eigenvalues.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_eigen_non_finite() {
        let a = array![[1.0, f64::NAN], [f64::NAN, 1.0]];
        let cfg = JacobiConfig::default();
        let result = eigen_symmetric(a.view(), cfg.max_sweeps, cfg.tol);
        assert_eq!(result, Err(LinalgError::NonFinite));
    }

    #[test]
    fn test_eigen_not_square() {
        let a: Array2<f64> = Array2::zeros((2, 3));
        let result = eigen_symmetric(a.view(), 10, 1e-12);
        assert_eq!(result, Err(LinalgError::DimensionMismatch));
    }

    #[test]
    fn test_eigen_zero_sweeps_fails_on_dense_matrix() {
        let a = array![[3.0, 1.0], [1.0, 3.0]];
        let result = eigen_symmetric(a.view(), 0, 1e-14);
        assert_eq!(result, Err(LinalgError::ConvergenceFailed));
    }

    #[test]
    fn test_svd_reconstruction_tall() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.5]];
        let dec = default_svd(x.view());

        assert_eq!(dec.u.dim(), (4, 2));
        assert_eq!(dec.vt.dim(), (2, 2));
        assert!(dec.singular_values[0] >= dec.singular_values[1]);

        let rebuilt = dec.u.dot(&Array2::from_diag(&dec.singular_values)).dot(&dec.vt);
        for (a, b) in rebuilt.iter().zip(x.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }

        let utu = dec.u.t().dot(&dec.u);
        assert_abs_diff_eq!(utu[[0, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(utu[[0, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_svd_reconstruction_wide() {
        let x = array![[1.0, 0.0, 2.0], [0.5, 1.5, -1.0]];
        let dec = default_svd(x.view());

        assert_eq!(dec.u.dim(), (2, 2));
        assert_eq!(dec.vt.dim(), (2, 3));

        let rebuilt = dec.u.dot(&Array2::from_diag(&dec.singular_values)).dot(&dec.vt);
        for (a, b) in rebuilt.iter().zip(x.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_svd_rank_deficient() {
        // Second column is twice the first
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let dec = default_svd(x.view());

        assert!(dec.singular_values[1] < 1e-12);
        let utu = dec.u.t().dot(&dec.u);
        assert_abs_diff_eq!(utu[[1, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(utu[[0, 1]], 0.0, epsilon = 1e-12);
        let rebuilt = dec.u.dot(&Array2::from_diag(&dec.singular_values)).dot(&dec.vt);
        for (a, b) in rebuilt.iter().zip(x.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_block_diag_layout() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[5.0], [6.0], [7.0]];
        let w = block_diag(&[a.view(), b.view()]);

        assert_eq!(w.dim(), (5, 3));
        assert_eq!(w[[1, 1]], 4.0);
        assert_eq!(w[[4, 2]], 7.0);
        assert_eq!(w[[0, 2]], 0.0);
        assert_eq!(w[[3, 0]], 0.0);
    }

    #[test]
    fn test_block_diag_empty_block() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let empty: Array2<f64> = Array2::zeros((2, 0));
        let w = block_diag(&[a.view(), empty.view()]);
        assert_eq!(w.dim(), (4, 2));
        assert!(w.slice(s![2.., ..]).iter().all(|&v| v == 0.0));
    }
}
