//! Canonical correlation analysis of multichannel time series.
//!
//! The pipeline works from the joint covariance of two signal blocks:
//! whiten each block, embed both transforms block-diagonally, and run a PCA
//! on the whitened joint covariance. Starting from raw data, [`covariance`]
//! accumulates one covariance page per lag first.
//!
//! ```
//! use ndarray::Array2;
//! use ntcca::{nt_cca, CcaRequest};
//!
//! let x = Array2::from_shape_fn((100, 2), |(t, c)| ((t * (c + 1)) as f64 * 0.1).sin());
//! let y = Array2::from_shape_fn((100, 2), |(t, c)| ((t + c) as f64 * 0.1).sin());
//! let out = nt_cca(
//!     CcaRequest::new()
//!         .with_x(x.view().into_dyn())
//!         .with_y(y.view().into_dyn()),
//! )
//! .unwrap();
//! assert!(out.n_components() <= 2);
//! ```

pub mod cca;
pub mod covariance;
pub mod linalg;
pub mod pca;
pub mod whiten;

pub use cca::{
    cca_from_covariance, cca_from_data, cca_page, cca_stack, nt_cca, nt_cca_with, CcaConfig,
    CcaError, CcaOutput, CcaPage, CcaRequest, CcaStack, CovarianceShape,
};
pub use covariance::{check_shifts, cov_lags, LaggedCovariance};
pub use linalg::{
    block_diag, eigen_symmetric, svd, EigenDecomposition, JacobiConfig, LinalgError,
    SvdDecomposition,
};
pub use pca::{pca, PcaOptions};
pub use whiten::{
    whiten, whiten_nt, whiten_nt_with, whiten_svd, whiten_svd_with, whiten_with, whiten_zca,
    whiten_zca_with, WhitenConfig, DEFAULT_FUDGE, DEFAULT_THRESH,
};
