//! Canonical Correlation Analysis (CCA) from covariance.
//!
//! CCA finds paired linear projections of two multichannel signals X and Y
//! whose outputs are maximally correlated. Here it is derived entirely from
//! the joint covariance `C = [X, Y]ᵀ [X, Y]`, so large recordings can be
//! reduced chunk by chunk before the analysis runs.
//!
//! # Algorithm
//!
//! Given `C` of shape `(n, n)` and the channel split `m`:
//! 1. Whiten `Cxx = C[:m, :m]` and `Cyy = C[m:, m:]` with [`whiten_nt`],
//!    dropping directions below `thresh`
//! 2. Embed both transforms in a block-diagonal `W` and form `Wᵀ C W`
//! 3. PCA of the whitened joint covariance (eigenvectors ranked descending)
//! 4. `A = Cxw · V[:rx, :N] · √2`, `B = Cyw · V[rx:, :N] · √2`, `R = d[:N] - 1`
//!
//! The eigenvalues of the whitened joint covariance are `1 ± ρ`, so `R`
//! holds the canonical correlations in descending order. Each half of a
//! joint eigenvector has norm `1/√2`; the `√2` factor makes `(X·A)ᵀ(X·A)`
//! and `(Y·B)ᵀ(Y·B)` identity matrices.
//!
//! # Usage
//!
//! - [`cca_from_data`]: X and Y time series, optionally over a lag sweep
//! - [`cca_from_covariance`]: precomputed `C` (2D, or 3D with one page per lag)
//! - [`nt_cca`]: a single entry point taking either form through [`CcaRequest`]
//!
//! A positive lag means Y is delayed relative to X. Means are not removed.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ntcca::cca::{cca_from_covariance, CcaConfig};
//!
//! // X has 2 channels, Y has 1; Y is fully correlated with X's first channel
//! let c = array![
//!     [1.0, 0.0, 1.0],
//!     [0.0, 1.0, 0.0],
//!     [1.0, 0.0, 1.0],
//! ];
//! let out = cca_from_covariance(c.view().into_dyn(), 2, &CcaConfig::default()).unwrap();
//! let page = out.as_single().unwrap();
//! assert_eq!(page.a.dim(), (2, 1));
//! assert!((page.r[0] - 1.0).abs() < 1e-6);
//! ```
//!
//! # References
//!
//! - de Cheveigné et al. (2018): "Multiway canonical correlation analysis of brain data"
//! - Hotelling (1936): "Relations between two sets of variates"

use core::f64::consts::SQRT_2;

use ndarray::{
    s, Array1, Array2, Array3, ArrayD, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix2, Ix3,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::covariance::{check_shifts, cov_lags};
use crate::linalg::{block_diag, JacobiConfig, LinalgError};
use crate::pca::{pca, PcaOptions};
use crate::whiten::{whiten_nt_with, WhitenConfig, DEFAULT_THRESH};

/// Errors that can occur during CCA operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CcaError {
    /// Inconsistent or missing combination of arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Structurally invalid covariance or data
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// An underlying decomposition failed
    #[error("numerical failure: {0}")]
    NumericalFailure(#[from] LinalgError),
}

/// Numerical policy of the CCA engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CcaConfig {
    /// Whitening drops directions whose eigenvalue-to-maximum ratio is `<= thresh`
    pub thresh: f64,

    /// Iteration budget of every eigendecomposition in the pipeline
    pub jacobi: JacobiConfig,
}

impl Default for CcaConfig {
    fn default() -> Self {
        Self {
            thresh: DEFAULT_THRESH,
            jacobi: JacobiConfig::default(),
        }
    }
}

impl CcaConfig {
    fn whiten_config(&self) -> WhitenConfig {
        WhitenConfig {
            thresh: self.thresh,
            jacobi: self.jacobi,
            ..WhitenConfig::default()
        }
    }
}

/// Layout of a covariance argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovarianceShape {
    /// A single `(n, n)` block
    SinglePage,

    /// `(n, n, n_pages)`, one block per lag or trial
    Stack(usize),
}

impl CovarianceShape {
    /// Classify covariance dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CcaError::InvalidState`] if there are fewer than 2 or more
    /// than 3 dimensions, or if the pages are not square.
    pub fn from_dims(dims: &[usize]) -> Result<Self, CcaError> {
        if dims.len() < 2 {
            return Err(CcaError::InvalidState("covariance should be at least 2D"));
        }
        if dims[0] != dims[1] {
            return Err(CcaError::InvalidState("covariance matrix should be square"));
        }
        match dims.len() {
            2 => Ok(Self::SinglePage),
            3 => Ok(Self::Stack(dims[2])),
            _ => Err(CcaError::InvalidState("covariance should be 3D at most")),
        }
    }
}

/// Transform pair and correlation scores of a single covariance block.
#[derive(Debug, Clone, PartialEq)]
pub struct CcaPage {
    /// Maps X to canonical space, shape `(m, N)`
    pub a: Array2<f64>,

    /// Maps Y to canonical space, shape `(n - m, N)`
    pub b: Array2<f64>,

    /// Canonical correlations, descending, length `N`
    pub r: Array1<f64>,
}

impl CcaPage {
    /// Number of canonical component pairs.
    pub fn n_components(&self) -> usize {
        self.r.len()
    }
}

/// Per-page results of a covariance stack, zero-padded to a common size.
#[derive(Debug, Clone, PartialEq)]
pub struct CcaStack {
    /// Shape `(m, N_global, n_pages)`
    pub a: Array3<f64>,

    /// Shape `(n - m, N_global, n_pages)`
    pub b: Array3<f64>,

    /// Shape `(N_global, n_pages)`
    pub r: Array2<f64>,
}

/// Result of [`nt_cca`]: one page for a 2D covariance, a stack for a 3D one.
#[derive(Debug, Clone, PartialEq)]
pub enum CcaOutput {
    /// Result of a single covariance block
    Single(CcaPage),

    /// Results of a covariance stack, one slot per page
    Stacked(CcaStack),
}

impl CcaOutput {
    /// The single-page result, if this came from a 2D covariance.
    pub fn as_single(&self) -> Option<&CcaPage> {
        match self {
            Self::Single(page) => Some(page),
            Self::Stacked(_) => None,
        }
    }

    /// The stacked result, if this came from a 3D covariance.
    pub fn as_stacked(&self) -> Option<&CcaStack> {
        match self {
            Self::Single(_) => None,
            Self::Stacked(stack) => Some(stack),
        }
    }

    /// Leading dimension of `R` (number of component slots).
    pub fn n_components(&self) -> usize {
        match self {
            Self::Single(page) => page.r.len(),
            Self::Stacked(stack) => stack.r.nrows(),
        }
    }

    /// Consume into dynamically shaped `(A, B, R)`.
    pub fn into_dyn(self) -> (ArrayD<f64>, ArrayD<f64>, ArrayD<f64>) {
        match self {
            Self::Single(p) => (p.a.into_dyn(), p.b.into_dyn(), p.r.into_dyn()),
            Self::Stacked(s) => (s.a.into_dyn(), s.b.into_dyn(), s.r.into_dyn()),
        }
    }
}

/// Arguments of [`nt_cca`].
///
/// Either both `x` and `y` are given (optionally with `lags`), or the
/// covariance `c` together with the split `m`. Build with the `with_*`
/// methods:
///
/// ```
/// use ndarray::Array2;
/// use ntcca::cca::{nt_cca, CcaError, CcaRequest};
///
/// let x: Array2<f64> = Array2::zeros((10, 2));
/// let request = CcaRequest::new().with_x(x.view().into_dyn());
/// assert!(matches!(nt_cca(request), Err(CcaError::InvalidArgument(_))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CcaRequest<'a> {
    x: Option<ArrayViewD<'a, f64>>,
    y: Option<ArrayViewD<'a, f64>>,
    lags: Option<&'a [isize]>,
    c: Option<ArrayViewD<'a, f64>>,
    m: Option<usize>,
    thresh: Option<f64>,
}

impl<'a> CcaRequest<'a> {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// X data, `(n_times, mx)` or `(n_times, mx, n_trials)`.
    pub fn with_x(mut self, x: ArrayViewD<'a, f64>) -> Self {
        self.x = Some(x);
        self
    }

    /// Y data, `(n_times, my)` or `(n_times, my, n_trials)`.
    pub fn with_y(mut self, y: ArrayViewD<'a, f64>) -> Self {
        self.y = Some(y);
        self
    }

    /// Lags in samples; positive means Y delayed relative to X.
    pub fn with_lags(mut self, lags: &'a [isize]) -> Self {
        self.lags = Some(lags);
        self
    }

    /// Precomputed covariance of `[X, Y]`, 2D or 3D.
    pub fn with_covariance(mut self, c: ArrayViewD<'a, f64>) -> Self {
        self.c = Some(c);
        self
    }

    /// Number of X channels in the covariance.
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = Some(m);
        self
    }

    /// Eigenvalue-retention ratio (default [`DEFAULT_THRESH`]).
    pub fn with_thresh(mut self, thresh: f64) -> Self {
        self.thresh = Some(thresh);
        self
    }
}

/// Compute CCA from raw data or from a precomputed covariance.
///
/// With `x` and `y` the lagged covariance is computed first (single zero
/// lag if `lags` is absent). Without them, `c` and `m` are required.
///
/// # Errors
///
/// - [`CcaError::InvalidArgument`] if exactly one of `x`/`y` is given,
///   `lags` accompanies a covariance, or `m` does not split the channels
/// - [`CcaError::InvalidState`] if `c` or `m` is missing, `c` is not square,
///   or `c` has more than 3 dimensions
/// - [`CcaError::NumericalFailure`] if a decomposition fails
pub fn nt_cca(request: CcaRequest<'_>) -> Result<CcaOutput, CcaError> {
    let config = CcaConfig {
        thresh: request.thresh.unwrap_or(DEFAULT_THRESH),
        ..CcaConfig::default()
    };
    nt_cca_with(request, &config)
}

/// [`nt_cca`] with an explicit configuration. A `thresh` set on the request
/// takes precedence over `config.thresh`.
pub fn nt_cca_with(request: CcaRequest<'_>, config: &CcaConfig) -> Result<CcaOutput, CcaError> {
    let config = CcaConfig {
        thresh: request.thresh.unwrap_or(config.thresh),
        ..*config
    };

    match (request.x, request.y) {
        (Some(_), None) | (None, Some(_)) => Err(CcaError::InvalidArgument(
            "either both x and y should be defined, or c",
        )),
        (Some(x), Some(y)) => cca_from_data(x, y, request.lags, &config),
        (None, None) => {
            let c = request
                .c
                .ok_or(CcaError::InvalidState("covariance matrix should be defined"))?;
            let m = request.m.ok_or(CcaError::InvalidState("m should be defined"))?;
            let dims = c.shape();
            if dims.len() < 2 {
                return Err(CcaError::InvalidState("covariance should be at least 2D"));
            }
            if dims[0] != dims[1] {
                return Err(CcaError::InvalidState("covariance matrix should be square"));
            }
            if request.lags.is_some() {
                return Err(CcaError::InvalidArgument(
                    "only covariance should be defined at this point",
                ));
            }
            cca_from_covariance(c, m, &config)
        }
    }
}

/// CCA of two time series, optionally for each value of `lags`.
///
/// A single lag (or none, meaning lag 0) gives [`CcaOutput::Single`];
/// several lags give [`CcaOutput::Stacked`] with one page per lag. Trials
/// along the third axis are pooled into each page.
///
/// # Errors
///
/// See [`nt_cca`].
pub fn cca_from_data(
    x: ArrayViewD<f64>,
    y: ArrayViewD<f64>,
    lags: Option<&[isize]>,
    config: &CcaConfig,
) -> Result<CcaOutput, CcaError> {
    let shifts = check_shifts(lags);
    let lagged = cov_lags(x, y, &shifts)?;
    debug!(m = lagged.m, n_lags = shifts.len(), "cca from raw data");

    if shifts.len() == 1 {
        let page = lagged.cov.index_axis(Axis(2), 0);
        cca_page(page, lagged.m, config).map(CcaOutput::Single)
    } else {
        cca_stack(lagged.cov.view(), lagged.m, config).map(CcaOutput::Stacked)
    }
}

/// CCA of a precomputed covariance `C = [X, Y]ᵀ [X, Y]` with `m` X channels.
///
/// A 3D covariance is treated page by page.
///
/// # Errors
///
/// See [`nt_cca`].
pub fn cca_from_covariance(
    c: ArrayViewD<f64>,
    m: usize,
    config: &CcaConfig,
) -> Result<CcaOutput, CcaError> {
    let shape = CovarianceShape::from_dims(c.shape())?;
    check_split(c.shape()[0], m)?;

    match shape {
        CovarianceShape::SinglePage => {
            let c = c
                .into_dimensionality::<Ix2>()
                .map_err(|_| CcaError::InvalidState("covariance should be 2D"))?;
            cca_page(c, m, config).map(CcaOutput::Single)
        }
        CovarianceShape::Stack(_) => {
            let c = c
                .into_dimensionality::<Ix3>()
                .map_err(|_| CcaError::InvalidState("covariance should be 3D"))?;
            cca_stack(c, m, config).map(CcaOutput::Stacked)
        }
    }
}

/// CCA of a single `(n, n)` covariance block.
///
/// # Errors
///
/// Returns [`CcaError::NumericalFailure`] if a decomposition fails.
pub fn cca_page(c: ArrayView2<f64>, m: usize, config: &CcaConfig) -> Result<CcaPage, CcaError> {
    CovarianceShape::from_dims(c.shape())?;
    check_split(c.nrows(), m)?;
    let wcfg = config.whiten_config();

    // sphere X and Y separately
    let cxw = whiten_nt_with(c.slice(s![..m, ..m]), &wcfg)?;
    let cyw = whiten_nt_with(c.slice(s![m.., m..]), &wcfg)?;
    let rx = cxw.ncols();

    let w = block_diag(&[cxw.view(), cyw.view()]);
    let cw = w.t().dot(&c).dot(&w);

    let n_comp = rx.min(cyw.ncols());
    let opts = PcaOptions {
        jacobi: config.jacobi,
        ..PcaOptions::default()
    };
    let (v, d) = pca(cw.view(), &opts)?;
    trace!(rx, ry = cyw.ncols(), n_comp, "joint pca");

    let a = cxw.dot(&v.slice(s![..rx, ..n_comp])) * SQRT_2;
    let b = cyw.dot(&v.slice(s![rx.., ..n_comp])) * SQRT_2;
    let r = d.slice(s![..n_comp]).mapv(|e| e - 1.0);

    Ok(CcaPage { a, b, r })
}

/// CCA of each page of an `(n, n, n_pages)` covariance stack.
///
/// Every page is analysed independently and written into the top-left
/// corner of its slot. Pages whose whitening retains fewer than
/// `min(m, n - m)` directions leave trailing zeros.
///
/// # Errors
///
/// Returns the first page error encountered.
pub fn cca_stack(c: ArrayView3<f64>, m: usize, config: &CcaConfig) -> Result<CcaStack, CcaError> {
    CovarianceShape::from_dims(c.shape())?;
    let (n, _, n_pages) = c.dim();
    check_split(n, m)?;
    let n_global = m.min(n - m);
    debug!(n_chans = n, m, n_pages, n_global, "cca over covariance stack");

    let pages = run_pages(c, m, config)?;

    let mut a = Array3::zeros((m, n_global, n_pages));
    let mut b = Array3::zeros((n - m, n_global, n_pages));
    let mut r = Array2::zeros((n_global, n_pages));

    for (k, page) in pages.into_iter().enumerate() {
        let nk = page.n_components();
        a.slice_mut(s![.., ..nk, k]).assign(&page.a);
        b.slice_mut(s![.., ..nk, k]).assign(&page.b);
        r.slice_mut(s![..nk, k]).assign(&page.r);
    }

    Ok(CcaStack { a, b, r })
}

fn check_split(n: usize, m: usize) -> Result<(), CcaError> {
    if m == 0 || m >= n {
        return Err(CcaError::InvalidArgument("m should split the channels: 0 < m < n_chans"));
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn run_pages(c: ArrayView3<f64>, m: usize, config: &CcaConfig) -> Result<Vec<CcaPage>, CcaError> {
    c.axis_iter(Axis(2)).map(|page| cca_page(page, m, config)).collect()
}

#[cfg(feature = "parallel")]
fn run_pages(c: ArrayView3<f64>, m: usize, config: &CcaConfig) -> Result<Vec<CcaPage>, CcaError> {
    use rayon::prelude::*;

    (0..c.len_of(Axis(2)))
        .into_par_iter()
        .map(|k| cca_page(c.index_axis(Axis(2), k), m, config))
        .collect()
}
