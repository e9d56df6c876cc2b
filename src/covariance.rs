//! Lagged cross-products of two multichannel signals.
//!
//! [`cov_lags`] builds the covariance stack CCA consumes when it starts from
//! raw data: one `[X, Y]ᵀ [X, Y]` page per lag, summed over trials.
//!
//! # Lag Convention
//!
//! A positive lag means Y is delayed relative to X: at lag `L` sample
//! `x[t]` is paired with `y[t + L]`. Only overlapping samples contribute, so
//! larger lags accumulate fewer samples (see [`LaggedCovariance::total_weight`]).
//!
//! Means are not removed.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ntcca::covariance::cov_lags;
//!
//! let x = array![[1.0], [2.0], [3.0], [4.0]];
//! let y = array![[0.0], [1.0], [2.0], [3.0]]; // y[t + 1] == x[t]
//! let lagged = cov_lags(x.view().into_dyn(), y.view().into_dyn(), &[0, 1]).unwrap();
//! assert_eq!(lagged.cov.dim(), (2, 2, 2));
//! assert_eq!(lagged.m, 1);
//! // At lag 1 the cross term equals the X energy over the overlap
//! assert_eq!(lagged.cov[[0, 1, 1]], lagged.cov[[0, 0, 1]]);
//! ```

use ndarray::{concatenate, s, Array3, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};
use tracing::debug;

use crate::cca::CcaError;

/// Covariance stack returned by [`cov_lags`].
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedCovariance {
    /// Cross-products, shape `(mx + my, mx + my, n_lags)`
    pub cov: Array3<f64>,

    /// Number of samples accumulated into each page
    pub total_weight: Vec<usize>,

    /// Number of X channels (split point between the X and Y partitions)
    pub m: usize,
}

/// Sanitise a lag list: `None` or an empty list becomes the single zero lag.
pub fn check_shifts(lags: Option<&[isize]>) -> Vec<isize> {
    match lags {
        Some(l) if !l.is_empty() => l.to_vec(),
        _ => vec![0],
    }
}

/// View 2D `(n_times, n_chans)` or 3D `(n_times, n_chans, n_trials)` data as 3D.
pub(crate) fn as_trials<'a>(
    data: ArrayViewD<'a, f64>,
    name: &'static str,
) -> Result<ArrayView3<'a, f64>, CcaError> {
    match data.ndim() {
        2 => data
            .into_dimensionality::<Ix2>()
            .map(|d| d.insert_axis(Axis(2)))
            .map_err(|_| CcaError::InvalidState(name)),
        3 => data
            .into_dimensionality::<Ix3>()
            .map_err(|_| CcaError::InvalidState(name)),
        _ => Err(CcaError::InvalidState(name)),
    }
}

/// Cross-products of `[X, Y]` for every lag, summed over trials.
///
/// # Arguments
///
/// * `x` - Data of shape `(n_times, mx)` or `(n_times, mx, n_trials)`
/// * `y` - Data of shape `(n_times, my)` or `(n_times, my, n_trials)`
/// * `lags` - Lags in samples; positive means Y delayed relative to X
///
/// # Errors
///
/// - [`CcaError::InvalidState`] if either input is not 2D or 3D
/// - [`CcaError::InvalidArgument`] if `n_times` or `n_trials` differ, the
///   lag list is empty, or a lag leaves no overlapping samples
pub fn cov_lags(
    x: ArrayViewD<f64>,
    y: ArrayViewD<f64>,
    lags: &[isize],
) -> Result<LaggedCovariance, CcaError> {
    let x = as_trials(x, "x should be 2D (times, channels) or 3D (times, channels, trials)")?;
    let y = as_trials(y, "y should be 2D (times, channels) or 3D (times, channels, trials)")?;

    let (n_times, mx, n_trials) = x.dim();
    let (y_times, my, y_trials) = y.dim();
    if n_times != y_times {
        return Err(CcaError::InvalidArgument("x and y should have the same number of samples"));
    }
    if n_trials != y_trials {
        return Err(CcaError::InvalidArgument("x and y should have the same number of trials"));
    }
    if lags.is_empty() {
        return Err(CcaError::InvalidArgument("at least one lag is required"));
    }
    if lags.iter().any(|&l| l.unsigned_abs() >= n_times) {
        return Err(CcaError::InvalidArgument("lags should be smaller than the number of samples"));
    }

    let n = mx + my;
    let mut cov = Array3::zeros((n, n, lags.len()));
    let mut total_weight = vec![0usize; lags.len()];

    for trial in 0..n_trials {
        let xt = x.index_axis(Axis(2), trial);
        let yt = y.index_axis(Axis(2), trial);

        for (k, &lag) in lags.iter().enumerate() {
            let shift = lag.unsigned_abs();
            let overlap = n_times - shift;
            let (xs, ys) = if lag >= 0 {
                (xt.slice(s![..overlap, ..]), yt.slice(s![shift.., ..]))
            } else {
                (xt.slice(s![shift.., ..]), yt.slice(s![..overlap, ..]))
            };

            let xy = concatenate(Axis(1), &[xs, ys])
                .map_err(|_| CcaError::InvalidState("x and y overlap mismatch"))?;
            let mut page = cov.index_axis_mut(Axis(2), k);
            page += &xy.t().dot(&xy);
            total_weight[k] += overlap;
        }
    }

    debug!(n_chans = n, m = mx, n_lags = lags.len(), n_trials, "lagged covariance accumulated");
    Ok(LaggedCovariance { cov, total_weight, m: mx })
}
