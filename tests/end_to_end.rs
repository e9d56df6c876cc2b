use approx::assert_abs_diff_eq;
use ndarray::{concatenate, s, Array2, Array3, Axis};
use ntcca::{cca_from_covariance, cov_lags, nt_cca, CcaConfig, CcaRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn gaussian(rng: &mut StdRng, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, cols), || StandardNormal.sample(&mut *rng))
}

#[test]
fn recovers_planted_correlation_structure() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    let x = gaussian(&mut rng, 1000, 4);
    let noise = gaussian(&mut rng, 1000, 3);

    // Y = X·M + noise with a sparse M: a dense full-rank M would put every
    // correlation near 1, so each Y channel gets a distinct strength instead.
    // y0 tracks x0 closely, y1 is x1 buried in equal-power noise, y2 is unrelated
    let mut y = Array2::zeros((1000, 3));
    y.column_mut(0).assign(&(&x.column(0) + &(&noise.column(0) * 0.01)));
    y.column_mut(1).assign(&(&x.column(1) + &noise.column(1)));
    y.column_mut(2).assign(&noise.column(2));

    let out = nt_cca(
        CcaRequest::new()
            .with_x(x.view().into_dyn())
            .with_y(y.view().into_dyn()),
    )
    .unwrap();
    let page = out.as_single().unwrap();

    assert_eq!(page.a.dim(), (4, 3));
    assert_eq!(page.b.dim(), (3, 3));
    assert!(page.r[0] > 0.999, "leading correlation {}", page.r[0]);
    assert!(page.r[1] > 0.6 && page.r[1] < 0.8, "second correlation {}", page.r[1]);
    assert!(page.r[2] < 0.2, "trailing correlation {}", page.r[2]);

    // Canonical variates have unit energy and pairwise correlation r
    let xa = x.dot(&page.a);
    let yb = y.dot(&page.b);
    for k in 0..3 {
        assert_abs_diff_eq!(xa.column(k).dot(&xa.column(k)), 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(yb.column(k).dot(&yb.column(k)), 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(xa.column(k).dot(&yb.column(k)), page.r[k], epsilon = 1e-8);
    }
}

#[test]
fn lag_sweep_peaks_at_true_delay() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(7);
    let n_times = 1000;
    let delay = 3;
    let x = gaussian(&mut rng, n_times, 2);
    let noise = gaussian(&mut rng, n_times, 2);

    // y[t] = x[t - delay] + small noise
    let mut y = &noise * 0.05;
    {
        let mut tail = y.slice_mut(s![delay.., ..]);
        tail += &x.slice(s![..n_times - delay, ..]);
    }

    let lags: Vec<isize> = (-5..=5).collect();
    let out = nt_cca(
        CcaRequest::new()
            .with_x(x.view().into_dyn())
            .with_y(y.view().into_dyn())
            .with_lags(&lags),
    )
    .unwrap();
    let stack = out.as_stacked().unwrap();
    assert_eq!(stack.r.dim(), (2, lags.len()));

    let leading = stack.r.row(0);
    let best = leading
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(k, _)| k)
        .unwrap();
    assert_eq!(lags[best], delay as isize);
    assert!(leading[best] > 0.99);

    for (k, &lag) in lags.iter().enumerate() {
        if lag != delay as isize {
            assert!(leading[k] < 0.3, "lag {} correlation {}", lag, leading[k]);
        }
    }
}

#[test]
fn precomputed_covariance_matches_raw_data() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(99);
    let x = gaussian(&mut rng, 300, 3);
    let y = gaussian(&mut rng, 300, 2);

    let from_data = nt_cca(
        CcaRequest::new()
            .with_x(x.view().into_dyn())
            .with_y(y.view().into_dyn()),
    )
    .unwrap();

    let xy = concatenate(Axis(1), &[x.view(), y.view()]).unwrap();
    let c = xy.t().dot(&xy);
    let from_cov = nt_cca(
        CcaRequest::new()
            .with_covariance(c.view().into_dyn())
            .with_m(3),
    )
    .unwrap();

    assert_eq!(from_data, from_cov);
}

#[test]
fn trials_are_pooled_into_one_covariance() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(5);
    let n_trials = 4;
    let mut x = Array3::zeros((250, 2, n_trials));
    let mut y = Array3::zeros((250, 2, n_trials));
    for k in 0..n_trials {
        let xt = gaussian(&mut rng, 250, 2);
        let yt = &xt * 0.8 + &gaussian(&mut rng, 250, 2);
        x.index_axis_mut(Axis(2), k).assign(&xt);
        y.index_axis_mut(Axis(2), k).assign(&yt);
    }

    let lagged = cov_lags(x.view().into_dyn(), y.view().into_dyn(), &[0]).unwrap();
    assert_eq!(lagged.total_weight, vec![250 * n_trials]);

    let out = nt_cca(
        CcaRequest::new()
            .with_x(x.view().into_dyn())
            .with_y(y.view().into_dyn()),
    )
    .unwrap();
    let direct = cca_from_covariance(
        lagged.cov.index_axis(Axis(2), 0).into_dyn(),
        lagged.m,
        &CcaConfig::default(),
    )
    .unwrap();
    assert_eq!(out, direct);

    let r = &out.as_single().unwrap().r;
    assert!(r[0] > 0.5 && r[0] < 0.8, "pooled correlation {}", r[0]);
}
