//! Piecewise-linear interpolation of fitted curves
//!
//! Matches R's `approx(x, y, xout, rule = 2)`: linear between knots, and
//! outside the knot range the nearest end value is returned.

use crate::error::{Result, SimError};

/// Interpolate `(xs, ys)` at `xout`; `xs` must be sorted ascending
pub fn approx_clamped(xs: &[f64], ys: &[f64], xout: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return f64::NAN;
    }
    if xout.is_nan() {
        return f64::NAN;
    }
    if xout <= xs[0] {
        return ys[0];
    }
    if xout >= xs[n - 1] {
        return ys[n - 1];
    }

    // first knot strictly greater than xout
    let hi = xs.partition_point(|&x| x <= xout);
    let lo = hi - 1;
    let (x0, x1) = (xs[lo], xs[hi]);
    if x1 == x0 {
        return ys[lo];
    }
    let t = (xout - x0) / (x1 - x0);
    ys[lo] + t * (ys[hi] - ys[lo])
}

/// Interpolate at every point and fail on a non-finite result
pub fn approx_all(xs: &[f64], ys: &[f64], xout: &[f64], what: &str) -> Result<Vec<f64>> {
    xout.iter()
        .map(|&x| {
            let y = approx_clamped(xs, ys, x);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(SimError::NumericalInstability {
                    operation: format!("{} interpolation", what),
                    details: format!("non-finite value at x = {}", x),
                })
            }
        })
        .collect()
}
