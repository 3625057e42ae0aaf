//! Interpolation and integration over tabulated curves.

/// Piecewise-linear interpolation of `fp(xp)` at `x`.
///
/// Sample points are sorted by `xp` first, so digitized curves may be stored
/// in any order. Outside the sampled range the nearest boundary value is
/// returned; there is no extrapolation. A NaN query gives NaN.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let mut points: Vec<(f64, f64)> = xp.iter().copied().zip(fp.iter().copied()).collect();
    if points.is_empty() {
        return f64::NAN;
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (x_first, y_first) = points[0];
    let (x_last, y_last) = points[points.len() - 1];
    if x <= x_first {
        return y_first;
    }
    if x >= x_last {
        return y_last;
    }

    // x_first < x < x_last, so 1 <= idx <= len - 1 unless the samples hold NaN
    let idx = points.partition_point(|p| p.0 <= x);
    if idx == 0 || idx >= points.len() {
        return f64::NAN;
    }
    let (x0, y0) = points[idx - 1];
    let (x1, y1) = points[idx];
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Cumulative trapezoidal integral of `y` over `x`, starting at 0.
pub fn cumulative_trapezoid(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(0.0);
    for k in 1..n {
        let area = 0.5 * (y[k] + y[k - 1]) * (x[k] - x[k - 1]);
        out.push(out[k - 1] + area);
    }
    out
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
