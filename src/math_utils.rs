//! Mathematical utility functions shared by the geometry and thermal code.

/// Linear interpolation between two values
///
/// # Arguments
/// * `a` - Start value
/// * `b` - End value
/// * `ratio` - Interpolation ratio (0.0 = a, 1.0 = b)
///
/// # Examples
/// ```
/// use geo_setup_rust::math_utils::lerp;
///
/// assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
/// assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
/// ```
pub fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

/// Harmonic mean of two conductivities, used for the conductivity of the
/// interface between two neighbouring samples.
///
/// Returns 0 when either side is non-conducting.
///
/// # Examples
/// ```
/// use geo_setup_rust::math_utils::harmonic_mean;
///
/// assert_eq!(harmonic_mean(3.0, 3.0), 3.0);
/// assert_eq!(harmonic_mean(2.0, 0.0), 0.0);
/// ```
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.abs() < f64::EPSILON {
        0.0
    } else {
        2.0 * a * b / sum
    }
}

/// Minimum and maximum of a slice, or `None` when it is empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

/// Piecewise linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be monotonic, ascending or descending. Values outside the
/// sampled range are clamped to the nearest end sample.
///
/// # Examples
/// ```
/// use geo_setup_rust::math_utils::interp_linear;
///
/// let depth = [0.0, -10.0, -20.0];
/// let temp = [0.0, 100.0, 300.0];
/// assert_eq!(interp_linear(&depth, &temp, -15.0), 200.0);
/// assert_eq!(interp_linear(&depth, &temp, 5.0), 0.0);
/// ```
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    match n {
        0 => return f64::NAN,
        1 => return ys[0],
        _ => {}
    }

    let ascending = xs[n - 1] >= xs[0];
    let (lo, hi) = if ascending { (xs[0], xs[n - 1]) } else { (xs[n - 1], xs[0]) };
    if x <= lo {
        return if ascending { ys[0] } else { ys[n - 1] };
    }
    if x >= hi {
        return if ascending { ys[n - 1] } else { ys[0] };
    }

    // first sample past x in the direction of the axis
    let upper = xs[..n].partition_point(|&v| if ascending { v <= x } else { v >= x });
    let upper = upper.clamp(1, n - 1);
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    lerp(y0, y1, (x - x0) / (x1 - x0))
}
