//! Likelihood terms used by the scorer.
use std::f64::consts::PI;

/// Gaussian probability density of `x` for a zero-mean distribution with `sigma`.
#[inline]
pub fn gaussian_pdf(x: f64, sigma: f64) -> f64 {
    gaussian_kernel(x, sigma) / (sigma * (2.0 * PI).sqrt())
}

/// Unnormalized Gaussian weight in `(0, 1]`, equal to 1 at `x = 0`.
#[inline]
pub fn gaussian_kernel(x: f64, sigma: f64) -> f64 {
    let z = x / sigma;
    (-0.5 * z * z).exp()
}

/// Standard deviation, in degrees, of the bearing to a point spread uniformly over a
/// span of `width` blocks seen from `range` blocks away.
pub fn uniform_spread_deg(width: f64, range: f64) -> f64 {
    if range <= 0.0 {
        return 90.0;
    }
    (width / 12f64.sqrt()).atan2(range).to_degrees()
}

/// Combines independent angular error sources into one standard deviation.
#[inline]
pub fn combined_sigma(measurement: f64, spread: f64) -> f64 {
    measurement.hypot(spread)
}
