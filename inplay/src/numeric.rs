//! Numeric primitives.

/// Bounds `x` to the closed interval \[`lo`, `hi`\].
#[inline]
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    f64::min(hi, f64::max(lo, x))
}

/// The exponential of `x`, with the exponent confined to \[-6, 6\].
#[inline]
pub fn bounded_exp(x: f64) -> f64 {
    f64::exp(clamp(x, -6.0, 6.0))
}
