//! Confidence intervals for binomial proportions.

use serde::Serialize;

use crate::numeric::clamp;

/// The z-score of a two-sided 95% interval.
pub const DEFAULT_Z: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

/// Wilson score interval for an observed proportion `p` over `n` trials at the given `z`. Both
/// bounds are confined to \[0, 1\].
pub fn wilson(p: f64, n: f64, z: f64) -> Bounds {
    let p = clamp(p, 0.0, 1.0);
    let z_sq = z * z;
    let denominator = 1.0 + z_sq / n;
    let centre = (p + z_sq / (2.0 * n)) / denominator;
    let half_width = z / denominator * f64::sqrt(p * (1.0 - p) / n + z_sq / (4.0 * n * n));
    Bounds {
        lower: clamp(centre - half_width, 0.0, 1.0),
        upper: clamp(centre + half_width, 0.0, 1.0),
    }
}

/// Effective sample size that grows with the elapsed fraction of the match, from 30 at kick-off
/// towards 100 at full time. Never below 10.
pub fn effective_sample_size(time_remaining: f64) -> f64 {
    f64::max(10.0, 30.0 + 70.0 * (1.0 - time_remaining))
}
