/// Poisson probabilities for `0..=max_k` events at rate `lambda`.
///
/// Each term is derived from its predecessor (`p(k) = p(k-1)·λ/k`), so no factorials or powers are
/// evaluated. The series is not normalised; the mass beyond `max_k` is simply absent. The leading
/// term is the exact `e^-λ`.
pub fn univariate_series(lambda: f64, max_k: usize) -> Vec<f64> {
    debug_assert!(lambda >= 0.0, "lambda must be non-negative, got {lambda}");
    let mut probs = Vec::with_capacity(max_k + 1);
    probs.push(f64::exp(-lambda));
    for k in 1..=max_k {
        let prev = probs[k - 1];
        probs.push(prev * lambda / k as f64);
    }
    probs
}

/// Probability of at least `k` events at rate `lambda`, summed over a series truncated at `max_k`.
pub fn upper_tail(lambda: f64, k: usize, max_k: usize) -> f64 {
    univariate_series(lambda, max_k).iter().skip(k).sum()
}
