//! Marginal and joint goal distributions over the remaining time.

use serde::Serialize;

use inplay::linear::Matrix;
use inplay::poisson;
use inplay::probs::SliceExt;

use crate::domain::PerSide;

pub const MIN_MAX_K: usize = 6;
pub const MAX_MAX_K: usize = 15;
pub const COVERAGE_TARGET: f64 = 0.999;

/// Probabilities of further goals, indexed by the number of goals still to come.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDistribution {
    pub max_k: usize,
    pub home: Vec<f64>,
    pub away: Vec<f64>,
    /// Rows are home goals, columns are away goals.
    pub joint: Matrix,
    /// Indexed by the total number of further goals, `0..=2·max_k`.
    pub total: Vec<f64>,
}

/// Poisson marginals for both sides, extended from [`MIN_MAX_K`] until each covers
/// [`COVERAGE_TARGET`] of the mass or [`MAX_MAX_K`] is reached, then normalised.
pub fn marginals(lambdas: &PerSide<f64>) -> (usize, Vec<f64>, Vec<f64>) {
    let mut max_k = MIN_MAX_K;
    let mut home = poisson::univariate_series(lambdas.home, max_k);
    let mut away = poisson::univariate_series(lambdas.away, max_k);
    while f64::min(home.sum(), away.sum()) < COVERAGE_TARGET && max_k < MAX_MAX_K {
        max_k += 1;
        home = poisson::univariate_series(lambdas.home, max_k);
        away = poisson::univariate_series(lambdas.away, max_k);
    }
    home.normalise(1.0);
    away.normalise(1.0);
    (max_k, home, away)
}

/// Inflates the low-scoring cells, where independent Poisson processes under-predict, then
/// renormalises the grid. A non-positive `tau` leaves the grid untouched.
pub fn apply_dixon_coles(tau: f64, scoregrid: &mut Matrix) {
    if tau <= 0.0 {
        return;
    }
    assert!(
        scoregrid.rows() >= 2 && scoregrid.cols() >= 2,
        "a {}x{} scoregrid is too small for the low-score correction",
        scoregrid.rows(),
        scoregrid.cols()
    );
    scoregrid[(0, 0)] *= 1.0 + tau;
    scoregrid[(1, 1)] *= 1.0 + 0.7 * tau;
    scoregrid[(1, 0)] *= 1.0 + 0.3 * tau;
    scoregrid[(0, 1)] *= 1.0 + 0.3 * tau;
    scoregrid.flatten_mut().normalise(1.0);
}

/// Sums the anti-diagonals of the grid.
pub fn total_goals(scoregrid: &Matrix) -> Vec<f64> {
    let mut totals = vec![0.0; scoregrid.rows() + scoregrid.cols() - 1];
    for home_goals in 0..scoregrid.rows() {
        for (away_goals, prob) in scoregrid[home_goals].iter().enumerate() {
            totals[home_goals + away_goals] += prob;
        }
    }
    totals
}

/// Probability of no further goals for `home`, i.e., the mass of row 0, or for away, column 0.
pub fn blank(scoregrid: &Matrix, home: bool) -> f64 {
    if home {
        scoregrid[0].sum()
    } else {
        (0..scoregrid.rows()).map(|row| scoregrid[(row, 0)]).sum()
    }
}

pub fn build(lambdas: &PerSide<f64>, tau: f64) -> GoalDistribution {
    let (max_k, home, away) = marginals(lambdas);
    let mut joint = Matrix::outer(&home, &away);
    apply_dixon_coles(tau, &mut joint);
    let total = total_goals(&joint);
    GoalDistribution {
        max_k,
        home,
        away,
        joint,
        total,
    }
}
