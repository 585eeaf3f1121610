//! Goal-expectation (λ) estimation from running match statistics.

use serde::Serialize;
use tracing::trace;

use inplay::numeric::{bounded_exp, clamp};

use crate::domain::{MatchSnapshot, PerSide, Side};
use crate::model::Config;

pub const HOME_BASE_RATE: f64 = 1.4;
pub const AWAY_BASE_RATE: f64 = 1.2;
pub const VENUE_BONUS: f64 = 1.1;
pub const LAMBDA_BOUNDS: (f64, f64) = (0.05, 8.0);

const REGULATION_MINUTES: f64 = 90.0;
const EXTRA_TIME_MINUTES: f64 = 30.0;
const EXTRA_TIME_FACTOR: f64 = 0.7;
const MIN_TIME_REMAINING: f64 = 0.05;

const EFFICIENCY_PRIOR: f64 = 0.35;
const EFFICIENCY_PRIOR_SHOTS: f64 = 3.0;
const CORNERS_PER_90: f64 = 9.0;
const YELLOWS_PER_90: f64 = 4.5;
const SHRINK_PRIOR_MINUTES: f64 = 30.0;

const MAX_STATE_GOAL_DIFF: u16 = 3;
const MAX_TEMPO_GOAL_DIFF: u16 = 2;
const TEMPO_ONSET_MINUTE: f64 = 75.0;
const TEMPO_RAMP_MINUTES: f64 = 15.0;

/// Where the match sits in regulation or extra time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    pub is_extra_time: bool,
    pub length: f64,
    /// Minutes played within the current phase.
    pub minute: f64,
    pub factor: f64,
    /// Fraction of the phase still to play, confined to \[0.05, 1\].
    pub time_remaining: f64,
}
impl Phase {
    pub fn at(match_minute: f64) -> Self {
        let is_extra_time = match_minute > REGULATION_MINUTES;
        let (length, minute, factor) = if is_extra_time {
            (EXTRA_TIME_MINUTES, match_minute - REGULATION_MINUTES, EXTRA_TIME_FACTOR)
        } else {
            (REGULATION_MINUTES, match_minute, 1.0)
        };
        let time_remaining = clamp((length - minute) / length, MIN_TIME_REMAINING, 1.0);
        Self {
            is_extra_time,
            length,
            minute,
            factor,
            time_remaining,
        }
    }

    pub fn elapsed(&self) -> f64 {
        1.0 - self.time_remaining
    }
}

/// How far the shot and card factors may stray from 1. Starts narrow and widens as the observed
/// statistics accumulate over the match.
pub fn max_change(match_minute: f64) -> f64 {
    clamp(0.4 + 0.6 * match_minute / REGULATION_MINUTES, 0.4, 1.0)
}

/// Blends an observed count with the count expected by now, trusting the observation more as
/// minutes accumulate.
fn shrink(observed: f64, expected: f64, match_minute: f64) -> f64 {
    let prior_weight = SHRINK_PRIOR_MINUTES / (SHRINK_PRIOR_MINUTES + match_minute);
    prior_weight * expected + (1.0 - prior_weight) * observed
}

/// Multiplicative adjustments to each side's base rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factors {
    pub possession: PerSide<f64>,
    /// Includes the efficiency bonus.
    pub on_target: PerSide<f64>,
    pub off_target: PerSide<f64>,
    /// Shrunk on-target ratio.
    pub efficiency: PerSide<f64>,
    pub efficiency_bonus: PerSide<f64>,
    pub corner: PerSide<f64>,
    pub card: PerSide<f64>,
    pub state: PerSide<f64>,
    pub tempo_mod: f64,
}
impl Factors {
    /// The combined adjustment for `side`, composed in log space and saturated by [`bounded_exp`].
    pub fn product(&self, side: Side) -> f64 {
        let log_sum = [
            self.possession.get(side),
            self.on_target.get(side),
            self.off_target.get(side),
            self.corner.get(side),
            self.card.get(side),
            self.state.get(side),
        ]
        .iter()
        .map(|factor| factor.ln())
        .sum();
        bounded_exp(log_sum)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intensity {
    pub lambdas: PerSide<f64>,
    pub phase: Phase,
    pub factors: Factors,
}
impl Intensity {
    pub fn total(&self) -> f64 {
        self.lambdas.home + self.lambdas.away
    }
}

pub fn estimate(snapshot: &MatchSnapshot, config: &Config) -> Intensity {
    let match_minute = snapshot.minute();
    let phase = Phase::at(match_minute);
    let max_change = max_change(match_minute);

    let efficiency = PerSide::from_fn(|side| shot_efficiency(snapshot, side));
    let efficiency_bonus = PerSide::from_fn(|side| {
        clamp(
            1.0 + config.efficiency_weight * (efficiency.get(side) - EFFICIENCY_PRIOR),
            0.8,
            1.4,
        )
    });
    let (tempo_mod, state) = game_state(snapshot, &phase, match_minute, config);
    let factors = Factors {
        possession: possession(snapshot, config),
        on_target: PerSide::from_fn(|side| {
            on_target(snapshot, side, max_change, config) * efficiency_bonus.get(side)
        }),
        off_target: PerSide::from_fn(|side| {
            let shots = snapshot.stats(side).shots_off_target();
            clamp(
                1.0 + config.off_target_weight * shots,
                1.0 - 0.3 * max_change,
                1.0 + 0.8 * max_change,
            )
        }),
        efficiency,
        efficiency_bonus,
        corner: PerSide::from_fn(|side| corner(snapshot, side, match_minute, config)),
        card: PerSide::from_fn(|side| card(snapshot, side, &phase, max_change, config)),
        state,
        tempo_mod,
    };

    let lambdas = PerSide::from_fn(|side| {
        let base_rate = match side {
            Side::Home => HOME_BASE_RATE,
            Side::Away => AWAY_BASE_RATE,
        };
        let venue = if snapshot.venue == side { VENUE_BONUS } else { 1.0 };
        let lambda = base_rate * phase.factor * phase.time_remaining * venue * factors.product(side);
        clamp(lambda, LAMBDA_BOUNDS.0, LAMBDA_BOUNDS.1)
    });
    trace!("lambdas: {lambdas:?}, factors: {factors:?}");

    Intensity {
        lambdas,
        phase,
        factors,
    }
}

/// Zero-sum: whatever one side gains from holding the ball, the other loses.
fn possession(snapshot: &MatchSnapshot, config: &Config) -> PerSide<f64> {
    let diff = clamp(snapshot.home.possession() - 50.0, -50.0, 50.0) / 50.0;
    PerSide::new(
        clamp(1.0 + config.possession_weight * diff, 0.5, 1.5),
        clamp(1.0 - config.possession_weight * diff, 0.5, 1.5),
    )
}

fn on_target(snapshot: &MatchSnapshot, side: Side, max_change: f64, config: &Config) -> f64 {
    let own = snapshot.stats(side).shots_on_target();
    let opponent = snapshot.stats(side.opponent()).shots_on_target();
    clamp(
        1.0 + config.on_target_weight * own - config.on_target_weight * 0.5 * opponent,
        1.0 - 0.4 * max_change,
        1.0 + max_change,
    )
}

fn shot_efficiency(snapshot: &MatchSnapshot, side: Side) -> f64 {
    let stats = snapshot.stats(side);
    let on_target = stats.shots_on_target();
    let total = on_target + stats.shots_off_target();
    (on_target + EFFICIENCY_PRIOR_SHOTS * EFFICIENCY_PRIOR) / (total + EFFICIENCY_PRIOR_SHOTS)
}

fn corner(snapshot: &MatchSnapshot, side: Side, match_minute: f64, config: &Config) -> f64 {
    let expected = 0.5 * CORNERS_PER_90 * match_minute / REGULATION_MINUTES;
    let shrunk = shrink(snapshot.stats(side).corners(), expected, match_minute);
    clamp(1.0 + config.corner_weight * (shrunk - expected), 0.8, 1.3)
}

fn card(snapshot: &MatchSnapshot, side: Side, phase: &Phase, max_change: f64, config: &Config) -> f64 {
    let match_minute = snapshot.minute();
    let stats = snapshot.stats(side);
    let expected_yellows = 0.5 * YELLOWS_PER_90 * match_minute / REGULATION_MINUTES;
    let yellows = shrink(stats.yellow_cards(), expected_yellows, match_minute);

    let time_weight = clamp(1.0 + 1.5 * phase.elapsed(), 1.0, 2.5);
    let red_timing = if phase.is_extra_time {
        1.0
    } else {
        2.0 - clamp(match_minute / REGULATION_MINUTES, 0.3, 1.0)
    };
    let penalty = (config.yellow_weight * yellows + config.red_weight * stats.red_cards() * red_timing)
        * time_weight;
    let balance = config.card_balance_weight * snapshot.stats(side.opponent()).card_points();
    clamp(
        1.0 - penalty + balance,
        1.0 - 0.7 * max_change,
        1.0 + 0.2 * max_change,
    )
}

/// Returns the tempo modifier and the per-side state factors.
fn game_state(
    snapshot: &MatchSnapshot,
    phase: &Phase,
    match_minute: f64,
    config: &Config,
) -> (f64, PerSide<f64>) {
    let score = snapshot.score();
    let lead = score.home.abs_diff(score.away);

    let tempo_mod = if match_minute > TEMPO_ONSET_MINUTE {
        let ramp = clamp((match_minute - TEMPO_ONSET_MINUTE) / TEMPO_RAMP_MINUTES, 0.0, 1.0);
        let tempo = if lead == 0 {
            1.0 + config.tempo_weight * ramp
        } else {
            1.0 - config.tempo_weight * 0.5 * u16::min(lead, MAX_TEMPO_GOAL_DIFF) as f64 * ramp
        };
        clamp(tempo, 0.7, 1.3)
    } else {
        1.0
    };

    if lead == 0 {
        return (tempo_mod, PerSide::new(tempo_mod, tempo_mod));
    }

    let state_intensity = 0.25 * phase.elapsed();
    let shift = state_intensity * u16::min(lead, MAX_STATE_GOAL_DIFF) as f64;
    let leader = clamp((1.0 - shift) * tempo_mod, 0.6, 1.4);
    let trailer = clamp((1.0 + shift) * tempo_mod, 0.8, 1.6);
    let factors = if score.home > score.away {
        PerSide::new(leader, trailer)
    } else {
        PerSide::new(trailer, leader)
    };
    (tempo_mod, factors)
}
