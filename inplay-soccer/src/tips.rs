//! Confidence-gated betting tips.
//!
//! A market becomes a tip only when the lower Wilson bound of its calibrated probability clears a
//! market-specific threshold and the market is still meaningful at this stage of the match.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use inplay::interval::wilson;

use crate::calibration::MarketKey;
use crate::domain::{MatchSnapshot, Score, Side};
use crate::market::{AuxiliaryModel, Markets, ScoreProbability};

pub const MAX_TIPS: usize = 6;

const RESULT_THRESHOLD: f64 = 0.55;
const LATE_DRAW_THRESHOLD: f64 = 0.50;
const LATE_DRAW_MINUTE: f64 = 70.0;
const GOALS_THRESHOLD: f64 = 0.60;
const DOUBLE_CHANCE_THRESHOLD: f64 = 0.70;
const DRAW_NO_BET_THRESHOLD: f64 = 0.65;
const CORRECT_SCORE_FLOOR: f64 = 0.12;

const OVER_2_5_CUTOFF_MINUTE: f64 = 75.0;
const OVER_2_5_MIN_LAMBDA: f64 = 2.4;
const OVER_3_5_CUTOFF_MINUTE: f64 = 60.0;
const OVER_3_5_MIN_LAMBDA: f64 = 3.2;
const UNDER_CUTOFF_MINUTE: f64 = 80.0;
const GOALSCORER_CUTOFF_MINUTE: f64 = 80.0;
const BTTS_YES_MIN_LAMBDA: f64 = 1.8;
const BTTS_NO_MAX_LAMBDA: f64 = 1.6;
const CORNERS_OVER_MIN_EXPECTED: f64 = 6.0;
const CORNERS_UNDER_MAX_EXPECTED: f64 = 10.0;
const CARDS_OVER_MIN_EXPECTED: f64 = 4.0;
const CARDS_UNDER_MAX_EXPECTED: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tip {
    pub label: String,
    /// The probability driving the ranking.
    pub probability: f64,
    /// Absent for tips that are not confidence-gated.
    pub lower_bound: Option<f64>,
}

impl Display for Tip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.probability * 100.0)
    }
}

/// Whether the goalscorer market refers to the opening goal or the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalFraming {
    First,
    Next,
}
impl GoalFraming {
    pub fn of(score: &Score) -> Self {
        if score.total() == 0 {
            GoalFraming::First
        } else {
            GoalFraming::Next
        }
    }
}

/// The match state the gates are evaluated against.
#[derive(Debug)]
pub struct Context<'a> {
    pub snapshot: &'a MatchSnapshot,
    pub lambda_total: f64,
    pub corners: &'a AuxiliaryModel,
    pub cards: &'a AuxiliaryModel,
    pub sample_size: f64,
    pub z: f64,
}

#[derive(Debug)]
struct Gate {
    key: MarketKey,
    label: String,
    threshold: f64,
    admissible: bool,
}
impl Gate {
    fn new(key: MarketKey, label: impl Into<String>, threshold: f64, admissible: bool) -> Self {
        Self {
            key,
            label: label.into(),
            threshold,
            admissible,
        }
    }
}

fn gates(context: &Context) -> Vec<Gate> {
    let snapshot = context.snapshot;
    let minute = snapshot.minute();
    let lambda = context.lambda_total;
    let home = snapshot.team_name(Side::Home);
    let away = snapshot.team_name(Side::Away);
    let goal = match GoalFraming::of(&snapshot.score()) {
        GoalFraming::First => "first goal",
        GoalFraming::Next => "next goal",
    };
    let corners = context.corners.expected_remaining;
    let cards = context.cards.expected_remaining;

    vec![
        Gate::new(MarketKey::Home, format!("{home} to win"), RESULT_THRESHOLD, true),
        Gate::new(MarketKey::Away, format!("{away} to win"), RESULT_THRESHOLD, true),
        Gate::new(MarketKey::Draw, "Draw", LATE_DRAW_THRESHOLD, minute > LATE_DRAW_MINUTE),
        Gate::new(
            MarketKey::Over25,
            "Over 2.5 further goals",
            GOALS_THRESHOLD,
            minute < OVER_2_5_CUTOFF_MINUTE && lambda > OVER_2_5_MIN_LAMBDA,
        ),
        Gate::new(
            MarketKey::Under25,
            "Under 2.5 further goals",
            GOALS_THRESHOLD,
            minute < UNDER_CUTOFF_MINUTE,
        ),
        Gate::new(
            MarketKey::Over35,
            "Over 3.5 further goals",
            GOALS_THRESHOLD,
            minute < OVER_3_5_CUTOFF_MINUTE && lambda > OVER_3_5_MIN_LAMBDA,
        ),
        Gate::new(
            MarketKey::Under35,
            "Under 3.5 further goals",
            GOALS_THRESHOLD,
            minute < UNDER_CUTOFF_MINUTE,
        ),
        Gate::new(MarketKey::BothScore, "Both teams to score", GOALS_THRESHOLD, lambda > BTTS_YES_MIN_LAMBDA),
        Gate::new(
            MarketKey::NotBothScore,
            "Both teams to score: no",
            GOALS_THRESHOLD,
            lambda < BTTS_NO_MAX_LAMBDA,
        ),
        Gate::new(MarketKey::HomeOrDraw, format!("{home} or draw"), DOUBLE_CHANCE_THRESHOLD, true),
        Gate::new(MarketKey::HomeOrAway, format!("{home} or {away}"), DOUBLE_CHANCE_THRESHOLD, true),
        Gate::new(MarketKey::DrawOrAway, format!("Draw or {away}"), DOUBLE_CHANCE_THRESHOLD, true),
        Gate::new(MarketKey::DrawNoBetHome, format!("{home} draw no bet"), DRAW_NO_BET_THRESHOLD, true),
        Gate::new(MarketKey::DrawNoBetAway, format!("{away} draw no bet"), DRAW_NO_BET_THRESHOLD, true),
        Gate::new(
            MarketKey::GoalHome,
            format!("{home} to score the {goal}"),
            GOALS_THRESHOLD,
            minute < GOALSCORER_CUTOFF_MINUTE,
        ),
        Gate::new(
            MarketKey::GoalAway,
            format!("{away} to score the {goal}"),
            GOALS_THRESHOLD,
            minute < GOALSCORER_CUTOFF_MINUTE,
        ),
        Gate::new(MarketKey::GoalNone, "No more goals", GOALS_THRESHOLD, true),
        Gate::new(
            MarketKey::CornersOver,
            "Over 8.5 further corners",
            GOALS_THRESHOLD,
            corners > CORNERS_OVER_MIN_EXPECTED,
        ),
        Gate::new(
            MarketKey::CornersUnder,
            "Under 8.5 further corners",
            GOALS_THRESHOLD,
            corners < CORNERS_UNDER_MAX_EXPECTED,
        ),
        Gate::new(
            MarketKey::CardsOver,
            "Over 4.5 further cards",
            GOALS_THRESHOLD,
            cards > CARDS_OVER_MIN_EXPECTED,
        ),
        Gate::new(
            MarketKey::CardsUnder,
            "Under 4.5 further cards",
            GOALS_THRESHOLD,
            cards < CARDS_UNDER_MAX_EXPECTED,
        ),
    ]
}

/// Filters the calibrated markets through their gates, adds the leading correct score if it is
/// likely enough, and returns the best `max_tips` by probability.
pub fn generate(
    context: &Context,
    calibrated: &Markets,
    correct_scores: &[ScoreProbability],
    max_tips: usize,
) -> Vec<Tip> {
    let mut tips: Vec<_> = gates(context)
        .into_iter()
        .filter(|gate| gate.admissible)
        .filter_map(|gate| {
            let probability = calibrated.get(gate.key);
            let bounds = wilson(probability, context.sample_size, context.z);
            (bounds.lower > gate.threshold).then(|| Tip {
                label: gate.label,
                probability,
                lower_bound: Some(bounds.lower),
            })
        })
        .collect();

    if let Some(top) = correct_scores.first() {
        if top.probability > CORRECT_SCORE_FLOOR {
            tips.push(Tip {
                label: format!("Correct score {}-{}", top.score.home, top.score.away),
                probability: top.probability,
                lower_bound: None,
            });
        }
    }

    tips.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    tips.truncate(max_tips);
    tips
}

#[cfg(test)]
mod tests;
