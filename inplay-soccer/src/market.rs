//! Market probabilities derived from the goal distribution and the auxiliary corner and card
//! models.

use serde::Serialize;

use inplay::linear::Matrix;
use inplay::poisson;
use inplay::probs::nonzero_or_one;

use crate::calibration::MarketKey;
use crate::domain::{MatchSnapshot, Score};
use crate::intensity::{Intensity, Phase};
use crate::scoregrid::{self, GoalDistribution};

/// Residual intensity standing in for the chance that nobody scores again.
pub const NO_GOAL_EPSILON: f64 = 0.2;
pub const CORRECT_SCORE_EXTENT: usize = 3;
pub const CORRECT_SCORE_COUNT: usize = 5;

pub const CORNERS_PER_90_REMAINING: f64 = 4.5;
pub const CORNERS_FLOOR: f64 = 0.5;
pub const CORNERS_LINE: usize = 9;
pub const CORNERS_MAX_K: usize = 15;
pub const CARDS_PER_90_REMAINING: f64 = 2.8;
pub const CARDS_FLOOR: f64 = 0.2;
pub const CARDS_LINE: usize = 5;
pub const CARDS_MAX_K: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThreeWay {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverUnder {
    pub over: f64,
    pub under: f64,
}
impl OverUnder {
    fn from_over(over: f64) -> Self {
        Self {
            over,
            under: 1.0 - over,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DoubleChance {
    pub home_or_draw: f64,
    pub home_or_away: f64,
    pub draw_or_away: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DrawNoBet {
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BothTeamsToScore {
    pub yes: f64,
    pub no: f64,
}

/// Who scores next, or nobody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NextGoal {
    pub home: f64,
    pub away: f64,
    pub none: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreProbability {
    pub score: Score,
    pub probability: f64,
}

/// A single Poisson process for the remaining count of some event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuxiliaryModel {
    pub observed: f64,
    pub expected_remaining: f64,
    /// Over/under line, e.g., 8.5.
    pub line: f64,
}
impl AuxiliaryModel {
    /// Corners still to come, regressed towards the baseline and accelerating as the match wears on.
    pub fn corners(snapshot: &MatchSnapshot, phase: &Phase, referee_intensity: f64) -> Self {
        let observed = snapshot.home.corners() + snapshot.away.corners();
        let base_rate = CORNERS_PER_90_REMAINING * phase.time_remaining * referee_intensity;
        let tempo = 1.0 + 0.3 * phase.elapsed();
        Self {
            observed,
            expected_remaining: f64::max(CORNERS_FLOOR, base_rate * tempo - observed),
            line: CORNERS_LINE as f64 - 0.5,
        }
    }

    /// Cards still to come; a red counts as two.
    pub fn cards(snapshot: &MatchSnapshot, phase: &Phase, referee_intensity: f64) -> Self {
        let observed = snapshot.home.card_points() + snapshot.away.card_points();
        let base_rate = CARDS_PER_90_REMAINING * phase.time_remaining * referee_intensity;
        Self {
            observed,
            expected_remaining: f64::max(CARDS_FLOOR, base_rate - observed),
            line: CARDS_LINE as f64 - 0.5,
        }
    }

    fn over_under(&self, max_k: usize) -> OverUnder {
        let line = self.line.ceil() as usize;
        OverUnder::from_over(poisson::upper_tail(self.expected_remaining, line, max_k))
    }
}

/// Every calibratable market. Enumerated field-by-field; see [`Markets::get`] and [`Markets::map`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Markets {
    pub match_outcome: ThreeWay,
    pub goals_2_5: OverUnder,
    pub goals_3_5: OverUnder,
    pub corners: OverUnder,
    pub cards: OverUnder,
    pub double_chance: DoubleChance,
    pub draw_no_bet: DrawNoBet,
    pub both_teams_to_score: BothTeamsToScore,
    pub next_goal: NextGoal,
}
impl Markets {
    pub fn get(&self, key: MarketKey) -> f64 {
        match key {
            MarketKey::Home => self.match_outcome.home,
            MarketKey::Draw => self.match_outcome.draw,
            MarketKey::Away => self.match_outcome.away,
            MarketKey::Over25 => self.goals_2_5.over,
            MarketKey::Under25 => self.goals_2_5.under,
            MarketKey::Over35 => self.goals_3_5.over,
            MarketKey::Under35 => self.goals_3_5.under,
            MarketKey::HomeOrDraw => self.double_chance.home_or_draw,
            MarketKey::HomeOrAway => self.double_chance.home_or_away,
            MarketKey::DrawOrAway => self.double_chance.draw_or_away,
            MarketKey::DrawNoBetHome => self.draw_no_bet.home,
            MarketKey::DrawNoBetAway => self.draw_no_bet.away,
            MarketKey::BothScore => self.both_teams_to_score.yes,
            MarketKey::NotBothScore => self.both_teams_to_score.no,
            MarketKey::CornersOver => self.corners.over,
            MarketKey::CornersUnder => self.corners.under,
            MarketKey::CardsOver => self.cards.over,
            MarketKey::CardsUnder => self.cards.under,
            MarketKey::GoalHome => self.next_goal.home,
            MarketKey::GoalAway => self.next_goal.away,
            MarketKey::GoalNone => self.next_goal.none,
        }
    }

    /// Applies `f` to each probability independently, keyed by its market.
    pub fn map(&self, mut f: impl FnMut(MarketKey, f64) -> f64) -> Self {
        let mut leg = |key| f(key, self.get(key));
        Self {
            match_outcome: ThreeWay {
                home: leg(MarketKey::Home),
                draw: leg(MarketKey::Draw),
                away: leg(MarketKey::Away),
            },
            goals_2_5: OverUnder {
                over: leg(MarketKey::Over25),
                under: leg(MarketKey::Under25),
            },
            goals_3_5: OverUnder {
                over: leg(MarketKey::Over35),
                under: leg(MarketKey::Under35),
            },
            corners: OverUnder {
                over: leg(MarketKey::CornersOver),
                under: leg(MarketKey::CornersUnder),
            },
            cards: OverUnder {
                over: leg(MarketKey::CardsOver),
                under: leg(MarketKey::CardsUnder),
            },
            double_chance: DoubleChance {
                home_or_draw: leg(MarketKey::HomeOrDraw),
                home_or_away: leg(MarketKey::HomeOrAway),
                draw_or_away: leg(MarketKey::DrawOrAway),
            },
            draw_no_bet: DrawNoBet {
                home: leg(MarketKey::DrawNoBetHome),
                away: leg(MarketKey::DrawNoBetAway),
            },
            both_teams_to_score: BothTeamsToScore {
                yes: leg(MarketKey::BothScore),
                no: leg(MarketKey::NotBothScore),
            },
            next_goal: NextGoal {
                home: leg(MarketKey::GoalHome),
                away: leg(MarketKey::GoalAway),
                none: leg(MarketKey::GoalNone),
            },
        }
    }
}

/// Match result probabilities, counting the goals already scored.
pub fn match_outcome(joint: &Matrix, score: &Score) -> ThreeWay {
    let (mut home, mut draw, mut away) = (0.0, 0.0, 0.0);
    for home_goals in 0..joint.rows() {
        for (away_goals, &prob) in joint[home_goals].iter().enumerate() {
            let final_home = home_goals + score.home as usize;
            let final_away = away_goals + score.away as usize;
            if final_home > final_away {
                home += prob;
            } else if final_home == final_away {
                draw += prob;
            } else {
                away += prob;
            }
        }
    }
    let total = nonzero_or_one(home + draw + away);
    ThreeWay {
        home: home / total,
        draw: draw / total,
        away: away / total,
    }
}

/// The most likely final scores among the low-scoring cells, best first.
pub fn correct_scores(distribution: &GoalDistribution, score: &Score) -> Vec<ScoreProbability> {
    let extent = usize::min(CORRECT_SCORE_EXTENT, distribution.max_k);
    let mut scores = Vec::with_capacity((extent + 1) * (extent + 1));
    for home_goals in 0..=extent {
        for away_goals in 0..=extent {
            scores.push(ScoreProbability {
                score: Score::new(
                    score.home.saturating_add(home_goals as u16),
                    score.away.saturating_add(away_goals as u16),
                ),
                probability: distribution.joint[(home_goals, away_goals)],
            });
        }
    }
    scores.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    scores.truncate(CORRECT_SCORE_COUNT);
    scores
}

/// Probability that the total of further goals exceeds `goals` (a line of `goals + 0.5`).
pub fn total_goals_over(total: &[f64], goals: usize) -> OverUnder {
    OverUnder::from_over(total.iter().skip(goals + 1).sum())
}

/// Inclusion-exclusion over the two blank events, taken from the corrected grid. A side that has
/// already scored cannot draw a blank.
pub fn both_teams_to_score(distribution: &GoalDistribution, score: &Score) -> BothTeamsToScore {
    let joint = &distribution.joint;
    let home_blank = if score.home > 0 { 0.0 } else { scoregrid::blank(joint, true) };
    let away_blank = if score.away > 0 { 0.0 } else { scoregrid::blank(joint, false) };
    let both_blank = if score.home == 0 && score.away == 0 {
        joint[(0, 0)]
    } else {
        0.0
    };
    let no = home_blank + away_blank - both_blank;
    BothTeamsToScore { yes: 1.0 - no, no }
}

pub fn next_goal(intensity: &Intensity) -> NextGoal {
    let denominator = intensity.total() + NO_GOAL_EPSILON;
    NextGoal {
        home: intensity.lambdas.home / denominator,
        away: intensity.lambdas.away / denominator,
        none: NO_GOAL_EPSILON / denominator,
    }
}

pub fn double_chance(outcome: &ThreeWay) -> DoubleChance {
    DoubleChance {
        home_or_draw: outcome.home + outcome.draw,
        home_or_away: outcome.home + outcome.away,
        draw_or_away: outcome.draw + outcome.away,
    }
}

pub fn draw_no_bet(outcome: &ThreeWay) -> DrawNoBet {
    let denominator = nonzero_or_one(outcome.home + outcome.away);
    DrawNoBet {
        home: outcome.home / denominator,
        away: outcome.away / denominator,
    }
}

/// Everything the tip engine and the caller need from a single pass over the distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub markets: Markets,
    pub correct_scores: Vec<ScoreProbability>,
    pub corners: AuxiliaryModel,
    pub cards: AuxiliaryModel,
}

pub fn derive(
    snapshot: &MatchSnapshot,
    intensity: &Intensity,
    distribution: &GoalDistribution,
    referee_intensity: f64,
) -> Derivation {
    let score = snapshot.score();
    let match_outcome = match_outcome(&distribution.joint, &score);
    let corners = AuxiliaryModel::corners(snapshot, &intensity.phase, referee_intensity);
    let cards = AuxiliaryModel::cards(snapshot, &intensity.phase, referee_intensity);
    let markets = Markets {
        match_outcome,
        goals_2_5: total_goals_over(&distribution.total, 2),
        goals_3_5: total_goals_over(&distribution.total, 3),
        corners: corners.over_under(CORNERS_MAX_K),
        cards: cards.over_under(CARDS_MAX_K),
        double_chance: double_chance(&match_outcome),
        draw_no_bet: draw_no_bet(&match_outcome),
        both_teams_to_score: both_teams_to_score(distribution, &score),
        next_goal: next_goal(intensity),
    };
    Derivation {
        markets,
        correct_scores: correct_scores(distribution, &score),
        corners,
        cards,
    }
}

#[cfg(test)]
mod tests;
