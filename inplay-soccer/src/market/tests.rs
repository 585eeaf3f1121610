use super::*;
use assert_float_eq::*;
use inplay_testing::{assert_sums_to_one, assert_unit_interval};
use strum::IntoEnumIterator;

use crate::domain::PerSide;
use crate::intensity;
use crate::model::Config;

fn create_test_4x4_scoregrid() -> Matrix {
    let mut scoregrid = Matrix::square(4);
    scoregrid[0].copy_from_slice(&[0.04, 0.03, 0.02, 0.01]);
    scoregrid[1].copy_from_slice(&[0.08, 0.06, 0.04, 0.02]);
    scoregrid[2].copy_from_slice(&[0.12, 0.09, 0.06, 0.03]);
    scoregrid[3].copy_from_slice(&[0.16, 0.12, 0.08, 0.04]);
    scoregrid
}

fn create_test_distribution() -> GoalDistribution {
    let joint = create_test_4x4_scoregrid();
    let total = scoregrid::total_goals(&joint);
    GoalDistribution {
        max_k: 3,
        home: vec![0.1, 0.2, 0.3, 0.4],
        away: vec![0.4, 0.3, 0.2, 0.1],
        joint,
        total,
    }
}

fn snapshot_at(minute: i32) -> MatchSnapshot {
    MatchSnapshot {
        minute,
        ..MatchSnapshot::default()
    }
}

#[test]
fn match_outcome_nil_all() {
    let outcome = match_outcome(&create_test_4x4_scoregrid(), &Score::nil_all());
    assert_float_absolute_eq!(0.65, outcome.home, 1e-12);
    assert_float_absolute_eq!(0.20, outcome.draw, 1e-12);
    assert_float_absolute_eq!(0.15, outcome.away, 1e-12);
}

#[test]
fn match_outcome_offset_by_score() {
    let outcome = match_outcome(&create_test_4x4_scoregrid(), &Score::new(0, 1));
    assert_float_absolute_eq!(0.40, outcome.home, 1e-12);
    assert_float_absolute_eq!(0.25, outcome.draw, 1e-12);
    assert_float_absolute_eq!(0.35, outcome.away, 1e-12);
}

#[test]
fn match_outcome_empty_grid() {
    let outcome = match_outcome(&Matrix::square(3), &Score::new(2, 0));
    assert_eq!(ThreeWay::default(), outcome);
}

#[test]
fn correct_scores_best_first() {
    let distribution = create_test_distribution();
    let scores = correct_scores(&distribution, &Score::nil_all());
    assert_eq!(CORRECT_SCORE_COUNT, scores.len());
    assert_eq!(Score::new(3, 0), scores[0].score);
    assert_float_absolute_eq!(0.16, scores[0].probability, 1e-12);
    assert_eq!(Score::new(2, 0), scores[1].score);
    assert_eq!(Score::new(3, 1), scores[2].score);
    assert_eq!(Score::new(2, 1), scores[3].score);
    for pair in scores.windows(2) {
        assert!(pair[0].probability >= pair[1].probability);
    }
}

#[test]
fn correct_scores_include_goals_scored() {
    let distribution = create_test_distribution();
    let scores = correct_scores(&distribution, &Score::new(1, 2));
    assert_eq!(Score::new(4, 2), scores[0].score);
}

#[test]
fn total_goals_over_lines() {
    let total = [0.1, 0.2, 0.3, 0.25, 0.15];
    let over_under = total_goals_over(&total, 2);
    assert_float_absolute_eq!(0.4, over_under.over, 1e-12);
    assert_float_absolute_eq!(0.6, over_under.under, 1e-12);

    let over_under = total_goals_over(&total, 3);
    assert_float_absolute_eq!(0.15, over_under.over, 1e-12);

    let over_under = total_goals_over(&total, 10);
    assert_eq!(0.0, over_under.over);
    assert_eq!(1.0, over_under.under);
}

#[test]
fn both_teams_to_score_inclusion_exclusion() {
    let distribution = create_test_distribution();
    let btts = both_teams_to_score(&distribution, &Score::nil_all());
    assert_float_absolute_eq!(0.46, btts.no, 1e-12);
    assert_float_absolute_eq!(0.54, btts.yes, 1e-12);
}

#[test]
fn both_teams_to_score_counts_goals_scored() {
    let distribution = create_test_distribution();
    let btts = both_teams_to_score(&distribution, &Score::new(1, 0));
    assert_float_absolute_eq!(0.4, btts.no, 1e-12);

    let btts = both_teams_to_score(&distribution, &Score::new(0, 2));
    assert_float_absolute_eq!(0.1, btts.no, 1e-12);

    let btts = both_teams_to_score(&distribution, &Score::new(1, 1));
    assert_eq!(0.0, btts.no);
    assert_eq!(1.0, btts.yes);
}

#[test]
fn next_goal_shares() {
    let intensity = intensity::estimate(&snapshot_at(0), &Config::default());
    let next = next_goal(&intensity);
    assert_sums_to_one(&[next.home, next.away, next.none], 1e-12);
    assert!(next.home > next.away);
    assert!(next.none > 0.0 && next.none < 1.0);
    assert_float_absolute_eq!(NO_GOAL_EPSILON / (intensity.total() + NO_GOAL_EPSILON), next.none, 1e-12);
}

#[test]
fn double_chance_pairs() {
    let outcome = ThreeWay {
        home: 0.5,
        draw: 0.3,
        away: 0.2,
    };
    let double = double_chance(&outcome);
    assert_float_absolute_eq!(0.8, double.home_or_draw, 1e-12);
    assert_float_absolute_eq!(0.7, double.home_or_away, 1e-12);
    assert_float_absolute_eq!(0.5, double.draw_or_away, 1e-12);
}

#[test]
fn draw_no_bet_excludes_draw() {
    let outcome = ThreeWay {
        home: 0.5,
        draw: 0.3,
        away: 0.2,
    };
    let dnb = draw_no_bet(&outcome);
    assert_float_absolute_eq!(0.5 / 0.7, dnb.home, 1e-12);
    assert_float_absolute_eq!(0.2 / 0.7, dnb.away, 1e-12);
}

#[test]
fn draw_no_bet_certain_draw() {
    let outcome = ThreeWay {
        home: 0.0,
        draw: 1.0,
        away: 0.0,
    };
    assert_eq!(DrawNoBet::default(), draw_no_bet(&outcome));
}

#[test]
fn corners_model() {
    let snapshot = snapshot_at(0);
    let phase = Phase::at(0.0);
    let corners = AuxiliaryModel::corners(&snapshot, &phase, 1.0);
    assert_eq!(0.0, corners.observed);
    assert_float_absolute_eq!(CORNERS_PER_90_REMAINING, corners.expected_remaining, 1e-12);
    assert_eq!(8.5, corners.line);

    let strict = AuxiliaryModel::corners(&snapshot, &phase, 1.5);
    assert!(strict.expected_remaining > corners.expected_remaining);
}

#[test]
fn corners_floor() {
    let mut snapshot = snapshot_at(80);
    snapshot.home.corners = 7;
    snapshot.away.corners = 5;
    let corners = AuxiliaryModel::corners(&snapshot, &Phase::at(80.0), 1.0);
    assert_eq!(12.0, corners.observed);
    assert_eq!(CORNERS_FLOOR, corners.expected_remaining);
}

#[test]
fn cards_count_reds_twice() {
    let mut snapshot = snapshot_at(30);
    snapshot.home.yellow_cards = 1;
    snapshot.away.red_cards = 1;
    let cards = AuxiliaryModel::cards(&snapshot, &Phase::at(30.0), 1.0);
    assert_eq!(3.0, cards.observed);
    assert_eq!(4.5, cards.line);
    assert_eq!(CARDS_FLOOR, cards.expected_remaining);
}

#[test]
fn auxiliary_over_under_complement() {
    let corners = AuxiliaryModel {
        observed: 0.0,
        expected_remaining: 9.0,
        line: 8.5,
    };
    let over_under = corners.over_under(CORNERS_MAX_K);
    assert!(over_under.over > 0.4 && over_under.over < 0.6);
    assert_float_absolute_eq!(1.0, over_under.over + over_under.under, 1e-12);
}

#[test]
fn markets_map_visits_every_key() {
    let snapshot = snapshot_at(30);
    let markets = derive(
        &snapshot,
        &intensity::estimate(&snapshot, &Config::default()),
        &scoregrid::build(&PerSide::new(1.0, 0.8), 0.12),
        1.0,
    )
    .markets;
    assert_eq!(markets, markets.map(|_, prob| prob));

    let mut visited = Vec::new();
    let halves = markets.map(|key, _| {
        visited.push(key);
        0.5
    });
    visited.sort();
    assert_eq!(MarketKey::iter().collect::<Vec<_>>(), visited);
    for key in MarketKey::iter() {
        assert_eq!(0.5, halves.get(key));
    }
}

#[test]
fn derive_kickoff() {
    let snapshot = snapshot_at(0);
    let intensity = intensity::estimate(&snapshot, &Config::default());
    let distribution = scoregrid::build(&intensity.lambdas, Config::default().dixon_coles_tau);
    let derivation = derive(&snapshot, &intensity, &distribution, 1.0);
    let markets = &derivation.markets;

    let outcome = markets.match_outcome;
    assert_sums_to_one(&[outcome.home, outcome.draw, outcome.away], 1e-9);
    assert!(outcome.home > outcome.away);
    assert_float_absolute_eq!(outcome.home + outcome.draw, markets.double_chance.home_or_draw, 1e-12);
    assert_float_absolute_eq!(1.0, markets.draw_no_bet.home + markets.draw_no_bet.away, 1e-12);
    assert!(markets.goals_2_5.over > markets.goals_3_5.over);
    assert_float_absolute_eq!(1.0, markets.both_teams_to_score.yes + markets.both_teams_to_score.no, 1e-12);

    let probs: Vec<_> = MarketKey::iter().map(|key| markets.get(key)).collect();
    assert_unit_interval(&probs);

    assert_eq!(CORRECT_SCORE_COUNT, derivation.correct_scores.len());
    assert_eq!(Score::new(1, 1), derivation.correct_scores[0].score);
}
