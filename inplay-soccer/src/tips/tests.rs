use super::*;
use inplay::interval::DEFAULT_Z;

fn snapshot_at(minute: i32) -> MatchSnapshot {
    MatchSnapshot {
        home_team: "Malmö".into(),
        away_team: "AIK".into(),
        minute,
        ..MatchSnapshot::default()
    }
}

fn auxiliary(expected_remaining: f64, line: f64) -> AuxiliaryModel {
    AuxiliaryModel {
        observed: 0.0,
        expected_remaining,
        line,
    }
}

fn context<'a>(
    snapshot: &'a MatchSnapshot,
    corners: &'a AuxiliaryModel,
    cards: &'a AuxiliaryModel,
    sample_size: f64,
) -> Context<'a> {
    Context {
        snapshot,
        lambda_total: 2.0,
        corners,
        cards,
        sample_size,
        z: DEFAULT_Z,
    }
}

fn labels(tips: &[Tip]) -> Vec<&str> {
    tips.iter().map(|tip| tip.label.as_str()).collect()
}

#[test]
fn display() {
    let tip = Tip {
        label: "Malmö to win".into(),
        probability: 0.6234,
        lower_bound: Some(0.58),
    };
    assert_eq!("Malmö to win (62.3%)", tip.to_string());
}

#[test]
fn goal_framing() {
    assert_eq!(GoalFraming::First, GoalFraming::of(&Score::nil_all()));
    assert_eq!(GoalFraming::Next, GoalFraming::of(&Score::new(0, 1)));
}

#[test]
fn probability_alone_is_not_enough() {
    let snapshot = snapshot_at(30);
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut markets = Markets::default();
    markets.match_outcome.home = 0.6;

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert!(tips.is_empty(), "{tips:?}");

    markets.match_outcome.home = 0.8;
    let tips = generate(&context(&snapshot, &corners, &cards, 10.0), &markets, &[], MAX_TIPS);
    assert!(tips.is_empty(), "{tips:?}");

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Malmö to win"], labels(&tips));
    let lower_bound = tips[0].lower_bound.unwrap();
    assert!(lower_bound > RESULT_THRESHOLD && lower_bound < 0.8);
}

#[test]
fn thresholds_differ_by_market() {
    let snapshot = snapshot_at(30);
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut markets = Markets::default();
    markets.double_chance.home_or_draw = 0.8;
    markets.draw_no_bet.away = 0.72;

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Malmö or draw"], labels(&tips));
}

#[test]
fn draw_only_late() {
    let (corners, cards) = (auxiliary(1.0, 8.5), auxiliary(1.0, 4.5));
    let mut markets = Markets::default();
    markets.match_outcome.draw = 0.9;

    let early = snapshot_at(60);
    let tips = generate(&context(&early, &corners, &cards, 80.0), &markets, &[], MAX_TIPS);
    assert!(tips.is_empty());

    let late = snapshot_at(75);
    let tips = generate(&context(&late, &corners, &cards, 80.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Draw"], labels(&tips));
}

#[test]
fn goal_lines_need_tempo() {
    let snapshot = snapshot_at(20);
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut markets = Markets::default();
    markets.goals_2_5.over = 0.9;

    let mut ctx = context(&snapshot, &corners, &cards, 100.0);
    assert!(generate(&ctx, &markets, &[], MAX_TIPS).is_empty());

    ctx.lambda_total = 2.6;
    assert_eq!(vec!["Over 2.5 further goals"], labels(&generate(&ctx, &markets, &[], MAX_TIPS)));
}

#[test]
fn lines_count_further_goals() {
    let mut snapshot = snapshot_at(40);
    snapshot.home.goals = 2;
    snapshot.away.goals = 1;
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut markets = Markets::default();
    markets.goals_3_5.under = 0.9;

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Under 3.5 further goals"], labels(&tips));
}

#[test]
fn goalscorer_framing() {
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut markets = Markets::default();
    markets.next_goal.home = 0.9;

    let snapshot = snapshot_at(30);
    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Malmö to score the first goal"], labels(&tips));

    let mut snapshot = snapshot_at(30);
    snapshot.away.goals = 1;
    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert_eq!(vec!["Malmö to score the next goal"], labels(&tips));

    let snapshot = snapshot_at(85);
    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &[], MAX_TIPS);
    assert!(tips.is_empty());
}

#[test]
fn correct_score_tip() {
    let snapshot = snapshot_at(70);
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let scores = [
        ScoreProbability {
            score: Score::new(1, 0),
            probability: 0.31,
        },
        ScoreProbability {
            score: Score::new(1, 1),
            probability: 0.2,
        },
    ];
    let tips = generate(
        &context(&snapshot, &corners, &cards, 50.0),
        &Markets::default(),
        &scores,
        MAX_TIPS,
    );
    assert_eq!(
        vec![Tip {
            label: "Correct score 1-0".into(),
            probability: 0.31,
            lower_bound: None,
        }],
        tips
    );

    let unlikely = [ScoreProbability {
        score: Score::new(1, 0),
        probability: CORRECT_SCORE_FLOOR,
    }];
    let tips = generate(
        &context(&snapshot, &corners, &cards, 50.0),
        &Markets::default(),
        &unlikely,
        MAX_TIPS,
    );
    assert!(tips.is_empty());
}

#[test]
fn capped_and_ranked() {
    let snapshot = snapshot_at(30);
    let (corners, cards) = (auxiliary(3.0, 8.5), auxiliary(3.0, 4.5));
    let mut step = 0.0;
    let markets = Markets::default().map(|_, _| {
        step += 0.001;
        0.97 + step
    });
    let scores = [ScoreProbability {
        score: Score::new(0, 0),
        probability: 0.5,
    }];

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &scores, MAX_TIPS);
    assert_eq!(MAX_TIPS, tips.len());
    for pair in tips.windows(2) {
        assert!(pair[0].probability >= pair[1].probability, "{tips:?}");
    }
    assert!(tips.iter().all(|tip| tip.lower_bound.is_some()));

    let tips = generate(&context(&snapshot, &corners, &cards, 100.0), &markets, &scores, 2);
    assert_eq!(2, tips.len());
}
