use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};
use strum::IntoEnumIterator;

use inplay::linear::Matrix;

use crate::calibration::MarketKey;
use crate::domain::{PerSide, Score};
use crate::market::{Markets, ScoreProbability};
use crate::model::Meta;
use crate::tips::Tip;

fn percent(prob: f64) -> String {
    format!("{:.1}%", prob * 100.0)
}

pub fn tabulate_markets(raw: &Markets, calibrated: &Markets) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(14)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Market".into(), "Raw".into(), "Calibrated".into()],
        ));
    for key in MarketKey::iter() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                key.to_string().into(),
                percent(raw.get(key)).into(),
                percent(calibrated.get(key)).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_correct_scores(scores: &[ScoreProbability]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(8)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Score".into(), "Probability".into()],
        ));
    for score in scores {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}-{}", score.score.home, score.score.away).into(),
                percent(score.probability).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_tips(tips: &[Tip]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(30)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Tip".into(), "Probability".into(), "Lower bound".into()],
        ));
    for tip in tips {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                tip.label.clone().into(),
                percent(tip.probability).into(),
                tip.lower_bound.map(percent).unwrap_or_else(|| "-".into()).into(),
            ],
        ));
    }
    table
}

/// Final-score heat map: rows are home goals and columns away goals, offset by the current score.
pub fn tabulate_scoregrid(scoregrid: &Matrix, score: &Score) -> Table {
    let mut cols = vec![Col::new(Styles::default().with(MinWidth(5)).with(Left))];
    cols.extend((0..scoregrid.cols()).map(|_| Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right))));
    let mut header = vec!["".into()];
    header.extend((0..scoregrid.cols()).map(|away_goals| (score.away as usize + away_goals).to_string().into()));
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header));
    for home_goals in 0..scoregrid.rows() {
        let mut cells = vec![(score.home as usize + home_goals).to_string().into()];
        cells.extend(scoregrid[home_goals].iter().map(|prob| percent(*prob).into()));
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

fn push_per_side(table: &mut Table, name: &str, values: &PerSide<f64>) {
    table.push_row(Row::new(
        Styles::default(),
        vec![
            name.into(),
            format!("{:.3}", values.home).into(),
            format!("{:.3}", values.away).into(),
        ],
    ));
}

fn push_scalar(table: &mut Table, name: &str, value: String) {
    table.push_row(Row::new(Styles::default(), vec![name.into(), value.into(), "".into()]));
}

/// Every intermediate factor, listed explicitly.
pub fn tabulate_diagnostics(meta: &Meta) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(18)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Factor".into(), "Home".into(), "Away".into()],
        ));
    let factors = &meta.factors;
    push_per_side(&mut table, "lambda", &meta.lambdas);
    push_per_side(&mut table, "possession", &factors.possession);
    push_per_side(&mut table, "on target", &factors.on_target);
    push_per_side(&mut table, "off target", &factors.off_target);
    push_per_side(&mut table, "efficiency", &factors.efficiency);
    push_per_side(&mut table, "efficiency bonus", &factors.efficiency_bonus);
    push_per_side(&mut table, "corner", &factors.corner);
    push_per_side(&mut table, "card", &factors.card);
    push_per_side(&mut table, "state", &factors.state);
    push_scalar(&mut table, "tempo", format!("{:.3}", factors.tempo_mod));
    push_scalar(&mut table, "time remaining", format!("{:.3}", meta.phase.time_remaining));
    push_scalar(&mut table, "extra time", meta.phase.is_extra_time.to_string());
    push_scalar(&mut table, "max k", meta.max_k.to_string());
    push_scalar(&mut table, "dixon-coles tau", format!("{:.3}", meta.dixon_coles_tau));
    push_scalar(&mut table, "exp. corners", format!("{:.2}", meta.corners.expected_remaining));
    push_scalar(&mut table, "exp. cards", format!("{:.2}", meta.cards.expected_remaining));
    push_scalar(&mut table, "sample size", format!("{:.1}", meta.sample_size));
    push_scalar(&mut table, "z", format!("{:.3}", meta.confidence_z));
    push_scalar(&mut table, "calibration", format!("{:?}", meta.calibration));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::domain::MatchSnapshot;
    use crate::model::predict;
    use stanza::renderer::console::Console;
    use stanza::renderer::Renderer;

    #[test]
    fn render_all_tables() {
        let snapshot = MatchSnapshot {
            minute: 60,
            ..MatchSnapshot::default()
        };
        let prediction = predict(&snapshot, &Calibration::Identity);
        let console = Console::default();

        let markets = console.render(&tabulate_markets(&prediction.raw, &prediction.calibrated));
        assert!(markets.to_string().contains("btts_yes"));

        let scoregrid = console.render(&tabulate_scoregrid(&prediction.distribution.joint, &snapshot.score()));
        assert!(!scoregrid.to_string().is_empty());

        let diagnostics = console.render(&tabulate_diagnostics(&prediction.meta));
        assert!(diagnostics.to_string().contains("tempo"));

        console.render(&tabulate_correct_scores(&prediction.correct_scores));
        console.render(&tabulate_tips(&prediction.tips));
    }
}
