use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use inplay::file::{read_json_async, write_json};
use inplay_soccer::calibration::CalibrationCell;
use inplay_soccer::domain::{MatchSnapshot, Side};
use inplay_soccer::history::{History, PredictionRecord};
use inplay_soccer::model;
use inplay_soccer::model::Prediction;
use inplay_soccer::print;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the match snapshot from
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// calibration curves; raw probabilities are used if absent
    #[clap(short = 'c', long, default_value = "calibration.json")]
    calibration: PathBuf,

    /// file holding the recent predictions
    #[clap(long, default_value = "history.json")]
    history: PathBuf,

    /// list the recent predictions
    #[clap(short = 'l', long)]
    list: bool,

    /// discard the recent predictions
    #[clap(long)]
    clear_history: bool,

    /// write the full prediction to a JSON file
    #[clap(short = 'x', long)]
    export: Option<PathBuf>,

    /// print the intermediate factors
    #[clap(short = 'd', long)]
    diagnostics: bool,

    /// print the prediction as JSON instead of tables
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.file.is_none() && !self.list && !self.clear_history {
            bail!("one of -f, -l or --clear-history must be specified");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let cell = Arc::new(CalibrationCell::default());
    let load = cell.spawn_load(&args.calibration);

    let mut history = History::load(&args.history)?;
    if args.clear_history {
        history.clear();
        history.save(&args.history)?;
        info!("cleared history at {}", args.history.display());
    }
    if args.list {
        print_history(&history);
    }

    let Some(file) = &args.file else {
        return Ok(());
    };
    let snapshot: MatchSnapshot = read_json_async(file).await?;
    info!(
        "{} v {}, minute {}",
        snapshot.team_name(Side::Home),
        snapshot.team_name(Side::Away),
        snapshot.minute()
    );

    // one-shot runs score against the completed load
    load.await?;
    let calibration = cell.snapshot();
    let prediction = model::predict(&snapshot, &calibration);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        print_prediction(&snapshot, &prediction, args.diagnostics || snapshot.diagnostics);
    }

    if let Some(export) = &args.export {
        write_json(export, &prediction)?;
        info!("exported prediction to {}", export.display());
    }

    history.push(PredictionRecord::new(&snapshot, &prediction)?);
    history.save(&args.history)?;
    debug!("history holds {} records", history.len());
    Ok(())
}

fn print_prediction(snapshot: &MatchSnapshot, prediction: &Prediction, diagnostics: bool) {
    let console = Console::default();
    println!(
        "{} {}-{} {} ({}')",
        snapshot.team_name(Side::Home),
        snapshot.home.goals(),
        snapshot.away.goals(),
        snapshot.team_name(Side::Away),
        snapshot.minute()
    );
    println!(
        "{}",
        console.render(&print::tabulate_markets(&prediction.raw, &prediction.calibrated))
    );
    println!("{}", console.render(&print::tabulate_correct_scores(&prediction.correct_scores)));
    if prediction.tips.is_empty() {
        println!("No tips clear their confidence threshold");
    } else {
        println!("{}", console.render(&print::tabulate_tips(&prediction.tips)));
    }
    if diagnostics {
        println!(
            "{}",
            console.render(&print::tabulate_scoregrid(&prediction.distribution.joint, &snapshot.score()))
        );
        println!("{}", console.render(&print::tabulate_diagnostics(&prediction.meta)));
    }
}

fn print_history(history: &History) {
    if history.is_empty() {
        println!("No recent predictions");
        return;
    }
    for record in history.records() {
        let snapshot = &record.snapshot;
        println!(
            "{} [{}] {} {}-{} {} ({}')",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            snapshot.team_name(Side::Home),
            snapshot.home.goals(),
            snapshot.away.goals(),
            snapshot.team_name(Side::Away),
            snapshot.minute()
        );
    }
}
