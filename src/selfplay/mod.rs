//! Self-play training data generation.
//!
//! Each game starts from a random or book opening, is played out by the
//! search engine under a fixed node budget and is written to the corpus
//! once its outcome is known.

pub mod codec;
pub mod config;
pub mod game;
pub mod label;
pub mod opening;
pub mod rng;
pub mod writer;

use cozy_chess::Color;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::alphabeta::Searcher;
use crate::search::SearchEngine;
use config::DatagenConfig;
use game::{GameRunner, MovePolicy};
use label::GameOutcome;
use opening::{OpeningBook, OpeningSupplier};
use rng::{RandomSource, SeededRandom};
use writer::RecordWriter;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub games: usize,
    pub samples: u64,
    /// Output file size at the end of the run.
    pub bytes: u64,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: GameOutcome) {
        self.games += 1;
        match outcome {
            GameOutcome::Win(Color::White) => self.white_wins += 1,
            GameOutcome::Win(Color::Black) => self.black_wins += 1,
            GameOutcome::Draw | GameOutcome::Undetermined => self.draws += 1,
        }
    }
}

fn progress_bar(config: &DatagenConfig) -> ProgressBar {
    if !config.progress { return ProgressBar::hidden(); }
    let pb = ProgressBar::new(config.games as u64);
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:30.cyan/blue} game {pos}/{len} | {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Plays `config.games` games with `engine` and appends their samples to `config.out`.
pub fn run<E: SearchEngine + ?Sized>(config: &DatagenConfig, engine: &mut E, rng: &mut dyn RandomSource) -> Result<RunSummary> {
    let book = OpeningBook::load(config.book.as_deref());
    let supplier = OpeningSupplier::new(&book, config.opening_min, config.opening_max);
    let policy = MovePolicy { epsilon_percent: config.epsilon_percent, volatility_cp: config.volatility_cp };
    let mut writer = RecordWriter::open(&config.out, config.format)?;
    log::info!(
        "self-play: {} games, {} nodes/move, {} format, output {} ({} bytes already present)",
        config.games, config.nodes, config.format, writer.path().display(), writer.position()
    );

    let pb = progress_bar(config);
    let mut summary = RunSummary::default();
    let flush_every = config.flush_every.max(1);
    for g in 1..=config.games {
        let opening = supplier.supply(&mut *rng);
        let session = GameRunner::new(&mut *engine, &mut *rng, config.nodes, policy).play(opening);
        writer.append_all(&session.samples)?;
        summary.record(session.outcome);

        log::debug!(
            "game {g}: {} opening plies, {} samples, {} ({:?})",
            session.opening_plies, session.samples.len(), session.outcome.pgn(), session.termination
        );
        pb.set_message(format!(
            "plies {} | res {} | {} KB",
            session.samples.len(), session.outcome.pgn(), writer.position() / 1024
        ));
        pb.inc(1);
        if g % flush_every == 0 { writer.flush()?; }
    }
    summary.samples = writer.records_written();
    summary.bytes = writer.finish()?;
    pb.finish();
    log::info!(
        "run complete: {} games, {} samples, +{} ={} -{}, {} KB",
        summary.games, summary.samples, summary.white_wins, summary.draws, summary.black_wins, summary.bytes / 1024
    );
    Ok(summary)
}

/// Runs with the built-in alpha-beta engine and a seed taken from the config or the clock.
pub fn generate(config: &DatagenConfig) -> Result<RunSummary> {
    let mut rng = SeededRandom::from_seed(config.seed);
    log::info!("rng seed {}", rng.seed());
    let mut engine = Searcher::default();
    run(config, &mut engine, &mut rng)
}
