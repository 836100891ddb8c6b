use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::selfplay::codec::RecordFormat;

pub const DEFAULT_NODES: u64 = 3000;
pub const DEFAULT_GAMES: usize = 1000;
pub const DEFAULT_OUT: &str = "selfplay_data.binpack";
pub const DEFAULT_FLUSH_EVERY: usize = 20;

/// Run configuration, built once and passed down by reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatagenConfig {
    /// Node budget per searched move.
    pub nodes: u64,
    pub games: usize,
    pub out: PathBuf,
    pub book: Option<PathBuf>,
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Flush the output after this many completed games.
    pub flush_every: usize,
    pub format: RecordFormat,
    /// Chance (percent) of playing the runner-up in quiet positions.
    pub epsilon_percent: u32,
    /// Top-two score gap (cp) below which the runner-up may be played.
    pub volatility_cp: i32,
    /// Inclusive range of random plies played from the start position.
    pub opening_min: usize,
    pub opening_max: usize,
    pub progress: bool,
}

impl Default for DatagenConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            games: DEFAULT_GAMES,
            out: PathBuf::from(DEFAULT_OUT),
            book: None,
            seed: None,
            flush_every: DEFAULT_FLUSH_EVERY,
            format: RecordFormat::Packed,
            epsilon_percent: 10,
            volatility_cp: 30,
            opening_min: 8,
            opening_max: 12,
            progress: true,
        }
    }
}

fn positive<T: std::str::FromStr + PartialOrd + Default>(tok: Option<&str>) -> Option<T> {
    tok.and_then(|s| s.parse::<T>().ok()).filter(|v| *v > T::default())
}

impl DatagenConfig {
    /// Parses `key value` tokens such as `nodes 5000 games 200 out data.bin book book.txt`.
    ///
    /// Order does not matter, unknown keys are skipped and a missing or
    /// malformed value leaves the default in place.
    pub fn from_options(options: &str) -> Self {
        let mut cfg = Self::default();
        cfg.apply_options(options);
        cfg
    }

    pub fn apply_options(&mut self, options: &str) {
        let mut tokens = options.split_whitespace();
        while let Some(tok) = tokens.next() {
            match tok {
                "nodes" => if let Some(v) = positive(tokens.next()) { self.nodes = v; },
                "games" => if let Some(v) = positive(tokens.next()) { self.games = v; },
                "flush" => if let Some(v) = positive(tokens.next()) { self.flush_every = v; },
                "out" => if let Some(p) = tokens.next() { self.out = PathBuf::from(p); },
                "book" => if let Some(p) = tokens.next() { self.book = Some(PathBuf::from(p)); },
                "seed" => if let Some(v) = tokens.next().and_then(|s| s.parse().ok()) { self.seed = Some(v); },
                "epsilon" => {
                    if let Some(v) = tokens.next().and_then(|s| s.parse::<u32>().ok()).filter(|v| *v <= 100) {
                        self.epsilon_percent = v;
                    }
                }
                "gap" => if let Some(v) = tokens.next().and_then(|s| s.parse::<i32>().ok()).filter(|v| *v >= 0) { self.volatility_cp = v; },
                "format" => match tokens.next().map(str::parse::<RecordFormat>) {
                    Some(Ok(f)) => self.format = f,
                    Some(Err(e)) => log::warn!("{e}; keeping {}", self.format),
                    None => {}
                },
                "opening" => {
                    let lo = tokens.next().and_then(|s| s.parse::<usize>().ok());
                    let hi = tokens.next().and_then(|s| s.parse::<usize>().ok());
                    if let (Some(lo), Some(hi)) = (lo, hi) {
                        if lo <= hi { self.opening_min = lo; self.opening_max = hi; }
                    }
                }
                "progress" => match tokens.next() {
                    Some("on") | Some("true") => self.progress = true,
                    Some("off") | Some("false") => self.progress = false,
                    _ => {}
                },
                other => log::debug!("ignoring option token `{other}`"),
            }
        }
    }
}
