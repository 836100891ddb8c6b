use std::path::Path;

use pgn_reader::{BufferedReader, SanPlus, Skip, Visitor};

use crate::board::Position;
use crate::selfplay::rng::RandomSource;

/// Opening lines, one move sequence per non-empty line of the book file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpeningBook {
    lines: Vec<Vec<String>>,
}

/// Collects the SAN tokens of one line of move text.
#[derive(Default)]
struct LineVisitor {
    tokens: Vec<String>,
}

impl Visitor for LineVisitor {
    type Result = Vec<String>;

    fn begin_game(&mut self) { self.tokens.clear(); }

    fn san(&mut self, san_plus: SanPlus) { self.tokens.push(san_plus.to_string()); }

    fn begin_variation(&mut self) -> Skip { Skip(true) }

    fn end_game(&mut self) -> Self::Result { std::mem::take(&mut self.tokens) }
}

impl OpeningBook {
    /// Parses book text, one line of PGN move text per opening. `#` lines are
    /// comments; move numbers, results and annotations are dropped.
    pub fn parse(text: &str) -> Self {
        let mut visitor = LineVisitor::default();
        let lines = text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| BufferedReader::new_cursor(l.as_bytes()).read_game(&mut visitor).ok().flatten())
            .filter(|l| !l.is_empty())
            .collect();
        Self { lines }
    }

    /// Loads a book; a missing or unreadable file yields an empty book.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Self::default() };
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let book = Self::parse(&text);
                log::info!("loaded {} opening lines from {}", book.len(), path.display());
                book
            }
            Err(e) => {
                log::warn!("opening book {} unavailable ({e}); using random openings", path.display());
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize { self.lines.len() }

    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line(&self, idx: usize) -> &[String] { &self.lines[idx] }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpeningSource {
    Random,
    Book { line: usize },
}

/// Start position of a game plus the plies already consumed reaching it.
#[derive(Clone, Debug)]
pub struct Opening {
    pub position: Position,
    pub plies: usize,
    pub source: OpeningSource,
}

pub struct OpeningSupplier<'a> {
    book: &'a OpeningBook,
    min_plies: usize,
    max_plies: usize,
}

impl<'a> OpeningSupplier<'a> {
    pub fn new(book: &'a OpeningBook, min_plies: usize, max_plies: usize) -> Self {
        Self { book, min_plies, max_plies: max_plies.max(min_plies) }
    }

    pub fn supply(&self, rng: &mut dyn RandomSource) -> Opening {
        if self.book.is_empty() { self.random(rng) } else { self.from_book(rng) }
    }

    fn random(&self, rng: &mut dyn RandomSource) -> Opening {
        let mut position = Position::startpos();
        let target = self.min_plies + rng.next_int(self.max_plies - self.min_plies + 1);
        for _ in 0..target {
            let moves = position.legal_moves();
            if moves.is_empty() { break; }
            let mv = moves[rng.next_int(moves.len())];
            position.play(mv);
        }
        let plies = position.ply_count();
        Opening { position, plies, source: OpeningSource::Random }
    }

    fn from_book(&self, rng: &mut dyn RandomSource) -> Opening {
        let idx = rng.next_int(self.book.len());
        let mut position = Position::startpos();
        for tok in self.book.line(idx) {
            if let Err(e) = position.play_token(tok) {
                log::warn!("book line {idx}: {e}; truncating opening");
                break;
            }
        }
        let plies = position.ply_count();
        Opening { position, plies, source: OpeningSource::Book { line: idx } }
    }
}
