use cozy_chess::Color;

use crate::selfplay::codec::PositionSample;

/// Final result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Undetermined,
    Win(Color),
    Draw,
}

impl GameOutcome {
    /// Label from White's point of view: +1 White won, -1 Black won, 0 otherwise.
    pub fn label(self) -> i8 {
        match self {
            GameOutcome::Win(Color::White) => 1,
            GameOutcome::Win(Color::Black) => -1,
            GameOutcome::Draw | GameOutcome::Undetermined => 0,
        }
    }

    pub fn pgn(self) -> &'static str {
        match self {
            GameOutcome::Win(Color::White) => "1-0",
            GameOutcome::Win(Color::Black) => "0-1",
            GameOutcome::Draw => "1/2",
            GameOutcome::Undetermined => "*",
        }
    }
}

/// Stamps every sample of a finished game with the same White-relative label,
/// whatever side was to move in the sample.
pub fn apply(outcome: GameOutcome, samples: &mut [PositionSample]) {
    let label = outcome.label();
    for s in samples.iter_mut() { s.result = label; }
}
