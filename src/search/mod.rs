pub mod alphabeta;
pub mod eval;
pub mod tt;
pub mod zobrist;

use cozy_chess::Move;
use crate::board::Position;

/// One root candidate as reported by a finished search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootMove {
    pub mv: Move,
    /// Centipawns from the side to move; mate scores are `±(MATE_SCORE - ply)`.
    pub score: i32,
    pub pv: Vec<Move>,
}

/// A search service that ranks the root moves of a position under a node budget.
///
/// `search` blocks until the search is finished. The returned list is ordered
/// best first and is empty when the side to move has no legal moves.
pub trait SearchEngine {
    fn search(&mut self, pos: &Position, nodes: u64) -> Vec<RootMove>;

    /// Called before the first search of every game.
    fn new_game(&mut self) {}
}
