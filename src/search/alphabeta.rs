use cozy_chess::{Board, Color, Move, Piece};
use crate::board::Position;
use crate::search::eval::{eval_cp, piece_value, DRAW_SCORE, MATE_SCORE, MAX_PLY};
use crate::search::tt::{Bound, Entry, Tt};
use crate::search::zobrist;
use crate::search::{RootMove, SearchEngine};

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub max_depth: u32,
    pub tt_entries: usize,
    pub use_killers: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { max_depth: 64, tt_entries: 1 << 16, use_killers: true }
    }
}

/// Iterative-deepening alpha-beta that scores every root move with a full window.
pub struct Searcher {
    tt: Tt,
    params: SearchParams,
    nodes: u64,
    node_limit: u64,
    stopped: bool,
    killers: Vec<[Option<Move>; 2]>,
}

impl Default for Searcher {
    fn default() -> Self { Self::new(SearchParams::default()) }
}

impl Searcher {
    pub fn new(params: SearchParams) -> Self {
        Self {
            tt: Tt::with_entries(params.tt_entries),
            params,
            nodes: 0,
            node_limit: u64::MAX,
            stopped: false,
            killers: vec![[None, None]; MAX_PLY as usize],
        }
    }

    pub fn nodes(&self) -> u64 { self.nodes }

    /// Ranks all legal root moves, best first.
    ///
    /// Depth 1 always completes; deeper iterations stop once `node_budget`
    /// nodes have been visited and an unfinished iteration is discarded.
    pub fn search_ranked(&mut self, pos: &Position, node_budget: u64) -> Vec<RootMove> {
        let board = pos.board();
        self.nodes = 0;
        self.stopped = false;
        self.node_limit = u64::MAX;
        for k in &mut self.killers { *k = [None, None]; }

        let mut ranked: Vec<RootMove> = pos.legal_moves().into_iter()
            .map(|mv| RootMove { mv, score: -MATE_SCORE, pv: vec![mv] })
            .collect();
        if ranked.is_empty() { return ranked; }
        if let Some(ttm) = self.tt.get(pos.key()).and_then(|e| e.best) {
            if let Some(i) = ranked.iter().position(|r| r.mv == ttm) { ranked.swap(0, i); }
        }

        for depth in 1..=self.params.max_depth.max(1) {
            self.tt.bump_generation();
            if depth > 1 { self.node_limit = node_budget; }
            let mut iteration: Vec<RootMove> = Vec::with_capacity(ranked.len());
            for rm in &ranked {
                let mut child = board.clone();
                child.play(rm.mv);
                let score = if pos.occurrences(zobrist::compute(&child)) >= 2 {
                    DRAW_SCORE
                } else {
                    -self.alphabeta(&child, depth - 1, -MATE_SCORE, MATE_SCORE, 1)
                };
                if self.stopped { break; }
                let mut pv = vec![rm.mv];
                self.extend_pv(&child, depth as usize - 1, &mut pv);
                iteration.push(RootMove { mv: rm.mv, score, pv });
            }
            if self.stopped { break; }
            iteration.sort_by(|a, b| b.score.cmp(&a.score));
            ranked = iteration;
            let best = &ranked[0];
            self.tt.put(Entry { key: pos.key(), depth, score: best.score, best: Some(best.mv), bound: Bound::Exact, gen: 0 });
            log::trace!("depth {} best {} score {} nodes {}", depth, pos.uci(best.mv), best.score, self.nodes);
            if self.nodes >= node_budget || best.score.abs() >= MATE_SCORE - depth as i32 { break; }
        }
        ranked
    }

    fn extend_pv(&self, board: &Board, len: usize, pv: &mut Vec<Move>) {
        let mut b = board.clone();
        for _ in 0..len {
            match self.tt.get(zobrist::compute(&b)).and_then(|e| e.best) {
                Some(m) if b.is_legal(m) => { b.play(m); pv.push(m); }
                _ => break,
            }
        }
    }

    fn check_limit(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes >= self.node_limit { self.stopped = true; }
        self.stopped
    }

    fn alphabeta(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if self.check_limit() { return eval_cp(board); }
        let in_check = !board.checkers().is_empty();
        if depth == 0 {
            if in_check && !has_moves(board) { return -MATE_SCORE + ply; }
            return self.qsearch(board, alpha, beta, ply);
        }
        if board.halfmove_clock() >= 100 { return DRAW_SCORE; }

        let key = zobrist::compute(board);
        let tt_entry = self.tt.get(key);
        if let Some(en) = tt_entry {
            if en.depth >= depth {
                let s = score_from_tt(en.score, ply);
                match en.bound {
                    Bound::Exact => return s,
                    Bound::Lower => if s >= beta { return s; },
                    Bound::Upper => if s <= alpha { return s; },
                }
            }
        }

        let mut moves: Vec<Move> = Vec::with_capacity(64);
        board.generate_moves(|ml| { moves.extend(ml); false });
        if moves.is_empty() {
            return if in_check { -MATE_SCORE + ply } else { DRAW_SCORE };
        }
        let tt_move = tt_entry.and_then(|e| e.best);
        let killers = self.killers.get(ply as usize).copied().unwrap_or([None, None]);
        let use_killers = self.params.use_killers;
        moves.sort_by_key(|&m| {
            if Some(m) == tt_move { return i32::MIN; }
            let cap = mvv_lva(board, m);
            if cap > 0 { return -(100_000 + cap); }
            if use_killers && killers.contains(&Some(m)) { return -50_000; }
            0
        });

        let orig_alpha = alpha;
        let mut best = -MATE_SCORE;
        let mut best_move: Option<Move> = None;
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, ply + 1);
            if self.stopped { return best.max(score); }
            if score > best { best = score; best_move = Some(m); }
            if best > alpha { alpha = best; }
            if alpha >= beta {
                if use_killers && mvv_lva(board, m) == 0 { self.update_killers(ply, m); }
                break;
            }
        }
        let bound = if best <= orig_alpha { Bound::Upper } else if best >= beta { Bound::Lower } else { Bound::Exact };
        self.tt.put(Entry { key, depth, score: score_to_tt(best, ply), best: best_move, bound, gen: 0 });
        best
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        let stand = eval_cp(board);
        if stand >= beta { return beta; }
        if stand > alpha { alpha = stand; }
        if ply >= MAX_PLY - 1 { return alpha; }

        let mut caps: Vec<(i32, Move)> = Vec::new();
        board.generate_moves(|ml| {
            for m in ml {
                let v = mvv_lva(board, m);
                if v > 0 { caps.push((v, m)); }
            }
            false
        });
        caps.sort_by_key(|&(v, _)| -v);
        for (_, m) in caps {
            if self.check_limit() { break; }
            let mut child = board.clone();
            child.play(m);
            let score = -self.qsearch(&child, -beta, -alpha, ply + 1);
            if score >= beta { return beta; }
            if score > alpha { alpha = score; }
        }
        alpha
    }

    fn update_killers(&mut self, ply: i32, m: Move) {
        let Some(slot) = self.killers.get_mut(ply as usize) else { return };
        if slot[0] == Some(m) { return; }
        slot[1] = slot[0];
        slot[0] = Some(m);
    }
}

impl SearchEngine for Searcher {
    fn search(&mut self, pos: &Position, nodes: u64) -> Vec<RootMove> {
        self.search_ranked(pos, nodes)
    }

    fn new_game(&mut self) { self.tt.clear(); }
}

fn has_moves(board: &Board) -> bool {
    let mut any = false;
    board.generate_moves(|ml| { any = !ml.is_empty(); any });
    any
}

// Capture ordering key: victim value scaled above attacker value, 0 for quiet moves.
fn mvv_lva(board: &Board, m: Move) -> i32 {
    let stm: Color = board.side_to_move();
    let attacker = board.piece_on(m.from).map(piece_value).unwrap_or(0);
    let victim = match (board.color_on(m.to), board.piece_on(m.to)) {
        (Some(c), Some(p)) if c != stm => piece_value(p),
        _ if board.piece_on(m.from) == Some(Piece::Pawn) && m.from.file() != m.to.file() => piece_value(Piece::Pawn),
        _ => return if m.promotion.is_some() { 1 } else { 0 },
    };
    victim * 10 - attacker / 10 + 1
}

fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE - MAX_PLY { score + ply } else if score <= -MATE_SCORE + MAX_PLY { score - ply } else { score }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE - MAX_PLY { score - ply } else if score <= -MATE_SCORE + MAX_PLY { score + ply } else { score }
}
