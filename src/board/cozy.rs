use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Square};
use shakmaty::fen::Fen;
use shakmaty::san::{SanError, SanPlus};
use shakmaty::{CastlingMode, Chess};

use crate::board::PositionError;
use crate::search::zobrist;

/// Why a position is adjudicated drawn without being played out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoves,
    Repetition,
    InsufficientMaterial,
}

/// Game position plus the history needed for repetition detection.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    // key of every position reached so far, current one last
    keys: Vec<u64>,
    moves: Vec<String>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        CozyBoard::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| PositionError::Fen(format!("{e:?}")))
    }

    fn from_board(board: CozyBoard) -> Self {
        let key = zobrist::compute(&board);
        Self { board, keys: vec![key], moves: Vec::new() }
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn key(&self) -> u64 { *self.keys.last().unwrap_or(&0) }

    /// Plies played since this position was set up.
    pub fn ply_count(&self) -> usize { self.moves.len() }

    /// Played moves in standard UCI notation.
    pub fn moves(&self) -> &[String] { &self.moves }

    pub fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        match (self.board.color_on(sq), self.board.piece_on(sq)) {
            (Some(c), Some(p)) => Some((c, p)),
            _ => None,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut out = Vec::with_capacity(64);
        self.board.generate_moves(|ml| { out.extend(ml); false });
        out
    }

    pub fn legal_moves_count(&self) -> usize {
        let mut ct = 0usize;
        self.board.generate_moves(|moves| { ct += moves.len(); false });
        ct
    }

    /// Applies a move that must be legal in the current position.
    pub fn play(&mut self, mv: Move) {
        let uci = self.uci(mv);
        self.board.play(mv);
        self.keys.push(zobrist::compute(&self.board));
        self.moves.push(uci);
    }

    /// Resolves a UCI (`e2e4`, `e1g1`, `e7e8q`) or SAN (`Nf3`, `exd5`, `O-O`) token and plays it.
    pub fn play_token(&mut self, token: &str) -> Result<Move, PositionError> {
        let mv = self.parse_token(token)?;
        self.play(mv);
        Ok(mv)
    }

    pub fn parse_token(&self, token: &str) -> Result<Move, PositionError> {
        let legal = self.legal_moves();
        if let Some(&m) = legal.iter().find(|&&m| self.uci(m) == token) {
            return Ok(m);
        }
        let illegal = || PositionError::IllegalToken { token: token.to_string(), fen: self.board.to_string() };
        let san = SanPlus::from_ascii(token.trim_end_matches(['!', '?']).as_bytes()).map_err(|_| illegal())?.san;
        let chess: Chess = Fen::from_ascii(self.board.to_string().as_bytes())
            .map_err(|e| PositionError::Fen(e.to_string()))?
            .into_position(CastlingMode::Standard)
            .map_err(|e| PositionError::Fen(e.to_string()))?;
        let resolved = match san.to_move(&chess) {
            Ok(m) => m,
            Err(SanError::AmbiguousSan) => {
                return Err(PositionError::AmbiguousToken { token: token.to_string(), fen: self.board.to_string() });
            }
            Err(_) => return Err(illegal()),
        };
        let uci = resolved.to_uci(CastlingMode::Standard).to_string();
        legal.into_iter().find(|&m| self.uci(m) == uci).ok_or_else(illegal)
    }

    /// Castling moves are represented king-takes-own-rook.
    pub fn is_castle(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.side_to_move())
    }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        self.board.color_on(mv.to) == Some(!self.side_to_move()) || self.is_en_passant(mv)
    }

    /// Standard UCI rendering (castling as the king's two-square move).
    pub fn uci(&self, mv: Move) -> String {
        if self.is_castle(mv) {
            let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
            let to = Square::new(file, mv.from.rank());
            return format!("{}{}", mv.from, to);
        }
        format!("{}", mv)
    }

    /// 16-bit move code: to | from << 6 | promo << 12 | flag << 14.
    pub fn move_code(&self, mv: Move) -> u16 {
        let mut code = (mv.to as u16) | ((mv.from as u16) << 6);
        if let Some(p) = mv.promotion {
            code |= ((p as u16 - Piece::Knight as u16) & 0x3) << 12;
            code |= 1 << 14;
        } else if self.is_en_passant(mv) {
            code |= 2 << 14;
        } else if self.is_castle(mv) {
            code |= 3 << 14;
        }
        code
    }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn is_checkmate(&self) -> bool { self.in_check() && self.legal_moves_count() == 0 }

    pub fn is_stalemate(&self) -> bool { !self.in_check() && self.legal_moves_count() == 0 }

    pub fn draw_reason(&self) -> Option<DrawReason> {
        if self.board.halfmove_clock() >= 100 && !self.is_checkmate() {
            return Some(DrawReason::FiftyMoves);
        }
        if self.repetitions() >= 3 {
            return Some(DrawReason::Repetition);
        }
        if self.insufficient_material() {
            return Some(DrawReason::InsufficientMaterial);
        }
        None
    }

    /// Occurrences of the current position since the last irreversible move.
    pub fn repetitions(&self) -> usize { self.occurrences(self.key()) }

    /// How often `key` was reached since the last irreversible move, current position included.
    pub fn occurrences(&self, key: u64) -> usize {
        let window = (self.board.halfmove_clock() as usize + 1).min(self.keys.len());
        self.keys[self.keys.len() - window..].iter().filter(|&&k| k == key).count()
    }

    fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() { return false; }
        let minors = b.pieces(Piece::Knight) | b.pieces(Piece::Bishop);
        minors.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn san_and_uci_tokens_resolve_to_same_move() {
        let pos = Position::startpos();
        assert_eq!(pos.parse_token("e4").unwrap(), pos.parse_token("e2e4").unwrap());
        assert_eq!(pos.parse_token("Nf3").unwrap(), pos.parse_token("g1f3").unwrap());
    }

    #[test]
    fn castling_token_and_code() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let short = pos.parse_token("O-O").unwrap();
        assert_eq!(pos.uci(short), "e1g1");
        assert_eq!(pos.parse_token("e1g1").unwrap(), short);
        assert_eq!(pos.move_code(short) >> 14, 3);
        let long = pos.parse_token("O-O-O").unwrap();
        assert_eq!(pos.uci(long), "e1c1");
        pos.play(short);
        assert_eq!(pos.moves(), &["e1g1".to_string()]);
    }

    #[test]
    fn promotion_code_carries_piece() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/k7/7K w - - 0 1").unwrap();
        let q = pos.parse_token("e8=Q").unwrap();
        let n = pos.parse_token("e7e8n").unwrap();
        assert_eq!(pos.move_code(q) >> 12, 0b0111);
        assert_eq!(pos.move_code(n) >> 12, 0b0100);
        assert_eq!(pos.move_code(q) & 0x3f, Square::E8 as u16);
    }

    #[test]
    fn knight_shuffle_is_threefold() {
        let mut pos = Position::startpos();
        for _ in 0..2 {
            for t in ["Nf3", "Nf6", "Ng1", "Ng8"] { pos.play_token(t).unwrap(); }
        }
        assert_eq!(pos.draw_reason(), Some(DrawReason::Repetition));
    }

    #[test]
    fn bare_kings_are_insufficient() {
        let pos = Position::from_fen("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(pos.draw_reason(), Some(DrawReason::InsufficientMaterial));
        let pos = Position::from_fen("k7/8/8/8/8/8/8/1R5K w - - 0 1").unwrap();
        assert_eq!(pos.draw_reason(), None);
    }

    #[test]
    fn bad_token_is_an_error() {
        let pos = Position::startpos();
        assert!(matches!(pos.parse_token("e5"), Err(PositionError::IllegalToken { .. })));
        assert!(matches!(pos.parse_token("Zz9"), Err(PositionError::IllegalToken { .. })));
    }
}
