use cozy_chess::{Board, Color, Piece, Square};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    board.colored_pieces(color, piece).len() as i32
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    Piece::ALL.iter()
        .map(|&p| (count_piece(board, Color::White, p) - count_piece(board, Color::Black, p)) * piece_value(p))
        .sum()
}

// Material from side-to-move perspective (negamax-friendly)
pub fn material_eval_cp(board: &Board) -> i32 {
    let base = material_eval_cp_side_agnostic(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

// Distance-from-centre bonus for minor pieces, rank bonus for pawns.
fn square_bonus(piece: Piece, color: Color, sq: Square) -> i32 {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    let rel_rank = if color == Color::White { rank } else { 7 - rank };
    let centre = 6 - ((2 * file - 7).abs() + (2 * rank - 7).abs()) / 2;
    match piece {
        Piece::Pawn => rel_rank * 5,
        Piece::Knight => centre * 5,
        Piece::Bishop => centre * 3,
        Piece::Queen => centre,
        _ => 0,
    }
}

/// Static evaluation in centipawns from the side to move.
pub fn eval_cp(board: &Board) -> i32 {
    let mut pst = 0;
    for &color in &Color::ALL {
        let sign = if color == Color::White { 1 } else { -1 };
        for &piece in &Piece::ALL {
            for sq in board.colored_pieces(color, piece) {
                pst += sign * square_bonus(piece, color, sq);
            }
        }
    }
    let white = material_eval_cp_side_agnostic(board) + pst;
    if board.side_to_move() == Color::White { white } else { -white }
}

// Mate scoring helpers
pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
pub const MAX_PLY: i32 = 256;

/// Score proves a forced mate for the side to move.
pub fn is_win(score: i32) -> bool { score >= MATE_SCORE - MAX_PLY }

/// Score proves the side to move gets mated.
pub fn is_loss(score: i32) -> bool { score <= -MATE_SCORE + MAX_PLY }
