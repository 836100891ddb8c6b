use cozy_chess::{Board, Color, Piece};
use std::sync::OnceLock;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// 12*64 piece-square keys, side, 4 castling keys, 8 en-passant files
const PIECE_KEYS: usize = 12 * 64;
const SIDE: usize = PIECE_KEYS;
const CASTLE: usize = SIDE + 1;
const EP: usize = CASTLE + 4;
const TOTAL: usize = EP + 8;

static TABLE: OnceLock<[u64; TOTAL]> = OnceLock::new();

fn table() -> &'static [u64; TOTAL] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; TOTAL];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

fn piece_index(color: Color, piece: Piece) -> usize {
    (color as usize) * 6 + piece as usize
}

/// Position key over pieces, side to move, castling rights and en-passant file.
pub fn compute(board: &Board) -> u64 {
    let t = table();
    let mut key = 0u64;
    for &color in &Color::ALL {
        for &piece in &Piece::ALL {
            let pi = piece_index(color, piece);
            for sq in board.colored_pieces(color, piece) {
                key ^= t[pi * 64 + sq as usize];
            }
        }
        let rights = board.castle_rights(color);
        let base = CASTLE + (color as usize) * 2;
        if rights.short.is_some() { key ^= t[base]; }
        if rights.long.is_some() { key ^= t[base + 1]; }
    }
    if let Some(file) = board.en_passant() { key ^= t[EP + file as usize]; }
    if board.side_to_move() == Color::Black { key ^= t[SIDE]; }
    key
}
