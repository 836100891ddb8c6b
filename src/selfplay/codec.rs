//! Position packing and the fixed-width record layouts of the training corpus.
//!
//! Squares are indexed a1 = 0 .. h8 = 63. Each square is one nibble: 0 empty,
//! 1..=6 white pawn..king, 9..=14 black pawn..king. Even squares take the low
//! nibble of their byte, odd squares the high nibble.

use cozy_chess::{Color, Piece, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board::Position;
use crate::error::DatagenError;

pub const BOARD_BYTES: usize = 32;
pub const PACKED_RECORD_SIZE: usize = BOARD_BYTES + 2 + 2 + 1 + 1;
pub const HASH_RECORD_SIZE: usize = 8 + 2 + 2 + 1 + 1;

pub type PackedBoard = [u8; BOARD_BYTES];

/// One recorded ply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSample {
    pub board: PackedBoard,
    /// Position key, kept for the hash record layout.
    pub key: u64,
    /// 0 white, 1 black.
    pub side: u8,
    /// Engine score before the move, side to move relative.
    pub score: i16,
    pub mv: u16,
    /// Game outcome from White's point of view, stamped once the game ends.
    pub result: i8,
}

pub fn piece_code(color: Color, piece: Piece) -> u8 {
    let base = piece as u8 + 1;
    if color == Color::White { base } else { base | 0x8 }
}

pub fn piece_from_code(code: u8) -> Option<(Color, Piece)> {
    let color = if code & 0x8 == 0 { Color::White } else { Color::Black };
    let piece = match code & 0x7 {
        1 => Piece::Pawn,
        2 => Piece::Knight,
        3 => Piece::Bishop,
        4 => Piece::Rook,
        5 => Piece::Queen,
        6 => Piece::King,
        _ => return None,
    };
    Some((color, piece))
}

pub fn side_code(color: Color) -> u8 { if color == Color::White { 0 } else { 1 } }

pub fn pack_squares(squares: &[Option<(Color, Piece)>; 64]) -> PackedBoard {
    let mut out = [0u8; BOARD_BYTES];
    for (i, sq) in squares.iter().enumerate() {
        let nib = sq.map_or(0, |(c, p)| piece_code(c, p));
        if i % 2 == 0 { out[i / 2] |= nib; } else { out[i / 2] |= nib << 4; }
    }
    out
}

pub fn unpack_squares(board: &PackedBoard) -> [Option<(Color, Piece)>; 64] {
    let mut out = [None; 64];
    for (i, slot) in out.iter_mut().enumerate() {
        let byte = board[i / 2];
        let nib = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
        *slot = piece_from_code(nib);
    }
    out
}

pub fn encode(pos: &Position) -> (PackedBoard, u8) {
    let mut squares = [None; 64];
    for sq in Square::ALL {
        squares[sq as usize] = pos.piece_on(sq);
    }
    (pack_squares(&squares), side_code(pos.side_to_move()))
}

pub fn decode(board: &PackedBoard, side: u8) -> ([Option<(Color, Piece)>; 64], Color) {
    (unpack_squares(board), if side == 0 { Color::White } else { Color::Black })
}

/// FEN piece-placement field for a decoded board.
pub fn placement(squares: &[Option<(Color, Piece)>; 64]) -> String {
    let mut s = String::with_capacity(72);
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            match squares[rank * 8 + file] {
                None => empty += 1,
                Some((c, p)) => {
                    if empty > 0 { s.push(char::from(b'0' + empty)); empty = 0; }
                    let ch = b"pnbrqk"[p as usize] as char;
                    s.push(if c == Color::White { ch.to_ascii_uppercase() } else { ch });
                }
            }
        }
        if empty > 0 { s.push(char::from(b'0' + empty)); }
        if rank > 0 { s.push('/'); }
    }
    s
}

/// A fixed-width serialisation of [`PositionSample`].
pub trait RecordCodec {
    fn record_size(&self) -> usize;
    fn encode_into(&self, sample: &PositionSample, out: &mut Vec<u8>);
    /// `bytes` must hold exactly `record_size()` bytes.
    fn decode(&self, bytes: &[u8]) -> PositionSample;
}

/// 32-byte packed board, score, move, result, side: 38 bytes.
pub struct PackedCodec;

/// Position key, score, move, result, side: 14 bytes.
pub struct HashCodec;

impl RecordCodec for PackedCodec {
    fn record_size(&self) -> usize { PACKED_RECORD_SIZE }

    fn encode_into(&self, s: &PositionSample, out: &mut Vec<u8>) {
        out.extend_from_slice(&s.board);
        out.extend_from_slice(&s.score.to_le_bytes());
        out.extend_from_slice(&s.mv.to_le_bytes());
        out.push(s.result as u8);
        out.push(s.side);
    }

    fn decode(&self, b: &[u8]) -> PositionSample {
        let mut board = [0u8; BOARD_BYTES];
        board.copy_from_slice(&b[0..32]);
        PositionSample {
            board,
            key: 0,
            score: i16::from_le_bytes([b[32], b[33]]),
            mv: u16::from_le_bytes([b[34], b[35]]),
            result: b[36] as i8,
            side: b[37],
        }
    }
}

impl RecordCodec for HashCodec {
    fn record_size(&self) -> usize { HASH_RECORD_SIZE }

    fn encode_into(&self, s: &PositionSample, out: &mut Vec<u8>) {
        out.extend_from_slice(&s.key.to_le_bytes());
        out.extend_from_slice(&s.score.to_le_bytes());
        out.extend_from_slice(&s.mv.to_le_bytes());
        out.push(s.result as u8);
        out.push(s.side);
    }

    fn decode(&self, b: &[u8]) -> PositionSample {
        let mut key = [0u8; 8];
        key.copy_from_slice(&b[0..8]);
        PositionSample {
            board: [0u8; BOARD_BYTES],
            key: u64::from_le_bytes(key),
            score: i16::from_le_bytes([b[8], b[9]]),
            mv: u16::from_le_bytes([b[10], b[11]]),
            result: b[12] as i8,
            side: b[13],
        }
    }
}

/// Record layout for a whole output file; one file never mixes layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Packed,
    Hash,
}

impl RecordFormat {
    pub fn codec(self) -> &'static dyn RecordCodec {
        match self {
            RecordFormat::Packed => &PackedCodec,
            RecordFormat::Hash => &HashCodec,
        }
    }

    pub fn record_size(self) -> usize { self.codec().record_size() }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { RecordFormat::Packed => "packed", RecordFormat::Hash => "hash" })
    }
}

impl FromStr for RecordFormat {
    type Err = DatagenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packed" => Ok(RecordFormat::Packed),
            "hash" => Ok(RecordFormat::Hash),
            other => Err(DatagenError::UnknownFormat(other.to_string())),
        }
    }
}
