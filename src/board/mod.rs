pub mod cozy;

use thiserror::Error;

pub use cozy::{DrawReason, Position};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("FEN error: {0}")]
    Fen(String),
    #[error("move token `{token}` does not match a legal move in {fen}")]
    IllegalToken { token: String, fen: String },
    #[error("move token `{token}` is ambiguous in {fen}")]
    AmbiguousToken { token: String, fen: String },
}
