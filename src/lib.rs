// Self-play data generation for PieBot
pub mod board;
pub mod error;
pub mod search;
pub mod selfplay;

pub use error::{DatagenError, Result};
