use std::path::PathBuf;
use thiserror::Error;

use crate::board::PositionError;

#[derive(Debug, Error)]
pub enum DatagenError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} holds {len} bytes, not a multiple of the {record_size}-byte record", path.display())]
    Truncated { path: PathBuf, len: u64, record_size: usize },
    #[error("unknown record format `{0}` (expected `packed` or `hash`)")]
    UnknownFormat(String),
    #[error(transparent)]
    Position(#[from] PositionError),
}

pub type Result<T, E = DatagenError> = std::result::Result<T, E>;

impl DatagenError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| DatagenError::Io { action, path, source }
    }
}
