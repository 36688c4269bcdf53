use std::fmt;

use thiserror::Error;

/// What an out-of-range coordinate was trying to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Cell,
    VerticalPassage,
    HorizontalPassage,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Cell => "cell",
            IndexKind::VerticalPassage => "vertical passage",
            IndexKind::HorizontalPassage => "horizontal passage",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("invalid maze dimensions: {reason}")]
    InvalidDimensions { reason: String },

    #[error("{kind} ({row}, {col}) is outside a {rows}x{cols} table")]
    OutOfRange {
        kind: IndexKind,
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
}

impl MazeError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MazeError::InvalidDimensions {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;

impl From<MazeError> for std::io::Error {
    fn from(err: MazeError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}
