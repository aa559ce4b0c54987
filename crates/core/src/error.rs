//! Error types for chess-referee-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("Invalid move notation")]
    InvalidNotation,

    #[error("No piece in source square")]
    EmptySquare,

    #[error("{0}")]
    ShapeViolation(String),

    #[error("Illegal move (Check rules)")]
    IllegalMove,

    #[error("No moves to undo")]
    NothingToUndo,

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by the request itself. These never change game
    /// state and the caller may retry with a corrected move.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidSquare(_)
                | Error::InvalidNotation
                | Error::EmptySquare
                | Error::ShapeViolation(_)
                | Error::IllegalMove
                | Error::NothingToUndo
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
