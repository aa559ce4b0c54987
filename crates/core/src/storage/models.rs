//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: i64,
    /// Position the game started from.
    pub fen: String,
    pub status: String,
    pub winner: Option<String>,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMove {
    pub id: i64,
    pub game_id: i64,
    pub from_sq: String,
    pub to_sq: String,
    pub move_no: u32,
    pub player: String,
    pub timestamp: u64,
}

/// A committed move about to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMove {
    pub game_id: i64,
    /// History length after the move, starting at 1.
    pub move_no: u32,
    pub player: String,
    pub from_sq: String,
    pub to_sq: String,
}
