//! Persistence: SQLite move log and position snapshots
//!
//! Both adapters only observe the game. Neither ever changes the position.

mod db;
mod models;
mod snapshot;

pub use db::Database;
pub use models::*;
pub use snapshot::{MemorySnapshot, SnapshotFile};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::game::GameState;

/// Append-only record of games and their committed moves.
pub trait MoveLog: Send {
    /// Registers a new game starting from `fen` and returns its id.
    fn create_game(&mut self, fen: &str) -> Result<i64>;

    fn record_move(&mut self, record: &NewMove) -> Result<i64>;

    /// Stores the status of a game: its result once decided, or `ongoing`
    /// again when the deciding move is taken back.
    fn set_game_status(&mut self, game_id: i64, status: &str, winner: Option<&str>) -> Result<()>;
}

/// Single-slot store for the latest game state.
pub trait SnapshotStore: Send {
    fn load(&self) -> Result<Option<GameState>>;

    fn save(&self, state: &GameState) -> Result<()>;
}

fn lock_log<T>(log: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    log.lock()
        .map_err(|_| Error::Persistence("move log lock poisoned".to_string()))
}

/// Lets one log be shared between the game and readers of the same store.
impl<T: MoveLog> MoveLog for Arc<Mutex<T>> {
    fn create_game(&mut self, fen: &str) -> Result<i64> {
        lock_log(self)?.create_game(fen)
    }

    fn record_move(&mut self, record: &NewMove) -> Result<i64> {
        lock_log(self)?.record_move(record)
    }

    fn set_game_status(&mut self, game_id: i64, status: &str, winner: Option<&str>) -> Result<()> {
        lock_log(self)?.set_game_status(game_id, status, winner)
    }
}
