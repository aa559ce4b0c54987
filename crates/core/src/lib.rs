//! Chess Referee Core Library
//!
//! The authoritative game state for a two-player chess game: move validation,
//! turn and history bookkeeping, end-of-game detection and a naive material
//! evaluator.

pub mod error;
pub mod eval;
pub mod game;
pub mod oracle;
pub mod shape;
pub mod square;
pub mod storage;

pub use error::{Error, Result};
pub use eval::{Evaluation, Suggestion};
pub use game::{EndgameReport, GameManager, GameState, GameStatus};
pub use oracle::{LegalityOracle, MoveDescriptor, ShakmatyOracle};
pub use storage::{Database, MemorySnapshot, MoveLog, SnapshotFile, SnapshotStore};
