//! Server configuration from environment variables

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

const DEFAULT_DB_PATH: &str = "chess.db";
const DEFAULT_SNAPSHOT_PATH: &str = "game_state.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the games and moves tables (`CHESS_DB_PATH`).
    pub db_path: PathBuf,
    /// JSON snapshot file (`CHESS_SNAPSHOT_PATH`). `None` when set to an
    /// empty string, which keeps snapshots in memory only.
    pub snapshot_path: Option<PathBuf>,
    /// Listen address (`CHESS_BIND_ADDR`).
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("CHESS_DB_PATH")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let snapshot_path = match lookup("CHESS_SNAPSHOT_PATH") {
            Some(p) if p.is_empty() => None,
            Some(p) => Some(PathBuf::from(p)),
            None => Some(PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
        };

        let default_addr: SocketAddr = ([127, 0, 0, 1], 3000).into();
        let bind_addr = match lookup("CHESS_BIND_ADDR") {
            Some(addr) => addr.parse().unwrap_or_else(|_| {
                warn!(%addr, "invalid CHESS_BIND_ADDR, using {}", DEFAULT_BIND_ADDR);
                default_addr
            }),
            None => default_addr,
        };

        Self {
            db_path: PathBuf::from(db_path),
            snapshot_path,
            bind_addr,
        }
    }
}
