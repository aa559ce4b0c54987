//! Database operations

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::*;
use super::MoveLog;
use crate::error::Result;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fen TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ongoing',
                winner TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS moves (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL,
                from_sq TEXT NOT NULL,
                to_sq TEXT NOT NULL,
                move_no INTEGER NOT NULL,
                player TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY (game_id) REFERENCES games(id)
            );

            CREATE INDEX IF NOT EXISTS idx_moves_game_id ON moves(game_id);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn game_from_row(row: &Row<'_>) -> rusqlite::Result<StoredGame> {
        Ok(StoredGame {
            id: row.get(0)?,
            fen: row.get(1)?,
            status: row.get(2)?,
            winner: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn move_from_row(row: &Row<'_>) -> rusqlite::Result<StoredMove> {
        Ok(StoredMove {
            id: row.get(0)?,
            game_id: row.get(1)?,
            from_sq: row.get(2)?,
            to_sq: row.get(3)?,
            move_no: row.get(4)?,
            player: row.get(5)?,
            timestamp: row.get(6)?,
        })
    }

    pub fn insert_game(&self, fen: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO games (fen, status, created_at) VALUES (?1, 'ongoing', ?2)",
            params![fen, Self::now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_move(&self, record: &NewMove) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO moves (game_id, from_sq, to_sq, move_no, player, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.game_id,
                record.from_sq,
                record.to_sq,
                record.move_no,
                record.player,
                Self::now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn set_game_result(&self, game_id: i64, status: &str, winner: Option<&str>) -> Result<()> {
        self.conn.execute(
            "UPDATE games SET status = ?2, winner = ?3 WHERE id = ?1",
            params![game_id, status, winner],
        )?;
        Ok(())
    }

    pub fn get_game(&self, id: i64) -> Result<Option<StoredGame>> {
        let game = self
            .conn
            .query_row(
                "SELECT id, fen, status, winner, created_at FROM games WHERE id = ?1",
                params![id],
                Self::game_from_row,
            )
            .optional()?;
        Ok(game)
    }

    pub fn get_all_games(&self) -> Result<Vec<StoredGame>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, fen, status, winner, created_at FROM games ORDER BY id")?;

        let games = stmt
            .query_map([], Self::game_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    pub fn get_recent_games(&self, limit: u32) -> Result<Vec<StoredGame>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fen, status, winner, created_at FROM games ORDER BY id DESC LIMIT ?1",
        )?;

        let games = stmt
            .query_map(params![limit], Self::game_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// Moves of one game in insertion order. Undone moves stay in the log,
    /// so a `move_no` may appear more than once.
    pub fn get_moves(&self, game_id: i64) -> Result<Vec<StoredMove>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, game_id, from_sq, to_sq, move_no, player, timestamp
            FROM moves WHERE game_id = ?1 ORDER BY id
            "#,
        )?;

        let moves = stmt
            .query_map(params![game_id], Self::move_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(moves)
    }

    pub fn get_all_moves(&self) -> Result<Vec<StoredMove>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, game_id, from_sq, to_sq, move_no, player, timestamp FROM moves ORDER BY id",
        )?;

        let moves = stmt
            .query_map([], Self::move_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(moves)
    }

    pub fn count_games(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_moves(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM moves", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl MoveLog for Database {
    fn create_game(&mut self, fen: &str) -> Result<i64> {
        self.insert_game(fen)
    }

    fn record_move(&mut self, record: &NewMove) -> Result<i64> {
        self.insert_move(record)
    }

    fn set_game_status(&mut self, game_id: i64, status: &str, winner: Option<&str>) -> Result<()> {
        self.set_game_result(game_id, status, winner)
    }
}
