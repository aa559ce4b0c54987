use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use chess_referee_core::storage::{StoredGame, StoredMove};

use super::error_response;
use crate::AppState;

const RECENT_GAMES: u32 = 50;

#[derive(Debug, Serialize)]
pub struct GameRow {
    pub id: i64,
    pub fen: String,
    pub status: String,
    pub winner: Option<String>,
    pub created_at: u64,
    pub date: String,
}

impl From<StoredGame> for GameRow {
    fn from(g: StoredGame) -> Self {
        let date = chrono::DateTime::from_timestamp(g.created_at as i64, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        GameRow {
            id: g.id,
            fen: g.fen,
            status: g.status,
            winner: g.winner,
            created_at: g.created_at,
            date,
        }
    }
}

pub async fn games_list(State(state): State<Arc<AppState>>) -> Response {
    let result = state.lock_db().get_recent_games(RECENT_GAMES);

    match result {
        Ok(games) => {
            let rows: Vec<GameRow> = games.into_iter().map(GameRow::from).collect();
            Json(rows).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn game_moves(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let db = state.lock_db();

    match db.get_game(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(super::ErrorResponse {
                    error: format!("Game {} not found", id),
                }),
            )
                .into_response()
        }
        Err(err) => return error_response(err),
    }

    match db.get_moves(id) {
        Ok(moves) => Json::<Vec<StoredMove>>(moves).into_response(),
        Err(err) => error_response(err),
    }
}
