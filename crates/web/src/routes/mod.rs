use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use chess_referee_core::{Error, GameState};

use crate::AppState;

pub mod games;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/validate_move", post(validate_move))
        .route("/move", post(validate_move))
        .route("/state", get(get_state))
        .route("/board", get(get_state))
        .route("/reset", post(reset))
        .route("/undo", post(undo))
        .route("/endgame", get(endgame))
        .route("/history", get(history))
        .route("/evaluate", get(evaluate))
        .route("/best_move", get(best_move))
        .route("/games", get(games::games_list))
        .route("/games/:id/moves", get(games::game_moves))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================================
// REQUEST / RESPONSE BODIES
// ============================================================================

/// Accepts both `from`/`to` and the `from_square`/`to_square` names the
/// board frontend sends.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(alias = "from_square")]
    pub from: String,
    #[serde(alias = "to_square")]
    pub to: String,
    #[serde(default)]
    pub promotion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<GameState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub state: GameState,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<String>,
}

/// Rejections are normal answers; anything else is a server failure.
fn status_for(err: &Error) -> StatusCode {
    if err.is_rejection() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: Error) -> Response {
    if !err.is_rejection() {
        error!(error = %err, "request failed");
    }
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn validate_move(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => {
            debug!(%rejection, "malformed move request");
            let body = MoveResponse {
                valid: false,
                state: None,
                error: Some("Invalid request format".to_string()),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let result = state
        .lock_game()
        .make_move(&req.from, &req.to, req.promotion.as_deref());

    match result {
        Ok(game_state) => Json(MoveResponse {
            valid: true,
            state: Some(game_state),
            error: None,
        })
        .into_response(),
        Err(err) => {
            if !err.is_rejection() {
                error!(error = %err, "move failed");
            }
            let body = MoveResponse {
                valid: false,
                state: None,
                error: Some(err.to_string()),
            };
            (status_for(&err), Json(body)).into_response()
        }
    }
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.lock_game().get_state())
}

pub async fn reset(State(state): State<Arc<AppState>>) -> Response {
    match state.lock_game().reset() {
        Ok(game_state) => Json(StatusResponse {
            status: "reset",
            state: game_state,
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Response {
    match state.lock_game().undo() {
        Ok(game_state) => Json(StatusResponse {
            status: "undone",
            state: game_state,
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn endgame(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.lock_game().detect_endgame())
}

pub async fn history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HistoryResponse {
        history: state.lock_game().history(),
    })
}

pub async fn evaluate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.lock_game().evaluate_board())
}

pub async fn best_move(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.lock_game().suggest_best_move())
}

pub async fn health() -> &'static str {
    "OK"
}
