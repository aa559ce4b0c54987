//! Game state manager
//!
//! Owns the live position (through a [`LegalityOracle`]) and runs every move
//! request through notation, shape and legality checks before committing it
//! and forwarding it to the persistence adapters.

use serde::{Deserialize, Serialize};
use shakmaty::{Color, Role};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::eval::{self, Evaluation, Suggestion};
use crate::oracle::{LegalityOracle, MoveDescriptor, ShakmatyOracle};
use crate::shape::validate_shape;
use crate::square::Coords;
use crate::storage::{MoveLog, NewMove, SnapshotStore};

/// Full view of the game handed to callers and written as the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub fen: String,
    pub turn: String,
    pub legal_moves: Vec<String>,
    pub move_history: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
    Draw,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndgameReport {
    pub status: GameStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

pub struct GameManager<O: LegalityOracle = ShakmatyOracle> {
    oracle: O,
    log: Box<dyn MoveLog>,
    snapshots: Box<dyn SnapshotStore>,
    game_id: i64,
}

impl<O: LegalityOracle> GameManager<O> {
    /// Restores the last snapshot if there is a usable one, otherwise starts
    /// from the initial position. Registers a new game in the move log.
    pub fn initialize(mut log: Box<dyn MoveLog>, snapshots: Box<dyn SnapshotStore>) -> Result<Self> {
        let oracle = restore::<O>(snapshots.as_ref());
        let game_id = log
            .create_game(&oracle.fen())
            .map_err(|e| Error::Persistence(e.to_string()))?;

        info!(
            game_id,
            fen = %oracle.fen(),
            moves = oracle.history().len(),
            "game initialized"
        );

        Ok(Self {
            oracle,
            log,
            snapshots,
            game_id,
        })
    }

    pub fn game_id(&self) -> i64 {
        self.game_id
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn move_count(&self) -> usize {
        self.oracle.history().len()
    }

    /// Validates and commits a move.
    ///
    /// Nothing is mutated until every check has passed, so a rejected move
    /// leaves the position, history and persisted data exactly as they were.
    pub fn make_move(&mut self, from: &str, to: &str, promotion: Option<&str>) -> Result<GameState> {
        let mut mv = MoveDescriptor::parse(from, to, promotion)?;

        let piece = self.oracle.piece_at(mv.from).ok_or(Error::EmptySquare)?;
        let mover = self.oracle.turn();

        let from_coords = Coords::from_square(mv.from);
        let to_coords = Coords::from_square(mv.to);
        if let Err(violation) = validate_shape(piece.role, from_coords, to_coords, mover) {
            debug!(%mv, reason = violation.reason, "move rejected by shape check");
            return Err(violation.into());
        }

        if piece.role == Role::Pawn && mv.promotion.is_none() {
            let last_rank = match piece.color {
                Color::White => 7,
                Color::Black => 0,
            };
            if to_coords.rank() == last_rank {
                mv.promotion = Some(Role::Queen);
            }
        }

        if !self.oracle.is_legal(&mv) {
            debug!(%mv, "move rejected by legality oracle");
            return Err(Error::IllegalMove);
        }

        self.oracle.push(&mv)?;

        let record = NewMove {
            game_id: self.game_id,
            move_no: self.move_count() as u32,
            player: color_name(mover).to_string(),
            from_sq: mv.from.to_string(),
            to_sq: mv.to.to_string(),
        };
        if let Err(e) = self.log.record_move(&record) {
            self.oracle.pop();
            warn!(%mv, error = %e, "move log write failed, move rolled back");
            return Err(Error::Persistence(e.to_string()));
        }

        let report = self.detect_endgame();
        if report.status.is_terminal() {
            info!(game_id = self.game_id, status = report.status.as_str(), "game finished");
            if let Err(e) =
                self.log
                    .set_game_status(self.game_id, report.status.as_str(), report.winner.as_deref())
            {
                warn!(error = %e, "failed to store game result");
            }
        }

        info!(game_id = self.game_id, move_no = record.move_no, %mv, "move committed");

        Ok(self.persist_snapshot())
    }

    pub fn get_state(&self) -> GameState {
        GameState {
            fen: self.oracle.fen(),
            turn: color_name(self.oracle.turn()).to_string(),
            legal_moves: self
                .oracle
                .legal_moves()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            move_history: self.history(),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.oracle.history().iter().map(|m| m.to_string()).collect()
    }

    /// Starts over from the initial position under a new game id. Moves
    /// already logged for the previous game are kept.
    pub fn reset(&mut self) -> Result<GameState> {
        let initial_fen = O::default().fen();
        let game_id = self
            .log
            .create_game(&initial_fen)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        self.oracle.reset();
        self.game_id = game_id;
        info!(game_id, "game reset");

        Ok(self.persist_snapshot())
    }

    /// Takes back the last move in the live position. The move log is
    /// append-only, so the record of the undone move stays. A game whose
    /// deciding move is taken back is stored as ongoing again.
    pub fn undo(&mut self) -> Result<GameState> {
        let was_finished = self.detect_endgame().status.is_terminal();
        let mv = self.oracle.pop().ok_or(Error::NothingToUndo)?;
        info!(game_id = self.game_id, %mv, "move undone");

        if was_finished {
            let status = GameStatus::Ongoing.as_str();
            if let Err(e) = self.log.set_game_status(self.game_id, status, None) {
                warn!(error = %e, "failed to reopen game result");
            }
        }

        Ok(self.persist_snapshot())
    }

    pub fn detect_endgame(&self) -> EndgameReport {
        if self.oracle.is_checkmate() {
            let winner = color_name(self.oracle.turn().other());
            return EndgameReport {
                status: GameStatus::Checkmate,
                message: format!("Checkmate! {} wins.", capitalize(winner)),
                winner: Some(winner.to_string()),
            };
        }

        let (status, message) = if self.oracle.is_stalemate() {
            (GameStatus::Stalemate, "Stalemate! The game is a draw.")
        } else if self.oracle.is_insufficient_material() {
            (GameStatus::Draw, "Draw due to insufficient material.")
        } else if self.oracle.is_check() {
            (GameStatus::Check, "Check!")
        } else {
            (GameStatus::Ongoing, "Game is ongoing.")
        };

        EndgameReport {
            status,
            message: message.to_string(),
            winner: None,
        }
    }

    pub fn evaluate_board(&self) -> Evaluation {
        eval::evaluate(&self.oracle)
    }

    pub fn suggest_best_move(&mut self) -> Suggestion {
        eval::suggest_best_move(&mut self.oracle)
    }

    /// Writes the current state as the snapshot and returns it. A failed
    /// write only costs restart recovery, so it is logged and not returned.
    fn persist_snapshot(&self) -> GameState {
        let state = self.get_state();
        if let Err(e) = self.snapshots.save(&state) {
            warn!(error = %e, "failed to write snapshot");
        }
        state
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn restore<O: LegalityOracle>(snapshots: &dyn SnapshotStore) -> O {
    let state = match snapshots.load() {
        Ok(Some(state)) => state,
        Ok(None) => return O::default(),
        Err(e) => {
            warn!(error = %e, "discarding unreadable snapshot");
            return O::default();
        }
    };

    if let Some(oracle) = replay::<O>(&state) {
        return oracle;
    }

    match O::from_fen(&state.fen) {
        Ok(oracle) => {
            info!("snapshot history does not replay, restoring position only");
            oracle
        }
        Err(e) => {
            warn!(error = %e, "discarding snapshot with invalid position");
            O::default()
        }
    }
}

/// Replays the snapshot history from the initial position. Succeeds only if
/// it lands exactly on the snapshot position.
fn replay<O: LegalityOracle>(state: &GameState) -> Option<O> {
    let mut oracle = O::default();
    for uci in &state.move_history {
        let mv: MoveDescriptor = uci.parse().ok()?;
        oracle.push(&mv).ok()?;
    }
    (oracle.fen() == state.fen).then_some(oracle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, MemorySnapshot, SnapshotFile};
    use shakmaty::{Piece, Square};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Move log that keeps everything in a shared vector and can be told to fail.
    #[derive(Clone, Default)]
    struct RecordingLog {
        games: Arc<Mutex<Vec<String>>>,
        moves: Arc<Mutex<Vec<NewMove>>>,
        results: Arc<Mutex<Vec<(i64, String, Option<String>)>>>,
        fail_moves: Arc<Mutex<bool>>,
    }

    impl RecordingLog {
        fn moves(&self) -> Vec<NewMove> {
            self.moves.lock().unwrap().clone()
        }

        fn set_failing(&self, fail: bool) {
            *self.fail_moves.lock().unwrap() = fail;
        }
    }

    impl MoveLog for RecordingLog {
        fn create_game(&mut self, fen: &str) -> Result<i64> {
            let mut games = self.games.lock().unwrap();
            games.push(fen.to_string());
            Ok(games.len() as i64)
        }

        fn record_move(&mut self, record: &NewMove) -> Result<i64> {
            if *self.fail_moves.lock().unwrap() {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            let mut moves = self.moves.lock().unwrap();
            moves.push(record.clone());
            Ok(moves.len() as i64)
        }

        fn set_game_status(&mut self, game_id: i64, status: &str, winner: Option<&str>) -> Result<()> {
            self.results.lock().unwrap().push((
                game_id,
                status.to_string(),
                winner.map(str::to_string),
            ));
            Ok(())
        }
    }

    fn new_game() -> (GameManager, RecordingLog, MemorySnapshot) {
        let log = RecordingLog::default();
        let snapshots = MemorySnapshot::new();
        let game = GameManager::initialize(Box::new(log.clone()), Box::new(snapshots.clone())).unwrap();
        (game, log, snapshots)
    }

    fn play(game: &mut GameManager, moves: &[&str]) {
        for uci in moves {
            game.make_move(&uci[0..2], &uci[2..4], None).unwrap();
        }
    }

    #[test]
    fn test_fresh_game() {
        let (game, log, _) = new_game();
        let state = game.get_state();
        assert_eq!(state.fen, START_FEN);
        assert_eq!(state.turn, "white");
        assert_eq!(state.legal_moves.len(), 20);
        assert!(state.move_history.is_empty());
        assert_eq!(game.game_id(), 1);
        assert_eq!(log.games.lock().unwrap().as_slice(), &[START_FEN.to_string()]);
    }

    #[test]
    fn test_legal_move_commits_everywhere() {
        let (mut game, log, snapshots) = new_game();

        let state = game.make_move("e2", "e4", None).unwrap();
        assert_eq!(state.turn, "black");
        assert_eq!(state.move_history, vec!["e2e4"]);
        assert_eq!(game.move_count(), 1);

        assert_eq!(
            log.moves(),
            vec![NewMove {
                game_id: 1,
                move_no: 1,
                player: "white".to_string(),
                from_sq: "e2".to_string(),
                to_sq: "e4".to_string(),
            }]
        );
        assert_eq!(snapshots.get(), Some(state));

        game.make_move("e7", "e5", None).unwrap();
        let second = &log.moves()[1];
        assert_eq!(second.move_no, 2);
        assert_eq!(second.player, "black");
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let (mut game, log, snapshots) = new_game();
        play(&mut game, &["e2e4"]);
        let before = game.get_state();
        let snapshot_before = snapshots.get();

        assert!(matches!(game.make_move("e9", "e4", None), Err(Error::InvalidNotation)));
        assert!(matches!(game.make_move("e4", "e5", Some("k")), Err(Error::InvalidNotation)));
        assert!(matches!(game.make_move("e3", "e4", None), Err(Error::EmptySquare)));
        assert!(matches!(
            game.make_move("g8", "g6", None),
            Err(Error::ShapeViolation(reason)) if reason == "Knight moves in an L-shape"
        ));
        // Right shape, wrong side to move.
        assert!(matches!(game.make_move("g1", "f3", None), Err(Error::IllegalMove)));
        // Right shape, blocked by own pawn.
        assert!(matches!(game.make_move("f8", "d6", None), Err(Error::IllegalMove)));

        assert_eq!(game.get_state(), before);
        assert_eq!(snapshots.get(), snapshot_before);
        assert_eq!(log.moves().len(), 1);
    }

    #[test]
    fn test_pawn_capture_shape_needs_a_target() {
        let (mut game, _, _) = new_game();
        assert!(matches!(game.make_move("e2", "f3", None), Err(Error::IllegalMove)));
        assert!(matches!(
            game.make_move("e2", "e5", None),
            Err(Error::ShapeViolation(reason)) if reason == "Pawn move invalid"
        ));
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let (mut game, log, snapshots) = new_game();
        play(&mut game, &["d2d4"]);
        let after_first = game.get_state();
        play(&mut game, &["d7d5"]);

        let state = game.undo().unwrap();
        assert_eq!(state.fen, after_first.fen);
        assert_eq!(state.move_history, vec!["d2d4"]);
        assert_eq!(snapshots.get(), Some(state));
        // The move log is append-only.
        assert_eq!(log.moves().len(), 2);
    }

    #[test]
    fn test_undo_on_fresh_game() {
        let (mut game, _, snapshots) = new_game();
        let before = game.get_state();
        assert!(matches!(game.undo(), Err(Error::NothingToUndo)));
        assert_eq!(game.get_state(), before);
        assert_eq!(snapshots.get(), None);
    }

    #[test]
    fn test_reset_starts_new_game() {
        let (mut game, log, snapshots) = new_game();
        play(&mut game, &["e2e4", "e7e5"]);

        let state = game.reset().unwrap();
        assert_eq!(state.fen, START_FEN);
        assert!(state.move_history.is_empty());
        assert_eq!(game.game_id(), 2);
        assert_eq!(snapshots.get(), Some(state));
        assert_eq!(log.moves().len(), 2);

        play(&mut game, &["d2d4"]);
        let last = log.moves().pop().unwrap();
        assert_eq!((last.game_id, last.move_no), (2, 1));
    }

    #[test]
    fn test_fools_mate() {
        let (mut game, log, _) = new_game();
        assert_eq!(game.detect_endgame().status, GameStatus::Ongoing);
        assert_eq!(game.detect_endgame().message, "Game is ongoing.");

        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        let report = game.detect_endgame();
        assert_eq!(report.status, GameStatus::Checkmate);
        assert_eq!(report.winner.as_deref(), Some("black"));
        assert_eq!(report.message, "Checkmate! Black wins.");

        assert_eq!(
            log.results.lock().unwrap().as_slice(),
            &[(1, "checkmate".to_string(), Some("black".to_string()))]
        );

        let suggestion = game.suggest_best_move();
        assert_eq!(suggestion.best_move, None);
    }

    #[test]
    fn test_undoing_mate_reopens_game() {
        let (mut game, log, _) = new_game();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        game.undo().unwrap();
        assert_eq!(game.detect_endgame().status, GameStatus::Ongoing);
        assert_eq!(
            log.results.lock().unwrap().last(),
            Some(&(1, "ongoing".to_string(), None))
        );

        // Undoing an undecided position does not touch the stored status.
        game.undo().unwrap();
        assert_eq!(log.results.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_undo_reopens_stored_result_in_sqlite() {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let mut game: GameManager =
            GameManager::initialize(Box::new(db.clone()), Box::new(MemorySnapshot::new())).unwrap();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(db.lock().unwrap().get_game(1).unwrap().unwrap().status, "checkmate");

        game.undo().unwrap();
        let row = db.lock().unwrap().get_game(1).unwrap().unwrap();
        assert_eq!(row.status, "ongoing");
        assert_eq!(row.winner, None);
    }

    #[test]
    fn test_check_is_reported() {
        let (mut game, _, _) = new_game();
        play(&mut game, &["e2e4", "f7f6", "d1h5"]);
        let report = game.detect_endgame();
        assert_eq!(report.status, GameStatus::Check);
        assert_eq!(report.message, "Check!");
        assert_eq!(report.winner, None);
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let snapshots = MemorySnapshot::with_state(GameState {
            fen: "8/4P3/8/8/8/8/k7/4K3 w - - 0 1".to_string(),
            ..GameState::default()
        });
        let mut game: GameManager =
            GameManager::initialize(Box::new(RecordingLog::default()), Box::new(snapshots)).unwrap();

        let state = game.make_move("e7", "e8", None).unwrap();
        assert_eq!(state.move_history, vec!["e7e8q"]);
        game.undo().unwrap();

        let state = game.make_move("e7", "e8", Some("N")).unwrap();
        assert_eq!(state.move_history, vec!["e7e8n"]);
    }

    #[test]
    fn test_move_log_failure_rolls_back() {
        let (mut game, log, snapshots) = new_game();
        let before = game.get_state();
        log.set_failing(true);

        assert!(matches!(game.make_move("e2", "e4", None), Err(Error::Persistence(_))));
        assert_eq!(game.get_state(), before);
        assert_eq!(snapshots.get(), None);

        log.set_failing(false);
        assert!(game.make_move("e2", "e4", None).is_ok());
    }

    /// Snapshot store whose writes always fail.
    struct FailingSnapshot;

    impl SnapshotStore for FailingSnapshot {
        fn load(&self) -> Result<Option<GameState>> {
            Ok(None)
        }

        fn save(&self, _state: &GameState) -> Result<()> {
            Err(Error::Io(std::io::Error::other("read-only file system")))
        }
    }

    #[test]
    fn test_snapshot_failure_does_not_fail_operations() {
        let log = RecordingLog::default();
        let mut game: GameManager =
            GameManager::initialize(Box::new(log.clone()), Box::new(FailingSnapshot)).unwrap();

        let state = game.make_move("e2", "e4", None).unwrap();
        assert_eq!(state.move_history, vec!["e2e4"]);
        assert_eq!(log.moves().len(), 1);

        let state = game.undo().unwrap();
        assert!(state.move_history.is_empty());

        let state = game.reset().unwrap();
        assert_eq!(state.fen, START_FEN);
        assert_eq!(game.game_id(), 2);
    }

    #[test]
    fn test_malformed_snapshot_file_falls_back_to_initial_position() {
        let path = std::env::temp_dir().join(format!(
            "chess-referee-game-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();

        let game: GameManager = GameManager::initialize(
            Box::new(RecordingLog::default()),
            Box::new(SnapshotFile::new(&path)),
        )
        .unwrap();
        assert_eq!(game.get_state().fen, START_FEN);
        assert!(game.history().is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_restores_snapshot_with_history() {
        let (mut game, _, snapshots) = new_game();
        play(&mut game, &["e2e4", "c7c5", "g1f3"]);
        let saved = game.get_state();

        let mut restored: GameManager =
            GameManager::initialize(Box::new(RecordingLog::default()), Box::new(snapshots)).unwrap();
        assert_eq!(restored.get_state(), saved);

        let state = restored.undo().unwrap();
        assert_eq!(state.move_history, vec!["e2e4", "c7c5"]);
    }

    #[test]
    fn test_restores_position_without_replayable_history() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let snapshots = MemorySnapshot::with_state(GameState {
            fen: fen.to_string(),
            turn: "white".to_string(),
            legal_moves: Vec::new(),
            move_history: vec!["zz".to_string()],
        });

        let game: GameManager =
            GameManager::initialize(Box::new(RecordingLog::default()), Box::new(snapshots)).unwrap();
        let state = game.get_state();
        assert_eq!(state.fen, fen);
        assert_eq!(state.turn, "white");
        assert!(state.move_history.is_empty());
    }

    #[test]
    fn test_bad_snapshot_falls_back_to_initial_position() {
        let snapshots = MemorySnapshot::with_state(GameState {
            fen: "garbage".to_string(),
            ..GameState::default()
        });
        let game: GameManager =
            GameManager::initialize(Box::new(RecordingLog::default()), Box::new(snapshots)).unwrap();
        assert_eq!(game.get_state().fen, START_FEN);
    }

    #[test]
    fn test_evaluation_through_manager() {
        let (mut game, _, _) = new_game();
        assert_eq!(game.evaluate_board().score, 0);

        play(&mut game, &["e2e4", "d7d5", "e4d5"]);
        let eval = game.evaluate_board();
        assert_eq!(eval.score, 1);
        assert_eq!(eval.evaluation, "White is better (+1)");

        let legal = game.get_state().legal_moves;
        let suggestion = game.suggest_best_move();
        assert!(legal.contains(suggestion.best_move.as_ref().unwrap()));
        assert_eq!(suggestion.best_move.as_deref(), Some("d8d5"));
        assert_eq!(suggestion.evaluation, Some(0));
        assert_eq!(game.get_state().legal_moves, legal);
    }

    #[test]
    fn test_works_with_sqlite_log() {
        let db = Database::open_in_memory().unwrap();
        let mut game: GameManager =
            GameManager::initialize(Box::new(db), Box::new(MemorySnapshot::new())).unwrap();
        play(&mut game, &["e2e4", "e7e5"]);
        assert_eq!(game.move_count(), 2);
    }

    /// Oracle with a scripted board, legal move list and status flags.
    #[derive(Clone)]
    struct ScriptedOracle {
        pieces: HashMap<Square, Piece>,
        legal: Vec<MoveDescriptor>,
        history: Vec<MoveDescriptor>,
        checkmate: bool,
        stalemate: bool,
        insufficient: bool,
    }

    impl Default for ScriptedOracle {
        fn default() -> Self {
            let mut pieces = HashMap::new();
            pieces.insert(Square::E2, Piece { color: Color::White, role: Role::Pawn });
            pieces.insert(Square::G1, Piece { color: Color::White, role: Role::Knight });
            Self {
                pieces,
                legal: vec!["g1f3".parse().unwrap(), "e2e4".parse().unwrap()],
                history: Vec::new(),
                checkmate: false,
                stalemate: false,
                insufficient: false,
            }
        }
    }

    impl LegalityOracle for ScriptedOracle {
        fn from_fen(fen: &str) -> Result<Self> {
            Err(Error::InvalidFen(fen.to_string()))
        }

        fn fen(&self) -> String {
            format!("scripted {}", self.history.len())
        }

        fn turn(&self) -> Color {
            if self.history.len() % 2 == 0 {
                Color::White
            } else {
                Color::Black
            }
        }

        fn piece_at(&self, square: Square) -> Option<Piece> {
            self.pieces.get(&square).copied()
        }

        fn legal_moves(&self) -> Vec<MoveDescriptor> {
            if self.history.is_empty() {
                self.legal.clone()
            } else {
                Vec::new()
            }
        }

        fn push(&mut self, mv: &MoveDescriptor) -> Result<()> {
            if !self.is_legal(mv) {
                return Err(Error::IllegalMove);
            }
            self.history.push(*mv);
            Ok(())
        }

        fn pop(&mut self) -> Option<MoveDescriptor> {
            self.history.pop()
        }

        fn history(&self) -> Vec<MoveDescriptor> {
            self.history.clone()
        }

        fn reset(&mut self) {
            self.history.clear();
        }

        fn is_check(&self) -> bool {
            false
        }

        fn is_checkmate(&self) -> bool {
            self.checkmate
        }

        fn is_stalemate(&self) -> bool {
            self.stalemate
        }

        fn is_insufficient_material(&self) -> bool {
            self.insufficient
        }

        fn count(&self, _color: Color, _role: Role) -> u32 {
            0
        }
    }

    fn scripted_game() -> (GameManager<ScriptedOracle>, RecordingLog, MemorySnapshot) {
        let log = RecordingLog::default();
        let snapshots = MemorySnapshot::new();
        let game =
            GameManager::initialize(Box::new(log.clone()), Box::new(snapshots.clone())).unwrap();
        (game, log, snapshots)
    }

    #[test]
    fn test_oracle_rejection_is_final() {
        let (mut game, log, snapshots) = scripted_game();

        // Shape is fine for a pawn, but the oracle does not list it.
        assert!(matches!(game.make_move("e2", "e3", None), Err(Error::IllegalMove)));
        assert!(log.moves().is_empty());
        assert_eq!(snapshots.get(), None);
        assert_eq!(game.get_state().fen, "scripted 0");

        let state = game.make_move("e2", "e4", None).unwrap();
        assert_eq!(state.fen, "scripted 1");
        assert_eq!(state.turn, "black");
        assert_eq!(log.moves().len(), 1);
    }

    #[test]
    fn test_shape_runs_before_oracle() {
        let (mut game, _, _) = scripted_game();
        assert!(matches!(
            game.make_move("g1", "g3", None),
            Err(Error::ShapeViolation(_))
        ));
    }

    #[test]
    fn test_endgame_priority() {
        let (mut game, _, _) = scripted_game();

        game.oracle.stalemate = true;
        game.oracle.insufficient = true;
        assert_eq!(game.detect_endgame().status, GameStatus::Stalemate);

        game.oracle.stalemate = false;
        let report = game.detect_endgame();
        assert_eq!(report.status, GameStatus::Draw);
        assert_eq!(report.message, "Draw due to insufficient material.");

        game.oracle.checkmate = true;
        let report = game.detect_endgame();
        assert_eq!(report.status, GameStatus::Checkmate);
        assert_eq!(report.winner.as_deref(), Some("black"));
    }

    #[test]
    fn test_scripted_suggestion_takes_first_of_equal_moves() {
        let (mut game, _, _) = scripted_game();
        let suggestion = game.suggest_best_move();
        assert_eq!(suggestion.best_move.as_deref(), Some("g1f3"));
        assert!(game.history().is_empty());
    }
}
