use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use chess_referee_core::{Database, GameManager, MemorySnapshot, SnapshotFile, SnapshotStore};

mod config;
mod routes;

use config::Config;

/// Everything a request handler can touch. The game lock serializes all
/// access to the single live position.
pub struct AppState {
    pub game: Mutex<GameManager>,
    pub db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(db: Database, snapshots: Box<dyn SnapshotStore>) -> chess_referee_core::Result<Self> {
        let db = Arc::new(Mutex::new(db));
        let game = GameManager::initialize(Box::new(Arc::clone(&db)), snapshots)?;
        Ok(Self {
            game: Mutex::new(game),
            db,
        })
    }

    pub fn lock_game(&self) -> MutexGuard<'_, GameManager> {
        self.game
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lock_db(&self) -> MutexGuard<'_, Database> {
        self.db
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let db = Database::open(&config.db_path).expect("Failed to open database");

    let snapshots: Box<dyn SnapshotStore> = match &config.snapshot_path {
        Some(path) => Box::new(SnapshotFile::new(path)),
        None => Box::new(MemorySnapshot::new()),
    };

    let state = Arc::new(AppState::new(db, snapshots).expect("Failed to initialize game"));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    info!(
        db = %config.db_path.display(),
        snapshot = ?config.snapshot_path,
        "Server running at http://{}",
        config.bind_addr
    );

    axum::serve(listener, app).await.expect("Server error");
}
