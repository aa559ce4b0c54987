//! Latest-position snapshots for restart recovery

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::SnapshotStore;
use crate::error::Result;
use crate::game::GameState;

/// Snapshot kept in a single JSON file, overwritten on every save.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for SnapshotFile {
    fn load(&self) -> Result<Option<GameState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&text)?;
        Ok(Some(state))
    }

    fn save(&self, state: &GameState) -> Result<()> {
        let text = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Snapshot held in memory only. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    slot: Arc<Mutex<Option<GameState>>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: GameState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    pub fn get(&self) -> Option<GameState> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SnapshotStore for MemorySnapshot {
    fn load(&self) -> Result<Option<GameState>> {
        Ok(self.get())
    }

    fn save(&self, state: &GameState) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(state.clone());
        Ok(())
    }
}
