//! Durable snapshot store for the session mapping.
//!
//! The whole mapping is written after every mutating operation as a JSON
//! list of `[id, GameState]` pairs, so a restart reconstructs the registry
//! from the last successful write.

use crate::games::tictactoe::GameState;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// File-backed store for the session mapping.
#[derive(Debug, Clone)]
pub struct GameStore {
    path: PathBuf,
}

impl GameStore {
    /// Creates a store writing to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted mapping.
    ///
    /// A missing or unreadable snapshot yields an empty mapping rather than
    /// a startup error; the next successful write replaces it.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> HashMap<String, GameState> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "No snapshot to load, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<Vec<(String, GameState)>>(&data) {
            Ok(entries) => {
                info!(count = entries.len(), "Sessions loaded from snapshot");
                entries.into_iter().collect()
            }
            Err(e) => {
                warn!(error = %e, "Snapshot unreadable, starting empty");
                HashMap::new()
            }
        }
    }

    /// Persists the whole mapping as a list of `[id, state]` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the snapshot cannot be serialized or
    /// written; callers surface this rather than losing data silently.
    #[instrument(skip(self, games), fields(path = %self.path.display(), count = games.len()))]
    pub fn save(&self, games: &HashMap<String, GameState>) -> Result<(), StoreError> {
        let entries: Vec<(&String, &GameState)> = games.iter().collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| StoreError::new(format!("Failed to serialize sessions: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            StoreError::new(format!(
                "Failed to write '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Sessions persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{GameState, apply_move};

    fn temp_store(dir: &tempfile::TempDir) -> GameStore {
        GameStore::new(dir.path().join("games.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = temp_store(&dir);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = temp_store(&dir);
        fs::write(store.path(), "not json at all").expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_mapping() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = temp_store(&dir);

        let mut games = HashMap::new();
        let fresh = GameState::with_name(Some("fresh".to_string()));
        let played = apply_move(&GameState::with_name(None), 4).expect("legal move");
        games.insert(fresh.id().to_string(), fresh);
        games.insert(played.id().to_string(), played);

        store.save(&games).expect("save");
        let reloaded = store.load();

        assert_eq!(reloaded, games);
    }

    #[test]
    fn test_snapshot_layout_is_pairs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = temp_store(&dir);

        let state = GameState::with_name(None);
        let mut games = HashMap::new();
        games.insert(state.id().to_string(), state.clone());
        store.save(&games).expect("save");

        let raw = fs::read_to_string(store.path()).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        let pairs = value.as_array().expect("top-level array");
        assert_eq!(pairs.len(), 1);

        let pair = pairs[0].as_array().expect("pair array");
        assert_eq!(pair[0], state.id());
        assert_eq!(pair[1]["id"], state.id());
    }

    #[test]
    fn test_unwritable_path_surfaces_error() {
        let store = GameStore::new("/nonexistent-dir/games.json");
        let result = store.save(&HashMap::new());
        assert!(result.is_err());
    }
}
