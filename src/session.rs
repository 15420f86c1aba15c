//! Session registry: lifecycle of concurrent game sessions.

use crate::games::tictactoe::{self, GameState, MoveError};
use crate::notify::ChangeNotifier;
use crate::store::{GameStore, StoreError};
use derive_more::{Display, Error, From};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Errors surfaced by registry operations.
#[derive(Debug, Display, Error, From)]
pub enum RegistryError {
    /// Session id unknown to the registry.
    #[display("Game not found")]
    NotFound,
    /// The move was rejected by the rules engine.
    #[display("{_0}")]
    #[from]
    Move(MoveError),
    /// The session snapshot could not be written.
    #[display("{_0}")]
    #[from]
    Store(StoreError),
}

/// Owns the mapping from session id to its latest [`GameState`].
///
/// Every mutating operation updates the in-memory mapping, persists the
/// whole mapping, and (for moves) publishes the new state - all under one
/// lock with no await points, so concurrent requests against a session
/// serialize and observers see states in apply order. The in-memory mapping
/// is the source of truth between writes; reads never touch the store.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    games: Arc<Mutex<HashMap<SessionId, GameState>>>,
    store: GameStore,
    notifier: Arc<ChangeNotifier>,
}

impl SessionRegistry {
    /// Creates a registry, reloading any previously persisted sessions.
    #[instrument(skip(store, notifier))]
    pub fn new(store: GameStore, notifier: Arc<ChangeNotifier>) -> Self {
        let games = store.load();
        info!(count = games.len(), "Session registry initialized");
        Self {
            games: Arc::new(Mutex::new(games)),
            store,
            notifier,
        }
    }

    /// Returns the notifier observers subscribe through.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Creates a new session and persists the registry.
    #[instrument(skip(self))]
    pub fn create(&self, name: Option<String>) -> Result<GameState, RegistryError> {
        let state = GameState::with_name(name);
        let mut games = self.games.lock().unwrap();
        games.insert(state.id().to_string(), state.clone());
        self.store.save(&games)?;

        info!(session_id = %state.id(), name = %state.name(), "Session created");
        Ok(state)
    }

    /// Gets a session's current state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<GameState, RegistryError> {
        let games = self.games.lock().unwrap();
        match games.get(id) {
            Some(state) => Ok(state.clone()),
            None => {
                debug!(session_id = id, "Session not found");
                Err(RegistryError::NotFound)
            }
        }
    }

    /// Lists all current sessions.
    ///
    /// Order is unspecified; the snapshot is taken under a single lock
    /// acquisition, so it is stable within one call.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<GameState> {
        self.games.lock().unwrap().values().cloned().collect()
    }

    /// Applies a move to a session and fans the new state out to observers.
    ///
    /// Validation, map update, persist and publish all happen while the lock
    /// is held, so a second concurrent move observes this one's completed
    /// effect and observers receive per-session states in apply order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id; the rules engine's
    /// [`MoveError`] propagated unchanged; [`RegistryError::Store`] when the
    /// snapshot write fails.
    #[instrument(skip(self))]
    pub fn apply_move(&self, id: &str, position: usize) -> Result<GameState, RegistryError> {
        let mut games = self.games.lock().unwrap();
        let current = games.get(id).ok_or(RegistryError::NotFound)?;
        let next = tictactoe::apply_move(current, position)?;

        games.insert(id.to_string(), next.clone());
        self.store.save(&games)?;
        self.notifier.publish(id, next.clone());

        info!(
            session_id = id,
            position,
            status = ?next.status(),
            "Move applied"
        );
        if next.is_over() {
            debug!(session_id = id, board = %next.board().display(), "Terminal state reached");
        }
        Ok(next)
    }

    /// Deletes a session and force-disconnects its observers.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<(), RegistryError> {
        let mut games = self.games.lock().unwrap();
        if games.remove(id).is_none() {
            debug!(session_id = id, "Session not found");
            return Err(RegistryError::NotFound);
        }
        self.store.save(&games)?;
        drop(games);

        self.notifier.close(id);
        info!(session_id = id, "Session deleted");
        Ok(())
    }
}
