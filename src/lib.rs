//! Noughts - multi-session tic-tac-toe server.
//!
//! Tracks any number of concurrent tic-tac-toe sessions: applying moves,
//! validating legality, detecting terminal outcomes, and pushing state
//! changes to connected observers.
//!
//! # Architecture
//!
//! - **Rules engine** ([`apply_move`], [`Board`]): pure state transitions
//!   and terminal detection, no I/O.
//! - **Session registry** ([`SessionRegistry`]): owns the id-to-state
//!   mapping, persists it after every mutation, and triggers fan-out.
//! - **Change notifier** ([`ChangeNotifier`]): per-session observer sets,
//!   best-effort delivery of every accepted move.
//! - **HTTP boundary** ([`router`]): REST surface plus a per-session
//!   WebSocket channel; thin glue only.
//!
//! # Example
//!
//! ```no_run
//! use noughts::{ChangeNotifier, GameStore, SessionRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = GameStore::new("/tmp/noughts-games.json");
//! let registry = SessionRegistry::new(store, Arc::new(ChangeNotifier::new()));
//!
//! let game = registry.create(Some("Lunch break".to_string()))?;
//! let game = registry.apply_move(game.id(), 4)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod notify;
mod server;
mod session;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Change notification
pub use notify::ChangeNotifier;

// Crate-level exports - HTTP boundary
pub use server::{CreateGameRequest, MoveRequest, ServerMessage, router};

// Crate-level exports - Session registry
pub use session::{RegistryError, SessionId, SessionRegistry};

// Crate-level exports - Persistence
pub use store::{GameStore, StoreError};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Cell, GameState, GameStatus, Mark, MoveError, Player, apply_move,
};
