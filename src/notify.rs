//! Change notification: per-session fan-out of new game states.

use crate::games::tictactoe::GameState;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Capacity of each per-session broadcast channel.
///
/// A game has at most nine moves, so an observer would have to lag an
/// entire session to miss an update.
const CHANNEL_CAPACITY: usize = 16;

/// Pushes new session states to currently subscribed observers.
///
/// One broadcast channel per session, created lazily on first subscribe and
/// released when the last observer goes away. Delivery is best-effort: an
/// observer that stopped listening is pruned, never an error for the
/// publisher.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    channels: Mutex<HashMap<String, broadcast::Sender<GameState>>>,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscriptions.
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes an observer to a session's updates.
    ///
    /// Session existence is not validated here; checking would race with
    /// registry deletion anyway, so callers wanting fail-fast behavior check
    /// the registry first. Dropping the receiver unsubscribes.
    #[instrument(skip(self))]
    pub fn subscribe(&self, id: &str) -> broadcast::Receiver<GameState> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Delivers `state` to every observer currently subscribed to the session.
    #[instrument(skip(self, state), fields(session_id = id))]
    pub fn publish(&self, id: &str, state: GameState) {
        let mut channels = self.channels.lock().unwrap();
        let Some(tx) = channels.get(id) else {
            return;
        };
        match tx.send(state) {
            Ok(observers) => debug!(observers, "State published"),
            Err(_) => {
                // Last observer went away; release the channel.
                channels.remove(id);
                debug!("No observers left, channel released");
            }
        }
    }

    /// Closes a session's channel, waking every observer with a closed error.
    ///
    /// Used by registry deletion to force-disconnect live observers.
    #[instrument(skip(self))]
    pub fn close(&self, id: &str) {
        if self.channels.lock().unwrap().remove(id).is_some() {
            debug!(session_id = id, "Observers disconnected");
        }
    }

    /// Releases a session's channel if no observers remain.
    pub fn prune(&self, id: &str) {
        let mut channels = self.channels.lock().unwrap();
        if channels.get(id).is_some_and(|tx| tx.receiver_count() == 0) {
            channels.remove(id);
            debug!(session_id = id, "No observers left, channel released");
        }
    }

    /// Number of observers currently subscribed to a session.
    pub fn observer_count(&self, id: &str) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
