//! HTTP boundary: REST surface and per-session WebSocket updates.
//!
//! Thin glue over the session registry; no game logic lives here.

use crate::games::tictactoe::{GameState, MoveError};
use crate::session::{RegistryError, SessionRegistry};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

/// Request body for creating a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGameRequest {
    /// Optional display label; a generic one is assigned when absent.
    pub name: Option<String>,
}

/// Request body for applying a move.
///
/// `position` is taken as a raw JSON value so that a wrong type (`2.5`,
/// `-1`, a string) surfaces as an invalid move rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveRequest {
    /// Board position, expected to be an integer in `[0, 8]`.
    #[serde(default)]
    pub position: serde_json::Value,
}

/// Messages pushed to observers over a session's WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A session's state changed (also sent once on connect).
    #[serde(rename_all = "camelCase")]
    GameUpdate {
        /// The session's latest state.
        game_state: GameState,
    },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
}

/// Registry error mapped onto an HTTP status plus `{"error": ...}` body.
struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            RegistryError::NotFound => (StatusCode::NOT_FOUND, "Game not found".to_string()),
            RegistryError::Move(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            RegistryError::Store(e) => {
                warn!(error = %e, "Persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist games".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Builds the application router over a shared registry.
pub fn router(registry: SessionRegistry) -> Router {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/move", post(apply_move))
        .route("/games/{id}/ws", get(game_updates))
        .with_state(registry)
}

#[instrument(skip(registry, body))]
async fn create_game(
    State(registry): State<SessionRegistry>,
    body: Option<Json<CreateGameRequest>>,
) -> Result<Json<GameState>, ApiError> {
    let name = body.and_then(|Json(req)| req.name);
    let state = registry.create(name)?;
    Ok(Json(state))
}

#[instrument(skip(registry))]
async fn list_games(State(registry): State<SessionRegistry>) -> Json<Vec<GameState>> {
    Json(registry.list())
}

#[instrument(skip(registry))]
async fn get_game(
    State(registry): State<SessionRegistry>,
    Path(id): Path<String>,
) -> Result<Json<GameState>, ApiError> {
    Ok(Json(registry.get(&id)?))
}

#[instrument(skip(registry, body))]
async fn apply_move(
    State(registry): State<SessionRegistry>,
    Path(id): Path<String>,
    body: Option<Json<MoveRequest>>,
) -> Result<Json<GameState>, ApiError> {
    // Unknown session wins over a malformed position, matching lookup-first
    // handling at the boundary.
    registry.get(&id)?;

    let raw = body.map(|Json(req)| req.position).unwrap_or_default();
    let position = parse_position(&raw).map_err(RegistryError::Move)?;
    Ok(Json(registry.apply_move(&id, position)?))
}

#[instrument(skip(registry))]
async fn delete_game(
    State(registry): State<SessionRegistry>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    registry.delete(&id)?;
    Ok(Json(DeleteResponse { success: true }))
}

/// Interprets a client-supplied position value.
///
/// Anything that is not a non-negative integer is rejected before the rules
/// engine sees it; the engine handles the upper bound.
fn parse_position(value: &serde_json::Value) -> Result<usize, MoveError> {
    let position = value.as_u64().ok_or(MoveError::InvalidPosition)?;
    usize::try_from(position).map_err(|_| MoveError::InvalidPosition)
}

/// Upgrades to the per-session update stream.
#[instrument(skip(registry, ws))]
async fn game_updates(
    State(registry): State<SessionRegistry>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| stream_updates(socket, registry, id))
}

/// Serves one observer: the current state on connect, then one update per
/// accepted move, until either side goes away.
async fn stream_updates(mut socket: WebSocket, registry: SessionRegistry, id: String) {
    // Subscribe before the initial read so an update landing in between is
    // buffered rather than lost.
    let updates = registry.notifier().subscribe(&id);
    observe_session(&mut socket, &registry, &id, updates).await;
    registry.notifier().prune(&id);
}

async fn observe_session(
    socket: &mut WebSocket,
    registry: &SessionRegistry,
    id: &str,
    mut updates: broadcast::Receiver<GameState>,
) {
    let current = match registry.get(id) {
        Ok(state) => state,
        Err(_) => {
            debug!(session_id = id, "Observer connected to unknown session");
            let frame = CloseFrame {
                code: close_code::POLICY,
                reason: "Game not found".into(),
            };
            let _ = socket.send(Message::Close(Some(frame))).await;
            return;
        }
    };

    if send_update(socket, current).await.is_err() {
        return;
    }
    info!(session_id = id, "Observer connected");

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(state) => {
                    if send_update(socket, state).await.is_err() {
                        debug!(session_id = id, "Observer unreachable, dropping");
                        break;
                    }
                }
                Err(RecvError::Closed) => {
                    // Session deleted; disconnect the observer.
                    let frame = CloseFrame {
                        code: close_code::NORMAL,
                        reason: "Game deleted".into(),
                    };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    break;
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(session_id = id, missed, "Observer lagged, resyncing");
                    match registry.get(id) {
                        Ok(state) => {
                            if send_update(socket, state).await.is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            },
            message = socket.recv() => match message {
                // This channel is push-only; inbound data is ignored.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    debug!(session_id = id, "Observer disconnected");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn send_update(socket: &mut WebSocket, state: GameState) -> Result<(), axum::Error> {
    let message = ServerMessage::GameUpdate { game_state: state };
    let json = serde_json::to_string(&message).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_position_accepts_board_range() {
        for pos in 0..9 {
            assert_eq!(parse_position(&json!(pos)), Ok(pos));
        }
    }

    #[test]
    fn test_parse_position_rejects_non_integers() {
        assert_eq!(parse_position(&json!(2.5)), Err(MoveError::InvalidPosition));
        assert_eq!(parse_position(&json!(-1)), Err(MoveError::InvalidPosition));
        assert_eq!(parse_position(&json!("4")), Err(MoveError::InvalidPosition));
        assert_eq!(
            parse_position(&serde_json::Value::Null),
            Err(MoveError::InvalidPosition)
        );
    }

    #[test]
    fn test_update_message_shape() {
        let state = GameState::with_name(None);
        let message = ServerMessage::GameUpdate {
            game_state: state.clone(),
        };
        let value = serde_json::to_value(&message).expect("serialize");

        assert_eq!(value["type"], "gameUpdate");
        assert_eq!(value["gameState"]["id"], state.id());
        assert_eq!(value["gameState"]["currentPlayer"], "X");
    }
}
