//! HTTP-level tests for the REST surface.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use noughts::{ChangeNotifier, GameStore, SessionRegistry, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Builds a router over a fresh registry. The directory handle must stay in
/// scope to keep the snapshot path alive.
fn setup_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = GameStore::new(dir.path().join("games.json"));
    let registry = SessionRegistry::new(store, Arc::new(ChangeNotifier::new()));
    (dir, router(registry))
}

/// Sends a request and returns the status plus parsed JSON body.
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn empty_board() -> Value {
    json!([null, null, null, null, null, null, null, null, null])
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn create_game(app: &Router) -> Value {
    let (status, body) = send(app, request("POST", "/games")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn move_at(app: &Router, id: &str, position: i64) -> (StatusCode, Value) {
    send(
        app,
        post_json(&format!("/games/{id}/move"), &json!({ "position": position })),
    )
    .await
}

#[tokio::test]
async fn test_create_game_shape() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;

    assert!(game["id"].is_string());
    assert_eq!(game["board"], empty_board());
    assert_eq!(game["currentPlayer"], "X");
    assert_eq!(game["winner"], Value::Null);
    assert_eq!(game["isDraw"], false);
}

#[tokio::test]
async fn test_create_game_with_name() {
    let (_dir, app) = setup_app();
    let (status, game) = send(
        &app,
        post_json("/games", &json!({ "name": "Friday final" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["name"], "Friday final");
}

#[tokio::test]
async fn test_list_contains_created_game() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;

    let (status, listed) = send(&app, request("GET", "/games")).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|g| g["id"].as_str())
        .collect();
    assert!(ids.contains(&game["id"].as_str().expect("id")));
}

#[tokio::test]
async fn test_get_game_by_id() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    let (status, fetched) = send(&app, request("GET", &format!("/games/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], game["id"]);
    assert_eq!(fetched["board"], empty_board());
}

#[tokio::test]
async fn test_get_unknown_game() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, request("GET", "/games/not-a-real-id")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game not found");
}

#[tokio::test]
async fn test_move_places_mark_and_flips_turn() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    let (status, updated) = move_at(&app, id, 0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["board"][0], "X");
    assert_eq!(updated["currentPlayer"], "O");
    assert_eq!(updated["winner"], Value::Null);
}

#[tokio::test]
async fn test_move_on_unknown_game() {
    let (_dir, app) = setup_app();
    let (status, _) = move_at(&app, "not-a-real-id", 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_rejects_bad_positions() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    for position in [json!(99), json!(-1), json!(2.5), json!("4"), Value::Null] {
        let (status, body) = send(
            &app,
            post_json(&format!("/games/{id}/move"), &json!({ "position": position })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "position {position}");
        assert!(body["error"].is_string(), "position {position}");
    }
}

#[tokio::test]
async fn test_move_rejects_occupied_cell() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    move_at(&app, id, 0).await;
    let (status, body) = move_at(&app, id, 0).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cell is already occupied");
}

#[tokio::test]
async fn test_left_column_win_over_http() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    for position in [0, 1, 3, 4] {
        let (status, _) = move_at(&app, id, position).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, won) = move_at(&app, id, 6).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        won["board"],
        json!(["X", "O", null, "X", "O", null, "X", null, null])
    );
    assert_eq!(won["winner"], "X");
    assert_eq!(won["isDraw"], false);

    // The game is over; further moves are rejected.
    let (status, body) = move_at(&app, id, 8).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "game is already over");
}

#[tokio::test]
async fn test_delete_game() {
    let (_dir, app) = setup_app();
    let game = create_game(&app).await;
    let id = game["id"].as_str().expect("id");

    let (status, body) = send(&app, request("DELETE", &format!("/games/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, request("DELETE", &format!("/games/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("GET", &format!("/games/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
