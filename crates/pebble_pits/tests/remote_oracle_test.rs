//! Tests for the HTTP legality oracle against a local validator.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use pebble_pits::{
    CreateOptions, GameService, LegalityOracle, MemoryStore, RemoteOracle, ServiceError,
};
use pebble_rules::{Board, Player};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Starts a validator that refuses pit 3 and accepts everything else.
async fn spawn_validator() -> String {
    async fn validate(Json(query): Json<Value>) -> Json<Value> {
        if query["pitIndex"] == 3 {
            Json(json!({"isValid": false, "reason": "Pit 4 is resting this turn."}))
        } else {
            Json(json!({"isValid": true, "reason": ""}))
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/validate", post(validate));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/validate", addr)
}

#[tokio::test]
async fn test_remote_verdicts() {
    let url = spawn_validator().await;
    let oracle = RemoteOracle::new(url, Duration::from_secs(5)).unwrap();

    let verdict = oracle.check(&Board::initial(), Player::One, 0).await.unwrap();
    assert!(verdict.is_valid);

    let verdict = oracle.check(&Board::initial(), Player::One, 3).await.unwrap();
    assert!(!verdict.is_valid);
    assert_eq!(verdict.reason.as_deref(), Some("Pit 4 is resting this turn."));
}

#[tokio::test]
async fn test_service_surfaces_remote_reason() {
    let url = spawn_validator().await;
    let oracle = RemoteOracle::new(url, Duration::from_secs(5)).unwrap();
    let service = GameService::new(Arc::new(MemoryStore::new()), Arc::new(oracle), 16);
    let options = CreateOptions {
        game_id: Some("g1".to_string()),
        ..CreateOptions::default()
    };
    service.create_game("alice", options).await.unwrap();

    let result = service.make_move("g1", "alice", 3).await;
    assert!(matches!(
        result,
        Err(ServiceError::IllegalMove { reason }) if reason == "Pit 4 is resting this turn."
    ));

    let receipt = service.make_move("g1", "alice", 0).await.unwrap();
    assert_eq!(*receipt.game.version(), 2);
}

#[tokio::test]
async fn test_unreachable_validator_is_an_oracle_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle = RemoteOracle::new(
        format!("http://{}/validate", addr),
        Duration::from_secs(2),
    )
    .unwrap();
    let service = GameService::new(Arc::new(MemoryStore::new()), Arc::new(oracle), 16);
    let options = CreateOptions {
        game_id: Some("g1".to_string()),
        ..CreateOptions::default()
    };
    service.create_game("alice", options).await.unwrap();

    let result = service.make_move("g1", "alice", 0).await;
    assert!(matches!(result, Err(ServiceError::Oracle(_))));
    assert_eq!(*service.get_game("g1").await.unwrap().version(), 1);
}
