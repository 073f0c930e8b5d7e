//! HTTP API over the game service.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use pebble_rules::MoveError;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, instrument, warn};

use crate::service::{CreateOptions, GameService, ServiceError};
use crate::store::{StoreError, StoredGame};

// ─────────────────────────────────────────────────────────────
//  Request bodies
// ─────────────────────────────────────────────────────────────

/// Body of `POST /games`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Creator, seated as Player 1.
    pub player_id: String,
    /// Creator's display name.
    #[serde(default)]
    pub player_name: Option<String>,
    /// Display name for Player 2's seat.
    #[serde(default)]
    pub player2_name: Option<String>,
    /// Requested game id.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Wait for a human opponent.
    #[serde(default)]
    pub open: bool,
}

/// Body of `POST /games/{id}/join`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Joining player.
    pub player_id: String,
    /// Joining player's display name.
    #[serde(default)]
    pub player_name: Option<String>,
}

/// Body of `POST /games/{id}/moves`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Acting player.
    pub player_id: String,
    /// Pit index, 0-11.
    pub pit: usize,
}

/// Body of `POST /games/{id}/reset`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    /// Acting player.
    pub player_id: String,
}

// ─────────────────────────────────────────────────────────────
//  Error mapping
// ─────────────────────────────────────────────────────────────

/// A [`ServiceError`] rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::GameNotFound(_) | ServiceError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Rules(MoveError::GameNotInPlay(_))
            | ServiceError::Join(_)
            | ServiceError::Store(StoreError::Conflict { .. })
            | ServiceError::Store(StoreError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ServiceError::Rules(MoveError::InvariantViolation(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Rules(_) | ServiceError::IllegalMove { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::NotYourTurn { .. } | ServiceError::NotSeated { .. } => {
                StatusCode::FORBIDDEN
            }
            ServiceError::Oracle(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Store(StoreError::Backend(_))
            | ServiceError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    fn message(&self) -> String {
        match &self.0 {
            // The oracle's wording is passed through untouched.
            ServiceError::IllegalMove { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ─────────────────────────────────────────────────────────────
//  Routes
// ─────────────────────────────────────────────────────────────

/// Builds the API router.
pub fn router(service: GameService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/events", get(game_events))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/moves", post(make_move))
        .route("/games/{id}/reset", post(reset_game))
        .with_state(service)
}

/// Serves the API on `listener` until Ctrl-C.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, service: GameService) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Pebble Pits API listening");
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(service))]
async fn list_games(State(service): State<GameService>) -> Result<Json<Vec<StoredGame>>, ApiError> {
    Ok(Json(service.list_games().await?))
}

#[instrument(skip(service))]
async fn create_game(
    State(service): State<GameService>,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<StoredGame>), ApiError> {
    let options = CreateOptions {
        game_id: request.game_id,
        open: request.open,
        player1_name: request.player_name,
        player2_name: request.player2_name,
    };
    let game = service.create_game(&request.player_id, options).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[instrument(skip(service))]
async fn get_game(
    State(service): State<GameService>,
    Path(id): Path<String>,
) -> Result<Json<StoredGame>, ApiError> {
    Ok(Json(service.get_game(&id).await?))
}

/// Server-sent events for one game: a `snapshot` of the current state,
/// then one event per persisted change, named after its kind.
#[instrument(skip(service))]
async fn game_events(
    State(service): State<GameService>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    // Subscribed before the snapshot read: every later change is delivered.
    let receiver = service.subscribe();
    let game = service.get_game(&id).await?;
    debug!(game_id = %id, version = *game.version(), "Event stream opened");

    let snapshot = Event::default().event("snapshot").json_data(&game);
    let changes = stream::unfold((receiver, id), |(mut receiver, id)| async move {
        loop {
            match receiver.recv().await {
                Ok(change) if change.game().state().id() == id => {
                    let event = Event::default().event(change.kind()).json_data(change.game());
                    return Some((event, (receiver, id)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(game_id = %id, skipped, "Event stream fell behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream::iter([snapshot]).chain(changes)).keep_alive(KeepAlive::default()))
}

#[instrument(skip(service))]
async fn join_game(
    State(service): State<GameService>,
    Path(id): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<StoredGame>, ApiError> {
    let game = service
        .join_game(&id, &request.player_id, request.player_name)
        .await?;
    Ok(Json(game))
}

#[instrument(skip(service))]
async fn make_move(
    State(service): State<GameService>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<StoredGame>, ApiError> {
    let receipt = service
        .make_move(&id, &request.player_id, request.pit)
        .await?;
    Ok(Json(receipt.game))
}

#[instrument(skip(service))]
async fn reset_game(
    State(service): State<GameService>,
    Path(id): Path<String>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<StoredGame>, ApiError> {
    Ok(Json(service.reset_game(&id, &request.player_id).await?))
}
