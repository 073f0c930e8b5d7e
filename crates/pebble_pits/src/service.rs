//! Game service: the operations clients perform on stored games.
//!
//! Every state change follows the same path: load the snapshot, validate,
//! compute the next state, write it back conditional on the version that
//! was read, then publish a [`GameEvent`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use derive_more::{Display, Error};
use pebble_rules::{
    GameInPlay, GameState, JoinError, MoveError, Participant, Player, Sowing, play,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::oracle::{LegalityOracle, OracleError};
use crate::store::{GameStore, StoreError, StoredGame};

/// Reason reported when an oracle refuses a move without saying why.
pub const UNEXPLAINED_REFUSAL: &str = "This move is not allowed by the rules.";

// ─────────────────────────────────────────────────────────────
//  Requests and results
// ─────────────────────────────────────────────────────────────

/// Options for [`GameService::create_game`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Id for the new game; generated when absent.
    pub game_id: Option<String>,
    /// Leave Player 2's seat empty for a human instead of the CPU placeholder.
    pub open: bool,
    /// Display name for Player 1.
    pub player1_name: Option<String>,
    /// Display name for Player 2.
    pub player2_name: Option<String>,
}

/// Outcome of an accepted move.
#[derive(Debug, Clone)]
pub struct MoveReceipt {
    /// The game as persisted after the move.
    pub game: StoredGame,
    /// Who moved.
    pub mover: Player,
    /// Where the seeds went.
    pub sowing: Sowing,
    /// Seeds captured, if any.
    pub captured: Option<u32>,
}

/// A persisted change to a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameEvent {
    /// A game was created.
    Created(StoredGame),
    /// A second human took Player 2's seat.
    Joined(StoredGame),
    /// A move was accepted.
    Moved(StoredGame),
    /// The board was reset.
    Reset(StoredGame),
}

impl GameEvent {
    /// Lower-case name of the change, matching the serialized `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Joined(_) => "joined",
            Self::Moved(_) => "moved",
            Self::Reset(_) => "reset",
        }
    }

    /// The snapshot written by this change.
    pub fn game(&self) -> &StoredGame {
        match self {
            Self::Created(game) | Self::Joined(game) | Self::Moved(game) | Self::Reset(game) => {
                game
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Errors
// ─────────────────────────────────────────────────────────────

/// Error returned by [`GameService`] operations.
#[derive(Debug, Display, Error)]
pub enum ServiceError {
    /// No game with this id.
    #[display("Game {} not found", _0)]
    GameNotFound(#[error(not(source))] String),

    /// The request is malformed.
    #[display("Invalid request: {}", _0)]
    InvalidRequest(#[error(not(source))] String),

    /// The rules engine rejected the move.
    #[display("{}", _0)]
    Rules(MoveError),

    /// The seat could not be taken.
    #[display("{}", _0)]
    Join(JoinError),

    /// The actor is seated but it is the other side's move.
    #[display("It's not your turn. Waiting for {}", waiting_for)]
    NotYourTurn {
        /// Display name of the player to move.
        waiting_for: String,
    },

    /// The actor holds no seat in this game.
    #[display("Player {} is not seated in game {}", player_id, game_id)]
    NotSeated {
        /// The actor.
        player_id: String,
        /// The game.
        game_id: String,
    },

    /// The legality oracle refused the move.
    #[display("Illegal move: {}", reason)]
    IllegalMove {
        /// The oracle's explanation, unmodified.
        reason: String,
    },

    /// The legality oracle could not be consulted.
    #[display("{}", _0)]
    Oracle(OracleError),

    /// The store failed or refused the write.
    #[display("{}", _0)]
    Store(StoreError),
}

impl From<MoveError> for ServiceError {
    fn from(err: MoveError) -> Self {
        Self::Rules(err)
    }
}

impl From<JoinError> for ServiceError {
    fn from(err: JoinError) -> Self {
        Self::Join(err)
    }
}

impl From<OracleError> for ServiceError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::GameNotFound(id),
            other => Self::Store(other),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Service
// ─────────────────────────────────────────────────────────────

/// Coordinates the store, the legality oracle and the rules engine.
///
/// Clones share the same store, oracle and event channel.
#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn GameStore>,
    oracle: Arc<dyn LegalityOracle>,
    events: broadcast::Sender<GameEvent>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl GameService {
    /// Creates a service. `event_capacity` bounds each subscriber's backlog.
    #[instrument(skip(store, oracle))]
    pub fn new(
        store: Arc<dyn GameStore>,
        oracle: Arc<dyn LegalityOracle>,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        info!("Game service ready");
        Self {
            store,
            oracle,
            events,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Receives every persisted change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Creates a game with `creator_id` in Player 1's seat.
    #[instrument(skip(self, options), fields(open = options.open))]
    pub async fn create_game(
        &self,
        creator_id: &str,
        options: CreateOptions,
    ) -> Result<StoredGame, ServiceError> {
        require_id("playerId", creator_id)?;
        let game_id = match options.game_id {
            Some(id) => {
                require_id("gameId", &id)?;
                id
            }
            None => self.generate_id(),
        };

        let state = if options.open {
            GameState::open(&game_id, creator_id)
        } else {
            GameState::new(&game_id, creator_id)
        }
        .with_names(options.player1_name, options.player2_name);

        let stored = self.store.insert(state).await?;
        info!(game_id = %game_id, status = %stored.state().status(), "Game created");
        self.publish(GameEvent::Created(stored.clone()));
        Ok(stored)
    }

    /// Seats `player_id` as Player 2.
    #[instrument(skip(self))]
    pub async fn join_game(
        &self,
        game_id: &str,
        player_id: &str,
        name: Option<String>,
    ) -> Result<StoredGame, ServiceError> {
        require_id("playerId", player_id)?;
        let stored = self.get_game(game_id).await?;
        let next = stored.state().join(player_id, name).map_err(|e| {
            warn!(error = %e, "Join refused");
            ServiceError::from(e)
        })?;

        let saved = self.store.replace(*stored.version(), next).await?;
        info!(version = saved.version(), "Player joined");
        self.publish(GameEvent::Joined(saved.clone()));
        Ok(saved)
    }

    /// Loads a game.
    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> Result<StoredGame, ServiceError> {
        self.store
            .load(game_id)
            .await?
            .ok_or_else(|| ServiceError::GameNotFound(game_id.to_string()))
    }

    /// Lists all games, oldest first.
    #[instrument(skip(self))]
    pub async fn list_games(&self) -> Result<Vec<StoredGame>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Plays `pit` on behalf of `actor_id`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Rules`] with [`MoveError::GameNotInPlay`] when the
    ///   game is waiting or over
    /// - [`ServiceError::NotYourTurn`] / [`ServiceError::NotSeated`] when the
    ///   actor may not move for the current player
    /// - [`ServiceError::IllegalMove`] when the oracle refuses; nothing is written
    /// - [`ServiceError::Store`] with [`StoreError::Conflict`] when another
    ///   move was saved since the game was loaded
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        game_id: &str,
        actor_id: &str,
        pit: usize,
    ) -> Result<MoveReceipt, ServiceError> {
        let stored = self.get_game(game_id).await?;
        let state = stored.state();

        GameInPlay::check(state)?;
        authorize_move(state, actor_id)?;

        let mover = state.current_player();
        let verdict = self.oracle.check(state.board(), mover, pit).await?;
        if !verdict.is_valid {
            // A blank reason counts as no reason.
            let reason = verdict
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| UNEXPLAINED_REFUSAL.to_string());
            warn!(%reason, "Move refused");
            return Err(ServiceError::IllegalMove { reason });
        }

        let turn = play(state, pit)?;
        let saved = self.store.replace(*stored.version(), turn.state).await?;
        info!(
            mover = %mover,
            landing = turn.sowing.landing,
            captured = ?turn.captured,
            version = saved.version(),
            "Move saved"
        );
        self.publish(GameEvent::Moved(saved.clone()));

        Ok(MoveReceipt {
            game: saved,
            mover,
            sowing: turn.sowing,
            captured: turn.captured,
        })
    }

    /// Restores the starting position, keeping seats and names.
    #[instrument(skip(self))]
    pub async fn reset_game(
        &self,
        game_id: &str,
        actor_id: &str,
    ) -> Result<StoredGame, ServiceError> {
        let stored = self.get_game(game_id).await?;
        if !is_seated(stored.state(), actor_id) {
            warn!("Reset refused for unseated player");
            return Err(ServiceError::NotSeated {
                player_id: actor_id.to_string(),
                game_id: game_id.to_string(),
            });
        }

        let saved = self
            .store
            .replace(*stored.version(), stored.state().reset())
            .await?;
        info!(version = saved.version(), "Game reset");
        self.publish(GameEvent::Reset(saved.clone()));
        Ok(saved)
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("game-{:x}-{}", Utc::now().timestamp_millis(), n)
    }

    fn publish(&self, event: GameEvent) {
        match self.events.send(event) {
            Ok(receivers) => debug!(receivers, "Event published"),
            Err(_) => debug!("No subscribers for event"),
        }
    }
}

fn require_id(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::InvalidRequest(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

/// Whether `actor_id` holds a human seat.
fn is_seated(state: &GameState, actor_id: &str) -> bool {
    state.player1().is_human(actor_id) || state.player2().is_some_and(|p| p.is_human(actor_id))
}

/// Player 1's human also moves for the CPU placeholder.
fn authorize_move(state: &GameState, actor_id: &str) -> Result<(), ServiceError> {
    let current = state.current_player();
    let allowed = match state.participant(current) {
        Some(Participant::Cpu) => state.player1().is_human(actor_id),
        Some(seat) => seat.is_human(actor_id),
        None => false,
    };

    if allowed {
        Ok(())
    } else if is_seated(state, actor_id) {
        warn!(actor_id, current = %current, "Move out of turn");
        Err(ServiceError::NotYourTurn {
            waiting_for: state.player_names().get(current).to_string(),
        })
    } else {
        warn!(actor_id, "Move from unseated player");
        Err(ServiceError::NotSeated {
            player_id: actor_id.to_string(),
            game_id: state.id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_one_moves_for_cpu_seat() {
        let game = pebble_rules::apply_move(&GameState::new("g1", "alice"), 2).unwrap();
        assert_eq!(game.current_player(), Player::Two);
        assert!(authorize_move(&game, "alice").is_ok());
        assert!(matches!(
            authorize_move(&game, "mallory"),
            Err(ServiceError::NotSeated { .. })
        ));
    }

    #[test]
    fn test_human_seats_take_turns() {
        let game = GameState::open("g1", "alice").join("bob", None).unwrap();
        assert!(authorize_move(&game, "alice").is_ok());
        assert!(matches!(
            authorize_move(&game, "bob"),
            Err(ServiceError::NotYourTurn { waiting_for }) if waiting_for == "Player 1"
        ));

        let game = pebble_rules::apply_move(&game, 0).unwrap();
        assert!(authorize_move(&game, "bob").is_ok());
        assert!(authorize_move(&game, "alice").is_err());
    }

    #[test]
    fn test_blank_ids_are_rejected() {
        assert!(require_id("playerId", "alice").is_ok());
        assert!(matches!(
            require_id("playerId", "  "),
            Err(ServiceError::InvalidRequest(_))
        ));
    }
}
