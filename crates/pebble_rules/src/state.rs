//! The game state aggregate and its constructors.

use super::error::JoinError;
use super::types::{Board, GameStatus, Outcome, Player, Scores};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Display name given to Player 1 when none is supplied.
pub const DEFAULT_PLAYER1_NAME: &str = "Player 1";

/// Display name given to a human Player 2 when none is supplied.
pub const DEFAULT_PLAYER2_NAME: &str = "Player 2";

/// Display name of the CPU placeholder seat.
pub const CPU_PLAYER_NAME: &str = "Player 2 (CPU)";

/// Whoever holds a seat at the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Participant {
    /// A human identified by an opaque id.
    Human {
        /// Player id supplied by the caller.
        id: String,
    },
    /// Placeholder for a non-human opponent. It never picks moves itself;
    /// Player 1's human moves for this seat.
    Cpu,
}

impl Participant {
    /// Creates a human participant.
    pub fn human(id: impl Into<String>) -> Self {
        Participant::Human { id: id.into() }
    }

    /// Returns the human's id, if this is a human.
    pub fn human_id(&self) -> Option<&str> {
        match self {
            Participant::Human { id } => Some(id),
            Participant::Cpu => None,
        }
    }

    /// Returns true for the CPU placeholder.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Participant::Cpu)
    }

    /// Checks whether this seat is held by the given human.
    pub fn is_human(&self, player_id: &str) -> bool {
        self.human_id() == Some(player_id)
    }
}

/// Display names for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerNames {
    /// Player 1's name.
    pub player1: String,
    /// Player 2's name.
    pub player2: String,
}

impl PlayerNames {
    /// Returns the given player's name.
    pub fn get(&self, player: Player) -> &str {
        match player {
            Player::One => &self.player1,
            Player::Two => &self.player2,
        }
    }
}

/// Complete game state.
///
/// A value type: the engine reads one snapshot and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) id: String,
    pub(crate) board: Board,
    pub(crate) current_player: Player,
    pub(crate) player1: Participant,
    pub(crate) player2: Option<Participant>,
    pub(crate) player_names: PlayerNames,
    pub(crate) scores: Scores,
    pub(crate) status: GameStatus,
    pub(crate) winner: Option<Outcome>,
    pub(crate) last_move_message: String,
}

impl GameState {
    /// Creates a game ready to play against the CPU placeholder.
    ///
    /// Every pit holds four seeds, Player 1 moves first and both scores
    /// start at zero.
    #[instrument]
    pub fn new(game_id: &str, creator_id: &str) -> Self {
        let names = PlayerNames {
            player1: DEFAULT_PLAYER1_NAME.to_string(),
            player2: CPU_PLAYER_NAME.to_string(),
        };
        Self::starting(
            game_id.to_string(),
            Participant::human(creator_id),
            Some(Participant::Cpu),
            names,
        )
    }

    /// Creates a game whose second seat stays empty until a human joins.
    #[instrument]
    pub fn open(game_id: &str, creator_id: &str) -> Self {
        let names = PlayerNames {
            player1: DEFAULT_PLAYER1_NAME.to_string(),
            player2: DEFAULT_PLAYER2_NAME.to_string(),
        };
        Self::starting(
            game_id.to_string(),
            Participant::human(creator_id),
            None,
            names,
        )
    }

    fn starting(
        id: String,
        player1: Participant,
        player2: Option<Participant>,
        player_names: PlayerNames,
    ) -> Self {
        let status = if player2.is_some() {
            GameStatus::Playing
        } else {
            GameStatus::Waiting
        };
        let last_move_message = opening_message(status, &player_names);

        Self {
            id,
            board: Board::initial(),
            current_player: Player::One,
            player1,
            player2,
            player_names,
            scores: Scores::default(),
            status,
            winner: None,
            last_move_message,
        }
    }

    /// Replaces the display names, keeping whichever side is `None`.
    ///
    /// If the game still shows its opening announcement, the announcement
    /// is rewritten with the new names.
    pub fn with_names(mut self, player1: Option<String>, player2: Option<String>) -> Self {
        let announced = self.last_move_message == opening_message(self.status, &self.player_names);
        if let Some(name) = player1 {
            self.player_names.player1 = name;
        }
        if let Some(name) = player2 {
            self.player_names.player2 = name;
        }
        if announced {
            self.last_move_message = opening_message(self.status, &self.player_names);
        }
        self
    }

    /// Replaces board, scores and player to move.
    ///
    /// Used to set up positions for analysis and tests. The resulting state
    /// is only as consistent as the inputs.
    pub fn with_position(mut self, board: Board, current_player: Player, scores: Scores) -> Self {
        self.board = board;
        self.current_player = current_player;
        self.scores = scores;
        self
    }

    /// Seats a human as Player 2, replacing an empty seat or the CPU
    /// placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] if the game is over, the seat already holds a
    /// human, or the joining player already holds Player 1's seat.
    #[instrument(skip(self, name), fields(game_id = %self.id))]
    pub fn join(&self, player_id: &str, name: Option<String>) -> Result<GameState, JoinError> {
        if self.status == GameStatus::GameOver {
            return Err(JoinError::GameOver);
        }
        if self.player1.is_human(player_id) {
            return Err(JoinError::AlreadySeated(player_id.to_string()));
        }
        if matches!(self.player2, Some(Participant::Human { .. })) {
            return Err(JoinError::SeatTaken);
        }

        let mut next = self.clone();
        next.player2 = Some(Participant::human(player_id));
        next.player_names.player2 = name.unwrap_or_else(|| DEFAULT_PLAYER2_NAME.to_string());
        if next.status == GameStatus::Waiting {
            next.status = GameStatus::Playing;
        }
        next.last_move_message = format!(
            "{} joined. {}'s turn.",
            next.player_names.player2,
            next.player_names.get(next.current_player)
        );

        debug!(status = %next.status, "Player 2 seated");
        Ok(next)
    }

    /// Starts over with a fresh board, keeping id, seats and names.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn reset(&self) -> GameState {
        Self::starting(
            self.id.clone(),
            self.player1.clone(),
            self.player2.clone(),
            self.player_names.clone(),
        )
    }

    /// Returns the game id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move (the last mover once the game is over).
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns Player 1's seat.
    pub fn player1(&self) -> &Participant {
        &self.player1
    }

    /// Returns Player 2's seat, `None` while waiting for a human.
    pub fn player2(&self) -> Option<&Participant> {
        self.player2.as_ref()
    }

    /// Returns the seat for the given side.
    pub fn participant(&self, player: Player) -> Option<&Participant> {
        match player {
            Player::One => Some(&self.player1),
            Player::Two => self.player2.as_ref(),
        }
    }

    /// Returns the display names.
    pub fn player_names(&self) -> &PlayerNames {
        &self.player_names
    }

    /// Returns the scores.
    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the outcome once the game is over.
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    /// Returns the summary of the last change.
    pub fn last_move_message(&self) -> &str {
        &self.last_move_message
    }

    /// Returns true once the game has ended.
    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}

/// First message of a game: who moves, or who is awaited.
fn opening_message(status: GameStatus, names: &PlayerNames) -> String {
    match status {
        GameStatus::Waiting => format!("Waiting for {} to join.", names.player2),
        GameStatus::Playing | GameStatus::GameOver => {
            format!("Game started. {}'s turn.", names.player1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TOTAL_SEEDS;

    #[test]
    fn test_initial_state() {
        let state = GameState::new("g1", "alice");
        assert_eq!(state.id(), "g1");
        assert_eq!(state.board(), &Board::initial());
        assert_eq!(state.board().total(), TOTAL_SEEDS);
        assert_eq!(state.current_player(), Player::One);
        assert_eq!(state.player1(), &Participant::human("alice"));
        assert_eq!(state.player2(), Some(&Participant::Cpu));
        assert_eq!(state.player_names().player2, "Player 2 (CPU)");
        assert_eq!(state.scores(), &Scores::default());
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.winner(), None);
        assert_eq!(state.last_move_message(), "Game started. Player 1's turn.");
    }

    #[test]
    fn test_open_game_waits_for_join() {
        let state = GameState::open("g1", "alice");
        assert_eq!(state.status(), GameStatus::Waiting);
        assert!(state.player2().is_none());

        let joined = state.join("bob", Some("Bob".to_string())).unwrap();
        assert_eq!(joined.status(), GameStatus::Playing);
        assert_eq!(joined.player2(), Some(&Participant::human("bob")));
        assert_eq!(joined.player_names().player2, "Bob");
        assert_eq!(joined.last_move_message(), "Bob joined. Player 1's turn.");
    }

    #[test]
    fn test_join_replaces_cpu_placeholder() {
        let state = GameState::new("g1", "alice");
        let joined = state.join("bob", None).unwrap();
        assert_eq!(joined.player_names().player2, "Player 2");
        assert!(!joined.player2().unwrap().is_cpu());
    }

    #[test]
    fn test_join_rejections() {
        let state = GameState::open("g1", "alice");
        assert_eq!(
            state.join("alice", None),
            Err(JoinError::AlreadySeated("alice".to_string()))
        );
        let joined = state.join("bob", None).unwrap();
        assert_eq!(joined.join("carol", None), Err(JoinError::SeatTaken));
    }

    #[test]
    fn test_reset_preserves_seats_and_names() {
        let state = GameState::new("g1", "alice")
            .with_names(Some("Alice".to_string()), None)
            .with_position(
                Board::from_pits([0; 12]),
                Player::Two,
                Scores {
                    player1: 30,
                    player2: 18,
                },
            );
        let fresh = state.reset();
        assert_eq!(fresh.id(), "g1");
        assert_eq!(fresh.board(), &Board::initial());
        assert_eq!(fresh.scores(), &Scores::default());
        assert_eq!(fresh.current_player(), Player::One);
        assert_eq!(fresh.player_names().player1, "Alice");
        assert_eq!(fresh.player2(), Some(&Participant::Cpu));
        assert_eq!(fresh.last_move_message(), "Game started. Alice's turn.");
    }

    #[test]
    fn test_names_rewrite_opening_message_only() {
        let state = GameState::open("g1", "alice").with_names(None, Some("Bob".to_string()));
        assert_eq!(state.last_move_message(), "Waiting for Bob to join.");

        let moved = crate::apply_move(&GameState::new("g1", "alice"), 0).unwrap();
        let message = moved.last_move_message().to_string();
        let renamed = moved.with_names(Some("Alice".to_string()), None);
        assert_eq!(renamed.last_move_message(), message);
        assert_eq!(renamed.player_names().player1, "Alice");
    }

    #[test]
    fn test_state_json_shape() {
        let state = GameState::new("g1", "alice");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentPlayer"], 1);
        assert_eq!(json["status"], "playing");
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["player1"]["kind"], "human");
        assert_eq!(json["player1"]["id"], "alice");
        assert_eq!(json["player2"]["kind"], "cpu");
        assert_eq!(json["playerNames"]["player1"], "Player 1");
        assert_eq!(json["board"].as_array().map(Vec::len), Some(12));

        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
