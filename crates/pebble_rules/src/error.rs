//! Errors raised by the rules engine.

use super::types::{GameStatus, Player};

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game is not accepting moves.
    #[display("Game is not in play (status: {})", _0)]
    GameNotInPlay(GameStatus),

    /// The pit index is off the board.
    #[display("Pit {} is off the board (must be 0-11)", _0)]
    PitOutOfRange(usize),

    /// The pit belongs to the other player.
    #[display("Pit {} does not belong to {}", pit, player)]
    NotYourPit {
        /// The chosen pit.
        pit: usize,
        /// The player who tried to sow from it.
        player: Player,
    },

    /// The pit holds no seeds.
    #[display("Pit {} is empty", _0)]
    EmptyPit(usize),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

/// Error that can occur when a player takes a seat.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum JoinError {
    /// Player 2's seat already holds a human.
    #[display("Player 2's seat is already taken")]
    SeatTaken,

    /// The player already holds Player 1's seat.
    #[display("Player {} is already seated in this game", _0)]
    AlreadySeated(String),

    /// The game has finished.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for JoinError {}
