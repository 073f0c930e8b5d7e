//! Pebble Pits rules engine.
//!
//! A pure, I/O-free implementation of the twelve-pit sowing game:
//!
//! - **Types**: board, players, scores, status and outcome
//! - **State**: the [`GameState`] aggregate with its constructors
//! - **Engine**: [`apply_move`], the sow / capture / turn / sweep transition
//! - **Contracts**: move preconditions and postconditions
//! - **Invariants**: properties every reachable state satisfies
//!
//! # Example
//!
//! ```
//! use pebble_rules::{GameState, GameStatus, Player, apply_move};
//!
//! let game = GameState::new("g1", "alice");
//! let next = apply_move(&game, 2)?;
//! assert_eq!(next.current_player(), Player::Two);
//! assert_eq!(next.status(), GameStatus::Playing);
//! # Ok::<(), pebble_rules::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod contracts;
mod engine;
mod error;
pub mod invariants;
pub mod pits;
mod state;
mod types;

pub use contracts::{
    Contract, GameInPlay, LegalMove, MoveContract, PitInRange, PitNotEmpty, PitOwnedByMover,
};
pub use engine::{Sowing, Turn, apply_move, legal_moves, play, replay, sow};
pub use error::{JoinError, MoveError};
pub use state::{
    CPU_PLAYER_NAME, DEFAULT_PLAYER1_NAME, DEFAULT_PLAYER2_NAME, GameState, Participant,
    PlayerNames,
};
pub use types::{
    Board, GameStatus, INITIAL_SEEDS_PER_PIT, InvalidPlayer, Outcome, PITS_PER_PLAYER, Player,
    Scores, TOTAL_PITS, TOTAL_SEEDS,
};
