//! Contract-based validation for Pebble Pits.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::error::MoveError;
use super::invariants::{InvariantSet, TransitionInvariants};
use super::state::GameState;
use super::types::{Board, GameStatus, Player, TOTAL_PITS};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: The game must be accepting moves.
pub struct GameInPlay;

impl GameInPlay {
    /// Fails unless the status is `playing`.
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        match state.status() {
            GameStatus::Playing => Ok(()),
            other => Err(MoveError::GameNotInPlay(other)),
        }
    }
}

/// Precondition: The pit index must be on the board.
pub struct PitInRange;

impl PitInRange {
    /// Fails for indices of 12 and above.
    pub fn check(pit: usize) -> Result<(), MoveError> {
        if pit < TOTAL_PITS {
            Ok(())
        } else {
            Err(MoveError::PitOutOfRange(pit))
        }
    }
}

/// Precondition: The pit must be on the mover's side.
pub struct PitOwnedByMover;

impl PitOwnedByMover {
    /// Fails when the pit belongs to the other player.
    pub fn check(player: Player, pit: usize) -> Result<(), MoveError> {
        if player.owns(pit) {
            Ok(())
        } else {
            Err(MoveError::NotYourPit { pit, player })
        }
    }
}

/// Precondition: The pit must hold at least one seed.
pub struct PitNotEmpty;

impl PitNotEmpty {
    /// Fails when the pit is empty.
    pub fn check(board: &Board, pit: usize) -> Result<(), MoveError> {
        match board.get(pit) {
            Some(0) => Err(MoveError::EmptyPit(pit)),
            Some(_) => Ok(()),
            None => Err(MoveError::PitOutOfRange(pit)),
        }
    }
}

/// Composite precondition: the game is in play and the pit is a legal choice
/// for the player to move.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for sowing from `pit`.
    #[instrument(skip(state), fields(game_id = %state.id()))]
    pub fn check(state: &GameState, pit: usize) -> Result<(), MoveError> {
        GameInPlay::check(state)?;
        Self::check_position(state.board(), state.current_player(), pit)
    }

    /// Validates the board-level preconditions only.
    ///
    /// This is the check a legality oracle sees: it is given a board, a
    /// player and a pit, not a full game.
    #[instrument(skip(board))]
    pub fn check_position(board: &Board, player: Player, pit: usize) -> Result<(), MoveError> {
        PitInRange::check(pit)?;
        PitOwnedByMover::check(player, pit)?;
        PitNotEmpty::check(board, pit)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for sowing moves.
///
/// Preconditions:
/// - Game is in play
/// - Pit is on the board, on the mover's side and not empty
///
/// Postconditions:
/// - Seeds are conserved
/// - Scores never decrease
/// - The turn passes to the opponent, or stays with the mover when the game ends
/// - Transition invariants hold
pub struct MoveContract;

impl Contract<GameState, usize> for MoveContract {
    fn pre(state: &GameState, pit: &usize) -> Result<(), MoveError> {
        LegalMove::check(state, *pit)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), MoveError> {
        let mut failures = Vec::new();

        let seeds_before = before.board().total() + before.scores().total();
        let seeds_after = after.board().total() + after.scores().total();
        if seeds_before != seeds_after {
            warn!(seeds_before, seeds_after, "Seed conservation violated");
            failures.push(format!(
                "seed count changed from {} to {}",
                seeds_before, seeds_after
            ));
        }

        for player in [Player::One, Player::Two] {
            if after.scores().get(player) < before.scores().get(player) {
                failures.push(format!("{}'s score decreased", player));
            }
        }

        let expected_turn = match after.status() {
            GameStatus::GameOver => before.current_player(),
            GameStatus::Waiting | GameStatus::Playing => before.current_player().opponent(),
        };
        if after.current_player() != expected_turn {
            failures.push(format!(
                "expected {} to move, found {}",
                expected_turn,
                after.current_player()
            ));
        }

        if let Err(violations) = TransitionInvariants::check_all(after) {
            failures.extend(violations.into_iter().map(|v| v.description));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MoveError::InvariantViolation(format!(
                "Postcondition failed: {}",
                failures.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scores, apply_move};

    #[test]
    fn test_precondition_accepts_opening_move() {
        let game = GameState::new("g1", "alice");
        assert!(MoveContract::pre(&game, &0).is_ok());
    }

    #[test]
    fn test_precondition_rejects_opponent_pit() {
        let game = GameState::new("g1", "alice");
        assert_eq!(
            MoveContract::pre(&game, &7),
            Err(MoveError::NotYourPit {
                pit: 7,
                player: Player::One
            })
        );
    }

    #[test]
    fn test_precondition_rejects_empty_pit() {
        let game = apply_move(&GameState::new("g1", "alice"), 2).unwrap();
        let game = apply_move(&game, 8).unwrap();
        assert_eq!(MoveContract::pre(&game, &2), Err(MoveError::EmptyPit(2)));
    }

    #[test]
    fn test_precondition_rejects_out_of_range() {
        let game = GameState::new("g1", "alice");
        assert_eq!(
            MoveContract::pre(&game, &12),
            Err(MoveError::PitOutOfRange(12))
        );
    }

    #[test]
    fn test_precondition_rejects_waiting_game() {
        let game = GameState::open("g1", "alice");
        assert_eq!(
            MoveContract::pre(&game, &0),
            Err(MoveError::GameNotInPlay(GameStatus::Waiting))
        );
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let game = GameState::new("g1", "alice");
        let after = apply_move(&game, 3).unwrap();
        assert!(MoveContract::post(&game, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_lost_seeds() {
        let game = GameState::new("g1", "alice");
        let after = apply_move(&game, 3).unwrap();
        let corrupted = after.clone().with_position(
            Board::from_pits([0; TOTAL_PITS]),
            after.current_player(),
            *after.scores(),
        );
        assert!(matches!(
            MoveContract::post(&game, &corrupted),
            Err(MoveError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_postcondition_detects_score_decrease() {
        let game = GameState::new("g1", "alice").with_position(
            Board::initial(),
            Player::One,
            Scores {
                player1: 2,
                player2: 0,
            },
        );
        let after = game.clone().with_position(
            Board::from_pits([4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 6]),
            Player::Two,
            Scores::default(),
        );
        assert!(MoveContract::post(&game, &after).is_err());
    }
}
