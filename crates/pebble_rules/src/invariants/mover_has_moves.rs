//! The player to move always has a move while the game is in play.

use super::Invariant;
use crate::{GameState, GameStatus};

/// Invariant: while `playing`, the current player owns a non-empty pit.
///
/// The engine ends the game instead of handing the turn to a player with
/// an empty side.
pub struct MoverHasMovesInvariant;

impl Invariant<GameState> for MoverHasMovesInvariant {
    fn holds(game: &GameState) -> bool {
        game.status() != GameStatus::Playing || game.board().has_moves(game.current_player())
    }

    fn description() -> &'static str {
        "The player to move owns at least one non-empty pit"
    }
}
