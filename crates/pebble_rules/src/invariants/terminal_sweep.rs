//! Terminal sweep: a finished game has an empty board and an outcome.

use super::Invariant;
use crate::{GameState, GameStatus};

/// Invariant: `gameOver` states have every pit swept and a winner recorded;
/// any other state has no winner.
pub struct TerminalSweepInvariant;

impl Invariant<GameState> for TerminalSweepInvariant {
    fn holds(game: &GameState) -> bool {
        match game.status() {
            GameStatus::GameOver => game.board().is_empty() && game.winner().is_some(),
            GameStatus::Waiting | GameStatus::Playing => game.winner().is_none(),
        }
    }

    fn description() -> &'static str {
        "Finished games have an empty board and an outcome; others have no outcome"
    }
}
