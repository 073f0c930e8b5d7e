//! Seed conservation: seeds are only moved, never created or destroyed.

use super::Invariant;
use crate::{GameState, TOTAL_SEEDS};

/// Invariant: pits plus both scores always hold every seed of the
/// standard setup.
pub struct SeedConservationInvariant;

impl Invariant<GameState> for SeedConservationInvariant {
    fn holds(game: &GameState) -> bool {
        game.board().total() + game.scores().total() == TOTAL_SEEDS
    }

    fn description() -> &'static str {
        "Seeds on the board plus both scores equal the starting total"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Player, Scores};

    #[test]
    fn test_new_game_holds() {
        assert!(SeedConservationInvariant::holds(&GameState::new("g1", "alice")));
    }

    #[test]
    fn test_scores_count_towards_total() {
        let game = GameState::new("g1", "alice").with_position(
            Board::from_pits([4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0]),
            Player::One,
            Scores {
                player1: 5,
                player2: 3,
            },
        );
        assert!(SeedConservationInvariant::holds(&game));
    }

    #[test]
    fn test_missing_seed_violates() {
        let game = GameState::new("g1", "alice").with_position(
            Board::from_pits([4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3]),
            Player::One,
            Scores::default(),
        );
        assert!(!SeedConservationInvariant::holds(&game));
    }
}
