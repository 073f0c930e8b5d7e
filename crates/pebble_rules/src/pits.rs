//! Pit index arithmetic.
//!
//! Ownership and opposition are pure functions of the index; nothing about
//! a pit is stored besides its seed count.

use super::types::{PITS_PER_PLAYER, Player, TOTAL_PITS};

/// Returns the player who owns the pit.
pub fn owner(pit: usize) -> Player {
    if pit < PITS_PER_PLAYER {
        Player::One
    } else {
        Player::Two
    }
}

/// Returns the pit directly across the board (`11 - pit`).
pub fn opposite(pit: usize) -> usize {
    TOTAL_PITS - 1 - pit
}

/// Returns the next pit in sowing order, wrapping from 11 to 0.
pub fn next(pit: usize) -> usize {
    (pit + 1) % TOTAL_PITS
}

/// Returns the 1-based label of a pit on its owner's side (1-6).
pub fn label(pit: usize) -> usize {
    pit % PITS_PER_PLAYER + 1
}

/// Converts a 1-based side label back into a board index for the player.
pub fn from_label(player: Player, label: usize) -> Option<usize> {
    if (1..=PITS_PER_PLAYER).contains(&label) {
        Some(player.pits().start + label - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for pit in 0..TOTAL_PITS {
            assert_eq!(opposite(opposite(pit)), pit);
            assert_ne!(owner(pit), owner(opposite(pit)));
        }
        assert_eq!(opposite(1), 10);
        assert_eq!(opposite(5), 6);
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(next(0), 1);
        assert_eq!(next(11), 0);
    }

    #[test]
    fn test_labels_round_trip_per_side() {
        assert_eq!(label(0), 1);
        assert_eq!(label(6), 1);
        assert_eq!(label(11), 6);
        assert_eq!(from_label(Player::Two, 3), Some(8));
        assert_eq!(from_label(Player::One, 0), None);
        assert_eq!(from_label(Player::One, 7), None);
    }
}
