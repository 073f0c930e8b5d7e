//! Core domain types for Pebble Pits.

use derive_more::{Display, Error};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::ops::{Index, Range};

/// Number of pits on each player's side.
pub const PITS_PER_PLAYER: usize = 6;

/// Number of pits on the board.
pub const TOTAL_PITS: usize = PITS_PER_PLAYER * 2;

/// Seeds placed in every pit at the start of a game.
pub const INITIAL_SEEDS_PER_PIT: u32 = 4;

/// Seeds in play for a standard game (pits plus both scores).
pub const TOTAL_SEEDS: u32 = TOTAL_PITS as u32 * INITIAL_SEEDS_PER_PIT;

/// Player in the game.
///
/// Serialized as the integers `1` and `2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    /// Player 1 (moves first, owns pits 0-5).
    #[display("Player 1")]
    One,
    /// Player 2 (owns pits 6-11).
    #[display("Player 2")]
    Two,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Returns the player number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Returns the pit indices on this player's side.
    pub fn pits(self) -> Range<usize> {
        match self {
            Player::One => 0..PITS_PER_PLAYER,
            Player::Two => PITS_PER_PLAYER..TOTAL_PITS,
        }
    }

    /// Checks whether the pit lies on this player's side.
    pub fn owns(self, pit: usize) -> bool {
        self.pits().contains(&pit)
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.number()
    }
}

/// A player number outside `1..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Invalid player number: {} (expected 1 or 2)", _0)]
pub struct InvalidPlayer(#[error(not(source))] pub u8);

impl TryFrom<u8> for Player {
    type Error = InvalidPlayer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(InvalidPlayer(other)),
        }
    }
}

/// The twelve pits of the board, indexed 0-11.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pits: [u32; TOTAL_PITS],
}

impl Board {
    /// Creates the starting board: every pit holds four seeds.
    pub fn initial() -> Self {
        Self::from_pits([INITIAL_SEEDS_PER_PIT; TOTAL_PITS])
    }

    /// Creates a board from explicit pit counts.
    pub fn from_pits(pits: [u32; TOTAL_PITS]) -> Self {
        Self { pits }
    }

    /// Gets the seed count of a pit, or `None` if the index is off the board.
    pub fn get(&self, pit: usize) -> Option<u32> {
        self.pits.get(pit).copied()
    }

    /// Returns all pits as an array.
    pub fn pits(&self) -> &[u32; TOTAL_PITS] {
        &self.pits
    }

    /// Returns the pits on one player's side.
    pub fn side(&self, player: Player) -> &[u32] {
        &self.pits[player.pits()]
    }

    /// Total seeds on the board.
    pub fn total(&self) -> u32 {
        self.pits.iter().sum()
    }

    /// Total seeds on one player's side.
    pub fn side_total(&self, player: Player) -> u32 {
        self.side(player).iter().sum()
    }

    /// Checks whether the player owns at least one non-empty pit.
    pub fn has_moves(&self, player: Player) -> bool {
        self.side(player).iter().any(|&seeds| seeds > 0)
    }

    /// Checks whether every pit is empty.
    pub fn is_empty(&self) -> bool {
        self.pits.iter().all(|&seeds| seeds == 0)
    }

    /// Empties a pit, returning the seeds it held.
    pub(crate) fn take(&mut self, pit: usize) -> u32 {
        std::mem::take(&mut self.pits[pit])
    }

    /// Drops one seed into a pit.
    pub(crate) fn drop_seed(&mut self, pit: usize) {
        self.pits[pit] += 1;
    }

    /// Empties one player's side, returning the seeds collected.
    pub(crate) fn clear_side(&mut self, player: Player) -> u32 {
        player.pits().map(|pit| self.take(pit)).sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Index<usize> for Board {
    type Output = u32;

    fn index(&self, pit: usize) -> &Self::Output {
        &self.pits[pit]
    }
}

impl std::fmt::Display for Board {
    /// Player 2's row is drawn on top, right to left, so the sowing
    /// direction reads counter-clockwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row = |pits: &mut dyn Iterator<Item = usize>| {
            pits.map(|pit| format!("[{:>2}]", self.pits[pit]))
                .collect::<Vec<_>>()
                .join(" ")
        };
        writeln!(f, "P2 {}", row(&mut Player::Two.pits().rev()))?;
        write!(f, "P1 {}", row(&mut Player::One.pits()))
    }
}

/// Accumulated scores for both players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scores {
    /// Player 1's score.
    pub player1: u32,
    /// Player 2's score.
    pub player2: u32,
}

impl Scores {
    /// Returns the given player's score.
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::One => self.player1,
            Player::Two => self.player2,
        }
    }

    /// Adds seeds to a player's score.
    pub fn add(&mut self, player: Player, seeds: u32) {
        match player {
            Player::One => self.player1 += seeds,
            Player::Two => self.player2 += seeds,
        }
    }

    /// Sum of both scores.
    pub fn total(&self) -> u32 {
        self.player1 + self.player2
    }

    /// Outcome if the game ended with these scores.
    pub fn outcome(&self) -> Outcome {
        match self.player1.cmp(&self.player2) {
            std::cmp::Ordering::Greater => Outcome::Winner(Player::One),
            std::cmp::Ordering::Less => Outcome::Winner(Player::Two),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// Waiting for a second player to take a seat.
    #[display("waiting")]
    Waiting,
    /// Moves are being accepted.
    #[display("playing")]
    Playing,
    /// The game has ended; the state is final.
    #[display("gameOver")]
    GameOver,
}

/// Outcome of a finished game.
///
/// Serialized as `1`, `2` or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Player won the game.
    Winner(Player),
    /// Both players finished with the same score.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Winner(player) => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{} wins", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

const DRAW_MARKER: &str = "draw";

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Winner(player) => serializer.serialize_u8(player.number()),
            Outcome::Draw => serializer.serialize_str(DRAW_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u8),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Player::try_from(n)
                .map(Outcome::Winner)
                .map_err(de::Error::custom),
            Repr::Marker(s) if s == DRAW_MARKER => Ok(Outcome::Draw),
            Repr::Marker(s) => Err(de::Error::custom(format!(
                "invalid winner marker: '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_sides() {
        assert_eq!(Player::One.pits(), 0..6);
        assert_eq!(Player::Two.pits(), 6..12);
        assert!(Player::One.owns(5));
        assert!(!Player::One.owns(6));
        assert!(Player::Two.owns(11));
        assert!(!Player::Two.owns(12));
    }

    #[test]
    fn test_player_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Player::Two).unwrap(), "2");
        let player: Player = serde_json::from_str("1").unwrap();
        assert_eq!(player, Player::One);
        assert!(serde_json::from_str::<Player>("3").is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&Outcome::Winner(Player::One)).unwrap(),
            "1"
        );
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
        let draw: Outcome = serde_json::from_str("\"draw\"").unwrap();
        assert!(draw.is_draw());
        let none: Option<Outcome> = serde_json::from_str("null").unwrap();
        assert_eq!(none, None);
        assert!(serde_json::from_str::<Outcome>("\"tie\"").is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&GameStatus::GameOver).unwrap(),
            "\"gameOver\""
        );
        assert_eq!(GameStatus::Waiting.to_string(), "waiting");
    }

    #[test]
    fn test_board_totals() {
        let board = Board::from_pits([1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(board.total(), 11);
        assert_eq!(board.side_total(Player::One), 6);
        assert_eq!(board.side_total(Player::Two), 5);
        assert!(board.has_moves(Player::Two));
        assert_eq!(board.get(12), None);
        assert_eq!(Board::initial().total(), TOTAL_SEEDS);
    }

    #[test]
    fn test_board_display_reverses_top_row() {
        let board = Board::from_pits([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let text = board.to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P2 [11] [10] [ 9] [ 8] [ 7] [ 6]"));
        assert_eq!(lines.next(), Some("P1 [ 0] [ 1] [ 2] [ 3] [ 4] [ 5]"));
    }

    #[test]
    fn test_scores_outcome() {
        let mut scores = Scores::default();
        assert_eq!(scores.outcome(), Outcome::Draw);
        scores.add(Player::Two, 3);
        assert_eq!(scores.outcome(), Outcome::Winner(Player::Two));
        scores.add(Player::One, 4);
        assert_eq!(scores.outcome(), Outcome::Winner(Player::One));
        assert_eq!(scores.total(), 7);
    }
}
