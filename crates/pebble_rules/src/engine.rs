//! The Move Engine: sow, capture, rotate the turn, detect the end.
//!
//! Every function here is pure. [`apply_move`] reads one snapshot and returns
//! a new one; the input is never modified.

use super::contracts::{Contract, MoveContract};
use super::error::MoveError;
use super::pits::{label, next, opposite};
use super::state::GameState;
use super::types::{Board, GameStatus, Outcome, Player, Scores};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Result of distributing the seeds of one pit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sowing {
    /// Pit the seeds were lifted from.
    pub origin: usize,
    /// Number of seeds sown.
    pub seeds: u32,
    /// Pit that received the last seed.
    pub landing: usize,
}

/// Everything that happened during one accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The state after the move.
    pub state: GameState,
    /// The player who moved.
    pub mover: Player,
    /// The sowing step.
    pub sowing: Sowing,
    /// Seeds captured into the mover's score, if a capture happened.
    pub captured: Option<u32>,
    /// Outcome if this move ended the game.
    pub outcome: Option<Outcome>,
}

/// Lifts every seed out of `pit` and drops them one by one into the
/// following pits, wrapping from 11 to 0.
///
/// With twelve or more seeds the emptied origin pit receives seeds too.
pub fn sow(board: &mut Board, pit: usize) -> Sowing {
    let seeds = board.take(pit);
    let mut landing = pit;
    for _ in 0..seeds {
        landing = next(landing);
        board.drop_seed(landing);
    }
    Sowing {
        origin: pit,
        seeds,
        landing,
    }
}

/// Captures the landing pit and its opposite pit when the last seed fell
/// into an empty pit on the mover's own side facing a non-empty pit.
fn capture(board: &mut Board, mover: Player, landing: usize) -> Option<u32> {
    if !mover.owns(landing) || board[landing] != 1 {
        return None;
    }
    let across = opposite(landing);
    if board[across] == 0 {
        return None;
    }
    Some(board.take(landing) + board.take(across))
}

/// Moves the seeds left on each side into that side's own score.
fn sweep(board: &mut Board, scores: &mut Scores) {
    for player in Player::iter() {
        let leftover = board.clear_side(player);
        scores.add(player, leftover);
        debug!(%player, leftover, "Swept remaining seeds");
    }
}

/// Applies a move and reports what happened.
///
/// # Errors
///
/// Returns [`MoveError`] if the move violates a precondition (game not in
/// play, pit off the board, opponent's pit, empty pit) or, in debug builds,
/// if the result breaks a postcondition.
#[instrument(skip(state), fields(game_id = %state.id(), mover = %state.current_player()))]
pub fn play(state: &GameState, pit: usize) -> Result<Turn, MoveError> {
    MoveContract::pre(state, &pit)?;

    let mover = state.current_player();
    let names = state.player_names();
    let mut board = state.board().clone();
    let mut scores = *state.scores();

    let sowing = sow(&mut board, pit);
    debug!(seeds = sowing.seeds, landing = sowing.landing, "Sowed");
    let mut message = format!(
        "{} sowed {} seeds from pit {}. ",
        names.get(mover),
        sowing.seeds,
        label(pit)
    );

    let captured = capture(&mut board, mover, sowing.landing);
    if let Some(seeds) = captured {
        scores.add(mover, seeds);
        debug!(seeds, landing = sowing.landing, "Captured");
        message.push_str(&format!("Captured {} seeds!", seeds));
    }

    let next_player = mover.opponent();
    let (status, current_player, outcome) = if board.has_moves(next_player) {
        message.push_str(&format!(" {}'s turn.", names.get(next_player)));
        (GameStatus::Playing, next_player, None)
    } else {
        message.push_str(&format!(
            " {} has no moves. Game Over. ",
            names.get(next_player)
        ));
        sweep(&mut board, &mut scores);
        let outcome = scores.outcome();
        match outcome {
            Outcome::Winner(winner) => {
                message.push_str(&format!("{} wins!", names.get(winner)))
            }
            Outcome::Draw => message.push_str("It's a draw!"),
        }
        info!(%outcome, player1 = scores.player1, player2 = scores.player2, "Game over");
        (GameStatus::GameOver, mover, Some(outcome))
    };

    let next = GameState {
        board,
        scores,
        current_player,
        status,
        winner: outcome,
        last_move_message: message,
        ..state.clone()
    };

    #[cfg(debug_assertions)]
    MoveContract::post(state, &next)?;

    Ok(Turn {
        state: next,
        mover,
        sowing,
        captured,
        outcome,
    })
}

/// Applies a move, returning the next game state.
///
/// # Errors
///
/// See [`play`].
pub fn apply_move(state: &GameState, pit: usize) -> Result<GameState, MoveError> {
    play(state, pit).map(|turn| turn.state)
}

/// Returns the pits the player to move may sow from.
///
/// Empty unless the game is in play.
pub fn legal_moves(state: &GameState) -> Vec<usize> {
    if state.status() != GameStatus::Playing {
        return Vec::new();
    }
    let board = state.board();
    state
        .current_player()
        .pits()
        .filter(|&pit| board[pit] > 0)
        .collect()
}

/// Replays a sequence of pits from a starting state.
///
/// # Errors
///
/// Returns the first [`MoveError`] encountered.
#[instrument(skip(initial), fields(game_id = %initial.id(), moves = pits.len()))]
pub fn replay(initial: &GameState, pits: &[usize]) -> Result<GameState, MoveError> {
    pits.iter()
        .try_fold(initial.clone(), |state, &pit| apply_move(&state, pit))
}
