//! Tests for the Move Engine against whole-game properties.

use pebble_rules::invariants::{InvariantSet, PebblePitsInvariants};
use pebble_rules::{
    Board, GameState, GameStatus, MoveError, Outcome, Player, Scores, TOTAL_SEEDS, apply_move,
    legal_moves, play, sow,
};

fn position(pits: [u32; 12], mover: Player) -> GameState {
    GameState::new("g1", "alice").with_position(Board::from_pits(pits), mover, Scores::default())
}

fn seeds_in_play(state: &GameState) -> u32 {
    state.board().total() + state.scores().total()
}

#[test]
fn test_opening_move_scenario() {
    let game = GameState::new("g1", "alice");
    let turn = play(&game, 2).expect("Valid move");

    assert_eq!(turn.sowing.landing, 6);
    assert_eq!(turn.captured, None);
    assert_eq!(
        turn.state.board().pits(),
        &[4, 4, 0, 5, 5, 5, 5, 4, 4, 4, 4, 4]
    );
    assert_eq!(turn.state.current_player(), Player::Two);
    assert_eq!(turn.state.status(), GameStatus::Playing);
    assert_eq!(turn.state.winner(), None);
    assert_eq!(
        turn.state.last_move_message(),
        "Player 1 sowed 4 seeds from pit 3.  Player 2 (CPU)'s turn."
    );
}

#[test]
fn test_capture_cases() {
    // Landing pit already held a seed.
    let turn = play(&position([1; 12], Player::One), 0).unwrap();
    assert_eq!(turn.captured, None);

    // Landing pit is on the opponent's side.
    let turn = play(&position([0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], Player::One), 5).unwrap();
    assert_eq!(turn.captured, None);

    // Two seeds, landing pit 2 held a seed before.
    let turn = play(&position([2, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], Player::One), 0).unwrap();
    assert_eq!(turn.sowing.landing, 2);
    assert_eq!(turn.captured, None);
    assert_eq!(turn.state.board()[1], 1);
    assert_eq!(turn.state.board()[2], 2);

    // The true positive: pit 1 was empty and pit 10 holds seeds.
    let before = position([1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], Player::One);
    let turn = play(&before, 0).unwrap();
    assert_eq!(turn.captured, Some(1 + before.board()[10]));
    assert_eq!(turn.state.board()[1], 0);
    assert_eq!(turn.state.board()[10], 0);
    assert_eq!(turn.state.scores().player1, 2);
}

#[test]
fn test_sowing_count_with_wraparound() {
    for origin in 0..12 {
        for seeds in 1..30u32 {
            let mut pits = [0u32; 12];
            pits[origin] = seeds;
            let mut board = Board::from_pits(pits);
            let sowing = sow(&mut board, origin);

            assert_eq!(sowing.landing, (origin + seeds as usize) % 12);
            assert_eq!(board.total(), seeds);
            for pit in 0..12 {
                let distance = (pit + 12 - origin - 1) % 12 + 1;
                let laps = seeds as usize / 12;
                let expected = laps + usize::from(distance <= seeds as usize % 12);
                assert_eq!(board[pit] as usize, expected, "origin {origin}, seeds {seeds}, pit {pit}");
            }
        }
    }
}

#[test]
fn test_full_games_keep_invariants() {
    // Two deterministic strategies: lowest and highest legal pit.
    let strategies: [fn(&[usize]) -> usize; 2] = [|moves| moves[0], |moves| moves[moves.len() - 1]];

    for pick_one in strategies {
        for pick_two in strategies {
            let mut game = GameState::new("g1", "alice");
            for _ in 0..1_000 {
                if game.is_over() {
                    break;
                }
                let moves = legal_moves(&game);
                assert!(!moves.is_empty(), "player to move must have a move");
                let mover = game.current_player();
                let pit = match mover {
                    Player::One => pick_one(&moves),
                    Player::Two => pick_two(&moves),
                };

                let next = apply_move(&game, pit).expect("legal move");
                assert_eq!(seeds_in_play(&next), TOTAL_SEEDS);
                assert!(next.scores().player1 >= game.scores().player1);
                assert!(next.scores().player2 >= game.scores().player2);
                assert!(PebblePitsInvariants::check_all(&next).is_ok());
                if next.status() == GameStatus::Playing {
                    assert_eq!(next.current_player(), mover.opponent());
                } else {
                    assert_eq!(next.current_player(), mover);
                }
                game = next;
            }

            if game.is_over() {
                assert!(game.board().is_empty());
                let expected = game.scores().outcome();
                assert_eq!(game.winner(), Some(expected));
                assert!(matches!(
                    apply_move(&game, 0),
                    Err(MoveError::GameNotInPlay(GameStatus::GameOver))
                ));
            }
        }
    }
}

#[test]
fn test_winner_is_strictly_higher_score() {
    let game = GameState::new("g1", "alice").with_position(
        Board::from_pits([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0]),
        Player::Two,
        Scores {
            player1: 20,
            player2: 27,
        },
    );
    let over = apply_move(&game, 10).unwrap();
    assert_eq!(over.scores().player2, 28);
    assert_eq!(over.winner(), Some(Outcome::Winner(Player::Two)));
    assert!(over.last_move_message().ends_with("Player 2 (CPU) wins!"));
}

#[test]
fn test_precondition_violations_fail_fast() {
    let game = GameState::new("g1", "alice");
    assert_eq!(apply_move(&game, 12), Err(MoveError::PitOutOfRange(12)));
    assert!(matches!(
        apply_move(&game, 6),
        Err(MoveError::NotYourPit { pit: 6, .. })
    ));
    let empty = position([0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], Player::One);
    assert_eq!(apply_move(&empty, 0), Err(MoveError::EmptyPit(0)));
}
