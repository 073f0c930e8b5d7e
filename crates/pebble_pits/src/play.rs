//! Terminal hot-seat game against the CPU placeholder.

use std::sync::Arc;

use pebble_rules::{GameState, GameStatus, PITS_PER_PLAYER, pits};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};

use crate::oracle::RulesOracle;
use crate::service::{CreateOptions, GameService, ServiceError};
use crate::store::MemoryStore;

const LOCAL_GAME_ID: &str = "local";

/// Plays one game against the CPU placeholder, reading pit labels from
/// `input` and writing to `output`.
///
/// Labels run 1-6 on the mover's own side. `q` quits. Returns the final
/// state, finished or not.
#[instrument(skip(input, output))]
pub async fn run<R, W>(player: &str, input: R, output: W) -> anyhow::Result<GameState>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let service = GameService::new(Arc::new(MemoryStore::new()), Arc::new(RulesOracle), 16);
    let options = CreateOptions {
        game_id: Some(LOCAL_GAME_ID.to_string()),
        player1_name: Some(player.to_string()),
        ..CreateOptions::default()
    };
    service.create_game(player, options).await?;
    info!(player, "Local game started");
    run_game(&service, LOCAL_GAME_ID, player, input, output).await
}

/// Plays an existing game as `player` until it ends, the input closes or
/// the player quits.
#[instrument(skip(service, input, output))]
pub async fn run_game<R, W>(
    service: &GameService,
    game_id: &str,
    player: &str,
    input: R,
    mut output: W,
) -> anyhow::Result<GameState>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut game = service.get_game(game_id).await?.into_state();
    let mut lines = input.lines();
    loop {
        output
            .write_all(render(&game).as_bytes())
            .await?;
        if game.status() == GameStatus::GameOver {
            break;
        }
        output
            .write_all(
                format!(
                    "{}, choose a pit (1-{}) or q to quit: ",
                    game.player_names().get(game.current_player()),
                    PITS_PER_PLAYER
                )
                .as_bytes(),
            )
            .await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("Input closed");
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            info!("Player quit");
            break;
        }

        let pit = line
            .parse::<usize>()
            .ok()
            .and_then(|label| pits::from_label(game.current_player(), label));
        let Some(pit) = pit else {
            output
                .write_all(format!("Enter a number from 1 to {}.\n", PITS_PER_PLAYER).as_bytes())
                .await?;
            continue;
        };

        match service.make_move(game_id, player, pit).await {
            Ok(receipt) => game = receipt.game.into_state(),
            Err(e @ (ServiceError::IllegalMove { .. } | ServiceError::Rules(_))) => {
                output.write_all(format!("{}\n", e).as_bytes()).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    output.flush().await?;
    Ok(game)
}

/// Board, scores and last message, ready to print.
///
/// A finished game's message already names the winner.
fn render(game: &GameState) -> String {
    let names = game.player_names();
    let scores = game.scores();
    format!(
        "\n{}\n{}: {}   {}: {}\n{}\n",
        game.board(),
        names.player1,
        scores.player1,
        names.player2,
        scores.player2,
        game.last_move_message()
    )
}

/// Reads from stdin and writes to stdout.
pub async fn run_stdio(player: &str) -> anyhow::Result<GameState> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run(player, stdin, tokio::io::stdout()).await
}
