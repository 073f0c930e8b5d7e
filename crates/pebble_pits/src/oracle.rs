//! Legality oracle: decides whether a move may be played before the engine
//! runs it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use derive_more::{Display, Error};
use pebble_rules::{Board, LegalMove, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::OracleConfig;

/// Answer to "may `player` sow from `pit` on this board?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the move is allowed.
    pub is_valid: bool,
    /// Human-readable explanation when the move is refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// An accepting verdict.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    /// A refusing verdict with a reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// The legality oracle could not produce a verdict.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Decides move legality for a board position.
#[async_trait]
pub trait LegalityOracle: Send + Sync {
    /// Checks whether `player` may sow from `pit`.
    async fn check(&self, board: &Board, player: Player, pit: usize)
    -> Result<Verdict, OracleError>;
}

/// Oracle backed by the local rules engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesOracle;

#[async_trait]
impl LegalityOracle for RulesOracle {
    #[instrument(skip(self, board))]
    async fn check(
        &self,
        board: &Board,
        player: Player,
        pit: usize,
    ) -> Result<Verdict, OracleError> {
        match LegalMove::check_position(board, player, pit) {
            Ok(()) => Ok(Verdict::valid()),
            Err(e) => {
                debug!(reason = %e, "Move refused by rules");
                Ok(Verdict::invalid(e.to_string()))
            }
        }
    }
}

/// Request body sent to a remote validator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveQuery<'a> {
    board_state: &'a Board,
    player: Player,
    pit_index: usize,
}

/// Oracle that asks an external HTTP validator.
#[derive(Debug, Clone)]
pub struct RemoteOracle {
    url: String,
    client: reqwest::Client,
}

impl RemoteOracle {
    /// Creates an oracle posting to `url` with the given request timeout.
    #[instrument(skip(url), fields(url = %url))]
    pub fn new(url: String, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::new(format!("Failed to build HTTP client: {}", e)))?;
        info!(timeout_ms = timeout.as_millis() as u64, "Remote oracle configured");
        Ok(Self { url, client })
    }
}

#[async_trait]
impl LegalityOracle for RemoteOracle {
    #[instrument(skip(self, board), fields(url = %self.url))]
    async fn check(
        &self,
        board: &Board,
        player: Player,
        pit: usize,
    ) -> Result<Verdict, OracleError> {
        let query = MoveQuery {
            board_state: board,
            player,
            pit_index: pit,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Oracle request failed");
                OracleError::new(format!("Request to {} failed: {}", self.url, e))
            })?
            .error_for_status()
            .map_err(|e| OracleError::new(format!("Oracle answered with an error: {}", e)))?;

        let verdict = response
            .json::<Verdict>()
            .await
            .map_err(|e| OracleError::new(format!("Malformed oracle response: {}", e)))?;

        debug!(is_valid = verdict.is_valid, "Oracle verdict received");
        Ok(verdict)
    }
}

/// Builds the oracle selected by configuration.
#[instrument]
pub fn build_oracle(config: &OracleConfig) -> Result<Arc<dyn LegalityOracle>, OracleError> {
    match config {
        OracleConfig::Rules => Ok(Arc::new(RulesOracle)),
        OracleConfig::Remote { url, timeout_ms } => Ok(Arc::new(RemoteOracle::new(
            url.clone(),
            Duration::from_millis(*timeout_ms),
        )?)),
    }
}
