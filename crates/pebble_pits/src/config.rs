//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the HTTP game server.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database file. The in-memory store is used when absent.
    #[serde(default)]
    database: Option<String>,

    /// Buffered game events per subscriber before old ones are dropped.
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,

    /// Legality oracle to consult before each move.
    #[serde(default)]
    oracle: OracleConfig,
}

/// Which legality oracle the service consults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OracleConfig {
    /// Built-in rules check.
    #[default]
    Rules,
    /// External HTTP validator.
    Remote {
        /// Endpoint receiving `{ boardState, player, pitIndex }`.
        url: String,
        /// Request timeout in milliseconds.
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3000
}

#[instrument]
fn default_event_capacity() -> usize {
    64
}

#[instrument]
fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: None,
            event_capacity: default_event_capacity(),
            oracle: OracleConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.event_capacity == 0 {
            return Err(ConfigError::new(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    #[instrument(skip(self))]
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if database.is_some() {
            self.database = database;
        }
        self
    }

    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.oracle(), &OracleConfig::Rules);
    }

    #[test]
    fn test_full_file() {
        let config = ServerConfig::from_toml(
            r#"
            host = "0.0.0.0"
            port = 8080
            database = "games.db"
            event_capacity = 16

            [oracle]
            kind = "remote"
            url = "http://localhost:4000/validate"
            "#,
        )
        .unwrap();

        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.database().as_deref(), Some("games.db"));
        assert_eq!(*config.event_capacity(), 16);
        assert_eq!(
            config.oracle(),
            &OracleConfig::Remote {
                url: "http://localhost:4000/validate".to_string(),
                timeout_ms: 5_000,
            }
        );
    }

    #[test]
    fn test_unknown_oracle_kind_fails() {
        let result = ServerConfig::from_toml("[oracle]\nkind = \"psychic\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_event_capacity_fails() {
        let err = ServerConfig::from_toml("event_capacity = 0").unwrap_err();
        assert!(err.message.contains("event_capacity"));
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = ServerConfig::default().with_overrides(None, Some(9000), None);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(*config.port(), 9000);
        assert!(config.database().is_none());
    }
}
