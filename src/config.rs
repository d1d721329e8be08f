//! Table configuration loaded from TOML.

use crate::store::validate_session_id;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strictly_resistance::Player;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`TableConfig::snapshot_dir`].
pub const SNAPSHOT_DIR_ENV: &str = "RESISTANCE_SNAPSHOT_DIR";

/// Configuration for one table: who sits where and how to deal.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct TableConfig {
    /// Session identifier (used for the snapshot file name).
    session: String,

    /// Player handles in seating order.
    players: Vec<String>,

    /// Seed for dealing roles; random when absent.
    #[serde(default)]
    seed: Option<u64>,

    /// Handle of the first leader; defaults to the first seat.
    #[serde(default)]
    first_leader: Option<String>,

    /// Directory holding session snapshots.
    #[serde(default = "default_snapshot_dir")]
    snapshot_dir: PathBuf,
}

#[instrument]
fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("sessions")
}

impl TableConfig {
    /// Creates a configuration with default dealing and storage.
    #[instrument(skip(session, players), fields(session = %session, players = players.len()))]
    pub fn new(session: String, players: Vec<String>) -> Self {
        Self {
            session,
            players,
            seed: None,
            first_leader: None,
            snapshot_dir: default_snapshot_dir(),
        }
    }

    /// Sets the dealing seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the snapshot directory.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Loads configuration from a TOML file.
    ///
    /// `RESISTANCE_SNAPSHOT_DIR`, when set, overrides `snapshot_dir`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml(&content)?;
        if let Ok(dir) = std::env::var(SNAPSHOT_DIR_ENV) {
            debug!(dir = %dir, "Snapshot dir overridden by environment");
            config.snapshot_dir = PathBuf::from(dir);
        }

        info!(session = %config.session, players = config.players.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the session id and the first leader.
    ///
    /// Player counts are left to the engine, which reports unsupported
    /// tables as configuration errors of its own.
    #[instrument(skip(self), fields(session = %self.session))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_session_id(&self.session).map_err(|e| ConfigError::new(e.message))?;
        if let Some(leader) = &self.first_leader
            && !self.players.contains(leader)
        {
            return Err(ConfigError::new(format!(
                "First leader '{}' is not among the players",
                leader
            )));
        }
        Ok(())
    }

    /// Players as engine identities, in seating order.
    pub fn seated_players(&self) -> Vec<Player> {
        self.players.iter().map(|h| Player::new(h.as_str())).collect()
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
