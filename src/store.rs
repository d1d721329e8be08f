//! Snapshot files for sessions.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strictly_resistance::{MissionCards, RoundSnapshot, Situation, TeamVote};
use tracing::{debug, info, instrument, warn};

/// Everything needed to pick a session up where it left off.
///
/// Ballots and cards are only meaningful in the phase that collects
/// them; restoring re-checks both against the situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct SessionRecord {
    /// The round phase, situation included.
    round: RoundSnapshot,
    /// Ballots cast on the proposed team.
    #[serde(default)]
    vote: TeamVote,
    /// Cards played on the current mission.
    #[serde(default)]
    cards: MissionCards,
}

impl SessionRecord {
    /// The recorded situation.
    pub fn situation(&self) -> &Situation {
        self.round.situation()
    }
}

/// Checks that `session` is usable as a file name inside the store:
/// non-empty, ASCII letters, digits, `-` and `_` only.
///
/// # Errors
///
/// Returns [`StoreError`] naming the rejected id.
#[track_caller]
pub fn validate_session_id(session: &str) -> Result<(), StoreError> {
    let valid = !session.is_empty()
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        warn!(session, "Rejected session id");
        return Err(StoreError::new(format!(
            "Session id '{}' must be non-empty and use only letters, digits, '-' or '_'",
            session
        )));
    }
    Ok(())
}

/// Stores one JSON snapshot per session in a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::new(format!("Failed to create '{}': {}", dir.display(), e))
        })?;
        info!("Snapshot store ready");
        Ok(Self { dir })
    }

    /// Path of the snapshot file for `session`, always inside the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the id fails [`validate_session_id`].
    pub fn path_for(&self, session: &str) -> Result<PathBuf, StoreError> {
        validate_session_id(session)?;
        Ok(self.dir.join(format!("{}.json", session)))
    }

    /// Returns true if a snapshot exists for `session`.
    pub fn exists(&self, session: &str) -> bool {
        self.path_for(session).is_ok_and(|path| path.is_file())
    }

    /// Writes the full record, roles included.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad id, serialization or I/O failure.
    #[instrument(skip(self, record), fields(round = record.situation().round_number()))]
    pub fn save(&self, session: &str, record: &SessionRecord) -> Result<PathBuf, StoreError> {
        let path = self.path_for(session)?;
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json).map_err(|e| {
            StoreError::new(format!("Failed to write '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Snapshot saved");
        Ok(path)
    }

    /// Reads a record back, re-checking the situation's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the id is bad, or the file is missing,
    /// unreadable, or describes an inconsistent situation.
    #[instrument(skip(self))]
    pub fn load(&self, session: &str) -> Result<SessionRecord, StoreError> {
        let path = self.path_for(session)?;
        let json = std::fs::read_to_string(&path).map_err(|e| {
            warn!(path = %path.display(), "Snapshot unreadable");
            StoreError::new(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let record: SessionRecord = serde_json::from_str(&json)?;
        debug!(round = record.situation().round_number(), "Snapshot loaded");
        Ok(record)
    }

    /// Deletes the snapshot for a finished or abandoned session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad id, or if the file exists but
    /// cannot be removed.
    #[instrument(skip(self))]
    pub fn remove(&self, session: &str) -> Result<(), StoreError> {
        let path = self.path_for(session)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new(format!(
                "Failed to remove '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Snapshot store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Snapshot JSON error: {}", err))
    }
}
