//! Resistance Table library - sessions, storage, and self-play around the
//! `strictly_resistance` engine.
//!
//! # Architecture
//!
//! - **Config**: TOML table configuration ([`TableConfig`])
//! - **Session**: one isolated, serialized engine per table ([`SessionManager`])
//! - **Store**: JSON snapshots of each session ([`SnapshotStore`])
//! - **Simulate**: seeded games played end to end ([`simulate`])
//!
//! # Example
//!
//! ```no_run
//! use resistance_table::{SessionManager, TableConfig, deal_table};
//! use rand::SeedableRng;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = TableConfig::from_file("table.toml")?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let situation = deal_table(&config, &mut rng)?;
//!
//! let sessions = SessionManager::new();
//! let id = sessions.create_session(config.session().clone(), situation)?;
//! let round = sessions.with_session(&id, |s| Ok(s.situation()?.round_number()))?;
//! assert_eq!(round, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod session;
mod simulate;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, SNAPSHOT_DIR_ENV, TableConfig};

// Crate-level exports - Session management
pub use session::{GameSession, SessionError, SessionId, SessionManager};

// Crate-level exports - Persistence
pub use store::{SessionRecord, SnapshotStore, StoreError, validate_session_id};

// Crate-level exports - Self-play
pub use simulate::{SimulationReport, deal_table, simulate};
