//! Tests for loading table configuration from disk.
//!
//! This binary is the only one that touches `RESISTANCE_SNAPSHOT_DIR`, and
//! it does so from a single test, so no other thread reads the variable
//! while it changes.

use resistance_table::{SNAPSHOT_DIR_ENV, TableConfig};
use std::path::PathBuf;

const TABLE: &str = r#"
session = "env-check"
players = ["a", "b", "c", "d", "e"]
snapshot_dir = "from-file"
"#;

#[test]
fn test_snapshot_dir_precedence() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("table.toml");
    std::fs::write(&path, TABLE).expect("Failed to write config");

    // SAFETY: single-threaded use; see the module docs.
    unsafe { std::env::remove_var(SNAPSHOT_DIR_ENV) };
    let config = TableConfig::from_file(&path).expect("Valid config");
    assert_eq!(config.snapshot_dir(), &PathBuf::from("from-file"));

    // SAFETY: as above.
    unsafe { std::env::set_var(SNAPSHOT_DIR_ENV, "/srv/resistance") };
    let config = TableConfig::from_file(&path);
    // SAFETY: as above.
    unsafe { std::env::remove_var(SNAPSHOT_DIR_ENV) };
    let config = config.expect("Valid config");
    assert_eq!(config.snapshot_dir(), &PathBuf::from("/srv/resistance"));
    assert_eq!(config.session(), "env-check");

    let config = config.with_snapshot_dir("from-cli");
    assert_eq!(config.snapshot_dir(), &PathBuf::from("from-cli"));
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    assert!(TableConfig::from_file(dir.path().join("absent.toml")).is_err());
}
