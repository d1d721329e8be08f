//! Resistance Table - Unified CLI
//!
//! Deals tables, inspects saved sessions, and simulates whole games.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use resistance_table::{GameSession, SnapshotStore, TableConfig, deal_table, simulate};
use std::path::{Path, PathBuf};
use strictly_resistance::{Player, Viewer};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let snapshot_dir = cli.snapshot_dir;
    match cli.command {
        Command::New { config, force } => run_new(&load_config(&config, snapshot_dir)?, force),
        Command::Show {
            config,
            viewer,
            reveal,
        } => run_show(&load_config(&config, snapshot_dir)?, viewer, reveal),
        Command::Simulate { config, seed } => run_simulate(load_config(&config, snapshot_dir)?, seed),
    }
}

/// Load the table config, letting the command line pick the snapshot dir
#[instrument]
fn load_config(path: &Path, snapshot_dir: Option<PathBuf>) -> Result<TableConfig> {
    let config = TableConfig::from_file(path)?;
    Ok(match snapshot_dir {
        Some(dir) => config.with_snapshot_dir(dir),
        None => config,
    })
}

/// Deal a table and save its opening snapshot
#[instrument(skip(config), fields(session = %config.session()))]
fn run_new(config: &TableConfig, force: bool) -> Result<()> {
    let store = SnapshotStore::open(config.snapshot_dir())?;

    if store.exists(config.session()) && !force {
        bail!(
            "Session '{}' already exists; pass --force to deal again",
            config.session()
        );
    }

    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };
    let situation = deal_table(config, &mut rng)?;
    let session = GameSession::new(config.session().clone(), situation);
    let path = store.save(config.session(), &session.record()?)?;
    info!(path = %path.display(), "Session saved");

    println!("Dealt session '{}' to {}", config.session(), path.display());
    print_public(&session)?;
    Ok(())
}

/// Show a saved session from one viewer's seat
#[instrument(skip(config), fields(session = %config.session()))]
fn run_show(config: &TableConfig, viewer: Option<String>, reveal: bool) -> Result<()> {
    let store = SnapshotStore::open(config.snapshot_dir())?;
    let session = GameSession::restore(config.session().clone(), store.load(config.session())?)?;
    print_public(&session)?;
    let situation = session.situation()?;

    let viewer = match (viewer, reveal) {
        (_, true) => Viewer::Moderator,
        (Some(handle), false) => Viewer::seat(Player::new(handle)),
        (None, false) => return Ok(()),
    };

    if let Viewer::Seat(me) = &viewer {
        let role = situation.role_of(me, &viewer)?;
        println!("You are {}", role);
    }
    match situation.spies(&viewer) {
        Ok(spies) => println!("Spies: {}", join(spies.iter().map(|pc| pc.player()))),
        Err(e) => warn!(error = %e, "Spy list withheld"),
    }
    Ok(())
}

/// Simulate a whole game
#[instrument(skip(config), fields(session = %config.session()))]
fn run_simulate(mut config: TableConfig, seed: Option<u64>) -> Result<()> {
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let report = simulate(&config)?;
    println!(
        "{} after {} missions and {} proposals (seed {})",
        report.outcome(),
        report.rounds(),
        report.proposals(),
        report.seed()
    );
    println!("Spies were: {}", join(report.spies().iter()));
    Ok(())
}

fn print_public(session: &GameSession) -> Result<()> {
    let situation = session.situation()?;
    println!("Round {} ({})", situation.round_number(), session.phase_name());
    println!(
        "Missions: {} succeeded, {} failed",
        situation.mission_successes(),
        situation.mission_fails()
    );
    println!(
        "Seating: {}",
        join(situation.seating().iter().map(|pc| pc.player()))
    );
    println!("Leader: {}", situation.leader());

    let outcome = session.outcome();
    if outcome.is_decided() {
        println!("Outcome: {}", outcome);
    } else {
        println!("Next team size: {}", situation.required_team_size()?);
    }
    Ok(())
}

fn join<'a>(players: impl Iterator<Item = &'a Player>) -> String {
    players
        .map(Player::handle)
        .collect::<Vec<_>>()
        .join(", ")
}
