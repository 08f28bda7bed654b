#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless SeaDog tracker session.

mod config;
mod report;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use seadog_core::{ActivityFilter, CategoryFilter, Command, EntityId};
use seadog_rendering::HeadlessMap;
use seadog_system_session::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Overrides, report::Report};

/// Runs a simulated tracking session and prints the resulting panels.
#[derive(Debug, Parser)]
#[command(name = "seadog", version)]
struct Cli {
    /// Path to a TOML session configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the perturbation random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between perturbation ticks.
    #[arg(long, value_name = "MS")]
    tick_interval_ms: Option<u64>,

    /// Milliseconds a filter selection waits for further selections.
    #[arg(long, value_name = "MS")]
    coalescing_window_ms: Option<u64>,

    /// Per-tick chance that an active shark moves, in 0.0..=1.0.
    #[arg(long, value_name = "P")]
    move_probability: Option<f64>,

    /// Largest per-axis drift applied by a tick, in degrees.
    #[arg(long, value_name = "DEGREES")]
    max_step_degrees: Option<f64>,

    /// Category filter: all, great-white, hammerhead, tiger or bull.
    #[arg(long)]
    category: Option<CategoryFilter>,

    /// Activity filter: all, active or inactive.
    #[arg(long)]
    activity: Option<ActivityFilter>,

    /// Number of perturbation ticks to simulate after filtering.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Entity id to select from the list once the run is over.
    #[arg(long, value_name = "ID")]
    select: Option<u32>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            tick_interval_ms: self.tick_interval_ms,
            coalescing_window_ms: self.coalescing_window_ms,
            move_probability: self.move_probability,
            max_step_degrees: self.max_step_degrees,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.overrides().apply(config::load(cli.config.as_deref())?);
    let mut session =
        Session::new(&config, HeadlessMap::new()).context("invalid session configuration")?;
    let mut events = Vec::new();
    session.start(&mut events);

    if let Some(filter) = cli.category {
        session.submit(Command::SelectCategory { filter }, &mut events);
    }
    if let Some(filter) = cli.activity {
        session.submit(Command::SelectActivity { filter }, &mut events);
    }
    session.advance(config.coalescing_window(), &mut events);

    for _ in 0..cli.ticks {
        session.advance(config.tick_interval(), &mut events);
    }

    if let Some(id) = cli.select {
        session.submit(
            Command::SelectEntry {
                entity: EntityId::new(id),
            },
            &mut events,
        );
    }

    info!(events = events.len(), now = ?session.now(), "session finished");

    let report = Report::capture(&session, &events);
    let mut out = io::stdout().lock();
    if cli.json {
        report.write_json(&mut out)
    } else {
        report.write_text(&mut out)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
