#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Tunnel Hive session.

mod config;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tunnel_hive_core::Difficulty;
use tunnel_hive_world::query;

use crate::config::{FileConfig, Overrides, RunConfig};

#[derive(Debug, Parser)]
#[command(name = "tunnel-hive", about = "Play a scripted Tunnel Hive session")]
struct Args {
    /// Difficulty: easy, medium or hard.
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Seed for the playfield layout.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate before stopping.
    #[arg(long)]
    ticks: Option<u32>,
    /// Simulated milliseconds per tick.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// TOML file with settings and a scripted action list.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    const fn overrides(&self) -> Overrides {
        Overrides {
            difficulty: self.difficulty,
            seed: self.seed,
            ticks: self.ticks,
            tick_ms: self.tick_ms,
        }
    }
}

/// Entry point for the Tunnel Hive command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => FileConfig::default(),
    };
    let run = RunConfig::resolve(args.overrides(), file).context("invalid run configuration")?;
    log::info!(
        "running {} ticks of {:?} on {} difficulty",
        run.ticks,
        run.tick,
        run.difficulty
    );

    let session = session::play(&run);
    println!("{}", render::board(session.world()));
    log::info!("final score {}", query::score(session.world()));
    Ok(())
}
