#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays one match over stdin and stdout.

mod session;

use std::{
    fs,
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use trailrunner_system_strategy::BotConfig;

/// Grid territory bot speaking the line-delimited JSON protocol.
#[derive(Debug, Parser)]
#[command(name = "trailrunner", version, about)]
struct Cli {
    /// TOML file with bot parameters.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plies explored by the forward simulator (0 disables it).
    #[arg(long)]
    depth: Option<u32>,

    /// Manhattan radius pulling opponents into the simulation.
    #[arg(long)]
    radius: Option<u32>,

    /// Seed for exploratory targets.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn bot_config(&self) -> Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                BotConfig::from_toml(&contents)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => BotConfig::default(),
        };

        if let Some(depth) = self.depth {
            config.predictor_depth = depth;
        }
        if let Some(radius) = self.radius {
            config.interaction_radius = radius;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

/// Entry point for the trailrunner command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.bot_config()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(config, stdin.lock(), BufWriter::new(stdout.lock()))
}
