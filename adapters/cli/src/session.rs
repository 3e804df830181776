//! Read-tick, emit-command loop for a single match.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};
use trailrunner_protocol::{decode, encode_decision, Message};
use trailrunner_system_strategy::{BotConfig, Strategy};

/// Plays one match, answering every tick with exactly one command line.
pub(crate) fn run(config: BotConfig, input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut strategy: Option<Strategy> = None;

    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let message =
            decode(&line).with_context(|| format!("failed to decode line {}", number + 1))?;

        match message {
            Message::StartGame(grid) => {
                info!(
                    columns = grid.x_cells_count(),
                    rows = grid.y_cells_count(),
                    cell_size = grid.cell_size(),
                    "match started"
                );
                strategy = Some(Strategy::new(grid, config.clone()));
            }
            Message::Tick(snapshot) => {
                let Some(strategy) = strategy.as_mut() else {
                    bail!("tick {} arrived before start_game", snapshot.tick());
                };
                let decision = strategy
                    .decide(&snapshot)
                    .ok_or_else(|| anyhow!("tick {} has no controlled player", snapshot.tick()))?;
                let reply = encode_decision(&decision)?;
                writeln!(output, "{reply}").context("failed to write command")?;
                output.flush().context("failed to flush command")?;
            }
            Message::EndGame => {
                info!("match ended");
                return Ok(());
            }
        }
    }

    debug!("input closed without end_game");
    Ok(())
}
