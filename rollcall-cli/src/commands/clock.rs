//! Clock command implementation.

use anyhow::{Context, Result};
use colored::Colorize;

use rollcall_core::{format_clock, ClockTicker};

/// Execute the clock command.
///
/// Prints one line per second until `ticks` lines were printed, or until
/// Ctrl-C when no limit is given.
pub async fn execute(ticks: Option<u64>) -> Result<()> {
    let mut ticker = ClockTicker::every_second();
    let mut printed = 0u64;

    loop {
        if ticks.is_some_and(|limit| printed >= limit) {
            return Ok(());
        }

        tokio::select! {
            now = ticker.next() => {
                println!("{}", format_clock(&now).cyan());
                printed += 1;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                return Ok(());
            }
        }
    }
}
