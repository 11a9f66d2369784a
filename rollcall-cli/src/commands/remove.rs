//! Remove command implementation.

use anyhow::{Context, Result};
use colored::Colorize;

use rollcall_core::CredentialReference;

use crate::utils::{build_service, GlobalOptions};

/// Execute the remove command.
pub async fn execute(options: &GlobalOptions, credential: String) -> Result<()> {
    let reference = CredentialReference::parse(&credential).context("Invalid credential")?;

    let (service, _platform) = build_service(options)?;
    let removed = service
        .remove(&reference)
        .await
        .with_context(|| format!("Failed to remove {reference}"))?;

    if !options.quiet {
        println!(
            "{} {}",
            "Removed".green().bold(),
            removed.display_name
        );
    }

    Ok(())
}
