//! List command implementation.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::utils::{format_enrolled_at, load_config, GlobalOptions};
use rollcall_core::RecordStore;

/// Execute the list command.
///
/// Read-only: opens the store directly, no authenticator is involved.
pub fn execute(options: &GlobalOptions) -> Result<()> {
    let config = load_config(options)?;
    let store = RecordStore::open(&config.store_dir).with_context(|| {
        format!(
            "Failed to open record store: {}",
            config.store_dir.display()
        )
    })?;
    let identities = store.list().context("Failed to read enrolled identities")?;

    if identities.is_empty() {
        if !options.quiet {
            println!("{}", "No registered users found".yellow());
        }
        return Ok(());
    }

    for identity in &identities {
        if options.quiet {
            println!("{}\t{}", identity.credential_reference, identity.display_name);
        } else {
            println!(
                "{}  {}  {}",
                identity.display_name.bold(),
                format_enrolled_at(&identity.enrolled_at).dimmed(),
                identity.credential_reference.to_string().dimmed()
            );
        }
    }

    if !options.quiet {
        println!();
        println!("{} registered", identities.len());
    }

    Ok(())
}
