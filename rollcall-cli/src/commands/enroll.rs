//! Enroll command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::utils::{build_service, GlobalOptions};

/// Execute the enroll command.
pub async fn execute(options: &GlobalOptions, name: String) -> Result<()> {
    let (service, _platform) = build_service(options)?;

    let enrollment = service
        .enroll(&name)
        .await
        .with_context(|| format!("Failed to enroll {}", name.trim()))?;

    info!(
        display_name = %enrollment.identity.display_name,
        relayed = enrollment.relay.is_ok(),
        "Enroll command finished"
    );

    if !options.quiet {
        println!();
        println!("{}", "Registration successful!".green().bold());
        println!();
        println!(
            "   {} {}",
            "Name:".dimmed(),
            enrollment.identity.display_name
        );
        println!(
            "   {} {}",
            "Credential:".dimmed(),
            enrollment.identity.credential_reference
        );
        if let Some(id) = &enrollment.identity.identity_id {
            println!("   {} {}", "Identity:".dimmed(), id);
        }
        if let Err(e) = &enrollment.relay {
            println!("   {} {}", "Sheet:".dimmed(), e.status_text().yellow());
        }
    }

    Ok(())
}
