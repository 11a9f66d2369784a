//! Attend command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use rollcall_core::CredentialReference;

use crate::utils::{build_service, GlobalOptions};

/// Execute the attend command.
///
/// `present` names the credential the mock authenticator should assert; the
/// first enrolled credential is used otherwise.
pub async fn execute(options: &GlobalOptions, present: Option<String>) -> Result<()> {
    let presented = present
        .as_deref()
        .map(CredentialReference::parse)
        .transpose()
        .context("Invalid --present credential")?;

    let (service, platform) = build_service(options)?;
    if let Some(reference) = &presented {
        debug!(credential = %reference, "Presenting credential");
    }
    platform.present(presented);

    let attendance = service
        .mark_attendance()
        .await
        .context("Failed to mark attendance")?;

    info!(
        display_name = %attendance.identity.display_name,
        relayed = !attendance.relay_failed(),
        "Attend command finished"
    );

    if !options.quiet {
        let record = &attendance.record;
        println!();
        println!("{}", "Attendance marked successfully!".green().bold());
        println!();
        println!("   {} {}", "Name:".dimmed(), record.name);
        println!("   {} {}", "Date:".dimmed(), record.date);
        println!("   {} {}", "Day:".dimmed(), record.day);
        println!("   {} {}", "Time:".dimmed(), record.time);
        if let Err(e) = &attendance.relay {
            println!("   {} {}", "Sheet:".dimmed(), e.status_text().yellow());
        }
    }

    Ok(())
}
