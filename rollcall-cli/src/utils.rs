//! Common utility functions shared across CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use tracing::{debug, warn};
use url::Url;

use rollcall_core::{AttendanceService, MockAuthenticator, RollcallConfig};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub store: Option<PathBuf>,
    pub webhook: Option<Url>,
    pub quiet: bool,
}

/// Load configuration from the environment, then apply command-line overrides.
pub fn load_config(options: &GlobalOptions) -> Result<RollcallConfig> {
    let mut config = RollcallConfig::from_env().context("Failed to load configuration")?;
    if let Some(store) = &options.store {
        config.store_dir = store.clone();
    }
    if let Some(webhook) = &options.webhook {
        config.webhook_url = Some(webhook.clone());
    }
    debug!(
        store_dir = %config.store_dir.display(),
        webhook = config.webhook_url.is_some(),
        rp_origin = %config.rp_origin,
        "Loaded configuration"
    );
    Ok(config)
}

/// Wire the service around the mock platform authenticator.
///
/// The command line has no browser, so every ceremony is answered by the mock.
/// It is reseeded per invocation so credential ids never collide across runs.
pub fn build_service(
    options: &GlobalOptions,
) -> Result<(AttendanceService, Arc<MockAuthenticator>)> {
    let config = load_config(options)?;

    warn!("Using MOCK platform authenticator (no biometric check!)");
    if !options.quiet {
        eprintln!(
            "{}",
            "Using MOCK platform authenticator (no biometric check!)".yellow()
        );
    }

    let platform = Arc::new(MockAuthenticator::random());
    let service = AttendanceService::from_config(&config, platform.clone()).with_context(|| {
        format!(
            "Failed to open record store: {}",
            config.store_dir.display()
        )
    })?;
    Ok((service, platform))
}

/// Format an enrollment time in the local timezone.
pub fn format_enrolled_at(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y %-I:%M:%S %p")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_enrolled_at_uses_us_layout() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let formatted = format_enrolled_at(&at);
        assert!(formatted.contains("/2024 "));
        assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let options = GlobalOptions {
            store: Some(PathBuf::from("/tmp/rollcall-test")),
            webhook: Some(Url::parse("https://example.com/exec").unwrap()),
            quiet: true,
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/rollcall-test"));
        assert_eq!(
            config.webhook_url.unwrap().as_str(),
            "https://example.com/exec"
        );
    }
}
