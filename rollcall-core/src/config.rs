//! Configuration module
//!
//! Loads configuration from environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Result, RollcallError};
use crate::platform::RelyingParty;

/// Default relying party display name
pub const DEFAULT_RP_NAME: &str = "Attendance System";

/// Default platform ceremony timeout (60 seconds)
pub const DEFAULT_CEREMONY_TIMEOUT_SECS: u64 = 60;

/// Default webhook request timeout (10 seconds)
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 10;

/// Rollcall configuration
#[derive(Debug, Clone)]
pub struct RollcallConfig {
    /// Origin the credentials are bound to; its host is the relying party id
    pub rp_origin: Url,
    /// Human-readable relying party name shown by the platform prompt
    pub rp_name: String,
    /// Directory holding the local record store (default: .rollcall)
    pub store_dir: PathBuf,
    /// Spreadsheet webhook endpoint (relay disabled when unset)
    pub webhook_url: Option<Url>,
    /// Timeout for enrollment and assertion ceremonies (default: 60s)
    pub ceremony_timeout: Duration,
    /// Timeout for webhook requests (default: 10s)
    pub relay_timeout: Duration,
}

impl Default for RollcallConfig {
    fn default() -> Self {
        Self {
            rp_origin: Url::parse("http://localhost").expect("static origin is valid"),
            rp_name: DEFAULT_RP_NAME.to_string(),
            store_dir: PathBuf::from(".rollcall"),
            webhook_url: None,
            ceremony_timeout: Duration::from_secs(DEFAULT_CEREMONY_TIMEOUT_SECS),
            relay_timeout: Duration::from_secs(DEFAULT_RELAY_TIMEOUT_SECS),
        }
    }
}

impl RollcallConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `ROLLCALL_RP_ORIGIN` - origin URL (default: "http://localhost")
    /// - `ROLLCALL_RP_NAME` - relying party name (default: "Attendance System")
    /// - `ROLLCALL_STORE_DIR` - record store directory (default: ".rollcall")
    /// - `ROLLCALL_WEBHOOK_URL` - spreadsheet webhook (default: unset, relay disabled)
    /// - `ROLLCALL_CEREMONY_TIMEOUT_SECS` - ceremony timeout (default: 60)
    /// - `ROLLCALL_RELAY_TIMEOUT_SECS` - webhook timeout (default: 10)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let rp_origin = match std::env::var("ROLLCALL_RP_ORIGIN") {
            Ok(origin) if !origin.trim().is_empty() => parse_url("ROLLCALL_RP_ORIGIN", &origin)?,
            _ => defaults.rp_origin,
        };

        let rp_name = std::env::var("ROLLCALL_RP_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.rp_name);

        let store_dir = std::env::var("ROLLCALL_STORE_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        let webhook_url = match std::env::var("ROLLCALL_WEBHOOK_URL") {
            Ok(url) if !url.trim().is_empty() => Some(parse_url("ROLLCALL_WEBHOOK_URL", &url)?),
            _ => None,
        };

        let ceremony_timeout = std::env::var("ROLLCALL_CEREMONY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.ceremony_timeout);

        let relay_timeout = std::env::var("ROLLCALL_RELAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.relay_timeout);

        let config = Self {
            rp_origin,
            rp_name,
            store_dir,
            webhook_url,
            ceremony_timeout,
            relay_timeout,
        };
        config.relying_party()?;
        Ok(config)
    }

    /// Relying party derived from the origin host
    pub fn relying_party(&self) -> Result<RelyingParty> {
        let id = self.rp_origin.host_str().ok_or_else(|| {
            RollcallError::Config(format!("Origin {} has no host", self.rp_origin))
        })?;
        Ok(RelyingParty {
            id: id.to_string(),
            name: self.rp_name.clone(),
        })
    }
}

fn parse_url(var: &str, value: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|e| RollcallError::Config(format!("Invalid {var}: {e}")))
}
