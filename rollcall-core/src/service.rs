//! Attendance service: one store, one platform, one relay, one guard.
//!
//! The presentation layer talks to this type only. It is created once at
//! start-up and lives for the rest of the process.

use std::sync::Arc;

use tracing::{info, warn};

use crate::assertion::{AssertionFlow, Attendance};
use crate::config::RollcallConfig;
use crate::context::CeremonyContext;
use crate::enrollment::{Enrollment, EnrollmentFlow};
use crate::error::Result;
use crate::identity::{CredentialReference, EnrolledIdentity};
use crate::platform::PlatformAuthenticator;
use crate::relay::{AttendanceRelay, RelayEvent};
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct AttendanceService {
    ctx: CeremonyContext,
    enrollment: EnrollmentFlow,
    assertion: AssertionFlow,
}

impl AttendanceService {
    /// Wire the flows around an existing context
    pub fn new(ctx: CeremonyContext) -> Self {
        Self {
            enrollment: EnrollmentFlow::new(ctx.clone()),
            assertion: AssertionFlow::new(ctx.clone()),
            ctx,
        }
    }

    /// Build from configuration: file-backed store and, when a webhook URL is
    /// configured, the webhook relay.
    pub fn from_config(
        config: &RollcallConfig,
        platform: Arc<dyn PlatformAuthenticator>,
    ) -> Result<Self> {
        let store = Arc::new(RecordStore::open(&config.store_dir)?);
        let relay = relay_from_config(config)?;
        let ctx = CeremonyContext::new(store, platform, relay, config.relying_party()?)
            .with_timeout(config.ceremony_timeout);
        Ok(Self::new(ctx))
    }

    /// Register a new person on this device.
    pub async fn enroll(&self, display_name: &str) -> Result<Enrollment> {
        self.enrollment.enroll(display_name).await
    }

    /// Identify whoever is at the sensor and stamp their attendance.
    pub async fn mark_attendance(&self) -> Result<Attendance> {
        self.assertion.mark_attendance().await
    }

    /// Forget an enrolled identity. The sheet is told best-effort; a relay
    /// failure is logged and does not fail the removal.
    pub async fn remove(&self, reference: &CredentialReference) -> Result<EnrolledIdentity> {
        let removed = self.ctx.store.remove(reference)?;
        info!(display_name = %removed.display_name, "Identity removed");

        if let Err(e) = self.ctx.relay.send(&RelayEvent::deleted(&removed)).await {
            warn!(error = %e, "Delete sync error");
        }
        Ok(removed)
    }

    /// Snapshot of enrolled identities, in enrollment order.
    pub fn identities(&self) -> Result<Vec<EnrolledIdentity>> {
        self.ctx.store.list()
    }

    pub fn store(&self) -> &RecordStore {
        &self.ctx.store
    }

    pub fn is_busy(&self) -> bool {
        self.ctx.guard.is_busy()
    }
}

#[cfg(feature = "webhook")]
fn relay_from_config(config: &RollcallConfig) -> Result<AttendanceRelay> {
    use crate::relay::{WebhookSink, WebhookSinkConfig};

    match &config.webhook_url {
        Some(url) => {
            info!(endpoint = %url, "Relaying attendance to webhook");
            let sink = WebhookSink::new(WebhookSinkConfig {
                endpoint: url.clone(),
                timeout: config.relay_timeout,
            })?;
            Ok(AttendanceRelay::new(Arc::new(sink)))
        }
        None => {
            warn!("ROLLCALL_WEBHOOK_URL not set, attendance will not be relayed");
            Ok(AttendanceRelay::disabled())
        }
    }
}

#[cfg(not(feature = "webhook"))]
fn relay_from_config(config: &RollcallConfig) -> Result<AttendanceRelay> {
    if config.webhook_url.is_some() {
        warn!("Built without the webhook feature, attendance will not be relayed");
    }
    Ok(AttendanceRelay::disabled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockAuthenticator;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_config_uses_file_store() {
        let temp = TempDir::new().unwrap();
        let config = RollcallConfig {
            store_dir: temp.path().join("store"),
            ..RollcallConfig::default()
        };

        let service =
            AttendanceService::from_config(&config, Arc::new(MockAuthenticator::new(5))).unwrap();
        assert!(service.store().is_persistent());

        service.enroll("Ada").await.unwrap();
        assert!(temp
            .path()
            .join("store")
            .join("rollcall.identities.json")
            .exists());
    }

    #[tokio::test]
    async fn test_remove_missing_identity() {
        let temp = TempDir::new().unwrap();
        let config = RollcallConfig {
            store_dir: temp.path().to_path_buf(),
            ..RollcallConfig::default()
        };
        let service =
            AttendanceService::from_config(&config, Arc::new(MockAuthenticator::new(5))).unwrap();

        let missing = CredentialReference::from_bytes(vec![9, 9]).unwrap();
        assert!(service.remove(&missing).await.is_err());
    }
}
