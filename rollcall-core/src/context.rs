//! Shared collaborators handed to each flow.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_CEREMONY_TIMEOUT_SECS;
use crate::guard::CeremonyGuard;
use crate::platform::{PlatformAuthenticator, RelyingParty};
use crate::relay::AttendanceRelay;
use crate::store::RecordStore;

/// Everything a ceremony needs. Cheap to clone; clones share the store,
/// the platform and the in-flight guard.
#[derive(Clone)]
pub struct CeremonyContext {
    pub store: Arc<RecordStore>,
    pub platform: Arc<dyn PlatformAuthenticator>,
    pub relay: AttendanceRelay,
    pub guard: CeremonyGuard,
    pub relying_party: RelyingParty,
    pub timeout: Duration,
}

impl CeremonyContext {
    /// Context with a fresh guard and the default 60 second ceremony timeout.
    pub fn new(
        store: Arc<RecordStore>,
        platform: Arc<dyn PlatformAuthenticator>,
        relay: AttendanceRelay,
        relying_party: RelyingParty,
    ) -> Self {
        Self {
            store,
            platform,
            relay,
            guard: CeremonyGuard::new(),
            relying_party,
            timeout: Duration::from_secs(DEFAULT_CEREMONY_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for CeremonyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CeremonyContext")
            .field("store", &self.store)
            .field("relying_party", &self.relying_party)
            .field("timeout", &self.timeout)
            .field("busy", &self.guard.is_busy())
            .finish()
    }
}
