//! Assertion flow: ask the platform to assert any enrolled credential, then
//! resolve who it belongs to and stamp their attendance.
//!
//! The platform's answer is trusted as-is. No signature, challenge or counter
//! is checked here or anywhere else, so a successful assertion proves only
//! that the local platform said "yes". Do not build anything beyond a demo on
//! top of this without adding real verification.

use chrono::Local;
use tracing::{debug, info, warn};

use crate::context::CeremonyContext;
use crate::error::{Result, RollcallError};
use crate::identity::{CredentialReference, EnrolledIdentity};
use crate::platform::{AssertedCredential, Challenge, CredentialRequestOptions};
use crate::relay::{AttendanceRecord, RelayEvent};

/// Result of a resolved assertion.
#[derive(Debug)]
pub struct Attendance {
    /// Who the platform vouched for
    pub identity: EnrolledIdentity,
    /// What was sent to the sheet
    pub record: AttendanceRecord,
    /// Relay outcome, reported separately from the identity result
    pub relay: Result<()>,
}

impl Attendance {
    pub fn relay_failed(&self) -> bool {
        self.relay.is_err()
    }
}

/// Resolves the person at the sensor without asking who they are first.
///
/// The challenge allows every stored credential, the platform picks the one the
/// user presents, and the returned id is looked up afterwards.
#[derive(Debug, Clone)]
pub struct AssertionFlow {
    ctx: CeremonyContext,
}

impl AssertionFlow {
    pub fn new(ctx: CeremonyContext) -> Self {
        debug!("Assertion results are trusted without signature verification");
        Self { ctx }
    }

    pub async fn mark_attendance(&self) -> Result<Attendance> {
        let permit = self.ctx.guard.try_begin()?;

        let allow_credentials = self.ctx.store.credential_references()?;
        if allow_credentials.is_empty() {
            return Err(RollcallError::NoRegisteredIdentities);
        }

        if !self.ctx.platform.is_available() {
            return Err(RollcallError::CapabilityUnavailable);
        }

        let challenge = Challenge::random().map_err(|e| {
            RollcallError::AssertionFailed(format!("random source unavailable: {e}"))
        })?;
        let options = CredentialRequestOptions::verified(
            challenge,
            self.ctx.relying_party.id.clone(),
            allow_credentials,
            self.ctx.timeout,
        );
        options.validate()?;
        debug!(
            allowed = options.allow_credentials.len(),
            timeout_ms = options.timeout.as_millis() as u64,
            "Requesting platform assertion"
        );

        let asserted = self.assert(&options).await?;
        let reference = CredentialReference::from_bytes(asserted.raw_id).map_err(|_| {
            RollcallError::AssertionFailed("platform returned an empty credential id".to_string())
        })?;

        let identity = self
            .ctx
            .store
            .find_by_credential(&reference)?
            .ok_or_else(|| {
                warn!(credential = %reference, "Asserted credential is not enrolled");
                RollcallError::IdentityResolution(format!(
                    "credential {reference} is not enrolled on this device"
                ))
            })?;
        drop(permit);

        let record = AttendanceRecord::new(identity.display_name.clone(), &Local::now());
        info!(
            display_name = %identity.display_name,
            date = %record.date,
            time = %record.time,
            "Attendance marked"
        );

        let relay = self
            .ctx
            .relay
            .send(&RelayEvent::Attendance(record.clone()))
            .await;

        Ok(Attendance {
            identity,
            record,
            relay,
        })
    }

    async fn assert(&self, options: &CredentialRequestOptions) -> Result<AssertedCredential> {
        match tokio::time::timeout(options.timeout, self.ctx.platform.get_assertion(options)).await
        {
            Ok(Ok(asserted)) => Ok(asserted),
            Ok(Err(e)) if e.is_cancellation() => {
                warn!(reason = %e, "Assertion cancelled");
                Err(RollcallError::AssertionCancelled(e.to_string()))
            }
            Ok(Err(e)) => {
                warn!(reason = %e, "Assertion failed");
                Err(RollcallError::AssertionFailed(e.to_string()))
            }
            Err(_) => {
                warn!(
                    timeout_ms = options.timeout.as_millis() as u64,
                    "Assertion timed out"
                );
                Err(RollcallError::AssertionCancelled(
                    "timed out waiting for the authenticator".to_string(),
                ))
            }
        }
    }
}
