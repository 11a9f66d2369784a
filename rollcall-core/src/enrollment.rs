//! Enrollment flow: create a platform credential for a name and remember it.

use tracing::{debug, info, warn};

use crate::context::CeremonyContext;
use crate::error::{Result, RollcallError};
use crate::identity::{CredentialReference, EnrolledIdentity};
use crate::platform::{
    random_bytes, Challenge, CreatedCredential, CredentialCreationOptions, UserEntity,
    USER_HANDLE_LEN,
};
use crate::relay::RelayEvent;

/// Result of a successful enrollment.
#[derive(Debug)]
pub struct Enrollment {
    /// The persisted record
    pub identity: EnrolledIdentity,
    /// Best-effort `register` notification; failure never undoes enrollment
    pub relay: Result<()>,
}

/// Registers a new platform credential under a display name.
///
/// One user-present ceremony per call. Nothing is retried automatically.
#[derive(Debug, Clone)]
pub struct EnrollmentFlow {
    ctx: CeremonyContext,
}

impl EnrollmentFlow {
    pub fn new(ctx: CeremonyContext) -> Self {
        Self { ctx }
    }

    pub async fn enroll(&self, display_name: &str) -> Result<Enrollment> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(RollcallError::InvalidInput(
                "display name must not be empty".to_string(),
            ));
        }

        let permit = self.ctx.guard.try_begin()?;

        if !self.ctx.platform.is_available() {
            return Err(RollcallError::CapabilityUnavailable);
        }

        if let Some(existing) = self.ctx.store.find_by_name(name)? {
            return Err(RollcallError::DuplicateCredential(format!(
                "{} is already enrolled",
                existing.display_name
            )));
        }

        let options = self.creation_options(name)?;
        debug!(
            display_name = %name,
            rp_id = %options.relying_party.id,
            timeout_ms = options.timeout.as_millis() as u64,
            "Requesting platform credential"
        );

        let created = self.create(&options).await?;
        let reference = CredentialReference::from_bytes(created.raw_id).map_err(|_| {
            RollcallError::EnrollmentFailed("platform returned an empty credential id".to_string())
        })?;

        let identity = EnrolledIdentity::new(name, reference);
        self.ctx.store.add(identity.clone())?;
        drop(permit);

        info!(
            display_name = %identity.display_name,
            credential = %identity.credential_reference,
            "Enrollment completed"
        );

        let relay = self.ctx.relay.send(&RelayEvent::registered(&identity)).await;
        Ok(Enrollment { identity, relay })
    }

    fn creation_options(&self, name: &str) -> Result<CredentialCreationOptions> {
        let challenge = Challenge::random().map_err(|e| {
            RollcallError::EnrollmentFailed(format!("random source unavailable: {e}"))
        })?;
        let user_handle = random_bytes::<USER_HANDLE_LEN>().map_err(|e| {
            RollcallError::EnrollmentFailed(format!("random source unavailable: {e}"))
        })?;

        let options = CredentialCreationOptions::platform(
            challenge,
            self.ctx.relying_party.clone(),
            UserEntity {
                id: user_handle.to_vec(),
                name: name.to_string(),
                display_name: name.to_string(),
            },
            self.ctx.timeout,
        );
        options.validate()?;
        Ok(options)
    }

    async fn create(&self, options: &CredentialCreationOptions) -> Result<CreatedCredential> {
        match tokio::time::timeout(options.timeout, self.ctx.platform.create_credential(options))
            .await
        {
            Ok(Ok(created)) => Ok(created),
            Ok(Err(e)) if e.is_cancellation() => {
                warn!(reason = %e, "Enrollment cancelled");
                Err(RollcallError::EnrollmentCancelled(e.to_string()))
            }
            Ok(Err(e)) => {
                warn!(reason = %e, "Enrollment failed");
                Err(RollcallError::EnrollmentFailed(e.to_string()))
            }
            Err(_) => {
                warn!(
                    timeout_ms = options.timeout.as_millis() as u64,
                    "Enrollment timed out"
                );
                Err(RollcallError::EnrollmentCancelled(
                    "timed out waiting for the authenticator".to_string(),
                ))
            }
        }
    }
}
