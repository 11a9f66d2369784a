//! Mock platform authenticator for testing and terminal demos.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sha3::{Digest, Sha3_256};

use super::{
    AssertedCredential, AuthenticatorAttachment, CreatedCredential, CredentialCreationOptions,
    CredentialRequestOptions, PlatformAuthenticator, PlatformError, PlatformResult,
};
use crate::identity::CredentialReference;

/// Mock platform authenticator.
/// WARNING: no biometric, no key material - any assertion "succeeds"!
///
/// Credential ids are derived deterministically from the seed and a creation
/// counter. On assertion the mock presents the credential chosen with
/// [`MockAuthenticator::present`] (without checking it against the allow-list,
/// so tests can simulate a foreign credential), or the first allowed one.
pub struct MockAuthenticator {
    seed: u64,
    available: bool,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    created: u64,
    presenting: Option<CredentialReference>,
    next_creation_error: Option<PlatformError>,
    next_assertion_error: Option<PlatformError>,
    creation_calls: usize,
    assertion_calls: usize,
    last_creation: Option<CredentialCreationOptions>,
    last_request: Option<CredentialRequestOptions>,
}

impl MockAuthenticator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            available: true,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Create a mock with default seed for simple tests.
    pub fn default_test() -> Self {
        Self::new(0xDEADBEEF_CAFEBABE)
    }

    /// Create a mock with a random seed, so ids never repeat across processes.
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().as_u128() as u64)
    }

    /// Behave like a device without a platform authenticator.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Raw id the `index`-th created credential gets (0-based).
    pub fn credential_id(&self, index: u64) -> Vec<u8> {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(index.to_le_bytes());
        hasher.update(b"rollcall-mock-credential");
        hasher.finalize().to_vec()
    }

    /// Choose which credential the "finger" on the sensor belongs to.
    pub fn present(&self, credential: Option<CredentialReference>) {
        self.state().presenting = credential;
    }

    /// Make the next `create_credential` call fail with `error`.
    pub fn fail_next_creation(&self, error: PlatformError) {
        self.state().next_creation_error = Some(error);
    }

    /// Make the next `get_assertion` call fail with `error`.
    pub fn fail_next_assertion(&self, error: PlatformError) {
        self.state().next_assertion_error = Some(error);
    }

    pub fn creation_calls(&self) -> usize {
        self.state().creation_calls
    }

    pub fn assertion_calls(&self) -> usize {
        self.state().assertion_calls
    }

    pub fn last_creation_options(&self) -> Option<CredentialCreationOptions> {
        self.state().last_creation.clone()
    }

    pub fn last_request_options(&self) -> Option<CredentialRequestOptions> {
        self.state().last_request.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::default_test()
    }
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn create_credential(
        &self,
        options: &CredentialCreationOptions,
    ) -> PlatformResult<CreatedCredential> {
        let mut state = self.state();
        state.creation_calls += 1;
        state.last_creation = Some(options.clone());

        if let Some(error) = state.next_creation_error.take() {
            return Err(error);
        }

        let index = state.created;
        state.created += 1;
        drop(state);

        Ok(CreatedCredential {
            raw_id: self.credential_id(index),
            attachment: Some(AuthenticatorAttachment::Platform),
        })
    }

    async fn get_assertion(
        &self,
        options: &CredentialRequestOptions,
    ) -> PlatformResult<AssertedCredential> {
        let mut state = self.state();
        state.assertion_calls += 1;
        state.last_request = Some(options.clone());

        if let Some(error) = state.next_assertion_error.take() {
            return Err(error);
        }

        let presented = state
            .presenting
            .clone()
            .or_else(|| options.allow_credentials.first().cloned())
            .ok_or_else(|| PlatformError::NotAllowed("no credential available".to_string()))?;

        Ok(AssertedCredential {
            raw_id: presented.as_bytes().to_vec(),
            user_handle: None,
        })
    }
}
