//! Platform credential capability.
//!
//! The browser/OS API that creates and asserts built-in biometric credentials
//! is an external collaborator. This module defines the seam the flows call
//! through, plus a deterministic mock.
//!
//! Nothing here verifies signatures: whatever the platform reports as a
//! successful assertion is trusted as-is.

mod mock;
mod options;

pub use mock::MockAuthenticator;
pub use options::{
    random_bytes, AttestationConveyance, AuthenticatorAttachment, Challenge, CoseAlgorithm,
    CredentialCreationOptions, CredentialRequestOptions, RelyingParty, UserEntity,
    UserVerification, CHALLENGE_LEN, USER_HANDLE_LEN,
};

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the platform capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// User cancelled, or the biometric was not recognized
    #[error("not allowed: {0}")]
    NotAllowed(String),

    #[error("ceremony timed out")]
    Timeout,

    /// e.g. the authenticator already holds a credential for this user
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    /// Cancellations and timeouts are reported without alarm and invite a retry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::NotAllowed(_) | Self::Timeout)
    }
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// A credential freshly created by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCredential {
    /// Raw credential id
    pub raw_id: Vec<u8>,
    pub attachment: Option<AuthenticatorAttachment>,
}

/// The platform's answer to an assertion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertedCredential {
    /// Raw id of the credential the user presented
    pub raw_id: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Trait for platform credential capabilities.
///
/// Implementations must be thread-safe (`Send + Sync`). Each call is a single
/// interactive, user-present ceremony; implementations must not retry.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether a platform authenticator exists at all.
    fn is_available(&self) -> bool;

    /// Create a new credential (`navigator.credentials.create`).
    async fn create_credential(
        &self,
        options: &CredentialCreationOptions,
    ) -> PlatformResult<CreatedCredential>;

    /// Assert one of the allowed credentials (`navigator.credentials.get`).
    async fn get_assertion(
        &self,
        options: &CredentialRequestOptions,
    ) -> PlatformResult<AssertedCredential>;
}
