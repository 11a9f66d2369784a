//! Option structures handed to the platform credential capability.
//!
//! These serialize as the JSON form of the `publicKey` member of
//! `navigator.credentials.create()` and `navigator.credentials.get()`,
//! restricted to the fields the flows set. Binary values are base64url.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Serialize, Serializer};

use crate::error::{Result, RollcallError};
use crate::identity::CredentialReference;

/// Challenge length in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// User handle length in bytes.
pub const USER_HANDLE_LEN: usize = 16;

/// Longest user handle the platform accepts.
const MAX_USER_HANDLE_LEN: usize = 64;

/// Fill a fixed-size buffer from the operating system's random source.
pub fn random_bytes<const N: usize>() -> std::result::Result<[u8; N], getrandom::Error> {
    let mut buf = [0u8; N];
    getrandom::fill(&mut buf)?;
    Ok(buf)
}

/// Single-use random challenge. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    pub fn random() -> std::result::Result<Self, getrandom::Error> {
        Ok(Self(random_bytes::<CHALLENGE_LEN>()?))
    }

    pub fn from_bytes(bytes: [u8; CHALLENGE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Challenge(<redacted>)")
    }
}

impl Serialize for Challenge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

/// Relying party the credential is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelyingParty {
    /// Domain identifier (host of the origin)
    pub id: String,
    /// Human-readable name shown by the platform prompt
    pub name: String,
}

/// User entity embedded in a new credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    #[serde(serialize_with = "serialize_base64url")]
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

/// COSE signature algorithms offered at enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoseAlgorithm {
    /// ECDSA w/ SHA-256
    Es256,
    /// RSASSA-PKCS1-v1_5 w/ SHA-256
    Rs256,
}

impl CoseAlgorithm {
    /// COSE algorithm identifier
    pub fn id(self) -> i64 {
        match self {
            Self::Es256 => -7,
            Self::Rs256 => -257,
        }
    }
}

impl Serialize for CoseAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.id())
    }
}

/// Which kind of authenticator may satisfy the ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorAttachment {
    /// Built-in authenticator (fingerprint reader, face unlock, Windows Hello)
    Platform,
    /// Roaming authenticator (security key)
    CrossPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationConveyance {
    #[default]
    None,
    Indirect,
    Direct,
}

/// Credential type named in parameter lists and descriptors.
const PUBLIC_KEY_TYPE: &str = "public-key";

/// Options for creating a new platform credential.
#[derive(Debug, Clone)]
pub struct CredentialCreationOptions {
    pub challenge: Challenge,
    pub relying_party: RelyingParty,
    pub user: UserEntity,
    pub algorithms: Vec<CoseAlgorithm>,
    pub attachment: AuthenticatorAttachment,
    pub user_verification: UserVerification,
    pub timeout: Duration,
    pub attestation: AttestationConveyance,
}

impl CredentialCreationOptions {
    /// Built-in authenticator, user verification required, ES256 and RS256, no attestation.
    pub fn platform(
        challenge: Challenge,
        relying_party: RelyingParty,
        user: UserEntity,
        timeout: Duration,
    ) -> Self {
        Self {
            challenge,
            relying_party,
            user,
            algorithms: vec![CoseAlgorithm::Es256, CoseAlgorithm::Rs256],
            attachment: AuthenticatorAttachment::Platform,
            user_verification: UserVerification::Required,
            timeout,
            attestation: AttestationConveyance::None,
        }
    }

    /// Check required fields before the platform is invoked.
    pub fn validate(&self) -> Result<()> {
        if self.relying_party.id.trim().is_empty() {
            return Err(invalid("relying party id is required"));
        }
        if self.relying_party.name.trim().is_empty() {
            return Err(invalid("relying party name is required"));
        }
        if self.user.id.len() < USER_HANDLE_LEN || self.user.id.len() > MAX_USER_HANDLE_LEN {
            return Err(invalid(format!(
                "user handle must be {USER_HANDLE_LEN}..={MAX_USER_HANDLE_LEN} bytes, got {}",
                self.user.id.len()
            )));
        }
        if self.user.name.trim().is_empty() {
            return Err(invalid("user name is required"));
        }
        if self.algorithms.is_empty() {
            return Err(invalid("at least one public key algorithm is required"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Options for asserting one of the allowed credentials.
#[derive(Debug, Clone)]
pub struct CredentialRequestOptions {
    pub challenge: Challenge,
    pub rp_id: String,
    pub allow_credentials: Vec<CredentialReference>,
    pub user_verification: UserVerification,
    pub timeout: Duration,
}

impl CredentialRequestOptions {
    /// User verification required, scoped to `allow_credentials`.
    pub fn verified(
        challenge: Challenge,
        rp_id: impl Into<String>,
        allow_credentials: Vec<CredentialReference>,
        timeout: Duration,
    ) -> Self {
        Self {
            challenge,
            rp_id: rp_id.into(),
            allow_credentials,
            user_verification: UserVerification::Required,
            timeout,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rp_id.trim().is_empty() {
            return Err(invalid("relying party id is required"));
        }
        if self.allow_credentials.is_empty() {
            return Err(invalid("allow list must name at least one credential"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RollcallError {
    RollcallError::InvalidInput(message.into())
}

#[derive(Serialize)]
struct PublicKeyParam {
    #[serde(rename = "type")]
    kind: &'static str,
    alg: CoseAlgorithm,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticatorSelection {
    authenticator_attachment: AuthenticatorAttachment,
    user_verification: UserVerification,
}

#[derive(Serialize)]
struct CredentialDescriptor {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(serialize_with = "serialize_base64url")]
    id: Vec<u8>,
}

impl Serialize for CredentialCreationOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            challenge: &'a Challenge,
            rp: &'a RelyingParty,
            user: &'a UserEntity,
            pub_key_cred_params: Vec<PublicKeyParam>,
            authenticator_selection: AuthenticatorSelection,
            timeout: u64,
            attestation: AttestationConveyance,
        }

        Wire {
            challenge: &self.challenge,
            rp: &self.relying_party,
            user: &self.user,
            pub_key_cred_params: self
                .algorithms
                .iter()
                .map(|&alg| PublicKeyParam {
                    kind: PUBLIC_KEY_TYPE,
                    alg,
                })
                .collect(),
            authenticator_selection: AuthenticatorSelection {
                authenticator_attachment: self.attachment,
                user_verification: self.user_verification,
            },
            timeout: self.timeout.as_millis() as u64,
            attestation: self.attestation,
        }
        .serialize(serializer)
    }
}

impl Serialize for CredentialRequestOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            challenge: &'a Challenge,
            rp_id: &'a str,
            allow_credentials: Vec<CredentialDescriptor>,
            user_verification: UserVerification,
            timeout: u64,
        }

        Wire {
            challenge: &self.challenge,
            rp_id: &self.rp_id,
            allow_credentials: self
                .allow_credentials
                .iter()
                .map(|reference| CredentialDescriptor {
                    kind: PUBLIC_KEY_TYPE,
                    id: reference.as_bytes().to_vec(),
                })
                .collect(),
            user_verification: self.user_verification,
            timeout: self.timeout.as_millis() as u64,
        }
        .serialize(serializer)
    }
}

fn serialize_base64url<S: Serializer>(
    bytes: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation_options() -> CredentialCreationOptions {
        CredentialCreationOptions::platform(
            Challenge::from_bytes([7; CHALLENGE_LEN]),
            RelyingParty {
                id: "localhost".to_string(),
                name: "Attendance System".to_string(),
            },
            UserEntity {
                id: vec![1; USER_HANDLE_LEN],
                name: "Ada".to_string(),
                display_name: "Ada".to_string(),
            },
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_platform_defaults() {
        let options = creation_options();
        assert_eq!(options.algorithms, vec![CoseAlgorithm::Es256, CoseAlgorithm::Rs256]);
        assert_eq!(options.attachment, AuthenticatorAttachment::Platform);
        assert_eq!(options.user_verification, UserVerification::Required);
        assert_eq!(options.attestation, AttestationConveyance::None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_creation_options_json_shape() {
        let json = serde_json::to_value(creation_options()).unwrap();
        assert_eq!(json["rp"]["id"], "localhost");
        assert_eq!(
            json["pubKeyCredParams"],
            serde_json::json!([
                {"type": "public-key", "alg": -7},
                {"type": "public-key", "alg": -257}
            ])
        );
        assert_eq!(
            json["authenticatorSelection"],
            serde_json::json!({
                "authenticatorAttachment": "platform",
                "userVerification": "required"
            })
        );
        assert!(json.get("authenticatorAttachment").is_none());
        assert_eq!(json["timeout"], 60_000);
        assert_eq!(json["attestation"], "none");
        assert_eq!(json["user"]["displayName"], "Ada");
        assert_eq!(json["user"]["id"], "AQEBAQEBAQEBAQEBAQEBAQ");
    }

    #[test]
    fn test_request_options_json_shape() {
        let options = CredentialRequestOptions::verified(
            Challenge::from_bytes([0; CHALLENGE_LEN]),
            "localhost",
            vec![CredentialReference::from_bytes(vec![0xfb, 0xff]).unwrap()],
            Duration::from_secs(60),
        );
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["rpId"], "localhost");
        assert_eq!(
            json["allowCredentials"],
            serde_json::json!([{"type": "public-key", "id": "-_8"}])
        );
        assert_eq!(json["userVerification"], "required");
        assert_eq!(json["timeout"], 60_000);
        assert_eq!(
            json["challenge"].as_str().unwrap().len(),
            43,
            "32 bytes of base64url without padding"
        );
    }

    #[test]
    fn test_validate_rejects_short_user_handle() {
        let mut options = creation_options();
        options.user.id = vec![1; 4];
        assert!(matches!(
            options.validate().unwrap_err(),
            RollcallError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_validate_rejects_missing_algorithms_and_timeout() {
        let mut options = creation_options();
        options.algorithms.clear();
        assert!(options.validate().is_err());

        let mut options = creation_options();
        options.timeout = Duration::ZERO;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_request_options_require_allow_list() {
        let options = CredentialRequestOptions::verified(
            Challenge::from_bytes([0; CHALLENGE_LEN]),
            "localhost",
            Vec::new(),
            Duration::from_secs(60),
        );
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_random_challenges_differ() {
        let a = Challenge::random().unwrap();
        let b = Challenge::random().unwrap();
        assert_eq!(a.as_bytes().len(), CHALLENGE_LEN);
        assert_ne!(a, b);
    }
}
