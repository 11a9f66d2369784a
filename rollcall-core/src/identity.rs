//! Enrolled identities and the credential references that key them.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, RollcallError};

/// Opaque credential identifier returned by the platform at enrollment.
///
/// The canonical text form is padded standard base64. Older records stored the
/// raw id as a comma-joined list of decimal bytes; [`CredentialReference::parse`]
/// accepts both and always re-encodes as base64.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialReference(Vec<u8>);

impl CredentialReference {
    /// Wrap raw credential id bytes. Empty ids are rejected.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(RollcallError::InvalidInput(
                "credential reference must not be empty".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Parse a stored reference (base64 or legacy comma-joined byte list).
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.contains(',') {
            let bytes = text
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<u8>, _>>()
                .map_err(|e| {
                    RollcallError::InvalidInput(format!("Invalid credential byte list: {e}"))
                })?;
            return Self::from_bytes(bytes);
        }

        let bytes = BASE64
            .decode(text)
            .map_err(|e| RollcallError::InvalidInput(format!("Invalid credential base64: {e}")))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical base64 text form.
    pub fn encode(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl fmt::Display for CredentialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for CredentialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialReference")
            .field(&self.encode())
            .finish()
    }
}

impl FromStr for CredentialReference {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CredentialReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for CredentialReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

/// A person whose platform credential has been enrolled on this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledIdentity {
    /// Human-readable label shown in lists and sent to the sheet
    #[serde(alias = "name")]
    pub display_name: String,

    /// Opaque local identifier (absent in records written by older front-ends)
    #[serde(
        default,
        alias = "id",
        deserialize_with = "deserialize_identity_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub identity_id: Option<String>,

    /// The only field used to resolve an asserting credential back to a person
    #[serde(alias = "credentialId")]
    pub credential_reference: CredentialReference,

    /// Informational enrollment time
    #[serde(alias = "registeredAt")]
    pub enrolled_at: DateTime<Utc>,
}

impl EnrolledIdentity {
    /// Create a freshly enrolled identity with a new random identity id.
    pub fn new(display_name: impl Into<String>, credential_reference: CredentialReference) -> Self {
        Self {
            display_name: display_name.into(),
            identity_id: Some(uuid::Uuid::new_v4().to_string()),
            credential_reference,
            enrolled_at: Utc::now(),
        }
    }

    /// Case-insensitive display name comparison used for duplicate checks.
    pub fn has_name(&self, name: &str) -> bool {
        self.display_name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Legacy front-ends stored the identity id as a string, a number, or not at all.
fn deserialize_identity_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "identity id must be a string or number, got {other}"
        ))),
    }
}
