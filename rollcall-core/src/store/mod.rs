//! Local credential record store
//!
//! Holds the enrolled identities of this device in insertion order:
//! - **Backend**: a small key-value store (`KeyValueStore`), either in-memory
//!   (development and tests) or one JSON file per key on disk.
//! - **Records**: serialized as a JSON array under a single well-known key.
//!
//! Every mutation is flushed to the backend before it returns, and every read
//! goes back to the backend, so `list()` always reflects the latest flushed state.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use std::sync::Mutex;

use crate::error::{Result, RollcallError};
use crate::identity::{CredentialReference, EnrolledIdentity};

/// Well-known key under which identities are persisted.
pub const IDENTITIES_KEY: &str = "rollcall.identities";

/// Minimal string key-value backend, modelled on a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, durably, before returning.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Whether values survive a process restart.
    fn is_persistent(&self) -> bool;
}

/// Ordered collection of enrolled identities backed by a `KeyValueStore`.
pub struct RecordStore {
    backend: Box<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Create a store over an arbitrary backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store with in-memory backend (development only)
    pub fn in_memory() -> Self {
        tracing::warn!("Using in-memory record store - enrolled identities will be lost on restart!");
        Self::new(MemoryKeyValueStore::new())
    }

    /// Create a store persisted as JSON files under `dir`
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self::new(FileKeyValueStore::open(dir)?))
    }

    pub fn is_persistent(&self) -> bool {
        self.backend.is_persistent()
    }

    /// All enrolled identities in insertion order.
    pub fn list(&self) -> Result<Vec<EnrolledIdentity>> {
        match self.backend.get(IDENTITIES_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                RollcallError::Serialization(format!("Failed to decode identities: {e}"))
            }),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.list()?.is_empty())
    }

    /// Append an identity. The credential reference must not already be present.
    pub fn add(&self, identity: EnrolledIdentity) -> Result<()> {
        let _guard = self.lock()?;
        let mut identities = self.list()?;

        if identities
            .iter()
            .any(|existing| existing.credential_reference == identity.credential_reference)
        {
            return Err(RollcallError::DuplicateCredential(format!(
                "credential {} is already enrolled",
                identity.credential_reference
            )));
        }

        tracing::debug!(
            display_name = %identity.display_name,
            credential = %identity.credential_reference,
            "Adding identity"
        );
        identities.push(identity);
        self.flush(&identities)
    }

    /// Remove the identity holding `reference` and return it.
    pub fn remove(&self, reference: &CredentialReference) -> Result<EnrolledIdentity> {
        let _guard = self.lock()?;
        let mut identities = self.list()?;

        let position = identities
            .iter()
            .position(|identity| &identity.credential_reference == reference)
            .ok_or_else(|| RollcallError::NotFound(format!("no identity holds credential {reference}")))?;

        let removed = identities.remove(position);
        self.flush(&identities)?;

        tracing::debug!(display_name = %removed.display_name, "Removed identity");
        Ok(removed)
    }

    /// Exact-match lookup by credential reference.
    pub fn find_by_credential(
        &self,
        reference: &CredentialReference,
    ) -> Result<Option<EnrolledIdentity>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|identity| &identity.credential_reference == reference))
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Result<Option<EnrolledIdentity>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|identity| identity.has_name(name)))
    }

    /// Credential references of every enrolled identity, in insertion order.
    pub fn credential_references(&self) -> Result<Vec<CredentialReference>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|identity| identity.credential_reference)
            .collect())
    }

    fn flush(&self, identities: &[EnrolledIdentity]) -> Result<()> {
        let raw = serde_json::to_string(identities).map_err(|e| {
            RollcallError::Serialization(format!("Failed to encode identities: {e}"))
        })?;
        self.backend.set(IDENTITIES_KEY, &raw)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| RollcallError::Storage("record store lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = if self.is_persistent() { "File" } else { "Memory" };
        f.debug_struct("RecordStore")
            .field("backend", &backend)
            .finish()
    }
}
