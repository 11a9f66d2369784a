//! Rollcall Core - Platform-biometric attendance library
//!
//! This crate enrolls people against the device's built-in authenticator
//! (fingerprint, face, PIN), later identifies whoever is at the sensor without
//! asking who they are, and relays a formatted attendance stamp to a
//! spreadsheet webhook.
//!
//! # Features
//!
//! - Discoverable-credential enrollment with platform attachment and required
//!   user verification
//! - Assertion against every enrolled credential, resolved after the fact
//! - JSON record store (in-memory or one file per key on disk)
//! - Fire-and-forget webhook relay (`webhook` feature)
//! - Deterministic mock authenticator for tests and the demo CLI
//!
//! # Security
//!
//! Assertion results are **not** cryptographically verified. There is no
//! relying-party server, no signature check and no sign-counter tracking: a
//! successful mark proves only that the local platform reported success.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollcall_core::{AttendanceService, MockAuthenticator, RollcallConfig};
//!
//! # async fn example() -> rollcall_core::Result<()> {
//! let config = RollcallConfig::from_env()?;
//!
//! // Use the mock authenticator for testing (in production, wire a real platform)
//! let service = AttendanceService::from_config(&config, Arc::new(MockAuthenticator::default()))?;
//!
//! service.enroll("Ada Lovelace").await?;
//! let attendance = service.mark_attendance().await?;
//! println!("{} marked at {}", attendance.record.name, attendance.record.time);
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod clock;
pub mod config;
pub mod context;
pub mod enrollment;
pub mod error;
pub mod guard;
pub mod identity;
pub mod platform;
pub mod relay;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use assertion::{AssertionFlow, Attendance};
pub use clock::{format_clock, ClockTicker};
pub use config::RollcallConfig;
pub use context::CeremonyContext;
pub use enrollment::{Enrollment, EnrollmentFlow};
pub use error::{Result, RollcallError};
pub use guard::{CeremonyGuard, CeremonyPermit};
pub use identity::{CredentialReference, EnrolledIdentity};
pub use platform::{
    AssertedCredential, CreatedCredential, CredentialCreationOptions, CredentialRequestOptions,
    MockAuthenticator, PlatformAuthenticator, PlatformError, PlatformResult, RelyingParty,
};
pub use relay::{AttendanceRecord, AttendanceRelay, AttendanceSink, DisabledSink, RelayEvent};
pub use service::AttendanceService;
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, RecordStore};

#[cfg(feature = "webhook")]
pub use relay::{WebhookSink, WebhookSinkConfig};
