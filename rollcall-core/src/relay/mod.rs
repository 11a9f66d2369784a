//! Attendance relay.
//!
//! Formats events for the spreadsheet webhook and hands them to a sink. The sink
//! is fire-and-forget: responses are not inspected, nothing is retried, and
//! only transport failures surface (as `RelayFailed`).

#[cfg(feature = "webhook")]
mod webhook;

#[cfg(feature = "webhook")]
pub use webhook::{WebhookSink, WebhookSinkConfig};

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::identity::{CredentialReference, EnrolledIdentity};

/// One attendance stamp, formatted the way the sheet expects (en-US).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub name: String,
    /// `M/D/YYYY`, unpadded
    pub date: String,
    /// Full weekday name
    pub day: String,
    /// `h:mm:ss AM`, unpadded hour
    pub time: String,
    /// UTC ISO-8601 with milliseconds
    pub timestamp: String,
}

impl AttendanceRecord {
    /// Format `at` in its own timezone; the ISO timestamp is always UTC.
    pub fn new<Tz>(name: impl Into<String>, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            name: name.into(),
            date: at.format("%-m/%-d/%Y").to_string(),
            day: at.format("%A").to_string(),
            time: at.format("%-I:%M:%S %p").to_string(),
            timestamp: at
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationNotice {
    pub name: String,
    pub credential_id: CredentialReference,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionNotice {
    pub name: String,
    pub credential_id: CredentialReference,
}

/// Envelope posted to the webhook: `{"action": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum RelayEvent {
    Attendance(AttendanceRecord),
    Register(RegistrationNotice),
    Delete(DeletionNotice),
}

impl RelayEvent {
    pub fn registered(identity: &EnrolledIdentity) -> Self {
        Self::Register(RegistrationNotice {
            name: identity.display_name.clone(),
            credential_id: identity.credential_reference.clone(),
            registered_at: identity.enrolled_at,
        })
    }

    pub fn deleted(identity: &EnrolledIdentity) -> Self {
        Self::Delete(DeletionNotice {
            name: identity.display_name.clone(),
            credential_id: identity.credential_reference.clone(),
        })
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Attendance(_) => "attendance",
            Self::Register(_) => "register",
            Self::Delete(_) => "delete",
        }
    }
}

/// External sink for relay events.
///
/// A returned error means the event never left this process (transport
/// failure); `Ok` does not mean it arrived.
#[async_trait]
pub trait AttendanceSink: Send + Sync {
    async fn submit(&self, event: &RelayEvent) -> Result<()>;
}

/// Sink used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

#[async_trait]
impl AttendanceSink for DisabledSink {
    async fn submit(&self, event: &RelayEvent) -> Result<()> {
        tracing::debug!(action = event.action(), "Relay disabled, event dropped");
        Ok(())
    }
}

/// Logs and forwards events to the configured sink.
#[derive(Clone)]
pub struct AttendanceRelay {
    sink: Arc<dyn AttendanceSink>,
}

impl AttendanceRelay {
    pub fn new(sink: Arc<dyn AttendanceSink>) -> Self {
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledSink))
    }

    /// Submit one event. Failures are logged here and returned as `RelayFailed`.
    pub async fn send(&self, event: &RelayEvent) -> Result<()> {
        tracing::debug!(action = event.action(), "Relaying event");
        match self.sink.submit(event).await {
            Ok(()) => {
                tracing::debug!(action = event.action(), "Relay submitted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(action = event.action(), error = %e, "Relay failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AttendanceRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceRelay")
            .field("sink", &"<dyn AttendanceSink>")
            .finish()
    }
}
