//! End-to-end tests for enrollment, identification and relay behaviour.
//!
//! Every test drives the public `AttendanceService` with a scripted platform
//! and an in-process sink, so nothing here touches the network.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use rollcall_core::platform::{AuthenticatorAttachment, RelyingParty};
use rollcall_core::{
    AssertedCredential, AttendanceRelay, AttendanceService, AttendanceSink, CeremonyContext,
    CreatedCredential, CredentialCreationOptions, CredentialReference, CredentialRequestOptions,
    EnrolledIdentity, FileKeyValueStore, MockAuthenticator, PlatformAuthenticator,
    PlatformResult, RecordStore, RelayEvent, Result, RollcallError,
};

// ============================================================================
// Fixtures
// ============================================================================

fn relying_party() -> RelyingParty {
    RelyingParty {
        id: "localhost".to_string(),
        name: "Attendance System".to_string(),
    }
}

fn service_with(
    platform: Arc<dyn PlatformAuthenticator>,
    relay: AttendanceRelay,
) -> (AttendanceService, Arc<RecordStore>) {
    let store = Arc::new(RecordStore::in_memory());
    let ctx = CeremonyContext::new(Arc::clone(&store), platform, relay, relying_party());
    (AttendanceService::new(ctx), store)
}

/// Keeps every event it is handed.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<RelayEvent>>,
}

impl RecordingSink {
    fn actions(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.action()).collect()
    }
}

#[async_trait]
impl AttendanceSink for RecordingSink {
    async fn submit(&self, event: &RelayEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Transport always down.
struct FailingSink;

#[async_trait]
impl AttendanceSink for FailingSink {
    async fn submit(&self, _event: &RelayEvent) -> Result<()> {
        Err(RollcallError::RelayFailed("connection refused".to_string()))
    }
}

/// Holds every credential creation open until released.
struct BlockingAuthenticator {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl PlatformAuthenticator for BlockingAuthenticator {
    fn is_available(&self) -> bool {
        true
    }

    async fn create_credential(
        &self,
        _options: &CredentialCreationOptions,
    ) -> PlatformResult<CreatedCredential> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(CreatedCredential {
            raw_id: vec![7, 7, 7],
            attachment: Some(AuthenticatorAttachment::Platform),
        })
    }

    async fn get_assertion(
        &self,
        _options: &CredentialRequestOptions,
    ) -> PlatformResult<AssertedCredential> {
        unreachable!("assertion is not exercised by the blocking authenticator")
    }
}

// ============================================================================
// Enrollment
// ============================================================================

#[tokio::test]
async fn test_enrolled_identity_carries_platform_credential() {
    let mock = Arc::new(MockAuthenticator::new(42));
    let (service, _store) = service_with(mock.clone(), AttendanceRelay::disabled());

    service.enroll("Ada Lovelace").await.unwrap();

    let identities = service.identities().unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].display_name, "Ada Lovelace");
    assert_eq!(
        identities[0].credential_reference.as_bytes(),
        mock.credential_id(0).as_slice()
    );
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let mock = Arc::new(MockAuthenticator::new(42));
    let (service, store) = service_with(mock.clone(), AttendanceRelay::disabled());

    service.enroll("Ada").await.unwrap();
    let err = service.enroll("  ada ").await.unwrap_err();

    assert!(matches!(err, RollcallError::DuplicateCredential(_)));
    assert_eq!(err.status_text(), "User already registered!");
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(mock.creation_calls(), 1);
}

#[tokio::test]
async fn test_enrollment_notifies_sheet() {
    let sink = Arc::new(RecordingSink::default());
    let (service, _store) = service_with(
        Arc::new(MockAuthenticator::new(1)),
        AttendanceRelay::new(sink.clone()),
    );

    let enrollment = service.enroll("Grace").await.unwrap();
    assert!(enrollment.relay.is_ok());
    assert_eq!(sink.actions(), vec!["register"]);
}

#[tokio::test]
async fn test_second_ceremony_rejected_while_first_pending() {
    let platform = Arc::new(BlockingAuthenticator {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let (service, store) = service_with(platform.clone(), AttendanceRelay::disabled());

    let (first, second) = tokio::join!(service.enroll("Ada"), async {
        platform.entered.notified().await;
        assert!(service.is_busy());
        let second = service.enroll("Grace").await;
        platform.release.notify_one();
        second
    });

    assert!(matches!(
        second.unwrap_err(),
        RollcallError::OperationInProgress
    ));
    assert_eq!(first.unwrap().identity.display_name, "Ada");
    assert_eq!(store.len().unwrap(), 1);
    assert!(!service.is_busy());
}

// ============================================================================
// Identification
// ============================================================================

#[tokio::test]
async fn test_empty_store_skips_platform() {
    let mock = Arc::new(MockAuthenticator::new(3));
    let (service, _store) = service_with(mock.clone(), AttendanceRelay::disabled());

    let err = service.mark_attendance().await.unwrap_err();
    assert!(matches!(err, RollcallError::NoRegisteredIdentities));
    assert_eq!(mock.assertion_calls(), 0);
}

#[tokio::test]
async fn test_presented_credential_resolves_regardless_of_order() {
    for order in [["Ada", "Grace"], ["Grace", "Ada"]] {
        let mock = Arc::new(MockAuthenticator::new(9));
        let (service, _store) = service_with(mock.clone(), AttendanceRelay::disabled());

        let mut grace = None;
        for name in order {
            let enrollment = service.enroll(name).await.unwrap();
            if name == "Grace" {
                grace = Some(enrollment.identity.credential_reference);
            }
        }

        mock.present(grace);
        let attendance = service.mark_attendance().await.unwrap();
        assert_eq!(attendance.identity.display_name, "Grace");
        assert_eq!(attendance.record.name, "Grace");
    }
}

#[tokio::test]
async fn test_unknown_credential_is_not_relayed() {
    let mock = Arc::new(MockAuthenticator::new(9));
    let sink = Arc::new(RecordingSink::default());
    let (service, _store) = service_with(mock.clone(), AttendanceRelay::new(sink.clone()));

    service.enroll("Ada").await.unwrap();
    mock.present(Some(CredentialReference::from_bytes(vec![0xAB; 16]).unwrap()));

    let err = service.mark_attendance().await.unwrap_err();
    assert!(matches!(err, RollcallError::IdentityResolution(_)));
    assert_eq!(sink.actions(), vec!["register"]);
}

#[tokio::test]
async fn test_relay_failure_does_not_fail_attendance() {
    let (service, _store) = service_with(
        Arc::new(MockAuthenticator::new(9)),
        AttendanceRelay::new(Arc::new(FailingSink)),
    );

    let enrollment = service.enroll("Ada").await.unwrap();
    assert!(enrollment.relay.is_err());

    let attendance = service.mark_attendance().await.unwrap();
    assert_eq!(attendance.identity.display_name, "Ada");
    assert!(attendance.relay_failed());
    assert!(matches!(
        attendance.relay,
        Err(RollcallError::RelayFailed(_))
    ));
}

#[tokio::test]
async fn test_attendance_event_envelope() {
    let sink = Arc::new(RecordingSink::default());
    let (service, _store) = service_with(
        Arc::new(MockAuthenticator::new(9)),
        AttendanceRelay::new(sink.clone()),
    );

    service.enroll("Ada").await.unwrap();
    let attendance = service.mark_attendance().await.unwrap();

    let events = sink.events.lock().unwrap();
    let json = serde_json::to_value(events.last().unwrap()).unwrap();
    assert_eq!(json["action"], "attendance");
    assert_eq!(json["data"]["name"], "Ada");
    assert_eq!(json["data"]["date"], attendance.record.date.as_str());
    assert!(json["data"]["timestamp"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// Removal
// ============================================================================

#[tokio::test]
async fn test_remove_forgets_identity_and_notifies() {
    let sink = Arc::new(RecordingSink::default());
    let (service, store) = service_with(
        Arc::new(MockAuthenticator::new(9)),
        AttendanceRelay::new(sink.clone()),
    );

    let ada = service.enroll("Ada").await.unwrap().identity;
    service.enroll("Grace").await.unwrap();

    let removed = service.remove(&ada.credential_reference).await.unwrap();
    assert_eq!(removed.display_name, "Ada");
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(sink.actions(), vec!["register", "register", "delete"]);

    assert!(matches!(
        service.remove(&ada.credential_reference).await.unwrap_err(),
        RollcallError::NotFound(_)
    ));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_file_store_survives_reopen_in_order() {
    let temp = TempDir::new().unwrap();
    let names = ["Ada", "Grace", "Edsger", "Barbara", "Alan"];

    {
        let store = RecordStore::new(FileKeyValueStore::open(temp.path()).unwrap());
        for (i, name) in names.iter().enumerate() {
            let reference = CredentialReference::from_bytes(vec![i as u8 + 1; 8]).unwrap();
            store.add(EnrolledIdentity::new(*name, reference)).unwrap();
        }
    }

    let reopened = RecordStore::open(temp.path()).unwrap();
    let listed: Vec<String> = reopened
        .list()
        .unwrap()
        .into_iter()
        .map(|identity| identity.display_name)
        .collect();
    assert_eq!(listed, names);
}

#[tokio::test]
async fn test_enrollment_persists_across_service_instances() {
    let temp = TempDir::new().unwrap();
    let mock = Arc::new(MockAuthenticator::new(11));

    let first = {
        let store = Arc::new(RecordStore::open(temp.path()).unwrap());
        let ctx = CeremonyContext::new(
            store,
            mock.clone(),
            AttendanceRelay::disabled(),
            relying_party(),
        );
        AttendanceService::new(ctx).enroll("Ada").await.unwrap()
    };

    let store = Arc::new(RecordStore::open(temp.path()).unwrap());
    let ctx = CeremonyContext::new(store, mock, AttendanceRelay::disabled(), relying_party());
    let service = AttendanceService::new(ctx);

    let attendance = service.mark_attendance().await.unwrap();
    assert_eq!(
        attendance.identity.credential_reference,
        first.identity.credential_reference
    );
}
