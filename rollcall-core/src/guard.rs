//! In-flight guard for credential ceremonies.
//!
//! The platform prompt is modal, so only one enrollment or assertion may run at
//! a time. A second attempt while one is pending fails with
//! `OperationInProgress` instead of queueing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, RollcallError};

/// Shared flag; clones observe the same ceremony.
#[derive(Debug, Clone, Default)]
pub struct CeremonyGuard {
    busy: Arc<AtomicBool>,
}

impl CeremonyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. The returned permit releases it on drop.
    pub fn try_begin(&self) -> Result<CeremonyPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RollcallError::OperationInProgress)?;
        Ok(CeremonyPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one ceremony.
#[derive(Debug)]
pub struct CeremonyPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for CeremonyPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_until_release() {
        let guard = CeremonyGuard::new();
        let permit = guard.try_begin().unwrap();
        assert!(guard.is_busy());
        assert!(matches!(
            guard.clone().try_begin().unwrap_err(),
            RollcallError::OperationInProgress
        ));

        drop(permit);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_ok());
    }
}
