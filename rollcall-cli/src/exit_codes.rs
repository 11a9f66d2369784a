//! Exit codes following sysexits.h conventions.
//!
//! Scripts driving the kiosk can tell "try again" apart from "fix the setup".

use rollcall_core::RollcallError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Invalid input or configuration.
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Identity not recognized, unknown, or already enrolled.
/// Maps to EX_DATAERR from sysexits.h.
pub const NOT_RECOGNIZED: i32 = 65;

/// Platform authenticator unavailable.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const UNAVAILABLE: i32 = 69;

/// Record store could not be read or written.
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Ceremony cancelled, timed out, or another one is in flight.
/// Maps to EX_TEMPFAIL from sysexits.h.
pub const TEMPORARY_FAILURE: i32 = 75;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let detail = format!("{err:#}");

        // Classify by the first library error in the chain
        let Some(core) = err.chain().find_map(|e| e.downcast_ref::<RollcallError>()) else {
            return Self {
                code: GENERAL_ERROR,
                message: Some(detail),
            };
        };

        Self {
            code: code_for(core),
            message: Some(format!("{} ({detail})", core.status_text())),
        }
    }
}

pub fn code_for(err: &RollcallError) -> i32 {
    match err {
        RollcallError::InvalidInput(_) | RollcallError::Config(_) => USAGE_ERROR,
        RollcallError::IdentityResolution(_)
        | RollcallError::NoRegisteredIdentities
        | RollcallError::NotFound(_)
        | RollcallError::DuplicateCredential(_) => NOT_RECOGNIZED,
        RollcallError::CapabilityUnavailable => UNAVAILABLE,
        RollcallError::Storage(_) | RollcallError::Serialization(_) => IO_ERROR,
        RollcallError::OperationInProgress => TEMPORARY_FAILURE,
        e if e.is_cancellation() => TEMPORARY_FAILURE,
        _ => GENERAL_ERROR,
    }
}
