use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Platform credential capability is not available")]
    CapabilityUnavailable,

    #[error("Duplicate credential: {0}")]
    DuplicateCredential(String),

    #[error("No registered identities")]
    NoRegisteredIdentities,

    #[error("Identity resolution failed: {0}")]
    IdentityResolution(String),

    #[error("Enrollment cancelled: {0}")]
    EnrollmentCancelled(String),

    #[error("Enrollment failed: {0}")]
    EnrollmentFailed(String),

    #[error("Assertion cancelled: {0}")]
    AssertionCancelled(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Relay failed: {0}")]
    RelayFailed(String),

    #[error("Another credential ceremony is already in progress")]
    OperationInProgress,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RollcallError {
    /// True for user-initiated outcomes that should be reported without alarm.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::EnrollmentCancelled(_) | Self::AssertionCancelled(_)
        )
    }

    /// Stable code for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::CapabilityUnavailable => "CAPABILITY_UNAVAILABLE",
            Self::DuplicateCredential(_) => "DUPLICATE_CREDENTIAL",
            Self::NoRegisteredIdentities => "NO_REGISTERED_IDENTITIES",
            Self::IdentityResolution(_) => "IDENTITY_RESOLUTION",
            Self::EnrollmentCancelled(_) => "ENROLLMENT_CANCELLED",
            Self::EnrollmentFailed(_) => "ENROLLMENT_FAILED",
            Self::AssertionCancelled(_) => "ASSERTION_CANCELLED",
            Self::AssertionFailed(_) => "ASSERTION_FAILED",
            Self::RelayFailed(_) => "RELAY_FAILED",
            Self::OperationInProgress => "OPERATION_IN_PROGRESS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Status line shown to the person at the terminal.
    ///
    /// Internal details stay in the `Display` output and the logs.
    pub fn status_text(&self) -> String {
        match self {
            Self::InvalidInput(reason) => format!("Please check your input: {reason}"),
            Self::CapabilityUnavailable => {
                "Fingerprint authentication is not supported on this device".to_string()
            }
            Self::DuplicateCredential(_) => "User already registered!".to_string(),
            Self::NoRegisteredIdentities => "No registered users found".to_string(),
            Self::IdentityResolution(_) => "Fingerprint not recognized".to_string(),
            Self::EnrollmentCancelled(_) => {
                "Registration cancelled or fingerprint not recognized".to_string()
            }
            Self::EnrollmentFailed(reason) => format!("Registration failed: {reason}"),
            Self::AssertionCancelled(_) => {
                "Login cancelled or fingerprint not recognized".to_string()
            }
            Self::AssertionFailed(reason) => format!("Login failed: {reason}"),
            Self::RelayFailed(_) => "Attendance could not be sent to the sheet".to_string(),
            Self::OperationInProgress => "Please finish the current fingerprint scan".to_string(),
            Self::NotFound(_) => "User not found".to_string(),
            Self::Storage(_) | Self::Serialization(_) => {
                "Local user records could not be read or saved".to_string()
            }
            Self::Config(reason) => format!("Configuration problem: {reason}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RollcallError>;
