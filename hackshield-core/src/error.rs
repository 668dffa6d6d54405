//! Error types for HackShield.
//!
//! Every remote-facing error is terminal per attempt: nothing here is retried
//! automatically, and each variant carries a message fit for the user.

use thiserror::Error;

/// Result type alias using `HackshieldError`.
pub type Result<T> = std::result::Result<T, HackshieldError>;

/// Why a verification attempt produced no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The service answered but recognized no embedded block.
    NoBlockFound,
    /// The service recognized the block but refused this device.
    Unauthorized,
    /// The service was unreachable or answered with a server error.
    Transport,
}

/// Main error type for all HackShield operations.
#[derive(Debug, Error)]
pub enum HackshieldError {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOCAL PRECONDITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A required field was missing before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The platform refused storage or media access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No signal was available to derive a device identity from.
    #[error("Device identity unavailable: {0}")]
    IdentityUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // REMOTE BLOCK SERVICE
    // ═══════════════════════════════════════════════════════════════════════════

    /// The create endpoint rejected the request or the transport failed.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The verify endpoint returned no payload.
    #[error("Verification failed: {message}")]
    Verification {
        /// Failure category.
        kind: VerificationFailure,
        /// Human-readable reason.
        message: String,
    },

    /// The list endpoint failed.
    #[error("Ledger fetch failed: {0}")]
    Fetch(String),

    /// HTTP client construction or request building failed.
    #[error("HTTP error: {0}")]
    Http(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE & SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Key-value store or media catalog failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact payload was not valid base64.
    #[error("Invalid base64 artifact: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HackshieldError {
    /// Builds a verification error.
    pub fn verification(kind: VerificationFailure, message: impl Into<String>) -> Self {
        HackshieldError::Verification {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if the operation was aborted before touching the network.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, HackshieldError::Validation(_))
    }

    /// Returns true if the error came from the remote Block Service or its transport.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            HackshieldError::Submission(_)
                | HackshieldError::Verification { .. }
                | HackshieldError::Fetch(_)
                | HackshieldError::Http(_)
        )
    }

    /// Returns the verification failure category, if any.
    pub fn verification_failure(&self) -> Option<VerificationFailure> {
        match self {
            HackshieldError::Verification { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The message shown to the user, without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            HackshieldError::Validation(m)
            | HackshieldError::PermissionDenied(m)
            | HackshieldError::IdentityUnavailable(m)
            | HackshieldError::Submission(m)
            | HackshieldError::Fetch(m)
            | HackshieldError::Verification { message: m, .. } => m.clone(),
            other => other.to_string(),
        }
    }
}
