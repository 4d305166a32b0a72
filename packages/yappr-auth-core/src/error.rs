//! # Error Handling
//!
//! Error types for the wallet key-exchange and key-registration core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR CATEGORIES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Format (100-199)       Malformed WIF, URI, key or payload bytes.      │
//! │                         Recoverable: re-prompt / re-scan.              │
//! │                                                                         │
//! │  Validation (200-299)   Contract violations at construction time       │
//! │                         (oversized label, wrong input length).         │
//! │                         Programmer error, raised before any I/O.       │
//! │                                                                         │
//! │  Crypto (300-399)       AEAD authentication failure, KDF failure.      │
//! │                         Fatal to the current attempt.                  │
//! │                                                                         │
//! │  Registration (400-499) Timeout, transient poll failure, build         │
//! │                         failure, cancellation.                         │
//! │                                                                         │
//! │  Collaborator (500-599) Identity lookup failures.                      │
//! │                                                                         │
//! │  Internal (900-999)     Configuration and invariant failures.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! URI parsers never produce these errors: scanned input is adversarial, so
//! the parsers return `None` and log the rejection reason instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the key-exchange core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Format Errors (100-199)
    // ========================================================================

    /// Malformed WIF string (bad Base58Check checksum or length)
    #[error("Invalid WIF: {0}")]
    InvalidWif(String),

    /// Malformed protocol URI
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Malformed binary payload (e.g. truncated wallet response)
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Bytes that do not form a valid secp256k1 key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Validation Errors (200-299)
    // ========================================================================

    /// A request field violates its length or range contract
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Key derivation input has the wrong length
    #[error("Invalid input length: expected {expected} bytes, got {got}")]
    InvalidInputLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        got: usize,
    },

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// AEAD authentication failed (wrong shared secret or tampering)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// AEAD encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// HKDF expansion failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Random number generation failed
    #[error("Random number generation failed")]
    RngFailed,

    // ========================================================================
    // Registration Errors (400-499)
    // ========================================================================

    /// The wallet did not confirm within the allotted window
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A single registration poll failed; retried on the next tick
    #[error("Registration check failed: {0}")]
    TransientPoll(String),

    /// The unsigned transition could not be built
    #[error("Failed to build state transition: {0}")]
    BuildFailed(String),

    /// The attempt was cancelled or superseded
    #[error("Registration attempt cancelled")]
    Cancelled,

    // ========================================================================
    // Collaborator Errors (500-599)
    // ========================================================================

    /// Identity lookup service failed
    #[error("Identity lookup failed: {0}")]
    IdentityLookup(String),

    /// Identity does not exist on chain
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Stable numeric error code
    ///
    /// - 100-199: Format
    /// - 200-299: Validation
    /// - 300-399: Crypto
    /// - 400-499: Registration
    /// - 500-599: Collaborators
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Format (100-199)
            Error::InvalidWif(_) => 100,
            Error::InvalidUri(_) => 101,
            Error::MalformedPayload(_) => 102,
            Error::InvalidKey(_) => 103,

            // Validation (200-299)
            Error::Validation(_) => 200,
            Error::InvalidInputLength { .. } => 201,

            // Crypto (300-399)
            Error::DecryptionFailed(_) => 300,
            Error::EncryptionFailed(_) => 301,
            Error::KeyDerivationFailed(_) => 302,
            Error::RngFailed => 303,

            // Registration (400-499)
            Error::Timeout(_) => 400,
            Error::TransientPoll(_) => 401,
            Error::BuildFailed(_) => 402,
            Error::Cancelled => 403,

            // Collaborators (500-599)
            Error::IdentityLookup(_) => 500,
            Error::IdentityNotFound(_) => 501,

            // Internal (900-999)
            Error::Internal(_) => 900,
            Error::Config(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors go away by re-prompting the user, re-scanning,
    /// or calling `retry()`. A decryption failure is never recoverable with
    /// the same inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidWif(_)
                | Error::InvalidUri(_)
                | Error::MalformedPayload(_)
                | Error::Timeout(_)
                | Error::TransientPoll(_)
                | Error::BuildFailed(_)
                | Error::IdentityLookup(_)
        )
    }
}

// ============================================================================
// ERROR REPORT
// ============================================================================

/// Flattened error for display and state snapshots
///
/// Stored in `RegistrationState` so observers can render a message without
/// holding on to the error itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the error is recoverable
    pub recoverable: bool,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        }
    }
}

impl From<Error> for ErrorReport {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidWif("x".into()).code(), 100);
        assert_eq!(Error::Validation("x".into()).code(), 200);
        assert_eq!(Error::DecryptionFailed("x".into()).code(), 300);
        assert_eq!(Error::Timeout("x".into()).code(), 400);
        assert_eq!(Error::IdentityLookup("x".into()).code(), 500);
        assert_eq!(Error::Internal("x".into()).code(), 900);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Timeout("wallet".into()).is_recoverable());
        assert!(Error::TransientPoll("503".into()).is_recoverable());
        assert!(Error::InvalidUri("scheme".into()).is_recoverable());
        assert!(!Error::DecryptionFailed("tag".into()).is_recoverable());
        assert!(!Error::Validation("label".into()).is_recoverable());
    }

    #[test]
    fn test_error_report_conversion() {
        let err = Error::Timeout("no wallet response".into());
        let report: ErrorReport = err.into();

        assert_eq!(report.code, 400);
        assert!(report.message.contains("no wallet response"));
        assert!(report.recoverable);
    }

    #[test]
    fn test_input_length_message() {
        let err = Error::InvalidInputLength { expected: 32, got: 31 };
        assert_eq!(
            err.to_string(),
            "Invalid input length: expected 32 bytes, got 31"
        );
    }
}
