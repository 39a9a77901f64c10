//! Error types for the Rollcall attendance protocol
//!
//! One flat error enum differentiated per failure kind, so callers branch on
//! the variant rather than matching message strings. Non-fatal degradations
//! (pointer writes, emitter start, fallback store reads) are logged at their
//! site and never surface through this type.

use crate::types::{SessionCode, SessionId, StudentId, Timestamp};

/// Core error types for the Rollcall protocol
#[derive(Debug, thiserror::Error)]
pub enum RollcallError {
    /// Store network/service failure; the operation aborted with no partial
    /// state persisted.
    #[error("session store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Advertising or scanning hardware/permission failure. Non-fatal for
    /// session creation, which degrades to fallback-only discovery.
    #[error("radio unavailable: {reason}")]
    RadioUnavailable { reason: String },

    /// No attendance session exists for the presented code.
    #[error("no session found for code {code}")]
    SessionNotFound { code: SessionCode },

    /// The session exists but its validity window has passed.
    #[error("session {code} expired at {expired_at}")]
    SessionExpired {
        code: SessionCode,
        expired_at: Timestamp,
    },

    /// An attendance log already exists for this (session, student) pair.
    /// Benign: the student is already credited.
    #[error("attendance already recorded for student {student_id} in session {session_id}")]
    DuplicateSubmission {
        session_id: SessionId,
        student_id: StudentId,
    },

    /// The code did not come through an approved discovery path.
    #[error("session code did not come from an approved discovery path")]
    InvalidSource,

    /// Terminal scan outcome: neither radio nor fallback produced a live
    /// session within the scan window.
    #[error("no live attendance session found")]
    NoSessionFound,

    /// The candidate string does not have the session code shape.
    #[error("not a valid session code: {value:?}")]
    InvalidSessionCode { value: String },

    /// Local identity cache failure.
    #[error("identity cache error: {reason}")]
    Identity { reason: String },

    /// Invalid configuration or malformed input to a flow.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl RollcallError {
    /// Create a store-unavailable error with a reason
    pub fn store_unavailable<T: Into<String>>(reason: T) -> Self {
        RollcallError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a radio-unavailable error with a reason
    pub fn radio_unavailable<T: Into<String>>(reason: T) -> Self {
        RollcallError::RadioUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an identity cache error with a reason
    pub fn identity<T: Into<String>>(reason: T) -> Self {
        RollcallError::Identity {
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        RollcallError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error means the student is already credited, which
    /// callers generally treat as success-equivalent.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RollcallError::DuplicateSubmission { .. })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, RollcallError>;
