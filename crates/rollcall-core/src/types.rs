//! Core types for the Rollcall attendance protocol
//!
//! This module defines the fundamental identifiers used throughout the
//! protocol, using newtype patterns for semantic validation and type safety.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, RollcallError};

// ----------------------------------------------------------------------------
// Session Code
// ----------------------------------------------------------------------------

/// Opaque random token identifying one live attendance window.
///
/// A session code is the only accepted input to attendance submission. Its
/// textual shape is a version-4 UUID (8-4-4-4-12 hex groups, version nibble
/// `4`, variant nibble in `{8, 9, a, b}`); anything else is rejected at the
/// boundary by both the discovery scanner and the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionCode(String);

impl SessionCode {
    /// Generate a fresh random session code.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse and validate a candidate session code.
    pub fn parse(value: &str) -> Result<Self> {
        if is_valid_session_code(value) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(RollcallError::InvalidSessionCode {
                value: value.to_string(),
            })
        }
    }

    /// Get the canonical (lowercase) string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Check whether a string has the exact version-4 UUID textual shape.
///
/// Accepts mixed case. Group separators must sit at byte offsets 8, 13, 18
/// and 23; every other byte must be a hex digit; the version nibble is fixed
/// to `4` and the variant nibble must be one of `8`, `9`, `a`, `b`.
pub fn is_valid_session_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, &b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    if bytes[14] != b'4' {
        return false;
    }
    matches!(bytes[19].to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b')
}

// ----------------------------------------------------------------------------
// Opaque Identifiers
// ----------------------------------------------------------------------------

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap an externally issued identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the raw string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

opaque_id! {
    /// Identifier of a recurring class, distinct from any session code.
    ClassId
}
opaque_id! {
    /// Externally issued teacher identifier.
    TeacherId
}
opaque_id! {
    /// Externally issued student identifier, cached locally on first use.
    StudentId
}
opaque_id! {
    /// Primary key of one attendance session row.
    SessionId
}
opaque_id! {
    /// Primary key of one attendance log row.
    LogId
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a new timestamp
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get current wall-clock timestamp
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    /// Get the raw milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Offset this timestamp forward by a duration
    pub fn add(&self, duration: core::time::Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis() as u64))
    }

    /// Duration elapsed since another timestamp (zero if `other` is later)
    pub fn duration_since(&self, other: Self) -> core::time::Duration {
        core::time::Duration::from_millis(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ----------------------------------------------------------------------------
// Time Source
// ----------------------------------------------------------------------------

/// Trait for providing timestamps without reaching for the wall clock
/// directly, so session validity can be tested deterministically.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp
    fn now(&self) -> Timestamp;
}

/// Standard wall-clock implementation of [`TimeSource`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually advanced clock for tests and simulations
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: std::sync::atomic::AtomicU64,
}

impl ManualTimeSource {
    /// Create a clock pinned at the given timestamp
    pub fn at(start: Timestamp) -> Self {
        Self {
            millis: std::sync::atomic::AtomicU64::new(start.as_millis()),
        }
    }

    /// Advance the clock by a duration
    pub fn advance(&self, duration: core::time::Duration) {
        self.millis.fetch_add(
            duration.as_millis() as u64,
            std::sync::atomic::Ordering::SeqCst,
        );
    }

    /// Pin the clock to an absolute timestamp
    pub fn set(&self, now: Timestamp) {
        self.millis
            .store(now.as_millis(), std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(std::sync::atomic::Ordering::SeqCst))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
