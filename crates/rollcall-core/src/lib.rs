//! Rollcall Core Protocol Implementation
//!
//! This crate provides the types, data model, store abstraction, and
//! attendance flows of the Rollcall proximity attendance protocol. Teachers
//! open time-boxed attendance sessions broadcast over short-range radio;
//! students discover a session code, validate it, and submit an
//! at-most-once attendance record. The radio and the relational store are
//! ports; their production implementations live in the sibling crates.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod content;
pub mod errors;
pub mod fallback;
pub mod identity;
pub mod model;
pub mod radio;
pub mod store;
pub mod submit;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::ProtocolConfig;
pub use errors::{Result, RollcallError};
pub use fallback::{FallbackResolver, SessionDescriptor};
pub use model::{
    ActiveSessionPointer, AttendanceLog, AttendanceSession, ClassRecord, ScheduleSlot,
    StudentProfile, TeacherProfile,
};
pub use radio::{Advertiser, DiscoverySource, RadioScanner, ScanEvent, SessionCandidate};
pub use store::{MemoryStore, SessionStore};
pub use submit::{AttendanceSubmitter, SubmitReceipt};
pub use types::{
    is_valid_session_code, ClassId, LogId, ManualTimeSource, SessionCode, SessionId, StudentId,
    SystemTimeSource, TeacherId, TimeSource, Timestamp,
};
