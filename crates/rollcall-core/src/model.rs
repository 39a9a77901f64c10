//! Data model for classes, sessions, pointers, and attendance logs
//!
//! A legacy schema revision repurposed two session columns (`teacher_id`
//! held the session code, `code` the class identifier). The two logical
//! fields are kept here under honest names; store clients own any column
//! mapping.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ClassId, LogId, SessionCode, SessionId, StudentId, TeacherId, Timestamp};
use crate::{Result, RollcallError};

// ----------------------------------------------------------------------------
// Class Record
// ----------------------------------------------------------------------------

/// One {day, time} entry of a class's weekly schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub time: String,
}

/// A recurring class owned by one teacher.
///
/// Never hard-deleted; deactivation flips `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    pub name: String,
    pub subject: String,
    pub teacher_id: TeacherId,
    /// Ordered weekly schedule
    pub schedule: Vec<ScheduleSlot>,
    /// Human-shareable class code, distinct in shape from any session code
    pub class_code: String,
    pub is_active: bool,
}

impl ClassRecord {
    /// Create a new class with a generated identifier and class code.
    ///
    /// Requires a non-empty name and subject and at least one schedule slot.
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        teacher_id: TeacherId,
        schedule: Vec<ScheduleSlot>,
    ) -> Result<Self> {
        let name = name.into();
        let subject = subject.into();
        if name.trim().is_empty() {
            return Err(RollcallError::config_error("class name must not be empty"));
        }
        if subject.trim().is_empty() {
            return Err(RollcallError::config_error(
                "class subject must not be empty",
            ));
        }
        if schedule.is_empty() {
            return Err(RollcallError::config_error(
                "class schedule needs at least one slot",
            ));
        }

        let class_code = generate_class_code(&subject);
        Ok(Self {
            id: ClassId::random(),
            name: name.trim().to_string(),
            subject: subject.trim().to_string(),
            teacher_id,
            schedule,
            class_code,
            is_active: true,
        })
    }

    /// Deactivate in place (classes are never hard-deleted).
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Generate a human-shareable class code: the first three subject letters
/// uppercased plus three random alphanumerics.
pub fn generate_class_code(subject: &str) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let prefix: String = subject
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();

    let raw = Uuid::new_v4();
    let suffix: String = raw.as_bytes()[..3]
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect();

    format!("{}{}", prefix, suffix)
}

// ----------------------------------------------------------------------------
// Attendance Session
// ----------------------------------------------------------------------------

/// One time-boxed attendance window for a class.
///
/// Immutable after creation; liveness is a passive timestamp comparison and
/// rows past expiry are removed lazily by the hygiene sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: SessionId,
    pub session_code: SessionCode,
    pub class_id: ClassId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl AttendanceSession {
    /// Open a new session for a class with a fresh random code.
    pub fn open(class_id: ClassId, now: Timestamp, validity: Duration) -> Self {
        Self {
            id: SessionId::random(),
            session_code: SessionCode::generate(),
            class_id,
            created_at: now,
            expires_at: now.add(validity),
        }
    }

    /// A session is live iff the current time is strictly before expiry.
    pub fn is_live(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

// ----------------------------------------------------------------------------
// Active Session Pointer
// ----------------------------------------------------------------------------

/// Denormalized shadow of the most recent live session, used only by the
/// fallback resolver so it need not scan full session history. Same lifetime
/// as its session; deleted on explicit teardown or by the expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSessionPointer {
    pub session_code: SessionCode,
    pub class_id: ClassId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl ActiveSessionPointer {
    /// Build the pointer shadowing a session.
    pub fn for_session(session: &AttendanceSession) -> Self {
        Self {
            session_code: session.session_code.clone(),
            class_id: session.class_id.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }

    pub fn is_live(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

// ----------------------------------------------------------------------------
// Attendance Log
// ----------------------------------------------------------------------------

/// One student's attendance record for one session.
///
/// Never updated after insert; removable only by an explicit teacher
/// override, which allows re-creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub id: LogId,
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub created_at: Timestamp,
}

impl AttendanceLog {
    pub fn new(session_id: SessionId, student_id: StudentId, now: Timestamp) -> Self {
        Self {
            id: LogId::random(),
            session_id,
            student_id,
            created_at: now,
        }
    }
}

// ----------------------------------------------------------------------------
// Cached Identity Profiles
// ----------------------------------------------------------------------------

/// Student identity as cached locally after login/refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub batch: String,
}

/// Teacher identity as cached locally after login/refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> ScheduleSlot {
        ScheduleSlot {
            day: "Monday".to_string(),
            time: "10:00".to_string(),
        }
    }

    #[test]
    fn test_class_code_shape() {
        let code = generate_class_code("Physics");
        assert_eq!(code.len(), 6);
        assert!(code.starts_with("PHY"));
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_class_validation() {
        let teacher = TeacherId::new("t-1");
        assert!(ClassRecord::new("", "Physics", teacher.clone(), vec![slot()]).is_err());
        assert!(ClassRecord::new("PHY101", " ", teacher.clone(), vec![slot()]).is_err());
        assert!(ClassRecord::new("PHY101", "Physics", teacher.clone(), vec![]).is_err());

        let class = ClassRecord::new("PHY101", "Physics", teacher, vec![slot()]).unwrap();
        assert!(class.is_active);
        // The class code never collides with the session code shape.
        assert!(!crate::types::is_valid_session_code(&class.class_code));
    }

    #[test]
    fn test_session_liveness_window() {
        let now = Timestamp::new(1_000_000);
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            now,
            Duration::from_secs(600),
        );

        assert_eq!(session.expires_at, now.add(Duration::from_secs(600)));
        assert!(session.is_live(now));
        assert!(session.is_live(now.add(Duration::from_secs(599))));
        // boundary: current time == expiry is no longer live
        assert!(!session.is_live(session.expires_at));
        assert!(!session.is_live(now.add(Duration::from_secs(601))));
    }

    #[test]
    fn test_pointer_shadows_session() {
        let now = Timestamp::new(42);
        let session =
            AttendanceSession::open(ClassId::new("c-1"), now, Duration::from_secs(600));
        let pointer = ActiveSessionPointer::for_session(&session);

        assert_eq!(pointer.session_code, session.session_code);
        assert_eq!(pointer.class_id, session.class_id);
        assert_eq!(pointer.expires_at, session.expires_at);
    }

    #[test]
    fn test_session_codes_are_unique_per_open() {
        let now = Timestamp::new(0);
        let a = AttendanceSession::open(ClassId::new("c"), now, Duration::from_secs(600));
        let b = AttendanceSession::open(ClassId::new("c"), now, Duration::from_secs(600));
        assert_ne!(a.session_code, b.session_code);
        assert_ne!(a.id, b.id);
    }
}
