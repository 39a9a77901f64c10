//! Attendance submission: the validated, at-most-once write path
//!
//! Four sequential store steps (lookup, expiry check, duplicate check,
//! insert) with no transactional wrapping. Ordering holds per caller only;
//! concurrent submitters race between the duplicate check and the insert.

use std::sync::Arc;

use tracing::{debug, info};

use crate::model::AttendanceLog;
use crate::store::SessionStore;
use crate::types::{SessionCode, SessionId, StudentId, TimeSource};
use crate::{Result, RollcallError};

/// Outcome of a successful submission
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// The session the log was recorded against
    pub session_id: SessionId,
}

/// Performs validated attendance writes for one student device
pub struct AttendanceSubmitter {
    store: Arc<dyn SessionStore>,
    time: Arc<dyn TimeSource>,
}

impl AttendanceSubmitter {
    pub fn new(store: Arc<dyn SessionStore>, time: Arc<dyn TimeSource>) -> Self {
        Self { store, time }
    }

    /// Submit attendance for a discovered session code.
    ///
    /// `via_radio` must be true: only codes that came through the discovery
    /// scanner or the fallback resolver are accepted. Free-text entry goes
    /// through the separate manual path, never through here.
    pub async fn submit(
        &self,
        code: &SessionCode,
        student_id: &StudentId,
        via_radio: bool,
    ) -> Result<SubmitReceipt> {
        if !via_radio {
            return Err(RollcallError::InvalidSource);
        }

        let session = self
            .store
            .session_by_code(code)
            .await?
            .ok_or_else(|| RollcallError::SessionNotFound { code: code.clone() })?;

        let now = self.time.now();
        if now > session.expires_at {
            return Err(RollcallError::SessionExpired {
                code: code.clone(),
                expired_at: session.expires_at,
            });
        }

        if self.store.log_exists(&session.id, student_id).await? {
            debug!(
                session_id = %session.id,
                student_id = %student_id,
                "duplicate submission suppressed"
            );
            return Err(RollcallError::DuplicateSubmission {
                session_id: session.id,
                student_id: student_id.clone(),
            });
        }

        let log = AttendanceLog::new(session.id.clone(), student_id.clone(), now);
        self.store.insert_log(&log).await?;

        info!(
            session_id = %session.id,
            student_id = %student_id,
            "attendance recorded"
        );
        Ok(SubmitReceipt {
            session_id: session.id,
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
