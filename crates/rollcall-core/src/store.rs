//! Session store abstraction and in-memory implementation
//!
//! The relational store is an external service; this module defines the
//! operations the protocol consumes and an in-process implementation used by
//! tests and demos. The store is the sole synchronization point between
//! devices: each operation is individually atomic, but no multi-operation
//! transaction exists, which is what leaves the duplicate-check window open.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::model::{ActiveSessionPointer, AttendanceLog, AttendanceSession, ClassRecord};
use crate::types::{ClassId, SessionCode, SessionId, StudentId, TeacherId, Timestamp};
use crate::{Result, RollcallError};

// ----------------------------------------------------------------------------
// Store Trait
// ----------------------------------------------------------------------------

/// Operations the protocol performs against the session store.
///
/// Every method maps to one remote call; implementations surface transport
/// failures as [`RollcallError::StoreUnavailable`].
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // -- classes -------------------------------------------------------------

    async fn insert_class(&self, class: &ClassRecord) -> Result<()>;

    async fn class(&self, id: &ClassId) -> Result<Option<ClassRecord>>;

    async fn classes_for_teacher(&self, teacher_id: &TeacherId) -> Result<Vec<ClassRecord>>;

    /// Replace a class record wholesale (owner edits, deactivation).
    async fn update_class(&self, class: &ClassRecord) -> Result<()>;

    // -- attendance sessions -------------------------------------------------

    async fn insert_session(&self, session: &AttendanceSession) -> Result<()>;

    async fn session_by_code(&self, code: &SessionCode) -> Result<Option<AttendanceSession>>;

    /// Most recently created session with `expires_at >= now`, if any.
    async fn latest_live_session(&self, now: Timestamp) -> Result<Option<AttendanceSession>>;

    // -- active session pointers ---------------------------------------------

    async fn insert_pointer(&self, pointer: &ActiveSessionPointer) -> Result<()>;

    /// Most recently created pointer with `expires_at >= now`, if any.
    async fn latest_live_pointer(&self, now: Timestamp) -> Result<Option<ActiveSessionPointer>>;

    /// Delete the pointer for a code. Deleting a missing pointer is not an
    /// error (teardown must be idempotent).
    async fn delete_pointer(&self, code: &SessionCode) -> Result<()>;

    // -- attendance logs -----------------------------------------------------

    async fn insert_log(&self, log: &AttendanceLog) -> Result<()>;

    async fn log_exists(&self, session_id: &SessionId, student_id: &StudentId) -> Result<bool>;

    async fn logs_for_session(&self, session_id: &SessionId) -> Result<Vec<AttendanceLog>>;

    async fn count_logs(&self, session_id: &SessionId) -> Result<u64>;

    /// Teacher override: remove one student's log so it can be re-created.
    async fn delete_log(&self, session_id: &SessionId, student_id: &StudentId) -> Result<()>;

    // -- hygiene -------------------------------------------------------------

    /// Delete sessions and pointers past expiry. Storage hygiene only;
    /// correctness never depends on this running.
    async fn purge_expired(&self, now: Timestamp) -> Result<u64>;
}

// ----------------------------------------------------------------------------
// In-memory Implementation
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryTables {
    classes: HashMap<ClassId, ClassRecord>,
    sessions: Vec<AttendanceSession>,
    pointers: Vec<ActiveSessionPointer>,
    logs: Vec<AttendanceLog>,
}

/// In-memory store for tests and single-process demos.
///
/// The availability toggle lets tests exercise the `StoreUnavailable`
/// propagation paths.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
    available: std::sync::atomic::AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new, empty, available store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(MemoryTables::default()),
            available: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Toggle simulated availability
    pub fn set_available(&self, available: bool) {
        self.available
            .store(available, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(std::sync::atomic::Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RollcallError::store_unavailable("simulated outage"))
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn insert_class(&self, class: &ClassRecord) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.classes.insert(class.id.clone(), class.clone());
        Ok(())
    }

    async fn class(&self, id: &ClassId) -> Result<Option<ClassRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.classes.get(id).cloned())
    }

    async fn classes_for_teacher(&self, teacher_id: &TeacherId) -> Result<Vec<ClassRecord>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut classes: Vec<ClassRecord> = tables
            .classes
            .values()
            .filter(|c| &c.teacher_id == teacher_id)
            .cloned()
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn update_class(&self, class: &ClassRecord) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.classes.insert(class.id.clone(), class.clone());
        Ok(())
    }

    async fn insert_session(&self, session: &AttendanceSession) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.sessions.push(session.clone());
        Ok(())
    }

    async fn session_by_code(&self, code: &SessionCode) -> Result<Option<AttendanceSession>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| &s.session_code == code)
            .cloned())
    }

    async fn latest_live_session(&self, now: Timestamp) -> Result<Option<AttendanceSession>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .filter(|s| s.expires_at >= now)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert_pointer(&self, pointer: &ActiveSessionPointer) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.pointers.push(pointer.clone());
        Ok(())
    }

    async fn latest_live_pointer(&self, now: Timestamp) -> Result<Option<ActiveSessionPointer>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .pointers
            .iter()
            .filter(|p| p.expires_at >= now)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn delete_pointer(&self, code: &SessionCode) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.pointers.retain(|p| &p.session_code != code);
        Ok(())
    }

    async fn insert_log(&self, log: &AttendanceLog) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.logs.push(log.clone());
        Ok(())
    }

    async fn log_exists(&self, session_id: &SessionId, student_id: &StudentId) -> Result<bool> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .any(|l| &l.session_id == session_id && &l.student_id == student_id))
    }

    async fn logs_for_session(&self, session_id: &SessionId) -> Result<Vec<AttendanceLog>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .filter(|l| &l.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn count_logs(&self, session_id: &SessionId) -> Result<u64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .filter(|l| &l.session_id == session_id)
            .count() as u64)
    }

    async fn delete_log(&self, session_id: &SessionId, student_id: &StudentId) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .logs
            .retain(|l| !(&l.session_id == session_id && &l.student_id == student_id));
        Ok(())
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len() + tables.pointers.len();
        tables.sessions.retain(|s| s.expires_at >= now);
        tables.pointers.retain(|p| p.expires_at >= now);
        let after = tables.sessions.len() + tables.pointers.len();
        Ok((before - after) as u64)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn session_at(created: u64) -> AttendanceSession {
        AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(created),
            Duration::from_secs(600),
        )
    }

    #[tokio::test]
    async fn test_latest_live_session_picks_newest() {
        let store = MemoryStore::new();
        let older = session_at(1_000);
        let newer = session_at(2_000);
        store.insert_session(&older).await.unwrap();
        store.insert_session(&newer).await.unwrap();

        let found = store
            .latest_live_session(Timestamp::new(3_000))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_not_live() {
        let store = MemoryStore::new();
        let session = session_at(0);
        store.insert_session(&session).await.unwrap();

        let past_expiry = session.expires_at.add(Duration::from_secs(1));
        assert!(store
            .latest_live_session(past_expiry)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pointer_delete_is_idempotent() {
        let store = MemoryStore::new();
        let session = session_at(0);
        let pointer = ActiveSessionPointer::for_session(&session);
        store.insert_pointer(&pointer).await.unwrap();

        store.delete_pointer(&session.session_code).await.unwrap();
        // second delete of a now-missing pointer is still Ok
        store.delete_pointer(&session.session_code).await.unwrap();
        assert!(store
            .latest_live_pointer(Timestamp::new(0))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_removes_only_dead_rows() {
        let store = MemoryStore::new();
        let dead = session_at(0);
        let live = session_at(10_000_000);
        store.insert_session(&dead).await.unwrap();
        store.insert_session(&live).await.unwrap();
        store
            .insert_pointer(&ActiveSessionPointer::for_session(&dead))
            .await
            .unwrap();
        store
            .insert_pointer(&ActiveSessionPointer::for_session(&live))
            .await
            .unwrap();

        let now = dead.expires_at.add(Duration::from_secs(1));
        let purged = store.purge_expired(now).await.unwrap();
        assert_eq!(purged, 2);

        assert!(store
            .session_by_code(&dead.session_code)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .session_by_code(&live.session_code)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryStore::new();
        store.set_available(false);

        let err = store.insert_session(&session_at(0)).await.unwrap_err();
        assert!(matches!(err, RollcallError::StoreUnavailable { .. }));

        store.set_available(true);
        assert!(store.insert_session(&session_at(0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_round_trip_and_override() {
        let store = MemoryStore::new();
        let session = session_at(0);
        let student = StudentId::new("s-1");
        let log = AttendanceLog::new(session.id.clone(), student.clone(), Timestamp::new(5));

        assert!(!store.log_exists(&session.id, &student).await.unwrap());
        store.insert_log(&log).await.unwrap();
        assert!(store.log_exists(&session.id, &student).await.unwrap());
        assert_eq!(store.count_logs(&session.id).await.unwrap(), 1);

        // teacher override removes the row and allows re-creation
        store.delete_log(&session.id, &student).await.unwrap();
        assert!(!store.log_exists(&session.id, &student).await.unwrap());
    }
}
