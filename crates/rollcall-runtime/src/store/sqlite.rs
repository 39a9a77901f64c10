//! SQLite-backed session store client
//!
//! File-backed client over the store schema, for deployments and demos
//! that keep the relational store on the device. Operations are short,
//! synchronous statements behind one connection mutex; every statement is
//! its own atomic step, and there is no unique index on
//! `(session_id, student_id)` — the duplicate check lives in the submit
//! flow.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use rollcall_core::{
    ActiveSessionPointer, AttendanceLog, AttendanceSession, ClassId, ClassRecord, LogId, Result,
    RollcallError, ScheduleSlot, SessionCode, SessionId, SessionStore, StudentId, TeacherId,
    Timestamp,
};

// ----------------------------------------------------------------------------
// Schema
// ----------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS classes (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    subject     TEXT NOT NULL,
    teacher_id  TEXT NOT NULL,
    schedule    TEXT NOT NULL,
    class_code  TEXT NOT NULL,
    is_active   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance_sessions (
    id           TEXT PRIMARY KEY,
    session_code TEXT NOT NULL,
    class_id     TEXT NOT NULL,
    created_at   INTEGER NOT NULL,
    expires_at   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS active_sessions (
    session_code TEXT PRIMARY KEY,
    class_id     TEXT NOT NULL,
    created_at   INTEGER NOT NULL,
    expires_at   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance_logs (
    id          TEXT PRIMARY KEY,
    session_id  TEXT NOT NULL,
    student_id  TEXT NOT NULL,
    created_at  INTEGER NOT NULL
);
";

// ----------------------------------------------------------------------------
// Store
// ----------------------------------------------------------------------------

/// SQLite implementation of [`SessionStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and initialize) a store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RollcallError::store_unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(conn)
    }

    /// Default on-disk location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| RollcallError::store_unavailable("no platform data directory"))?;
        Ok(base.join("rollcall").join("rollcall.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn db_err(err: rusqlite::Error) -> RollcallError {
    RollcallError::store_unavailable(err.to_string())
}

// ----------------------------------------------------------------------------
// Row Mapping
// ----------------------------------------------------------------------------

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<ClassRecord> {
    let schedule_json: String = row.get("schedule")?;
    let schedule: Vec<ScheduleSlot> = serde_json::from_str(&schedule_json).unwrap_or_default();
    Ok(ClassRecord {
        id: ClassId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
        subject: row.get("subject")?,
        teacher_id: TeacherId::new(row.get::<_, String>("teacher_id")?),
        schedule,
        class_code: row.get("class_code")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<AttendanceSession> {
    Ok(AttendanceSession {
        id: SessionId::new(row.get::<_, String>("id")?),
        session_code: SessionCode::parse(&row.get::<_, String>("session_code")?)
            .map_err(|e| rusqlite::Error::InvalidColumnName(e.to_string()))?,
        class_id: ClassId::new(row.get::<_, String>("class_id")?),
        created_at: Timestamp::new(row.get::<_, i64>("created_at")? as u64),
        expires_at: Timestamp::new(row.get::<_, i64>("expires_at")? as u64),
    })
}

fn pointer_from_row(row: &Row<'_>) -> rusqlite::Result<ActiveSessionPointer> {
    Ok(ActiveSessionPointer {
        session_code: SessionCode::parse(&row.get::<_, String>("session_code")?)
            .map_err(|e| rusqlite::Error::InvalidColumnName(e.to_string()))?,
        class_id: ClassId::new(row.get::<_, String>("class_id")?),
        created_at: Timestamp::new(row.get::<_, i64>("created_at")? as u64),
        expires_at: Timestamp::new(row.get::<_, i64>("expires_at")? as u64),
    })
}

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<AttendanceLog> {
    Ok(AttendanceLog {
        id: LogId::new(row.get::<_, String>("id")?),
        session_id: SessionId::new(row.get::<_, String>("session_id")?),
        student_id: StudentId::new(row.get::<_, String>("student_id")?),
        created_at: Timestamp::new(row.get::<_, i64>("created_at")? as u64),
    })
}

// ----------------------------------------------------------------------------
// SessionStore Implementation
// ----------------------------------------------------------------------------

#[async_trait::async_trait]
impl SessionStore for SqliteStore {
    async fn insert_class(&self, class: &ClassRecord) -> Result<()> {
        let schedule = serde_json::to_string(&class.schedule)
            .map_err(|e| RollcallError::store_unavailable(e.to_string()))?;
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO classes \
                 (id, name, subject, teacher_id, schedule, class_code, is_active) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    class.id.as_str(),
                    class.name,
                    class.subject,
                    class.teacher_id.as_str(),
                    schedule,
                    class.class_code,
                    class.is_active as i64,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn class(&self, id: &ClassId) -> Result<Option<ClassRecord>> {
        self.conn
            .lock()
            .query_row(
                "SELECT * FROM classes WHERE id = ?1",
                params![id.as_str()],
                class_from_row,
            )
            .optional()
            .map_err(db_err)
    }

    async fn classes_for_teacher(&self, teacher_id: &TeacherId) -> Result<Vec<ClassRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT * FROM classes WHERE teacher_id = ?1 ORDER BY name")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![teacher_id.as_str()], class_from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    async fn update_class(&self, class: &ClassRecord) -> Result<()> {
        self.insert_class(class).await
    }

    async fn insert_session(&self, session: &AttendanceSession) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO attendance_sessions \
                 (id, session_code, class_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.id.as_str(),
                    session.session_code.as_str(),
                    session.class_id.as_str(),
                    session.created_at.as_millis() as i64,
                    session.expires_at.as_millis() as i64,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn session_by_code(&self, code: &SessionCode) -> Result<Option<AttendanceSession>> {
        self.conn
            .lock()
            .query_row(
                "SELECT * FROM attendance_sessions WHERE session_code = ?1",
                params![code.as_str()],
                session_from_row,
            )
            .optional()
            .map_err(db_err)
    }

    async fn latest_live_session(&self, now: Timestamp) -> Result<Option<AttendanceSession>> {
        self.conn
            .lock()
            .query_row(
                "SELECT * FROM attendance_sessions WHERE expires_at >= ?1 \
                 ORDER BY created_at DESC LIMIT 1",
                params![now.as_millis() as i64],
                session_from_row,
            )
            .optional()
            .map_err(db_err)
    }

    async fn insert_pointer(&self, pointer: &ActiveSessionPointer) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO active_sessions \
                 (session_code, class_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    pointer.session_code.as_str(),
                    pointer.class_id.as_str(),
                    pointer.created_at.as_millis() as i64,
                    pointer.expires_at.as_millis() as i64,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn latest_live_pointer(&self, now: Timestamp) -> Result<Option<ActiveSessionPointer>> {
        self.conn
            .lock()
            .query_row(
                "SELECT * FROM active_sessions WHERE expires_at >= ?1 \
                 ORDER BY created_at DESC LIMIT 1",
                params![now.as_millis() as i64],
                pointer_from_row,
            )
            .optional()
            .map_err(db_err)
    }

    async fn delete_pointer(&self, code: &SessionCode) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "DELETE FROM active_sessions WHERE session_code = ?1",
                params![code.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_log(&self, log: &AttendanceLog) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO attendance_logs (id, session_id, student_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    log.id.as_str(),
                    log.session_id.as_str(),
                    log.student_id.as_str(),
                    log.created_at.as_millis() as i64,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn log_exists(&self, session_id: &SessionId, student_id: &StudentId) -> Result<bool> {
        self.conn
            .lock()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM attendance_logs \
                 WHERE session_id = ?1 AND student_id = ?2)",
                params![session_id.as_str(), student_id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n != 0)
            .map_err(db_err)
    }

    async fn logs_for_session(&self, session_id: &SessionId) -> Result<Vec<AttendanceLog>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT * FROM attendance_logs WHERE session_id = ?1 ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![session_id.as_str()], log_from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    async fn count_logs(&self, session_id: &SessionId) -> Result<u64> {
        self.conn
            .lock()
            .query_row(
                "SELECT COUNT(*) FROM attendance_logs WHERE session_id = ?1",
                params![session_id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(db_err)
    }

    async fn delete_log(&self, session_id: &SessionId, student_id: &StudentId) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "DELETE FROM attendance_logs WHERE session_id = ?1 AND student_id = ?2",
                params![session_id.as_str(), student_id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64> {
        let conn = self.conn.lock();
        let sessions = conn
            .execute(
                "DELETE FROM attendance_sessions WHERE expires_at < ?1",
                params![now.as_millis() as i64],
            )
            .map_err(db_err)?;
        let pointers = conn
            .execute(
                "DELETE FROM active_sessions WHERE expires_at < ?1",
                params![now.as_millis() as i64],
            )
            .map_err(db_err)?;
        Ok((sessions + pointers) as u64)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
