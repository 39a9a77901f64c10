//! Attendance statistics and the fixed-period polling watcher
//!
//! The watcher is the plain substitute for a store push channel: it
//! re-queries the log count on a fixed 5-second period with no jitter and
//! publishes it on a watch channel. Poll failures are logged and retried on
//! the next tick; nothing else is retried automatically.

use rollcall_core::{AttendanceLog, Result, SessionId, SessionStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::context::AppContext;

// ----------------------------------------------------------------------------
// Point-in-time Stats
// ----------------------------------------------------------------------------

/// Attendance numbers for one session at one moment
#[derive(Debug, Clone)]
pub struct AttendanceStats {
    pub total: u64,
    pub attendees: Vec<AttendanceLog>,
}

/// Fetch current stats for a session
pub async fn attendance_stats(ctx: &AppContext, session_id: &SessionId) -> Result<AttendanceStats> {
    let attendees = ctx.store().logs_for_session(session_id).await?;
    Ok(AttendanceStats {
        total: attendees.len() as u64,
        attendees,
    })
}

// ----------------------------------------------------------------------------
// Polling Watcher
// ----------------------------------------------------------------------------

/// Handle to a running attendance poller
pub struct AttendanceWatch {
    rx: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl AttendanceWatch {
    /// Subscribe to published counts
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rx.clone()
    }

    /// Stop polling
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Start polling the log count for a session.
///
/// Publishes an initial count immediately, then one per poll period. The
/// poller stops when the handle is stopped or every receiver is gone.
pub fn watch_attendance(ctx: &AppContext, session_id: SessionId) -> AttendanceWatch {
    let store = ctx.store();
    let period = ctx.config().stats_poll_interval;
    let (tx, rx) = watch::channel(0u64);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match store.count_logs(&session_id).await {
                Ok(count) => {
                    if tx.send(count).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(session_id = %session_id, "attendance poll failed, retrying next tick: {}", err);
                }
            }
        }
    });

    AttendanceWatch { rx, task }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use core::time::Duration;
    use rollcall_core::{
        AttendanceSession, ClassId, ManualTimeSource, MemoryStore, ProtocolConfig, SessionStore,
        StudentId, Timestamp,
    };
    use std::sync::Arc;

    async fn seeded() -> (AppContext, Arc<MemoryStore>, AttendanceSession) {
        let store = Arc::new(MemoryStore::new());
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(0),
            Duration::from_secs(600),
        );
        store.insert_session(&session).await.unwrap();
        let ctx = AppContext::builder()
            .with_store(store.clone())
            .with_time(Arc::new(ManualTimeSource::at(Timestamp::new(0))))
            .with_config(ProtocolConfig::default())
            .build()
            .unwrap();
        (ctx, store, session)
    }

    #[tokio::test]
    async fn test_stats_reflect_logs() {
        let (ctx, store, session) = seeded().await;

        let empty = attendance_stats(&ctx, &session.id).await.unwrap();
        assert_eq!(empty.total, 0);

        let log = rollcall_core::AttendanceLog::new(
            session.id.clone(),
            StudentId::new("s-1"),
            Timestamp::new(1),
        );
        store.insert_log(&log).await.unwrap();

        let one = attendance_stats(&ctx, &session.id).await.unwrap();
        assert_eq!(one.total, 1);
        assert_eq!(one.attendees[0].student_id, StudentId::new("s-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_publishes_on_each_period() {
        let (ctx, store, session) = seeded().await;
        let watcher = watch_attendance(&ctx, session.id.clone());
        let mut rx = watcher.subscribe();

        // first publish happens on the immediate tick
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 0);

        for i in 0..2u64 {
            let log = rollcall_core::AttendanceLog::new(
                session.id.clone(),
                StudentId::new(format!("s-{}", i)),
                Timestamp::new(i),
            );
            store.insert_log(&log).await.unwrap();
        }

        // next fixed-period tick picks the new count up
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);

        watcher.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_survives_store_outage() {
        let (ctx, store, session) = seeded().await;
        let watcher = watch_attendance(&ctx, session.id.clone());
        let mut rx = watcher.subscribe();

        rx.changed().await.unwrap();
        store.set_available(false);
        tokio::time::sleep(Duration::from_secs(11)).await;

        // poller is still alive and resumes once the store is back
        store.set_available(true);
        let log = rollcall_core::AttendanceLog::new(
            session.id.clone(),
            StudentId::new("s-1"),
            Timestamp::new(1),
        );
        store.insert_log(&log).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        watcher.stop();
    }
}
