//! Store-query fallback for when radio discovery yields nothing
//!
//! The resolver is the degraded-mode discovery path for both roles. It never
//! surfaces store errors: callers treat `None` as "keep waiting / report no
//! session", not as a fatal condition.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::SessionStore;
use crate::types::{ClassId, SessionCode, TimeSource, Timestamp};

/// Description of a live session found by the fallback query
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
    pub session_code: SessionCode,
    pub class_id: ClassId,
    pub expires_at: Timestamp,
}

/// Queries the store directly for any unexpired session
pub struct FallbackResolver {
    store: Arc<dyn SessionStore>,
    time: Arc<dyn TimeSource>,
}

impl FallbackResolver {
    pub fn new(store: Arc<dyn SessionStore>, time: Arc<dyn TimeSource>) -> Self {
        Self { store, time }
    }

    /// Find the most recently created live session, newest first, limit one.
    ///
    /// The denormalized pointer table is consulted first; when it has no
    /// row (or the query fails), the session table is scanned directly.
    pub async fn find_live_session(&self) -> Option<SessionDescriptor> {
        let now = self.time.now();

        match self.store.latest_live_pointer(now).await {
            Ok(Some(pointer)) => {
                debug!(code = %pointer.session_code, "live session via pointer table");
                return Some(SessionDescriptor {
                    session_code: pointer.session_code,
                    class_id: pointer.class_id,
                    expires_at: pointer.expires_at,
                });
            }
            Ok(None) => {}
            Err(err) => {
                warn!("pointer lookup failed, trying session table: {}", err);
            }
        }

        match self.store.latest_live_session(now).await {
            Ok(Some(session)) => {
                debug!(code = %session.session_code, "live session via session table");
                Some(SessionDescriptor {
                    session_code: session.session_code,
                    class_id: session.class_id,
                    expires_at: session.expires_at,
                })
            }
            Ok(None) => None,
            Err(err) => {
                warn!("fallback session lookup failed: {}", err);
                None
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActiveSessionPointer, AttendanceSession};
    use crate::store::MemoryStore;
    use crate::types::ManualTimeSource;
    use core::time::Duration;

    fn resolver_with(store: Arc<MemoryStore>, now: Timestamp) -> FallbackResolver {
        FallbackResolver::new(store, Arc::new(ManualTimeSource::at(now)))
    }

    #[tokio::test]
    async fn test_prefers_pointer_table() {
        let store = Arc::new(MemoryStore::new());
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(0),
            Duration::from_secs(600),
        );
        store.insert_session(&session).await.unwrap();
        store
            .insert_pointer(&ActiveSessionPointer::for_session(&session))
            .await
            .unwrap();

        let found = resolver_with(store, Timestamp::new(1_000))
            .find_live_session()
            .await
            .unwrap();
        assert_eq!(found.session_code, session.session_code);
    }

    #[tokio::test]
    async fn test_falls_back_to_session_table() {
        let store = Arc::new(MemoryStore::new());
        // session row exists, pointer write was lost
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(0),
            Duration::from_secs(600),
        );
        store.insert_session(&session).await.unwrap();

        let found = resolver_with(store, Timestamp::new(1_000))
            .find_live_session()
            .await
            .unwrap();
        assert_eq!(found.session_code, session.session_code);
    }

    #[tokio::test]
    async fn test_none_when_everything_expired() {
        let store = Arc::new(MemoryStore::new());
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(0),
            Duration::from_secs(600),
        );
        store.insert_session(&session).await.unwrap();
        store
            .insert_pointer(&ActiveSessionPointer::for_session(&session))
            .await
            .unwrap();

        let after_expiry = session.expires_at.add(Duration::from_secs(1));
        assert!(resolver_with(store, after_expiry)
            .find_live_session()
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_store_error_yields_none_not_panic() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);

        assert!(resolver_with(store, Timestamp::new(0))
            .find_live_session()
            .await
            .is_none());
    }
}
