//! Session lifecycle manager
//!
//! Orchestrates session creation (persist the row, start the broadcast,
//! register the fallback pointer) and teardown (stop the broadcast, drop the
//! pointer). Only the session row write is fatal; every other step degrades.

use rollcall_core::{
    ActiveSessionPointer, Advertiser, AttendanceSession, ClassId, Result, SessionCode, SessionId,
    SessionStore, Timestamp,
};
use tracing::{debug, info, warn};

use crate::context::AppContext;

// ----------------------------------------------------------------------------
// Started Session Handle
// ----------------------------------------------------------------------------

/// What a teacher gets back from starting a session
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub session_code: SessionCode,
    pub expires_at: Timestamp,
}

// ----------------------------------------------------------------------------
// Lifecycle Manager
// ----------------------------------------------------------------------------

/// Manages attendance session creation and teardown for one teacher device
pub struct SessionLifecycle {
    ctx: AppContext,
    advertiser: Box<dyn Advertiser>,
}

impl SessionLifecycle {
    pub fn new(ctx: AppContext, advertiser: Box<dyn Advertiser>) -> Self {
        Self { ctx, advertiser }
    }

    /// Open a session for a class: fresh random code, fixed validity window.
    ///
    /// A store failure on the session row aborts the whole operation — no
    /// session exists and no broadcast starts. Emitter failure and pointer
    /// write failure are degradations: the session stays valid and
    /// discoverable through the store fallback.
    pub async fn start_session(&mut self, class_id: &ClassId) -> Result<StartedSession> {
        let now = self.ctx.time().now();
        let session = AttendanceSession::open(
            class_id.clone(),
            now,
            self.ctx.config().session_validity,
        );

        self.ctx.store().insert_session(&session).await?;

        let on_air = self.advertiser.advertise(&session.session_code).await;
        if !on_air {
            warn!(
                code = %session.session_code,
                "broadcast could not start; students must rely on fallback discovery"
            );
        }

        let pointer = ActiveSessionPointer::for_session(&session);
        if let Err(err) = self.ctx.store().insert_pointer(&pointer).await {
            warn!(
                code = %session.session_code,
                "active session pointer write failed, broadcast discovery unaffected: {}",
                err
            );
        }

        info!(
            session_id = %session.id,
            code = %session.session_code,
            expires_at = %session.expires_at,
            "attendance session started"
        );
        Ok(StartedSession {
            session_id: session.id,
            session_code: session.session_code,
            expires_at: session.expires_at,
        })
    }

    /// Tear down a session's discovery surfaces.
    ///
    /// Stops the broadcast and deletes the fallback pointer. The session row
    /// is left alone — its own expiry governs validity, so late-arriving
    /// scans fail validation once the window passes. Safe to call twice.
    pub async fn stop_session(&mut self, code: &SessionCode) -> Result<()> {
        self.advertiser.stop_advertising().await;

        if let Err(err) = self.ctx.store().delete_pointer(code).await {
            warn!(code = %code, "failed to clear active session pointer: {}", err);
        }

        debug!(code = %code, "attendance session stopped");
        Ok(())
    }

    /// Whether the broadcast is currently on the air
    pub fn is_broadcasting(&self) -> bool {
        self.advertiser.is_advertising()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
