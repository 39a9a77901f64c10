//! Scan orchestration: radio discovery with a timed store fallback
//!
//! One single-shot flow per student device. The radio scanner streams
//! candidates into a channel; a 3-second timer arms the store fallback; a
//! hard 30-second deadline ends the attempt. Radio-layer errors are
//! reported and absorbed — they end neither the fallback timer nor the
//! deadline.

use rollcall_core::{RadioScanner, Result, RollcallError, ScanEvent, SessionCandidate};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::context::AppContext;

/// Run one discovery scan to completion.
///
/// Resolves with the first accepted candidate from either path, or with
/// [`RollcallError::NoSessionFound`] when the deadline passes. The radio
/// scan is stopped before returning, whichever path won.
pub async fn scan_for_session<S: RadioScanner>(
    ctx: &AppContext,
    scanner: &mut S,
) -> Result<SessionCandidate> {
    let config = ctx.config().clone();
    let (tx, mut rx) = mpsc::channel::<ScanEvent>(16);

    // A scanner that cannot start leaves the fallback timer as the only
    // discovery path; that is a degradation, not a failure.
    if let Err(err) = scanner.start(tx).await {
        warn!("radio scan unavailable, relying on store fallback: {}", err);
    }

    let fallback = sleep(config.fallback_delay);
    let deadline = sleep(config.scan_timeout);
    tokio::pin!(fallback, deadline);

    let mut fallback_armed = true;
    let mut rx_open = true;

    loop {
        tokio::select! {
            biased;

            event = rx.recv(), if rx_open => match event {
                Some(ScanEvent::Candidate(candidate)) => {
                    scanner.stop().await;
                    info!(code = %candidate.code, source = ?candidate.source, "session discovered");
                    return Ok(candidate);
                }
                Some(ScanEvent::RadioError(reason)) => {
                    warn!("radio error during scan: {}", reason);
                }
                None => {
                    rx_open = false;
                }
            },

            _ = &mut fallback, if fallback_armed => {
                fallback_armed = false;
                if let Some(descriptor) = ctx.fallback_resolver().find_live_session().await {
                    scanner.stop().await;
                    info!(code = %descriptor.session_code, "session found via store fallback");
                    return Ok(SessionCandidate::from_store(descriptor.session_code));
                }
                debug!("store fallback found no live session, radio scan continues");
            },

            _ = &mut deadline => {
                scanner.stop().await;
                return Err(RollcallError::NoSessionFound);
            }
        }
    }
}
