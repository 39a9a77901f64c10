//! Timing behavior of the discovery scan: radio path, fallback grace
//! period, and the hard deadline. Runs on a paused clock so the 3 s and
//! 30 s rules are exact.

use core::time::Duration;
use std::sync::Arc;

use rollcall_core::{
    AttendanceSession, ClassId, DiscoverySource, ManualTimeSource, MemoryStore, RadioScanner,
    Result, RollcallError, ScanEvent, SessionCandidate, SessionCode, SessionStore, Timestamp,
};
use rollcall_runtime::{scan_for_session, AppContext, DisabledScanner};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// ----------------------------------------------------------------------------
// Scripted Scanner
// ----------------------------------------------------------------------------

/// Scanner that replays a script of (delay-from-start, event) pairs
struct ScriptedScanner {
    script: Vec<(Duration, ScanEvent)>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedScanner {
    fn new(script: Vec<(Duration, ScanEvent)>) -> Self {
        Self { script, task: None }
    }

    fn silent() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl RadioScanner for ScriptedScanner {
    async fn start(&mut self, events: mpsc::Sender<ScanEvent>) -> Result<()> {
        let script = self.script.clone();
        self.task = Some(tokio::spawn(async move {
            let start = Instant::now();
            for (at, event) in script {
                tokio::time::sleep_until(start + at).await;
                if events.send(event).await.is_err() {
                    break;
                }
            }
            // keep the sender alive until aborted, like a real radio scan
            std::future::pending::<()>().await;
        }));
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn radio_candidate() -> SessionCandidate {
    SessionCandidate::from_radio(
        SessionCode::generate(),
        DiscoverySource::DeviceName,
        "dev-1",
        Some(-52),
    )
}

async fn context_with_live_session(seed_session: bool) -> AppContext {
    let store = Arc::new(MemoryStore::new());
    if seed_session {
        let session = AttendanceSession::open(
            ClassId::new("c-1"),
            Timestamp::new(0),
            Duration::from_secs(600),
        );
        store.insert_session(&session).await.unwrap();
    }
    AppContext::builder()
        .with_store(store)
        .with_time(Arc::new(ManualTimeSource::at(Timestamp::new(0))))
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_radio_candidate_wins_before_fallback() {
    // the store also has a live session, but the fallback must not fire
    // early just because one exists
    let ctx = context_with_live_session(true).await;
    let expected = radio_candidate();
    let mut scanner = ScriptedScanner::new(vec![(
        Duration::from_millis(1_000),
        ScanEvent::Candidate(expected.clone()),
    )]);

    let started = Instant::now();
    let found = scan_for_session(&ctx, &mut scanner).await.unwrap();

    assert_eq!(found.code, expected.code);
    assert_eq!(found.source, DiscoverySource::DeviceName);
    assert_eq!(started.elapsed(), Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn test_fallback_fires_exactly_at_grace_period() {
    let ctx = context_with_live_session(true).await;
    let mut scanner = ScriptedScanner::silent();

    let started = Instant::now();
    let found = scan_for_session(&ctx, &mut scanner).await.unwrap();

    assert_eq!(found.source, DiscoverySource::StoreFallback);
    assert!(found.device_id.is_none());
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_no_session_found() {
    let ctx = context_with_live_session(false).await;
    let mut scanner = ScriptedScanner::silent();

    let started = Instant::now();
    let err = scan_for_session(&ctx, &mut scanner).await.unwrap_err();

    assert!(matches!(err, RollcallError::NoSessionFound));
    assert_eq!(started.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_radio_error_does_not_stop_fallback_timer() {
    let ctx = context_with_live_session(true).await;
    let mut scanner = ScriptedScanner::new(vec![(
        Duration::from_millis(500),
        ScanEvent::RadioError("adapter hiccup".to_string()),
    )]);

    let started = Instant::now();
    let found = scan_for_session(&ctx, &mut scanner).await.unwrap();

    assert_eq!(found.source, DiscoverySource::StoreFallback);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_unstartable_radio_degrades_to_fallback_only() {
    let ctx = context_with_live_session(true).await;
    let mut scanner = DisabledScanner;

    let found = scan_for_session(&ctx, &mut scanner).await.unwrap();
    assert_eq!(found.source, DiscoverySource::StoreFallback);
}

#[tokio::test(start_paused = true)]
async fn test_radio_still_wins_after_fallback_misses() {
    // empty store: the 3 s fallback finds nothing, the scan keeps running,
    // and a late radio candidate is still accepted before the deadline
    let ctx = context_with_live_session(false).await;
    let expected = radio_candidate();
    let mut scanner = ScriptedScanner::new(vec![(
        Duration::from_secs(10),
        ScanEvent::Candidate(expected.clone()),
    )]);

    let started = Instant::now();
    let found = scan_for_session(&ctx, &mut scanner).await.unwrap();

    assert_eq!(found.code, expected.code);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}
