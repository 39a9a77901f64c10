//! Inert radio ports for degraded, fallback-only operation
//!
//! Used when the radio is switched off by flag or unusable on the host:
//! sessions are still created and discovered, but only through the store.

use rollcall_core::{Advertiser, RadioScanner, Result, RollcallError, ScanEvent, SessionCode};
use tokio::sync::mpsc;
use tracing::warn;

/// Advertiser that reports the broadcast as unavailable
#[derive(Debug, Default)]
pub struct DisabledAdvertiser;

#[async_trait::async_trait]
impl Advertiser for DisabledAdvertiser {
    async fn advertise(&mut self, code: &SessionCode) -> bool {
        warn!(code = %code, "radio disabled; session reachable via store fallback only");
        false
    }

    async fn stop_advertising(&mut self) {}

    fn is_advertising(&self) -> bool {
        false
    }
}

/// Scanner that never starts, leaving discovery to the store fallback
#[derive(Debug, Default)]
pub struct DisabledScanner;

#[async_trait::async_trait]
impl RadioScanner for DisabledScanner {
    async fn start(&mut self, _events: mpsc::Sender<ScanEvent>) -> Result<()> {
        Err(RollcallError::radio_unavailable("radio disabled"))
    }

    async fn stop(&mut self) {}
}
