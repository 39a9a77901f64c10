//! Radio ports: the seams between the protocol flows and a concrete
//! short-range radio implementation
//!
//! The BLE crate provides the production implementations; tests and the
//! degraded `--no-radio` mode plug in scripted or inert ones.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::SessionCode;
use crate::Result;

// ----------------------------------------------------------------------------
// Discovered Candidates
// ----------------------------------------------------------------------------

/// Where a candidate session code was extracted from, in decreasing order of
/// advertisement richness, plus the non-radio store fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoverySource {
    /// Structured payload under the fixed attendance service identifier
    ServiceData,
    /// Vendor-scoped payload decoded as text
    ManufacturerData,
    /// `ATTEND_`-prefixed device name
    DeviceName,
    /// Synthesized by the fallback resolver from a store query
    StoreFallback,
}

/// A validated candidate produced by discovery.
///
/// Carrying one of these is proof the code came through an approved
/// discovery path; free-text codes never become candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCandidate {
    pub code: SessionCode,
    pub source: DiscoverySource,
    /// Identity of the advertising device, when discovered over radio
    pub device_id: Option<String>,
    /// Signal strength at discovery time, when the radio reports it
    pub rssi: Option<i16>,
}

impl SessionCandidate {
    /// Candidate discovered over the radio.
    pub fn from_radio(
        code: SessionCode,
        source: DiscoverySource,
        device_id: impl Into<String>,
        rssi: Option<i16>,
    ) -> Self {
        Self {
            code,
            source,
            device_id: Some(device_id.into()),
            rssi,
        }
    }

    /// Candidate synthesized from a store fallback lookup.
    pub fn from_store(code: SessionCode) -> Self {
        Self {
            code,
            source: DiscoverySource::StoreFallback,
            device_id: None,
            rssi: None,
        }
    }
}

// ----------------------------------------------------------------------------
// Scan Events
// ----------------------------------------------------------------------------

/// Events a scanner pushes to the scan orchestration
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A shape-valid candidate was extracted from an advertisement
    Candidate(SessionCandidate),
    /// A radio-layer error; reported, but it neither ends the scan window
    /// nor the fallback timer
    RadioError(String),
}

// ----------------------------------------------------------------------------
// Radio Ports
// ----------------------------------------------------------------------------

/// Broadcast side of the radio: advertises one session code for the
/// session's validity window.
#[async_trait::async_trait]
pub trait Advertiser: Send {
    /// Start advertising the given code.
    ///
    /// Returns a success signal and never propagates an error past this
    /// boundary: total failure means "advertising unavailable", which
    /// degrades the session to fallback-only discovery.
    async fn advertise(&mut self, code: &SessionCode) -> bool;

    /// Stop advertising. Idempotent: safe to call repeatedly and at any
    /// time, including before a start completes.
    async fn stop_advertising(&mut self);

    /// Check if currently advertising
    fn is_advertising(&self) -> bool;
}

/// Listening side of the radio: pushes extracted candidates and radio
/// errors into the provided channel until stopped.
#[async_trait::async_trait]
pub trait RadioScanner: Send {
    /// Start scanning, delivering events through `events`.
    async fn start(&mut self, events: mpsc::Sender<ScanEvent>) -> Result<()>;

    /// Stop scanning. Idempotent, like [`Advertiser::stop_advertising`].
    async fn stop(&mut self);
}
