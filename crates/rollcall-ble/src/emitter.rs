//! Broadcast emitter: keeps one session code on the air
//!
//! Wraps the platform advertiser behind the core [`Advertiser`] port and
//! walks the encoding ladder. Nothing escapes this boundary as an error;
//! the caller only sees a success signal.

use rollcall_core::{Advertiser, SessionCode};
use tracing::{info, warn};

use crate::advertising::{AdvertiseProfile, BleAdvertiser, PlatformAdvertiser};
use crate::config::BleRadioConfig;

// ----------------------------------------------------------------------------
// Broadcast Emitter
// ----------------------------------------------------------------------------

/// Encodes a session code into a short-range advertisement and keeps it live
/// until stopped
pub struct BroadcastEmitter {
    advertiser: PlatformAdvertiser,
    config: BleRadioConfig,
    current: Option<SessionCode>,
}

impl BroadcastEmitter {
    /// Create an emitter for the current platform
    pub fn new(config: BleRadioConfig) -> Self {
        Self {
            advertiser: PlatformAdvertiser::new(),
            config,
            current: None,
        }
    }

    /// The code currently on the air, if any
    pub fn current_code(&self) -> Option<&SessionCode> {
        self.current.as_ref()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::new(BleRadioConfig::default())
    }
}

#[async_trait::async_trait]
impl Advertiser for BroadcastEmitter {
    async fn advertise(&mut self, code: &SessionCode) -> bool {
        for profile in AdvertiseProfile::LADDER {
            match self
                .advertiser
                .start_advertising(code, profile, &self.config)
                .await
            {
                Ok(()) => {
                    self.current = Some(code.clone());
                    info!(?profile, code = %code, "broadcast started");
                    return true;
                }
                Err(err) => {
                    warn!(?profile, "advertising strategy failed: {}", err);
                }
            }
        }

        warn!(code = %code, "advertising unavailable; session reachable via store fallback only");
        false
    }

    async fn stop_advertising(&mut self) {
        if let Err(err) = self.advertiser.stop_advertising().await {
            warn!("error stopping advertising: {}", err);
        }
        self.current = None;
    }

    fn is_advertising(&self) -> bool {
        self.advertiser.is_advertising()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // On platforms without peripheral support the whole ladder fails and the
    // emitter reports unavailability instead of panicking or erroring.
    #[cfg(not(target_os = "linux"))]
    #[tokio::test]
    async fn test_ladder_exhaustion_reports_false() {
        let mut emitter = BroadcastEmitter::default();
        let advertised = emitter.advertise(&SessionCode::generate()).await;
        assert!(!advertised);
        assert!(emitter.current_code().is_none());
        assert!(!emitter.is_advertising());
    }

    #[tokio::test]
    async fn test_double_stop_is_safe() {
        let mut emitter = BroadcastEmitter::default();
        // stop before any start, then twice in a row
        emitter.stop_advertising().await;
        emitter.stop_advertising().await;
        assert!(!emitter.is_advertising());
    }
}
