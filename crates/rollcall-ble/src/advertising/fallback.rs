//! Fallback advertising implementation for unsupported platforms

use rollcall_core::{Result, RollcallError, SessionCode};
use tracing::warn;

use crate::config::BleRadioConfig;

use super::{AdvertiseProfile, BleAdvertiser};

// ----------------------------------------------------------------------------
// Fallback Implementation
// ----------------------------------------------------------------------------

/// Advertiser for platforms without peripheral-mode support. Every start
/// attempt fails, which the emitter reports as "advertising unavailable";
/// the session stays reachable through the store fallback.
pub struct FallbackAdvertiser {
    _private: (),
}

impl FallbackAdvertiser {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for FallbackAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for FallbackAdvertiser {
    async fn start_advertising(
        &mut self,
        code: &SessionCode,
        profile: AdvertiseProfile,
        _config: &BleRadioConfig,
    ) -> Result<()> {
        warn!(
            "BLE advertising not supported on this platform; '{}' will not be discoverable",
            profile.local_name(code)
        );
        Err(RollcallError::radio_unavailable(
            "BLE peripheral mode not supported on this platform",
        ))
    }

    async fn stop_advertising(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        false
    }
}
