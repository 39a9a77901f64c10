//! BLE radio configuration

use std::time::Duration;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the BLE radio layer
#[derive(Debug, Clone)]
pub struct BleRadioConfig {
    /// Maximum time to wait for the adapter to become usable
    pub adapter_timeout: Duration,
    /// Whether the advertisement marks the device system-wide discoverable.
    /// Deliberate trade-off: any device in range can see it, not just the
    /// intended class.
    pub discoverable: bool,
}

impl Default for BleRadioConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(10),
            discoverable: true,
        }
    }
}

impl BleRadioConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set adapter wait timeout
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Set system-wide discoverability
    pub fn with_discoverable(mut self, discoverable: bool) -> Self {
        self.discoverable = discoverable;
        self
    }
}
