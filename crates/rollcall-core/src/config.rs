//! Protocol configuration

use core::time::Duration;

/// Timing constants of the proximity session protocol
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProtocolConfig {
    /// Validity window of an attendance session from creation
    pub session_validity: Duration,
    /// Hard deadline for one discovery scan
    pub scan_timeout: Duration,
    /// Grace period before the store fallback is consulted
    pub fallback_delay: Duration,
    /// Fixed period of the attendance stats poller
    pub stats_poll_interval: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            session_validity: Duration::from_secs(10 * 60),
            scan_timeout: Duration::from_secs(30),
            fallback_delay: Duration::from_secs(3),
            stats_poll_interval: Duration::from_secs(5),
        }
    }
}

impl ProtocolConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session validity window
    pub fn with_session_validity(mut self, validity: Duration) -> Self {
        self.session_validity = validity;
        self
    }

    /// Set the scan deadline
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set the fallback grace period
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Set the stats polling period
    pub fn with_stats_poll_interval(mut self, interval: Duration) -> Self {
        self.stats_poll_interval = interval;
        self
    }
}
