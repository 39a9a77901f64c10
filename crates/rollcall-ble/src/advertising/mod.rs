//! Cross-platform advertising trait and platform detection

pub mod fallback;
#[cfg(target_os = "linux")]
pub mod linux;

use rollcall_core::{Result, SessionCode};

use crate::config::BleRadioConfig;
use crate::protocol::session_device_name;

// ----------------------------------------------------------------------------
// Encoding Profiles
// ----------------------------------------------------------------------------

/// How much of the session code encoding an advertisement carries.
///
/// Each profile is a complete fallback for the previous one; the emitter
/// walks them in order until one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseProfile {
    /// Structured payload under the fixed service identifier plus the
    /// `ATTEND_`-prefixed name
    Full,
    /// `ATTEND_`-prefixed device name only
    NamedOnly,
    /// The raw session code as the device name, no other metadata
    BareCode,
}

impl AdvertiseProfile {
    /// The full encoding ladder, richest first
    pub const LADDER: [AdvertiseProfile; 3] = [Self::Full, Self::NamedOnly, Self::BareCode];

    /// The local name this profile advertises
    pub fn local_name(&self, code: &SessionCode) -> String {
        match self {
            Self::Full | Self::NamedOnly => session_device_name(code),
            Self::BareCode => code.to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Cross-platform Advertising Trait
// ----------------------------------------------------------------------------

/// Trait for BLE advertising functionality across different platforms
#[async_trait::async_trait]
pub trait BleAdvertiser: Send {
    /// Start advertising a session code with the given encoding profile
    async fn start_advertising(
        &mut self,
        code: &SessionCode,
        profile: AdvertiseProfile,
        config: &BleRadioConfig,
    ) -> Result<()>;

    /// Stop advertising
    async fn stop_advertising(&mut self) -> Result<()>;

    /// Check if currently advertising
    fn is_advertising(&self) -> bool;
}

// ----------------------------------------------------------------------------
// Platform Detection and Factory
// ----------------------------------------------------------------------------

/// Platform-specific advertiser enum
pub enum PlatformAdvertiser {
    #[cfg(target_os = "linux")]
    Linux(linux::LinuxAdvertiser),
    #[allow(dead_code)]
    Fallback(fallback::FallbackAdvertiser),
}

impl PlatformAdvertiser {
    /// Create the appropriate advertiser for the current platform
    pub fn new() -> Self {
        #[cfg(target_os = "linux")]
        {
            Self::Linux(linux::LinuxAdvertiser::new())
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::Fallback(fallback::FallbackAdvertiser::new())
        }
    }
}

impl Default for PlatformAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for PlatformAdvertiser {
    async fn start_advertising(
        &mut self,
        code: &SessionCode,
        profile: AdvertiseProfile,
        config: &BleRadioConfig,
    ) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref mut advertiser) => {
                advertiser.start_advertising(code, profile, config).await
            }
            Self::Fallback(ref mut advertiser) => {
                advertiser.start_advertising(code, profile, config).await
            }
        }
    }

    async fn stop_advertising(&mut self) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref mut advertiser) => advertiser.stop_advertising().await,
            Self::Fallback(ref mut advertiser) => advertiser.stop_advertising().await,
        }
    }

    fn is_advertising(&self) -> bool {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref advertiser) => advertiser.is_advertising(),
            Self::Fallback(ref advertiser) => advertiser.is_advertising(),
        }
    }
}
