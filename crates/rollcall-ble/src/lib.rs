//! Bluetooth Low Energy radio for the Rollcall attendance protocol
//!
//! Implements the core radio ports over real hardware: the broadcast
//! emitter advertises one session code for the session's validity window
//! (platform advertisers behind a ladder of encoding profiles), and the
//! discovery scanner extracts validated session candidates from nearby
//! advertisements.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod advertising;
pub mod config;
pub mod discovery;
pub mod emitter;
pub mod protocol;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use advertising::{AdvertiseProfile, BleAdvertiser, PlatformAdvertiser};
pub use config::BleRadioConfig;
pub use discovery::BleDiscoveryScanner;
pub use emitter::BroadcastEmitter;
pub use protocol::{
    extract_candidate, session_device_name, AdvertisementView, ATTENDANCE_MANUFACTURER_ID,
    ATTENDANCE_SERVICE_UUID, DEVICE_NAME_PREFIX,
};
