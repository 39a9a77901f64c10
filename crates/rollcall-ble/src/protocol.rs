//! BLE protocol constants and candidate extraction for Rollcall
//!
//! Extraction is pure over an [`AdvertisementView`] so the strategy order
//! and the shape gate can be tested without a radio.

use std::collections::HashMap;

use rollcall_core::{DiscoverySource, SessionCandidate, SessionCode};
use tracing::debug;
use uuid::Uuid;

// ----------------------------------------------------------------------------
// Service UUID and Name Prefix
// ----------------------------------------------------------------------------

/// Fixed, well-known service identifier carried by attendance advertisements
pub const ATTENDANCE_SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef0);

/// Vendor identifier under which the code rides in manufacturer data
pub const ATTENDANCE_MANUFACTURER_ID: u16 = 0xFFFF;

/// Device-name prefix of the human-readable encoding
pub const DEVICE_NAME_PREFIX: &str = "ATTEND_";

/// Generate the advertised device name for a session code
pub fn session_device_name(code: &SessionCode) -> String {
    format!("{}{}", DEVICE_NAME_PREFIX, code)
}

// ----------------------------------------------------------------------------
// Advertisement View
// ----------------------------------------------------------------------------

/// Radio-agnostic snapshot of one discovered advertisement
#[derive(Debug, Clone, Default)]
pub struct AdvertisementView {
    /// Stable identity of the advertising device
    pub device_id: String,
    pub local_name: Option<String>,
    pub rssi: Option<i16>,
    pub services: Vec<Uuid>,
    pub service_data: HashMap<Uuid, Vec<u8>>,
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
}

// ----------------------------------------------------------------------------
// Candidate Extraction
// ----------------------------------------------------------------------------

/// Extract a validated session candidate from one advertisement.
///
/// Strategies run in strict priority order and extraction stops at the first
/// one that yields data: (1) service-scoped payload, (2) manufacturer data
/// decoded as text, (3) `ATTEND_`-prefixed device name. Whatever is yielded
/// must still pass the session-code shape gate; malformed candidates are
/// discarded silently and the scan continues.
pub fn extract_candidate(view: &AdvertisementView) -> Option<SessionCandidate> {
    let (raw, source) = extract_raw(view)?;

    match SessionCode::parse(&raw) {
        Ok(code) => Some(SessionCandidate::from_radio(
            code,
            source,
            view.device_id.clone(),
            view.rssi,
        )),
        Err(_) => {
            debug!(
                device = %view.device_id,
                candidate = %raw,
                "discarding candidate without session code shape"
            );
            None
        }
    }
}

fn extract_raw(view: &AdvertisementView) -> Option<(String, DiscoverySource)> {
    // (1) structured payload under the fixed service identifier
    if view.services.contains(&ATTENDANCE_SERVICE_UUID)
        || view.service_data.contains_key(&ATTENDANCE_SERVICE_UUID)
    {
        if let Some(data) = view.service_data.get(&ATTENDANCE_SERVICE_UUID) {
            match core::str::from_utf8(data) {
                Ok(text) => return Some((text.to_string(), DiscoverySource::ServiceData)),
                Err(_) => {
                    debug!(
                        device = %view.device_id,
                        payload = %hex::encode(data),
                        "service data is not text"
                    );
                }
            }
        }
    }

    // (2) vendor-scoped payload, accepted only if it already has the shape
    for data in view.manufacturer_data.values() {
        if let Ok(text) = core::str::from_utf8(data) {
            if rollcall_core::is_valid_session_code(text) {
                return Some((text.to_string(), DiscoverySource::ManufacturerData));
            }
        }
    }

    // (3) device-name pattern
    if let Some(name) = &view.local_name {
        if let Some(code) = name.strip_prefix(DEVICE_NAME_PREFIX) {
            return Some((code.to_string(), DiscoverySource::DeviceName));
        }
    }

    None
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
