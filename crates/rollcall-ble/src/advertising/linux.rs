//! Linux BLE advertising implementation using bluer (BlueZ)

use rollcall_core::{Result, RollcallError, SessionCode};
use tracing::info;

use crate::config::BleRadioConfig;
use crate::protocol::{ATTENDANCE_MANUFACTURER_ID, ATTENDANCE_SERVICE_UUID};

use super::{AdvertiseProfile, BleAdvertiser};

// ----------------------------------------------------------------------------
// Linux Implementation
// ----------------------------------------------------------------------------

pub struct LinuxAdvertiser {
    session: Option<bluer::Session>,
    adapter: Option<bluer::Adapter>,
    advertisement_handle: Option<bluer::adv::AdvertisementHandle>,
    is_advertising: bool,
}

impl LinuxAdvertiser {
    pub fn new() -> Self {
        Self {
            session: None,
            adapter: None,
            advertisement_handle: None,
            is_advertising: false,
        }
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let session = bluer::Session::new().await.map_err(|e| {
            RollcallError::radio_unavailable(format!("BlueZ session: {}", e))
        })?;

        let adapter = session.default_adapter().await.map_err(|e| {
            RollcallError::radio_unavailable(format!("BLE adapter: {}", e))
        })?;

        if !adapter.is_powered().await.unwrap_or(false) {
            adapter.set_powered(true).await.map_err(|e| {
                RollcallError::radio_unavailable(format!("failed to power on adapter: {}", e))
            })?;
        }

        self.session = Some(session);
        self.adapter = Some(adapter);
        info!("Linux BLE adapter initialized for advertising");
        Ok(())
    }

    fn build_advertisement(
        code: &SessionCode,
        profile: AdvertiseProfile,
        config: &BleRadioConfig,
    ) -> bluer::adv::Advertisement {
        let local_name = Some(profile.local_name(code));
        let discoverable = Some(config.discoverable);

        match profile {
            AdvertiseProfile::Full => bluer::adv::Advertisement {
                advertisement_type: bluer::adv::Type::Peripheral,
                local_name,
                service_uuids: [ATTENDANCE_SERVICE_UUID].into_iter().collect(),
                service_data: [(
                    ATTENDANCE_SERVICE_UUID,
                    code.as_str().as_bytes().to_vec(),
                )]
                .into_iter()
                .collect(),
                manufacturer_data: [(
                    ATTENDANCE_MANUFACTURER_ID,
                    code.as_str().as_bytes().to_vec(),
                )]
                .into_iter()
                .collect(),
                discoverable,
                ..Default::default()
            },
            AdvertiseProfile::NamedOnly | AdvertiseProfile::BareCode => {
                bluer::adv::Advertisement {
                    advertisement_type: bluer::adv::Type::Peripheral,
                    local_name,
                    discoverable,
                    ..Default::default()
                }
            }
        }
    }
}

impl Default for LinuxAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for LinuxAdvertiser {
    async fn start_advertising(
        &mut self,
        code: &SessionCode,
        profile: AdvertiseProfile,
        config: &BleRadioConfig,
    ) -> Result<()> {
        self.initialize().await?;

        // restarting replaces any live advertisement
        if let Some(handle) = self.advertisement_handle.take() {
            drop(handle);
            self.is_advertising = false;
        }

        let adapter = self
            .adapter
            .as_ref()
            .ok_or_else(|| RollcallError::radio_unavailable("BLE adapter not initialized"))?;

        let advertisement = Self::build_advertisement(code, profile, config);
        let handle = adapter.advertise(advertisement).await.map_err(|e| {
            RollcallError::radio_unavailable(format!(
                "failed to start advertising ({:?}): {}",
                profile, e
            ))
        })?;

        self.advertisement_handle = Some(handle);
        self.is_advertising = true;
        info!("started BLE advertising as '{}'", profile.local_name(code));
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<()> {
        if let Some(handle) = self.advertisement_handle.take() {
            // dropping the handle stops advertising
            drop(handle);
            self.is_advertising = false;
            info!("stopped BLE advertising");
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.is_advertising
    }
}
