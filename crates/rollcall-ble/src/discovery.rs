//! BLE discovery scanner
//!
//! Listens for advertisements with btleplug and pushes validated session
//! candidates into the orchestration channel. The scan filter is left open:
//! name-only advertisements carry no service identifier, so filtering by
//! service would blind the two lower-priority extraction strategies.

use std::collections::HashSet;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral, ScanFilter};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::StreamExt;
use rollcall_core::{RadioScanner, Result, RollcallError, ScanEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::BleRadioConfig;
use crate::protocol::{extract_candidate, AdvertisementView};

// ----------------------------------------------------------------------------
// Discovery Scanner
// ----------------------------------------------------------------------------

/// Single-shot BLE scanner implementing the [`RadioScanner`] port
pub struct BleDiscoveryScanner {
    config: BleRadioConfig,
    adapter: Option<Adapter>,
    task: Option<JoinHandle<()>>,
}

impl BleDiscoveryScanner {
    pub fn new(config: BleRadioConfig) -> Self {
        Self {
            config,
            adapter: None,
            task: None,
        }
    }

    async fn ensure_adapter(&mut self) -> Result<Adapter> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }

        let acquire = async {
            let manager = Manager::new().await.map_err(|e| {
                RollcallError::radio_unavailable(format!("failed to create BLE manager: {}", e))
            })?;

            let adapters = manager.adapters().await.map_err(|e| {
                RollcallError::radio_unavailable(format!("failed to get BLE adapters: {}", e))
            })?;

            adapters
                .into_iter()
                .next()
                .ok_or_else(|| RollcallError::radio_unavailable("no BLE adapters available"))
        };

        let adapter = tokio::time::timeout(self.config.adapter_timeout, acquire)
            .await
            .map_err(|_| RollcallError::radio_unavailable("timed out waiting for BLE adapter"))??;

        self.adapter = Some(adapter.clone());
        info!("BLE adapter initialized for scanning");
        Ok(adapter)
    }
}

impl Default for BleDiscoveryScanner {
    fn default() -> Self {
        Self::new(BleRadioConfig::default())
    }
}

#[async_trait::async_trait]
impl RadioScanner for BleDiscoveryScanner {
    async fn start(&mut self, events: mpsc::Sender<ScanEvent>) -> Result<()> {
        let adapter = self.ensure_adapter().await?;

        adapter.start_scan(ScanFilter::default()).await.map_err(|e| {
            RollcallError::radio_unavailable(format!("failed to start BLE scan: {}", e))
        })?;

        let mut stream = adapter.events().await.map_err(|e| {
            RollcallError::radio_unavailable(format!("failed to open BLE event stream: {}", e))
        })?;

        let adapter_for_task = adapter.clone();
        self.task = Some(tokio::spawn(async move {
            // one candidate per advertising device, keyed by device identity
            let mut reported: HashSet<PeripheralId> = HashSet::new();

            while let Some(event) = stream.next().await {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => continue,
                };
                if reported.contains(&id) {
                    continue;
                }

                let peripheral = match adapter_for_task.peripheral(&id).await {
                    Ok(p) => p,
                    Err(err) => {
                        if events
                            .send(ScanEvent::RadioError(err.to_string()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                        continue;
                    }
                };
                let properties = match peripheral.properties().await {
                    Ok(Some(p)) => p,
                    Ok(None) => continue,
                    Err(err) => {
                        if events
                            .send(ScanEvent::RadioError(err.to_string()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                        continue;
                    }
                };

                let view = AdvertisementView {
                    device_id: format!("{:?}", id),
                    local_name: properties.local_name.clone(),
                    rssi: properties.rssi,
                    services: properties.services.clone(),
                    service_data: properties.service_data.clone(),
                    manufacturer_data: properties.manufacturer_data.clone(),
                };

                if let Some(candidate) = extract_candidate(&view) {
                    debug!(device = %view.device_id, code = %candidate.code, "candidate discovered");
                    reported.insert(id);
                    if events.send(ScanEvent::Candidate(candidate)).await.is_err() {
                        // orchestration is gone; the scan is over
                        break;
                    }
                }
            }
        }));

        info!("started BLE scanning for attendance sessions");
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(adapter) = self.adapter.as_ref() {
            if let Err(err) = adapter.stop_scan().await {
                debug!("error stopping BLE scan: {}", err);
            }
        }
    }
}
