use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::device::constants::{IS_CONNECTED_DEADLINE, SQUEGG_SERVICE_UUID};
use crate::device::transport::Transport;
use crate::device::types::{DiscoveredDevice, FrameHandler};
use crate::error::DeviceError;

struct NotificationTask {
    characteristic: Uuid,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// `Transport` backed by the platform bluetooth stack (btleplug).
pub struct BtleTransport {
    manager: Manager,
    discovered: Vec<(DiscoveredDevice, Peripheral)>,
    scanning: Vec<Adapter>,
    peripheral: Option<Peripheral>,
    notifications: Option<NotificationTask>,
}

impl BtleTransport {
    pub async fn new() -> Result<Self, DeviceError> {
        let manager = Manager::new().await?;

        Ok(BtleTransport {
            manager,
            discovered: Vec::new(),
            scanning: Vec::new(),
            peripheral: None,
            notifications: None,
        })
    }

    fn connected_peripheral(&self) -> Result<&Peripheral, DeviceError> {
        self.peripheral.as_ref().ok_or(DeviceError::NotConnected)
    }

    async fn stop_notifications(&mut self) -> Option<Uuid> {
        let task = self.notifications.take()?;
        task.cancel.cancel();

        info!("Waiting for read notifications task to stop");
        if let Err(err) = task.handle.await {
            warn!("Read notifications task did not stop cleanly: {:?}", err);
        }
        info!("Read notifications task stopped");

        Some(task.characteristic)
    }

    async fn stop_scanning(&mut self) {
        for adapter in self.scanning.drain(..) {
            if let Err(err) = adapter.stop_scan().await {
                warn!("Failed to stop scanning: {:?}", err);
            }
        }
    }
}

async fn start_scanning(manager: &Manager) -> Result<Vec<Adapter>, DeviceError> {
    let adapters = manager.adapters().await?;
    if adapters.is_empty() {
        return Err(DeviceError::NoAdapter);
    }

    let mut scanning = Vec::with_capacity(adapters.len());
    let mut last_error = None;

    // the device does not reliably advertise its service uuid, so do not filter on it
    for adapter in adapters {
        info!("Scanning using adapter {}...", adapter.adapter_info().await.unwrap_or("UNKNOWN".to_string()));
        match adapter.start_scan(ScanFilter::default()).await {
            Ok(_) => scanning.push(adapter),
            Err(err) => {
                warn!("Failed to start scanning: {:?}", err);
                last_error = Some(err);
            },
        }
    }

    match (scanning.is_empty(), last_error) {
        (true, Some(err)) => Err(err.into()),
        (true, None) => Err(DeviceError::NoAdapter),
        (false, _) => Ok(scanning),
    }
}

async fn named_peripherals(adapter: &Adapter) -> Vec<(DiscoveredDevice, Peripheral)> {
    let peripherals = match adapter.peripherals().await {
        Ok(v) => v,
        Err(err) => {
            warn!("Failed to query BLE adapter for peripherals: {}", err);
            return Vec::new();
        },
    };

    let mut found = Vec::new();

    for peripheral in peripherals {
        match peripheral.properties().await {
            Err(err) => {
                warn!("Could not query peripheral for properties: {:?}", err);
            },
            Ok(None) => {
                debug!("Peripheral has no properties");
            },
            Ok(Some(properties)) => {
                if let Some(name) = properties.local_name {
                    let device = DiscoveredDevice { name, address: properties.address.to_string() };
                    debug!("Discovered {:?} @ {}", device.name, device.address);
                    found.push((device, peripheral));
                }
            },
        }
    }

    found
}

fn find_characteristic(peripheral: &Peripheral, uuid: Uuid) -> Result<Characteristic, DeviceError> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|characteristic| characteristic.uuid == uuid)
        .ok_or(DeviceError::MissingCharacteristic)
}

async fn connect_peripheral(peripheral: &Peripheral) -> Result<(), DeviceError> {
    info!("Connecting to peripheral...");
    peripheral.connect().await?;

    info!("Connected; Discovering services...");
    peripheral.discover_services().await?;

    if !peripheral.services().iter().any(|service| service.uuid == SQUEGG_SERVICE_UUID) {
        warn!("Peripheral does not expose the Squegg service {}", SQUEGG_SERVICE_UUID);
    }

    Ok(())
}

// `release` only runs when `setup` fails, so a half established link is never left behind
async fn release_on_error<S, R>(setup: S, release: R) -> Result<(), DeviceError>
where
    S: Future<Output = Result<(), DeviceError>>,
    R: Future<Output = Result<(), DeviceError>>,
{
    let err = match setup.await {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if let Err(release_err) = release.await {
        warn!("Failed to release peripheral after a failed connect: {}", release_err);
    }
    Err(err)
}

async fn read_notifications_task(cancel: CancellationToken, peripheral: &Peripheral, characteristic: Uuid, handler: FrameHandler) -> Result<JoinHandle<()>, DeviceError> {
    let mut notification_stream = peripheral.notifications().await?;

    Ok(spawn(async move {
        'mainloop: loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    break 'mainloop;
                },
                notification = notification_stream.next() => match notification {
                    Some(data) => {
                        if data.uuid.eq(&characteristic) {
                            handler(data.value.as_slice());
                        }
                    },
                    None => {
                        warn!("Notification stream ended");
                        break 'mainloop;
                    },
                },
            }
        }
    }))
}

#[async_trait]
impl Transport for BtleTransport {
    async fn discover(&mut self, timeout: Duration) -> Result<Vec<DiscoveredDevice>, DeviceError> {
        // kept on self so disconnect() can stop the scan if this future is dropped while sleeping
        self.stop_scanning().await;
        self.scanning = start_scanning(&self.manager).await?;
        sleep(timeout).await;

        self.discovered.clear();
        for adapter in &self.scanning {
            for (device, peripheral) in named_peripherals(adapter).await {
                if !self.discovered.iter().any(|(known, _)| known.address == device.address) {
                    self.discovered.push((device, peripheral));
                }
            }
        }
        self.stop_scanning().await;

        Ok(self.discovered.iter().map(|(device, _)| device.clone()).collect())
    }

    async fn connect(&mut self, address: &str) -> Result<(), DeviceError> {
        let peripheral = self.discovered
            .iter()
            .find(|(device, _)| device.address == address)
            .map(|(_, peripheral)| peripheral.clone())
            .ok_or_else(|| DeviceError::UnknownPeripheral { address: address.to_string() })?;

        // stored first, so disconnect() still reaches the link if this future is dropped mid-connect
        self.peripheral = Some(peripheral.clone());

        let result = release_on_error(
            connect_peripheral(&peripheral),
            async { peripheral.disconnect().await.map_err(DeviceError::from) },
        ).await;

        if result.is_err() {
            self.peripheral = None;
        }
        result
    }

    async fn is_connected(&self) -> bool {
        let Some(peripheral) = &self.peripheral else {
            return false;
        };

        tokio::select! {
            _ = sleep(Duration::from_millis(IS_CONNECTED_DEADLINE)) => {
                // macOS
                warn!("Checking for connection status took too long");
                false
            }
            result = peripheral.is_connected() => match result {
                Err(err) => {
                    warn!("Error checking for connection state: {:?}", err);
                    false
                },
                Ok(connected) => connected,
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.stop_notifications().await;
        self.stop_scanning().await;

        match self.peripheral.take() {
            Some(peripheral) => Ok(peripheral.disconnect().await?),
            None => Ok(()),
        }
    }

    async fn subscribe(&mut self, characteristic: Uuid, handler: FrameHandler) -> Result<(), DeviceError> {
        let peripheral = self.connected_peripheral()?.clone();
        let target = find_characteristic(&peripheral, characteristic)?;

        // replace any previous reader so frames are never delivered twice
        self.stop_notifications().await;

        let cancel = CancellationToken::new();
        let handle = read_notifications_task(cancel.clone(), &peripheral, characteristic, handler).await?;

        info!("Subscribing to characteristic {:?}", characteristic);
        if let Err(err) = peripheral.subscribe(&target).await {
            cancel.cancel();
            return Err(err.into());
        }

        self.notifications = Some(NotificationTask { characteristic, cancel, handle });
        Ok(())
    }

    async fn unsubscribe(&mut self, characteristic: Uuid) -> Result<(), DeviceError> {
        if let Some(stopped) = self.stop_notifications().await {
            if stopped != characteristic {
                warn!("Stopped notifications of {:?} while unsubscribing from {:?}", stopped, characteristic);
            }
        }

        let peripheral = self.connected_peripheral()?;
        let target = find_characteristic(peripheral, characteristic)?;
        peripheral.unsubscribe(&target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_setup_releases_the_link() {
        let mut released = 0;

        let result = release_on_error(
            async { Err::<(), DeviceError>(DeviceError::MissingCharacteristic) },
            async { released += 1; Ok::<(), DeviceError>(()) },
        ).await;

        assert!(matches!(result, Err(DeviceError::MissingCharacteristic)));
        assert_eq!(released, 1);
    }

    #[tokio::test]
    async fn failed_release_keeps_the_setup_error() {
        let result = release_on_error(
            async { Err::<(), DeviceError>(DeviceError::MissingCharacteristic) },
            async { Err::<(), DeviceError>(DeviceError::NotConnected) },
        ).await;

        assert!(matches!(result, Err(DeviceError::MissingCharacteristic)));
    }

    #[tokio::test]
    async fn successful_setup_keeps_the_link() {
        let mut released = 0;

        let result = release_on_error(async { Ok::<(), DeviceError>(()) }, async { released += 1; Ok::<(), DeviceError>(()) }).await;

        assert!(result.is_ok());
        assert_eq!(released, 0);
    }
}
