use std::sync::Arc;
use std::time::Duration;
use log::{debug, info, warn};

use crate::device::constants::SQUEGG_NOTIFY_UUID;
use crate::device::decoder::decode;
use crate::device::state::{Phase, SessionEvent, SessionState};
use crate::device::transport::Transport;
use crate::device::types::{Consumer, DeviceEvent, DiscoveredDevice, FrameHandler};
use crate::error::{ConnectError, SubscribeError};

fn forward_frame(consumer: &Consumer, frame: &[u8]) {
    debug!("Received frame {:?}", frame);

    let event = match decode(frame) {
        Ok(measurement) => DeviceEvent::Measurement(measurement),
        Err(err) => DeviceEvent::DecodeFailed(err),
    };

    consumer(event);
}

fn matches_target(device: &DiscoveredDevice, target_name: &str) -> bool {
    device.name == target_name || device.name.starts_with(target_name)
}

/// One device session: owns the lifecycle state, the transport and the consumer of decoded frames.
///
/// Lifecycle calls take `&mut self`, so only one of them can be in flight at a time. The frame
/// handler given to the transport only holds the consumer, never the session state.
pub struct DeviceSession<T: Transport> {
    transport: T,
    state: SessionState,
    consumer: Consumer,
}

impl<T: Transport> DeviceSession<T> {
    pub fn new(transport: T, target_name: impl Into<String>, consumer: Consumer) -> Self {
        DeviceSession {
            transport,
            state: SessionState::new(target_name),
            consumer,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn is_connected(&self) -> bool {
        self.state.is_connected() && self.transport.is_connected().await
    }

    pub async fn connect(&mut self, timeout: Duration) -> Result<(), ConnectError> {
        if self.state.is_connected() {
            if self.transport.is_connected().await {
                return Ok(());
            }

            warn!("Connection lost");
            self.teardown().await;
        }

        self.state.apply(SessionEvent::BeginConnect)?;

        info!("Scanning for {:?}...", self.state.target_name());
        let devices = match self.transport.discover(timeout).await {
            Ok(devices) => devices,
            Err(source) => {
                self.state.apply(SessionEvent::ConnectFailed)?;
                return Err(ConnectError::Discovery { source });
            },
        };

        let Some(device) = devices.into_iter().find(|device| matches_target(device, self.state.target_name())) else {
            info!("No matching device found");
            self.state.apply(SessionEvent::ConnectFailed)?;
            return Err(ConnectError::NotFound { target: self.state.target_name().to_string() });
        };

        info!("Found {:?} @ {}", device.name, device.address);
        match self.transport.connect(&device.address).await {
            Ok(_) => {
                self.state.apply(SessionEvent::ConnectSucceeded)?;
                info!("Connected to {:?} @ {}", device.name, device.address);
                Ok(())
            },
            Err(source) => {
                warn!("Connecting to peripheral failed: {:?}", source);
                self.state.apply(SessionEvent::ConnectFailed)?;
                Err(ConnectError::Failed { address: device.address, source })
            },
        }
    }

    pub async fn subscribe(&mut self) -> Result<(), SubscribeError> {
        match self.state.phase() {
            Phase::Subscribed => return Ok(()),
            Phase::Connected => {},
            _ => return Err(SubscribeError::NotConnected),
        }

        let consumer = self.consumer.clone();
        let handler: FrameHandler = Arc::new(move |frame: &[u8]| forward_frame(&consumer, frame));

        self.transport.subscribe(SQUEGG_NOTIFY_UUID, handler).await?;
        self.state.apply(SessionEvent::SubscribeSucceeded)?;
        info!("Subscribed to notifications");
        Ok(())
    }

    /// Decode one raw notification frame and hand the result to the consumer.
    pub fn handle_raw_frame(&self, frame: &[u8]) {
        forward_frame(&self.consumer, frame);
    }

    /// Best-effort: transport failures are logged and the state always ends `Disconnected`.
    pub async fn teardown(&mut self) {
        let from = self.state.phase();
        if from == Phase::Disconnected && !self.state.subscription_active() {
            return;
        }

        info!("Disconnecting from {:?}...", self.state.target_name());
        if let Err(err) = self.state.apply(SessionEvent::BeginTeardown) {
            warn!("Unexpected teardown transition: {}", err);
        }

        if self.state.subscription_active() {
            if let Err(err) = self.transport.unsubscribe(SQUEGG_NOTIFY_UUID).await {
                warn!("Failed to stop notifications: {}", err);
            }
        }

        if let Err(err) = self.transport.disconnect().await {
            warn!("Failed to disconnect: {}", err);
        }

        if let Err(err) = self.state.apply(SessionEvent::TeardownComplete) {
            warn!("Unexpected teardown transition: {}", err);
        }
        info!("Disconnected.");
    }
}
