use std::time::Duration;
use async_trait::async_trait;
use uuid::Uuid;

use crate::device::types::{DiscoveredDevice, FrameHandler};
use crate::error::DeviceError;

/// The bluetooth operations a device session needs.
///
/// Implementations may deliver frames to a registered `FrameHandler` from any thread or task.
#[async_trait]
pub trait Transport: Send {
    /// Scan for advertising peripherals for `timeout`, in the order they were seen.
    async fn discover(&mut self, timeout: Duration) -> Result<Vec<DiscoveredDevice>, DeviceError>;

    async fn connect(&mut self, address: &str) -> Result<(), DeviceError>;

    async fn is_connected(&self) -> bool;

    async fn disconnect(&mut self) -> Result<(), DeviceError>;

    async fn subscribe(&mut self, characteristic: Uuid, handler: FrameHandler) -> Result<(), DeviceError>;

    async fn unsubscribe(&mut self, characteristic: Uuid) -> Result<(), DeviceError>;
}
