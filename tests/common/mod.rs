#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use squegg::device::session::DeviceSession;
use squegg::device::transport::Transport;
use squegg::device::types::{Consumer, DeviceEvent, DiscoveredDevice, FrameHandler};
use squegg::error::DeviceError;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Calls {
    pub discover: AtomicUsize,
    pub connect: AtomicUsize,
    pub disconnect: AtomicUsize,
    pub subscribe: AtomicUsize,
    pub unsubscribe: AtomicUsize,
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Scripted transport that records every call.
pub struct MockTransport {
    pub devices: Vec<DiscoveredDevice>,
    // discover() returns nothing for this many calls
    pub hidden_discoveries: usize,
    pub discover_delay: Duration,
    pub connect_ok: bool,
    pub subscribe_ok: bool,
    pub teardown_ok: bool,
    pub connected: Arc<AtomicBool>,
    pub connected_to: Option<String>,
    pub subscribed_to: Option<Uuid>,
    pub handler: Arc<Mutex<Option<FrameHandler>>>,
    pub calls: Arc<Calls>,
}

pub fn device(name: &str, address: &str) -> DiscoveredDevice {
    DiscoveredDevice { name: name.to_string(), address: address.to_string() }
}

impl MockTransport {
    pub fn new(devices: Vec<DiscoveredDevice>) -> Self {
        MockTransport {
            devices,
            hidden_discoveries: 0,
            discover_delay: Duration::ZERO,
            connect_ok: true,
            subscribe_ok: true,
            teardown_ok: true,
            connected: Arc::new(AtomicBool::new(false)),
            connected_to: None,
            subscribed_to: None,
            handler: Arc::new(Mutex::new(None)),
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn with_squegg() -> Self {
        MockTransport::new(vec![device("Squegg_1", "AA:BB:CC:DD:EE:01")])
    }

    /// Deliver a frame the way the bluetooth stack would.
    pub fn push_frame(&self, frame: &[u8]) {
        let handler = self.handler.lock().unwrap().clone().expect("no frame handler registered");
        handler(frame);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn discover(&mut self, _timeout: Duration) -> Result<Vec<DiscoveredDevice>, DeviceError> {
        let call = self.calls.discover.fetch_add(1, Ordering::SeqCst);
        if !self.discover_delay.is_zero() {
            tokio::time::sleep(self.discover_delay).await;
        }

        if call < self.hidden_discoveries {
            return Ok(Vec::new());
        }
        Ok(self.devices.clone())
    }

    async fn connect(&mut self, address: &str) -> Result<(), DeviceError> {
        self.calls.connect.fetch_add(1, Ordering::SeqCst);
        if !self.connect_ok {
            return Err(DeviceError::UnknownPeripheral { address: address.to_string() });
        }

        self.connected_to = Some(address.to_string());
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.calls.disconnect.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);

        if self.teardown_ok { Ok(()) } else { Err(DeviceError::NotConnected) }
    }

    async fn subscribe(&mut self, characteristic: Uuid, handler: FrameHandler) -> Result<(), DeviceError> {
        self.calls.subscribe.fetch_add(1, Ordering::SeqCst);
        if !self.subscribe_ok {
            return Err(DeviceError::MissingCharacteristic);
        }

        self.subscribed_to = Some(characteristic);
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }

    async fn unsubscribe(&mut self, _characteristic: Uuid) -> Result<(), DeviceError> {
        self.calls.unsubscribe.fetch_add(1, Ordering::SeqCst);
        self.handler.lock().unwrap().take();

        if self.teardown_ok { Ok(()) } else { Err(DeviceError::NotConnected) }
    }
}

pub fn recording_consumer() -> (Consumer, Arc<Mutex<Vec<DeviceEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let consumer: Consumer = Arc::new(move |event: DeviceEvent| sink.lock().unwrap().push(event));
    (consumer, events)
}

pub fn session(transport: MockTransport) -> (DeviceSession<MockTransport>, Arc<Mutex<Vec<DeviceEvent>>>) {
    let (consumer, events) = recording_consumer();
    (DeviceSession::new(transport, "Squegg_1", consumer), events)
}
