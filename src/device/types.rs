use std::fmt;
use std::sync::Arc;
use serde::Serialize;

use crate::error::DecodeError;

/// One decoded telemetry notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub strength: f64, // rounded to one decimal
    pub is_squeezing: bool,
    pub battery_charge: u8, // percentage
}

/// Field slots of a notification frame, used to report which one failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Battery,
    Squeeze,
    Strength,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self {
            Field::Battery => "battery",
            Field::Squeeze => "squeeze",
            Field::Strength => "strength",
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Measurement(Measurement),
    DecodeFailed(DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub name: String,
    pub address: String,
}

/// Receives every raw notification frame. May be invoked from any thread or task.
pub type FrameHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Receives the decoded result of every notification frame.
pub type Consumer = Arc<dyn Fn(DeviceEvent) + Send + Sync>;
