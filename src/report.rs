use std::io::Write;
use std::sync::Arc;
use log::warn;
use serde_json::json;

use crate::device::types::{Consumer, DeviceEvent, Measurement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json, // one object per line
}

pub fn format_measurement(measurement: &Measurement) -> String {
    format!(
        "Strength: {:.1}, Squeezing: {}, Battery: {}%",
        measurement.strength, measurement.is_squeezing, measurement.battery_charge,
    )
}

/// The line to print for `event`, if any. Decode failures are only printed in json mode.
pub fn render(event: &DeviceEvent, format: OutputFormat) -> Option<String> {
    match (event, format) {
        (DeviceEvent::Measurement(measurement), OutputFormat::Text) => Some(format_measurement(measurement)),
        (DeviceEvent::Measurement(measurement), OutputFormat::Json) => serde_json::to_string(measurement).ok(),
        (DeviceEvent::DecodeFailed(_), OutputFormat::Text) => None,
        (DeviceEvent::DecodeFailed(err), OutputFormat::Json) => Some(json!({ "error": err.to_string() }).to_string()),
    }
}

/// A consumer that writes every event to stdout and logs skipped frames.
pub fn stdout_consumer(format: OutputFormat) -> Consumer {
    Arc::new(move |event: DeviceEvent| {
        if let DeviceEvent::DecodeFailed(err) = &event {
            warn!("Skipped frame: {}", err);
        }

        if let Some(line) = render(&event, format) {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = writeln!(stdout, "{}", line) {
                warn!("Failed to write to stdout: {}", err);
            }
        }
    })
}
