use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::device::constants::{DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_DELAY, DEFAULT_TARGET_NAME};
use crate::device::run_loop::RunOptions;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub target_name: String,
    pub discovery_timeout_secs: f64,
    pub poll_interval_secs: f64,
    pub connect_attempts: u32,
    pub retry_delay_secs: f64,
}

fn positive_secs(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("{} is not a positive number of seconds", value) })
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_name.is_empty() {
            return Err(ConfigError::Invalid { field: "targetName", reason: "must not be empty".to_string() });
        }

        positive_secs("discoveryTimeoutSecs", self.discovery_timeout_secs)?;
        positive_secs("pollIntervalSecs", self.poll_interval_secs)?;

        // zero is allowed here, it means retry immediately
        if !(self.retry_delay_secs.is_finite() && self.retry_delay_secs >= 0.0) {
            return Err(ConfigError::Invalid { field: "retryDelaySecs", reason: format!("{} is not a valid delay", self.retry_delay_secs) });
        }

        if self.connect_attempts == 0 {
            return Err(ConfigError::Invalid { field: "connectAttempts", reason: "must be at least 1".to_string() });
        }

        Ok(())
    }

    // call validate() first, Duration::from_secs_f64 panics on negative values
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            discovery_timeout: Duration::from_secs_f64(self.discovery_timeout_secs),
            connect_attempts: self.connect_attempts,
            retry_delay: Duration::from_secs_f64(self.retry_delay_secs),
            poll_interval: Duration::from_secs_f64(self.poll_interval_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_name: DEFAULT_TARGET_NAME.to_string(),
            discovery_timeout_secs: DEFAULT_DISCOVERY_TIMEOUT,
            poll_interval_secs: DEFAULT_POLL_INTERVAL,
            connect_attempts: 1,
            retry_delay_secs: DEFAULT_RETRY_DELAY,
        }
    }
}
