use std::io;
use std::str::Utf8Error;
use thiserror::Error;
use btleplug;
use serde_json;

use crate::device::state::{Phase, SessionEvent};
use crate::device::types::Field;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine path to config file")]
    NoConfigPath,

    #[error("Failed to acquire file lock on config file: {source}")]
    CanNotLock { source: io::Error },

    #[error("Failed to encode/decode config as utf-8: {source}")]
    Utf8Error { #[from] source: Utf8Error },

    #[error("Failed to read/write config file: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Failed to parse/build config file: {source}")]
    JsonError { #[from] source: serde_json::Error },

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn is_file_not_found_error(&self) -> bool {
        match self {
            ConfigError::IOError { source } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (config): {source}")]
    ConfigError { #[from] source: ConfigError },

    #[error("Failed to initialize logging: {source}")]
    Logging { #[from] source: log::SetLoggerError },

    #[error("Failed to open LOG_FILE: {source}")]
    LogFile { source: io::Error },

    #[error("Failed to start async runtime: {source}")]
    Runtime { source: io::Error },

    #[error("Failed to open bluetooth transport: {source}")]
    Transport { #[from] source: DeviceError },

    #[error("Session ended: {source}")]
    Session { #[from] source: RunError },
}

/// Errors reported by a bluetooth transport.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Error communicating with device (btleplug): {source}")]
    Btle { #[from] source: btleplug::Error },

    #[error("No bluetooth adapter is available")]
    NoAdapter,

    #[error("No discovered peripheral has address {address}")]
    UnknownPeripheral { address: String },

    #[error("Not connected to a peripheral")]
    NotConnected,

    #[error("A required bluetooth characteristic is not available")]
    MissingCharacteristic,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid session transition: {event:?} while {from:?}")]
    InvalidTransition { from: Phase, event: SessionEvent },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Frame too short: expected at least 4 bytes, got {len}")]
    TooShort { len: usize },

    #[error("Invalid {field} field: {value:?}")]
    InvalidField { field: Field, value: String },
}

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("No device named {target:?} found")]
    NotFound { target: String },

    #[error("Failed to connect to {address}: {source}")]
    Failed { address: String, source: DeviceError },

    #[error("Scanning failed: {source}")]
    Discovery { source: DeviceError },

    #[error(transparent)]
    State { #[from] source: StateError },
}

#[derive(Error, Debug)]
pub enum SubscribeError {
    #[error("Can not subscribe while not connected")]
    NotConnected,

    #[error("Failed to subscribe to notifications: {source}")]
    Transport { #[from] source: DeviceError },

    #[error(transparent)]
    State { #[from] source: StateError },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Connect { #[from] source: ConnectError },

    #[error(transparent)]
    Subscribe { #[from] source: SubscribeError },

    #[error("Connection to the device was lost")]
    ConnectionLost,
}
