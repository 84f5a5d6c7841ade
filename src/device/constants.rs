use uuid::Uuid;

/**
 * Advertised name (or name prefix) of the device to connect to.
 */
pub const DEFAULT_TARGET_NAME: &str = "Squegg_1";

/**
 * How long (seconds) to scan for advertisements before giving up.
 */
pub const DEFAULT_DISCOVERY_TIMEOUT: f64 = 20.0;

/**
 * How often (seconds) to check that the peripheral is still connected while the session is kept alive.
 */
pub const DEFAULT_POLL_INTERVAL: f64 = 3.0;

/**
 * How long (seconds) to wait before attempting to connect again.
 */
pub const DEFAULT_RETRY_DELAY: f64 = 1.0;

/**
 * How long (milliseconds) checking if the peripheral is still connected may take.
 */
pub const IS_CONNECTED_DEADLINE: u64 = 2000;

/**
 * The UUID of the Bluetooth BLE service of the Squegg.
 */
pub const SQUEGG_SERVICE: &str = "8e400001-f315-4f60-9fb8-838830daea50";

/**
 * The UUID of the characteristic that pushes telemetry notifications.
 */
pub const SQUEGG_NOTIFY_CHARACTERISTIC: &str = "0000ffb2-0000-1000-8000-00805f9b34fb";

/**
 * Writable characteristics of the device. Not used for telemetry.
 */
pub const SQUEGG_WRITE_CHARACTERISTIC: &str = "0000ffb0-0000-1000-8000-00805f9b34fb";
pub const SQUEGG_WRITE_WITHOUT_RESPONSE_CHARACTERISTIC: &str = "0000ffb1-0000-1000-8000-00805f9b34fb";

pub const SQUEGG_SERVICE_UUID: Uuid = Uuid::from_u128(0x8e400001_f315_4f60_9fb8_838830daea50);
pub const SQUEGG_NOTIFY_UUID: Uuid = Uuid::from_u128(0x0000ffb2_0000_1000_8000_00805f9b34fb);
pub const SQUEGG_WRITE_UUID: Uuid = Uuid::from_u128(0x0000ffb0_0000_1000_8000_00805f9b34fb);
pub const SQUEGG_WRITE_WITHOUT_RESPONSE_UUID: Uuid = Uuid::from_u128(0x0000ffb1_0000_1000_8000_00805f9b34fb);
