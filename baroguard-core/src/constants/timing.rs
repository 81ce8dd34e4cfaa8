//! Timing Constants
//!
//! All durations are in milliseconds, matching [`Timestamp`](crate::time::Timestamp).

/// A validator without a sample for this long is flagged as timed out (ms).
pub const SENSOR_TIMEOUT_MS: u64 = 300;

/// Reschedule hint returned after every cycle (ms).
///
/// The cycle also runs whenever the selected feed delivers a sample, so
/// this only bounds the latency of fault detection when data stops.
pub const CYCLE_INTERVAL_MS: u64 = 50;

/// Minimum spacing between two fault reports (ms).
pub const FAULT_REPORT_INTERVAL_MS: u64 = 3_000;

/// Delay between the first relative calibration attempt and the first
/// computation, so slower drivers can come up (ms).
pub const RELATIVE_CALIBRATION_DELAY_MS: u64 = 1_000;

/// Maximum age of the averaged sample timestamp for an output record (ms).
pub const PUBLISH_MAX_SAMPLE_AGE_MS: u64 = 1_000;

/// Maximum age of an airspeed-sensor temperature sample (ms).
pub const AIRSPEED_TEMPERATURE_MAX_AGE_MS: u64 = 1_000;

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1_000;
