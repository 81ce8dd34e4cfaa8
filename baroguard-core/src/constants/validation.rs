//! Validator Thresholds and Priorities

/// Lowest priority of an enabled sensor: still used, never preferred.
pub const PRIORITY_MIN: i32 = 1;

/// Highest priority.
pub const PRIORITY_MAX: i32 = 100;

/// Priority of an internal sensor without a stored calibration entry.
pub const PRIORITY_DEFAULT: i32 = 50;

/// Priority of an external sensor without a stored calibration entry.
pub const PRIORITY_DEFAULT_EXTERNAL: i32 = 75;

/// Driver error counter above which a sensor is considered gone for good.
pub const ERROR_COUNT_LIMIT: u64 = 10_000;

/// Error density window: density above this flags the sensor.
///
/// Density rises with every new driver error and decays by one per clean
/// sample, so this is roughly "errors within the last N samples".
pub const ERROR_DENSITY_WINDOW: f32 = 100.0;

/// Identical consecutive samples tolerated before a sensor counts as frozen.
pub const STALE_EQUAL_COUNT_LIMIT: u32 = 100;

/// Two samples closer than this are treated as identical.
pub const STALE_EQUAL_EPSILON: f32 = 1.0e-6;

/// Smoothing factor of the per-instance inconsistency metric.
pub const INCONSISTENCY_SMOOTHING: f32 = 0.95;
