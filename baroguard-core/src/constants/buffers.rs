//! Fixed Capacities
//!
//! Every per-instance structure is a fixed array of this size so the cycle
//! runs in bounded time with no allocation.

/// Number of redundant barometer slots.
pub const MAX_SENSOR_COUNT: usize = 4;

/// Samples drained per instance per cycle.
///
/// Matches the depth of the driver publication queue; anything older was
/// overwritten upstream.
pub const SAMPLE_QUEUE_DEPTH: usize = 4;

/// Calibration entries held by a parameter snapshot.
pub const MAX_CALIBRATION_ENTRIES: usize = 8;
