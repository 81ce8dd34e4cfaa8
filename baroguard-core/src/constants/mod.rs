//! Constants for BaroGuard Core
//!
//! Centralized numeric values used by the voting, failover and calibration
//! engine. Every value carries its unit in the name and a short note on
//! where it comes from.
//!
//! ## Organization
//!
//! - **Physics**: standard atmosphere and gas constants
//! - **Timing**: timeouts, windows and rate limits (milliseconds)
//! - **Calibration**: relative/absolute calibration tolerances and search bounds
//! - **Validation**: fault detector thresholds and priority limits
//! - **Buffers**: fixed capacities for instance arrays and input queues

/// Standard atmosphere and gas constants.
pub mod physics;

/// Timeouts, observation windows and rate limits.
pub mod timing;

/// Calibration tolerances and search bounds.
pub mod calibration;

/// Validator thresholds and priority limits.
pub mod validation;

/// Fixed capacities for instance arrays and queues.
pub mod buffers;

pub use physics::{
    SEA_LEVEL_PRESSURE_HPA, DEFAULT_TEMPERATURE_C,
    AMBIENT_TEMPERATURE_MIN_C, AMBIENT_TEMPERATURE_MAX_C,
};

pub use timing::{
    SENSOR_TIMEOUT_MS, CYCLE_INTERVAL_MS, FAULT_REPORT_INTERVAL_MS,
    RELATIVE_CALIBRATION_DELAY_MS,
};

pub use calibration::{
    REFERENCE_EPV_MAX_M, OFFSET_DRIFT_TOLERANCE_M,
    OFFSET_SEARCH_TOLERANCE_M, OFFSET_SEARCH_MAX_ITERATIONS,
};

pub use validation::{PRIORITY_MIN, PRIORITY_MAX};

pub use buffers::{MAX_SENSOR_COUNT, SAMPLE_QUEUE_DEPTH};
