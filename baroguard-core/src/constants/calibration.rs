//! Calibration Constants
//!
//! Tolerances for the absolute (reference-altitude) calibration. Pressure
//! offsets are in pascals, altitudes in metres.

/// Largest reference vertical error accepted for calibration (m).
pub const REFERENCE_EPV_MAX_M: f32 = 8.0;

/// Largest drift of the filtered delta between the two snapshots (m).
pub const OFFSET_DRIFT_TOLERANCE_M: f32 = 4.0;

/// Length of one observation window, also the filter time constant (ms).
pub const OFFSET_LPF_WINDOW_MS: u64 = 2_000;

/// Altitude error at which the offset search stops (m).
pub const OFFSET_SEARCH_TOLERANCE_M: f32 = 0.1;

/// Iteration cap of the offset search.
///
/// The bracket is 20 kPa wide, so 100 halvings are far below f32 resolution.
pub const OFFSET_SEARCH_MAX_ITERATIONS: u32 = 100;

/// Lower bound of the offset search bracket (Pa).
pub const OFFSET_SEARCH_MIN_PA: f32 = -10_000.0;

/// Upper bound of the offset search bracket (Pa).
pub const OFFSET_SEARCH_MAX_PA: f32 = 10_000.0;
