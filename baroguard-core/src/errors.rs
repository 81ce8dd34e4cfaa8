//! Error Types for Configuration and Calibration
//!
//! ## Design Philosophy
//!
//! The air-data engine never aborts a cycle. Faulted sensors are absorbed by
//! the validator bank and surface only through flags, priorities and the
//! rate-limited fault report. The errors in this module therefore describe
//! the two places where a caller still needs an explicit answer:
//!
//! 1. **Configuration**: a parameter snapshot that cannot be applied
//!    (negative output rate, implausible sea-level pressure, priority out of
//!    range). Rejected snapshots leave the previous configuration in place.
//!
//! 2. **Calibration**: an attempt that did not produce an offset. The engine
//!    logs the reason and retries on a later cycle; the offset in use is
//!    never touched by a rejected attempt.
//!
//! Like the rest of the crate the errors are small, `Copy`, and carry only
//! `&'static str` text so they can be returned from the real-time path
//! without allocation.
//!
//! ```rust
//! use baroguard_core::errors::CalibrationError;
//!
//! fn describe(err: CalibrationError) -> &'static str {
//!     match err {
//!         CalibrationError::Unstable { .. } => "window discarded",
//!         CalibrationError::NotConverged { .. } => "search exhausted",
//!         _ => "waiting",
//!     }
//! }
//! # assert_eq!(describe(CalibrationError::NoPrimaryData), "waiting");
//! ```

use thiserror_no_std::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for calibration steps
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Parameter snapshot rejected during validation
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Output rate must be finite and non-negative (0 disables output)
    #[error("Invalid output rate {rate_hz} Hz")]
    InvalidOutputRate {
        /// Requested rate in Hz
        rate_hz: f32,
    },

    /// Sea-level pressure outside the plausible QNH band
    #[error("Sea-level pressure {hpa} hPa outside [{min}, {max}]")]
    InvalidSeaLevelPressure {
        /// Requested QNH in hPa
        hpa: f32,
        /// Lowest accepted QNH
        min: f32,
        /// Highest accepted QNH
        max: f32,
    },

    /// Configured priority outside the accepted range
    #[error("Priority {priority} for device {device_id} outside [-1, 100]")]
    InvalidPriority {
        /// Device the entry belongs to
        device_id: u32,
        /// Offending priority
        priority: i32,
    },

    /// Offset is NaN or infinite
    #[error("Offset for device {device_id} is not a finite number")]
    InvalidOffset {
        /// Device the entry belongs to
        device_id: u32,
    },

    /// Two calibration entries claim the same device
    #[error("Duplicate calibration entry for device {device_id}")]
    DuplicateDevice {
        /// Device listed twice
        device_id: u32,
    },

    /// More calibration entries than the table holds
    #[error("Calibration table full")]
    TableFull,
}

/// Calibration attempt that did not produce an offset
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// No selected instance, or it has no samples in the current window
    #[error("No primary pressure available")]
    NoPrimaryData,

    /// Still inside the start-up or observation window
    #[error("Calibration window still open: {reason}")]
    Pending {
        /// Which window is still running
        reason: &'static str,
    },

    /// Reference vertical error above the accepted limit
    #[error("Reference vertical error {epv} m exceeds {limit} m")]
    ReferenceInaccurate {
        /// Reported vertical error estimate
        epv: f32,
        /// Accepted limit
        limit: f32,
    },

    /// The filtered baro/reference delta drifted between snapshots
    #[error("Offset estimate unstable: drift {drift} m exceeds {tolerance} m")]
    Unstable {
        /// |t2 - t1| in meters
        drift: f32,
        /// Accepted drift
        tolerance: f32,
    },

    /// Bisection ran out of iterations without meeting the tolerance
    #[error("Offset search did not converge after {iterations} iterations (residual {residual} m)")]
    NotConverged {
        /// Iterations spent
        iterations: u32,
        /// Altitude error at the last midpoint
        residual: f32,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidOutputRate { rate_hz } =>
                defmt::write!(fmt, "Invalid output rate {} Hz", rate_hz),
            Self::InvalidSeaLevelPressure { hpa, min, max } =>
                defmt::write!(fmt, "QNH {} hPa outside [{}, {}]", hpa, min, max),
            Self::InvalidPriority { device_id, priority } =>
                defmt::write!(fmt, "Priority {} for device {}", priority, device_id),
            Self::InvalidOffset { device_id } =>
                defmt::write!(fmt, "Offset for device {} not finite", device_id),
            Self::DuplicateDevice { device_id } =>
                defmt::write!(fmt, "Duplicate device {}", device_id),
            Self::TableFull =>
                defmt::write!(fmt, "Calibration table full"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NoPrimaryData =>
                defmt::write!(fmt, "No primary pressure"),
            Self::Pending { reason } =>
                defmt::write!(fmt, "Pending: {}", reason),
            Self::ReferenceInaccurate { epv, limit } =>
                defmt::write!(fmt, "EPV {} m > {} m", epv, limit),
            Self::Unstable { drift, tolerance } =>
                defmt::write!(fmt, "Drift {} m > {} m", drift, tolerance),
            Self::NotConverged { iterations, residual } =>
                defmt::write!(fmt, "No convergence after {} (residual {} m)", iterations, residual),
        }
    }
}
