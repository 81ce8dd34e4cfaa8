//! Data Validator Bank
//!
//! ## Overview
//!
//! Every redundant barometer instance gets a [`DataValidator`] that turns
//! its sample stream into a set of [`FaultFlags`]. The [`ValidatorBank`]
//! holds one validator per slot and answers the only question the rest of
//! the engine asks every cycle: *which instance should be trusted now?*
//!
//! ```text
//!  slot 0 ──put──► DataValidator ─┐
//!  slot 1 ──put──► DataValidator ─┼─► get_best(now) ─► Option<index>
//!  slot 2 ──put──► DataValidator ─┤        │
//!  slot 3 ──put──► DataValidator ─┘        └─► failover_count / index / state
//! ```
//!
//! ## Ranking
//!
//! Only fault-free instances compete. Among those the highest priority
//! wins, ties go to the lowest slot index (the first sensor that came up
//! wins). If nothing is fault-free the previous best is kept, the bank
//! never promotes a faulted instance.
//!
//! ## Failover Detection
//!
//! The bank counts a failover each time the instance it reported as best
//! acquires fault flags it did not have at the previous evaluation. Moving
//! to a higher-priority sensor that came online late is *not* a failover.
//! Reporting and demotion are left to the
//! [`FailoverReporter`](crate::failover::FailoverReporter); the bank only
//! detects.
//!
//! ## Usage
//!
//! ```rust
//! use baroguard_core::validator::{ValidatorBank, ValidatorConfig};
//!
//! let mut bank = ValidatorBank::new(ValidatorConfig::default());
//! bank.put(0, 1_000, [101_325.0, 20.0, 0.0], 0, 50);
//! bank.put(1, 1_000, [101_320.0, 21.0, 0.4], 0, 75);
//!
//! assert_eq!(bank.get_best(1_010), Some(1));
//! ```

mod bank;
mod data_validator;
mod flags;

pub use bank::ValidatorBank;
pub use data_validator::{DataValidator, VALIDATOR_DIMENSIONS};
pub use flags::FaultFlags;

use crate::constants::{
    timing::SENSOR_TIMEOUT_MS,
    validation::{ERROR_COUNT_LIMIT, ERROR_DENSITY_WINDOW, STALE_EQUAL_COUNT_LIMIT, STALE_EQUAL_EPSILON},
};

/// Thresholds shared by every validator in a bank
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidatorConfig {
    /// Sample silence that flags a timeout (ms)
    pub timeout_ms: u64,
    /// Driver error counter limit
    pub error_count_limit: u64,
    /// Error density above which the sensor is flagged
    pub error_density_window: f32,
    /// Identical consecutive samples before the sensor counts as frozen
    pub stale_equal_count_limit: u32,
    /// Pressure difference below which two samples are identical (Pa)
    pub stale_epsilon: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: SENSOR_TIMEOUT_MS,
            error_count_limit: ERROR_COUNT_LIMIT,
            error_density_window: ERROR_DENSITY_WINDOW,
            stale_equal_count_limit: STALE_EQUAL_COUNT_LIMIT,
            stale_epsilon: STALE_EQUAL_EPSILON,
        }
    }
}
