//! Air-Data Configuration
//!
//! ## Overview
//!
//! The engine consumes configuration as an immutable snapshot. Parameter
//! storage and change notification live outside the crate; whenever the
//! stored values change the caller hands a fresh [`AirDataConfig`] to the
//! next cycle. A cycle that receives a snapshot counts as a *parameter
//! update cycle*: selection changes and failover reporting are deferred to
//! the next cycle so the two kinds of state change are never mixed.
//!
//! ## Contents
//!
//! | Field                   | Default      | Meaning                                  |
//! |-------------------------|--------------|------------------------------------------|
//! | `output_rate_hz`        | 20 Hz        | Output record rate, 0 disables output    |
//! | `sea_level_pressure_hpa`| 1013.25 hPa  | QNH used for every altitude conversion   |
//! | `autocal_enabled`       | `true`       | Absolute calibration against reference   |
//! | `validator`             | see below    | Fault detector thresholds                |
//! | `calibrations`          | empty        | Per-device offset and priority entries   |
//!
//! ## Calibration Entries
//!
//! Entries are keyed by device id, not by slot, so a sensor keeps its
//! offset and priority when it enumerates into a different slot after a
//! reboot. A priority of `-1` selects the default (75 for external, 50 for
//! internal sensors); `0` disables the sensor.
//!
//! ```rust
//! use baroguard_core::config::{AirDataConfig, CalibrationEntry};
//!
//! let mut config = AirDataConfig::default();
//! config.upsert_calibration(CalibrationEntry::new(0x1234, 100, 0.0, false))?;
//! config.validate()?;
//!
//! assert_eq!(config.publish_interval_ms(), Some(50));
//! # Ok::<(), baroguard_core::errors::ConfigError>(())
//! ```

use heapless::Vec;

use crate::constants::{
    buffers::MAX_CALIBRATION_ENTRIES,
    physics::{PA_PER_HPA, QNH_MAX_HPA, QNH_MIN_HPA, SEA_LEVEL_PRESSURE_HPA},
    timing::MS_PER_SECOND,
    validation::{PRIORITY_DEFAULT, PRIORITY_DEFAULT_EXTERNAL, PRIORITY_MAX},
};
use crate::errors::{ConfigError, ConfigResult};
use crate::validator::ValidatorConfig;

/// Configured priority meaning "use the default for this sensor type"
pub const PRIORITY_UNSET: i32 = -1;

/// Stored calibration of one device
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationEntry {
    /// Device the entry belongs to
    pub device_id: u32,
    /// Configured priority: -1 default, 0 disabled, 1..=100
    pub priority: i32,
    /// Pressure offset (Pa), corrected = raw - offset
    pub offset: f32,
    /// Sensor sits outside the flight controller (reads ambient temperature)
    pub external: bool,
}

impl CalibrationEntry {
    /// Entry for `device_id`; `priority` may be `PRIORITY_UNSET`
    pub fn new(device_id: u32, priority: i32, offset: f32, external: bool) -> Self {
        Self { device_id, priority, offset, external }
    }

    /// Priority after resolving the default
    pub fn effective_priority(&self) -> i32 {
        resolve_priority(self.priority, self.external)
    }
}

/// Resolve a configured priority, mapping unset or invalid values to the default
pub fn resolve_priority(priority: i32, external: bool) -> i32 {
    if (0..=PRIORITY_MAX).contains(&priority) {
        priority
    } else if external {
        PRIORITY_DEFAULT_EXTERNAL
    } else {
        PRIORITY_DEFAULT
    }
}

/// Configuration snapshot consumed by the engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirDataConfig {
    /// Output record rate (Hz), 0 disables output
    pub output_rate_hz: f32,
    /// Sea-level pressure used for altitude (hPa)
    pub sea_level_pressure_hpa: f32,
    /// Run the absolute calibration against the external reference
    pub autocal_enabled: bool,
    /// Fault detector thresholds
    pub validator: ValidatorConfig,
    /// Stored calibration entries
    pub calibrations: Vec<CalibrationEntry, MAX_CALIBRATION_ENTRIES>,
}

impl Default for AirDataConfig {
    fn default() -> Self {
        Self {
            output_rate_hz: 20.0,
            sea_level_pressure_hpa: SEA_LEVEL_PRESSURE_HPA,
            autocal_enabled: true,
            validator: ValidatorConfig::default(),
            calibrations: Vec::new(),
        }
    }
}

impl AirDataConfig {
    /// Set the output rate (Hz, 0 disables publication)
    pub fn with_output_rate(mut self, rate_hz: f32) -> Self {
        self.output_rate_hz = rate_hz;
        self
    }

    /// Set the QNH (hPa)
    pub fn with_sea_level_pressure(mut self, hpa: f32) -> Self {
        self.sea_level_pressure_hpa = hpa;
        self
    }

    /// Enable or disable absolute calibration
    pub fn with_autocal(mut self, enabled: bool) -> Self {
        self.autocal_enabled = enabled;
        self
    }

    /// Check every field; the engine rejects snapshots that fail this
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.output_rate_hz.is_finite() || self.output_rate_hz < 0.0 {
            return Err(ConfigError::InvalidOutputRate { rate_hz: self.output_rate_hz });
        }

        if !(QNH_MIN_HPA..=QNH_MAX_HPA).contains(&self.sea_level_pressure_hpa) {
            return Err(ConfigError::InvalidSeaLevelPressure {
                hpa: self.sea_level_pressure_hpa,
                min: QNH_MIN_HPA,
                max: QNH_MAX_HPA,
            });
        }

        for (i, entry) in self.calibrations.iter().enumerate() {
            if !(PRIORITY_UNSET..=PRIORITY_MAX).contains(&entry.priority) {
                return Err(ConfigError::InvalidPriority {
                    device_id: entry.device_id,
                    priority: entry.priority,
                });
            }

            if !entry.offset.is_finite() {
                return Err(ConfigError::InvalidOffset { device_id: entry.device_id });
            }

            if self.calibrations[..i].iter().any(|other| other.device_id == entry.device_id) {
                return Err(ConfigError::DuplicateDevice { device_id: entry.device_id });
            }
        }

        Ok(())
    }

    /// Sea-level pressure in Pa
    pub fn sea_level_pa(&self) -> f32 {
        self.sea_level_pressure_hpa * PA_PER_HPA
    }

    /// Spacing of output records, `None` when output is disabled
    pub fn publish_interval_ms(&self) -> Option<u64> {
        if self.output_rate_hz > 0.0 {
            Some((MS_PER_SECOND as f32 / self.output_rate_hz) as u64)
        } else {
            None
        }
    }

    /// Stored calibration of a device
    pub fn calibration(&self, device_id: u32) -> Option<&CalibrationEntry> {
        self.calibrations.iter().find(|entry| entry.device_id == device_id)
    }

    /// Insert or replace the entry of `entry.device_id`
    pub fn upsert_calibration(&mut self, entry: CalibrationEntry) -> ConfigResult<()> {
        if let Some(existing) = self.calibrations.iter_mut().find(|e| e.device_id == entry.device_id) {
            *existing = entry;
            return Ok(());
        }

        self.calibrations.push(entry).map_err(|_| ConfigError::TableFull)
    }
}
