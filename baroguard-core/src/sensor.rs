//! Sensor Instances and Sample Accumulation
//!
//! ## Overview
//!
//! The engine keeps a fixed array of [`SensorSlot`]s, one per redundant
//! barometer. A slot is claimed the first time a device id shows up on its
//! input and is reinitialised in place when a different device id appears,
//! nothing is ever allocated or freed during flight.
//!
//! ```text
//! SensorSlot
//! ├── SensorCalibration   device id, offset, configured priority, flags
//! ├── Accumulator         sums since the last output interval
//! ├── priority            live trust level (faults lower it)
//! ├── last_pressure       latest corrected pressure
//! └── inconsistency       smoothed deviation from the instance mean
//! ```
//!
//! ## Offsets
//!
//! Offsets are subtracted from the raw reading:
//!
//! ```text
//! corrected = raw - offset
//! ```
//!
//! A sensor reading 5 Pa above the primary therefore ends up with an
//! offset of +5 Pa after relative calibration.

use crate::config::{resolve_priority, AirDataConfig, CalibrationEntry};
use crate::constants::validation::{INCONSISTENCY_SMOOTHING, PRIORITY_MAX, PRIORITY_MIN};
use crate::time::Timestamp;

/// Raw sample delivered by a barometer driver
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaroSample {
    /// Publication time (ms)
    pub timestamp: Timestamp,
    /// Time the measurement was taken (ms)
    pub timestamp_sample: Timestamp,
    /// Driver-assigned device id, never 0 for a real device
    pub device_id: u32,
    /// Static pressure (Pa)
    pub pressure: f32,
    /// Sensor die temperature (°C)
    pub temperature: f32,
    /// Cumulative driver error counter
    pub error_count: u64,
}

/// Calibration state of the device currently occupying a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCalibration {
    device_id: u32,
    configured_priority: i32,
    offset: f32,
    external: bool,
    calibrated: bool,
    calibration_count: u8,
}

impl SensorCalibration {
    /// Unused calibration, no device
    pub const fn new() -> Self {
        Self {
            device_id: 0,
            configured_priority: 0,
            offset: 0.0,
            external: false,
            calibrated: false,
            calibration_count: 0,
        }
    }

    /// Take over a device and load its stored entry, if any
    pub fn set_device_id(&mut self, device_id: u32, config: &AirDataConfig) {
        *self = Self::new();
        self.device_id = device_id;
        self.parameters_update(config);
    }

    /// Reload offset, priority and flags for the current device
    pub fn parameters_update(&mut self, config: &AirDataConfig) {
        if self.device_id == 0 {
            return;
        }

        match config.calibration(self.device_id) {
            Some(entry) => {
                self.external = entry.external;
                self.configured_priority = entry.effective_priority();
                self.offset = entry.offset;
                self.calibrated = true;
            }
            None => {
                self.configured_priority = resolve_priority(crate::config::PRIORITY_UNSET, self.external);
                self.offset = 0.0;
                self.calibrated = false;
            }
        }

        self.calibration_count = self.calibration_count.wrapping_add(1);
    }

    /// Apply the offset to a raw reading
    pub fn correct(&self, raw_pressure: f32) -> f32 {
        raw_pressure - self.offset
    }

    /// Replace the offset (Pa) and mark the device calibrated
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.calibrated = true;
        self.calibration_count = self.calibration_count.wrapping_add(1);
    }

    /// Entry to persist for this device
    pub fn entry(&self) -> CalibrationEntry {
        CalibrationEntry::new(self.device_id, self.configured_priority, self.offset, self.external)
    }

    /// Device id, 0 when unset
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Offset subtracted from raw readings (Pa)
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Priority from configuration, defaults resolved
    pub fn priority(&self) -> i32 {
        self.configured_priority
    }

    /// A device is in use and has a non-zero configured priority
    pub fn enabled(&self) -> bool {
        self.device_id != 0 && self.configured_priority > 0
    }

    /// Device sits on an external bus
    pub fn external(&self) -> bool {
        self.external
    }

    /// A stored entry exists (or an offset has been computed) for the device
    pub fn calibrated(&self) -> bool {
        self.calibrated
    }

    /// Revision counter, bumped on every parameter load or offset change
    pub fn calibration_count(&self) -> u8 {
        self.calibration_count
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Running sums of one instance since the last output interval
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pressure_sum: f64,
    temperature_sum: f64,
    timestamp_sample_sum: u64,
    count: u32,
}

impl Accumulator {
    /// Add one corrected sample
    pub fn add(&mut self, pressure: f32, temperature: f32, timestamp_sample: Timestamp) {
        self.pressure_sum += pressure as f64;
        self.temperature_sum += temperature as f64;
        self.timestamp_sample_sum = self.timestamp_sample_sum.saturating_add(timestamp_sample);
        self.count += 1;
    }

    /// Clear the sums
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Samples since the last reset
    pub fn count(&self) -> u32 {
        self.count
    }

    /// No sample since the last reset
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Average corrected pressure (Pa)
    pub fn mean_pressure(&self) -> Option<f32> {
        (self.count > 0).then(|| (self.pressure_sum / self.count as f64) as f32)
    }

    /// Average sensor temperature (°C)
    pub fn mean_temperature(&self) -> Option<f32> {
        (self.count > 0).then(|| (self.temperature_sum / self.count as f64) as f32)
    }

    /// Average measurement time (ms)
    pub fn mean_timestamp_sample(&self) -> Option<Timestamp> {
        (self.count > 0).then(|| self.timestamp_sample_sum / self.count as u64)
    }
}

/// One redundant barometer slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSlot {
    /// Calibration of the occupying device
    pub calibration: SensorCalibration,
    /// Sums since the last output interval
    pub accumulator: Accumulator,
    /// Live priority handed to the validator (1 = never preferred)
    pub priority: i32,
    /// Slot has delivered at least one sample since start or takeover
    pub active: bool,
    /// Latest corrected pressure (Pa)
    pub last_pressure: f32,
    /// Smoothed deviation of `last_pressure` from the instance mean (Pa)
    pub inconsistency: f32,
    /// Last time the slot produced (or was denied) an output record
    pub last_publication: Timestamp,
}

impl SensorSlot {
    /// Empty slot
    pub const fn new() -> Self {
        Self {
            calibration: SensorCalibration::new(),
            accumulator: Accumulator {
                pressure_sum: 0.0,
                temperature_sum: 0.0,
                timestamp_sample_sum: 0,
                count: 0,
            },
            priority: 0,
            active: false,
            last_pressure: 0.0,
            inconsistency: 0.0,
            last_publication: 0,
        }
    }

    /// Reinitialise the slot for a newly observed device
    pub fn take_over(&mut self, device_id: u32, config: &AirDataConfig) {
        *self = Self::new();
        self.calibration.set_device_id(device_id, config);
        self.priority = self.calibration.priority();
    }

    /// Reload calibration parameters, carrying fault demotions across
    ///
    /// If the configured priority changed and the live priority still
    /// equals the old configured value, it follows the new value. Otherwise
    /// the live priority was lowered by a fault and is shifted by the same
    /// amount, clamped to the valid range.
    pub fn parameters_update(&mut self, config: &AirDataConfig) {
        let priority_old = self.calibration.priority();
        self.calibration.parameters_update(config);
        let priority_new = self.calibration.priority();

        if priority_old != priority_new {
            if self.priority == priority_old {
                self.priority = priority_new;
            } else {
                self.priority = (self.priority + priority_new - priority_old).clamp(PRIORITY_MIN, PRIORITY_MAX);
            }
        }
    }

    /// Update the smoothed inconsistency against the mean of all instances
    pub fn update_inconsistency(&mut self, mean: f32) {
        self.inconsistency = INCONSISTENCY_SMOOTHING * self.inconsistency
            + (1.0 - INCONSISTENCY_SMOOTHING) * (self.last_pressure - mean);
    }

    /// Device id occupying the slot, 0 when unset
    pub fn device_id(&self) -> u32 {
        self.calibration.device_id()
    }
}

impl Default for SensorSlot {
    fn default() -> Self {
        Self::new()
    }
}
