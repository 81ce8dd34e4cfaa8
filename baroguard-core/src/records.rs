//! Output records
//!
//! Two records leave the engine:
//!
//! - [`AirDataRecord`]: the published air data of the selected instance,
//!   at most once per output interval.
//! - [`SensorsStatus`]: a per-slot health snapshot, every cycle once an
//!   instance has been selected.

use crate::constants::buffers::MAX_SENSOR_COUNT;
use crate::temperature::TemperatureSource;
use crate::time::Timestamp;

/// Air data of the selected instance, averaged over one output interval
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirDataRecord {
    /// Mean measurement time of the averaged samples (ms)
    pub timestamp_sample: Timestamp,
    /// Device the data came from
    pub device_id: u32,
    /// Barometric altitude above the configured sea level (m)
    pub altitude: f32,
    /// Ambient air temperature (°C)
    pub ambient_temperature: f32,
    /// Where `ambient_temperature` came from
    pub temperature_source: TemperatureSource,
    /// Mean corrected static pressure (Pa)
    pub pressure: f32,
    /// Air density (kg/m³)
    pub air_density: f32,
    /// Calibration revision of the device
    pub calibration_count: u8,
    /// Record creation time (ms)
    pub timestamp: Timestamp,
}

/// Health of every slot
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorsStatus {
    /// Device of the selected instance
    pub device_id_primary: u32,
    /// Device per slot, 0 when empty
    pub device_ids: [u32; MAX_SENSOR_COUNT],
    /// Smoothed deviation from the instance mean (Pa), NaN for empty slots
    pub inconsistency: [f32; MAX_SENSOR_COUNT],
    /// No fault flags set
    pub healthy: [bool; MAX_SENSOR_COUNT],
    /// Priority last seen by the validator
    pub priority: [i32; MAX_SENSOR_COUNT],
    /// Device present with a non-zero configured priority
    pub enabled: [bool; MAX_SENSOR_COUNT],
    /// External sensor
    pub external: [bool; MAX_SENSOR_COUNT],
    /// Snapshot time (ms)
    pub timestamp: Timestamp,
}

impl Default for SensorsStatus {
    fn default() -> Self {
        Self {
            device_id_primary: 0,
            device_ids: [0; MAX_SENSOR_COUNT],
            inconsistency: [f32::NAN; MAX_SENSOR_COUNT],
            healthy: [false; MAX_SENSOR_COUNT],
            priority: [0; MAX_SENSOR_COUNT],
            enabled: [false; MAX_SENSOR_COUNT],
            external: [false; MAX_SENSOR_COUNT],
            timestamp: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_has_nan_inconsistency() {
        let status = SensorsStatus::default();
        assert!(status.inconsistency.iter().all(|v| v.is_nan()));
        assert!(status.healthy.iter().all(|&healthy| !healthy));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_serializes() {
        let record = AirDataRecord {
            timestamp_sample: 1_000,
            device_id: 7,
            altitude: 12.5,
            ambient_temperature: 15.0,
            temperature_source: TemperatureSource::Default,
            pressure: 101_175.0,
            air_density: 1.22,
            calibration_count: 2,
            timestamp: 1_050,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"device_id\":7"));
        assert!(json.contains("\"temperature_source\":\"Default\""));
    }
}
