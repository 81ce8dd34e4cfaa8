//! Ambient temperature selection
//!
//! Air density needs the outside air temperature, which an internal
//! barometer does not measure: its die sits on a warm board. Sources in
//! order of preference:
//!
//! | Source           | Condition                                   |
//! |------------------|---------------------------------------------|
//! | Airspeed sensor  | sample younger than 1 s with finite reading |
//! | External baro    | published instance is marked external       |
//! | Default          | 15 °C                                       |
//!
//! The result is clamped to -60..60 °C.

use crate::constants::physics::{AMBIENT_TEMPERATURE_MAX_C, AMBIENT_TEMPERATURE_MIN_C, DEFAULT_TEMPERATURE_C};
use crate::constants::timing::AIRSPEED_TEMPERATURE_MAX_AGE_MS;
use crate::time::{elapsed_ms, Timestamp};

/// Where the published ambient temperature came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TemperatureSource {
    /// Standard 15 °C
    #[default]
    Default = 0,
    /// Die temperature of an external barometer
    ExternalBaro = 1,
    /// Differential pressure sensor
    Airspeed = 2,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TemperatureSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Default => defmt::write!(fmt, "default"),
            Self::ExternalBaro => defmt::write!(fmt, "external baro"),
            Self::Airspeed => defmt::write!(fmt, "airspeed"),
        }
    }
}

/// Latest temperature from the differential pressure (airspeed) sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirspeedTemperature {
    /// Measurement time (ms)
    pub timestamp_sample: Timestamp,
    /// Air temperature (°C)
    pub temperature: f32,
}

/// Pick the ambient temperature for an output record
pub fn ambient_temperature(
    now: Timestamp,
    baro_temperature: f32,
    external: bool,
    airspeed: Option<&AirspeedTemperature>,
) -> (f32, TemperatureSource) {
    let (temperature, source) = match airspeed {
        Some(sample)
            if elapsed_ms(sample.timestamp_sample, now) < AIRSPEED_TEMPERATURE_MAX_AGE_MS
                && sample.temperature.is_finite() =>
        {
            (sample.temperature, TemperatureSource::Airspeed)
        }
        _ if external && baro_temperature.is_finite() => (baro_temperature, TemperatureSource::ExternalBaro),
        _ => (DEFAULT_TEMPERATURE_C, TemperatureSource::Default),
    };

    (temperature.clamp(AMBIENT_TEMPERATURE_MIN_C, AMBIENT_TEMPERATURE_MAX_C), source)
}
