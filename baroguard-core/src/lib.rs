//! Redundant barometer voting, failover and calibration for BaroGuard
//!
//! Fuses up to four barometer streams into one trusted air-data output.
//! Each cycle the engine votes for the most trustworthy instance, switches
//! over when it faults, aligns the instances to each other and, given an
//! external altitude reference, to the true altitude.
//!
//! Key constraints:
//! - Fixed-size state, no heap allocation in the cycle
//! - Bounded work per cycle (queue depth, bisection cap)
//! - Runs without `std` (disable default features)
//!
//! ```no_run
//! use baroguard_core::{AirDataConfig, AirDataEngine, CycleInput, SampleQueues, SystemTime};
//!
//! let mut engine = AirDataEngine::new(AirDataConfig::default()).unwrap();
//! let mut queues: SampleQueues = SampleQueues::new();
//! let clock = SystemTime::new();
//!
//! // driver callbacks push into `queues`, the scheduler calls:
//! let output = engine.run(&clock, &mut queues, CycleInput::default());
//! if let Some(record) = output.record {
//!     println!("{:.1} m from device {:#x}", record.altitude, record.device_id);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod atmosphere;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod failover;
pub mod records;
pub mod selection;
pub mod sensor;
pub mod source;
pub mod temperature;
pub mod time;
pub mod validator;

// Public API
pub use atmosphere::{AltitudeModel, StandardAtmosphere};
pub use calibration::{CalibrationWrite, ReferenceSample};
pub use config::{AirDataConfig, CalibrationEntry};
pub use engine::{AirDataEngine, CycleInput, CycleOutput};
pub use errors::{CalibrationError, CalibrationResult, ConfigError, ConfigResult};
pub use failover::FaultReport;
pub use records::{AirDataRecord, SensorsStatus};
pub use sensor::BaroSample;
pub use source::{SampleQueues, SampleSource};
pub use temperature::{AirspeedTemperature, TemperatureSource};
pub use time::{FixedTime, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::SystemTime;
pub use validator::FaultFlags;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
