//! Physical Constants for Air-Data Computation
//!
//! International Standard Atmosphere values used by the default
//! [`StandardAtmosphere`](crate::atmosphere::StandardAtmosphere) model and by
//! the air-density computation.

// ===== STANDARD ATMOSPHERE =====

/// Standard atmospheric pressure at sea level (hPa).
///
/// Default QNH when no local setting has been configured.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

/// Pascals per hectopascal.
pub const PA_PER_HPA: f32 = 100.0;

/// Standard temperature at sea level (K).
///
/// Source: ISA, 15 °C at mean sea level
pub const SEA_LEVEL_TEMPERATURE_K: f32 = 288.15;

/// Temperature gradient in the troposphere (K/m).
///
/// Negative: temperature drops 6.5 K per kilometre of climb.
///
/// Source: ISA troposphere lapse rate
pub const TEMPERATURE_GRADIENT_K_PER_M: f32 = -6.5 / 1000.0;

/// Specific gas constant of dry air (J/(kg·K)).
///
/// Source: ISA (R / M = 8.31432 / 0.0289644)
pub const AIR_GAS_CONSTANT_J_PER_KG_K: f32 = 287.1;

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY_M_PER_S2: f32 = 9.80665;

/// Absolute zero in Celsius (°C).
///
/// Source: NIST Special Publication 330 (2019)
pub const ABSOLUTE_ZERO_CELSIUS: f32 = -273.15;

// ===== AMBIENT TEMPERATURE =====

/// Temperature assumed when no trustworthy ambient source exists (°C).
///
/// Internal barometers sit on the flight controller board and read board
/// temperature, not air temperature.
pub const DEFAULT_TEMPERATURE_C: f32 = 15.0;

/// Lower clamp for the ambient temperature used in density (°C).
pub const AMBIENT_TEMPERATURE_MIN_C: f32 = -60.0;

/// Upper clamp for the ambient temperature used in density (°C).
pub const AMBIENT_TEMPERATURE_MAX_C: f32 = 60.0;

// ===== SEA-LEVEL PRESSURE SETTING =====

/// Lowest QNH accepted from configuration (hPa).
///
/// Below the lowest pressure ever recorded at sea level (870 hPa).
pub const QNH_MIN_HPA: f32 = 500.0;

/// Highest QNH accepted from configuration (hPa).
pub const QNH_MAX_HPA: f32 = 1500.0;
