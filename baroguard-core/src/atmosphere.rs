//! Pressure/Altitude Conversion
//!
//! ## Overview
//!
//! The engine does not hard-wire any atmosphere physics. Everything that
//! turns a pressure into an altitude goes through the [`AltitudeModel`]
//! trait so the flight stack can plug in its own formula module. The only
//! property the engine relies on is monotonicity: altitude strictly
//! decreases as pressure increases. The absolute calibration search uses
//! that to decide which half of its bracket to keep.
//!
//! ## Standard Atmosphere
//!
//! [`StandardAtmosphere`] is the default model, the hypsometric form of the
//! ISA troposphere:
//!
//! ```text
//! h = T₀ / L × ((P / P₀)^(−R×L / g) − 1)
//!
//! Where:
//! - T₀ = 288.15 K        (sea-level temperature)
//! - L  = −0.0065 K/m     (temperature gradient)
//! - R  = 287.1 J/(kg·K)  (specific gas constant of dry air)
//! - g  = 9.80665 m/s²
//! - P₀ = sea-level pressure (QNH), in Pa
//! ```
//!
//! Air density follows from the ideal gas law:
//!
//! ```text
//! ρ = P / (R × T)
//! ```
//!
//! `libm::powf` keeps the module usable without `std`.

use crate::constants::physics::{
    ABSOLUTE_ZERO_CELSIUS, AIR_GAS_CONSTANT_J_PER_KG_K, SEA_LEVEL_TEMPERATURE_K,
    STANDARD_GRAVITY_M_PER_S2, TEMPERATURE_GRADIENT_K_PER_M,
};

/// Pressure-to-altitude formula consumed by the engine
///
/// Implementations must be strictly decreasing in `pressure_pa` for a fixed
/// `sea_level_pa`.
pub trait AltitudeModel {
    /// Altitude (m) for a static pressure, given the sea-level pressure (both Pa)
    fn altitude(&self, pressure_pa: f32, sea_level_pa: f32) -> f32;
}

/// International Standard Atmosphere, troposphere only
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StandardAtmosphere;

impl AltitudeModel for StandardAtmosphere {
    fn altitude(&self, pressure_pa: f32, sea_level_pa: f32) -> f32 {
        altitude_from_pressure(pressure_pa, sea_level_pa)
    }
}

impl<F> AltitudeModel for F
where
    F: Fn(f32, f32) -> f32,
{
    fn altitude(&self, pressure_pa: f32, sea_level_pa: f32) -> f32 {
        self(pressure_pa, sea_level_pa)
    }
}

/// ISA altitude (m) from static pressure and sea-level pressure (Pa)
pub fn altitude_from_pressure(pressure_pa: f32, sea_level_pa: f32) -> f32 {
    let pressure_ratio = pressure_pa / sea_level_pa;
    let exponent = -(AIR_GAS_CONSTANT_J_PER_KG_K * TEMPERATURE_GRADIENT_K_PER_M) / STANDARD_GRAVITY_M_PER_S2;

    (libm::powf(pressure_ratio, exponent) * SEA_LEVEL_TEMPERATURE_K - SEA_LEVEL_TEMPERATURE_K)
        / TEMPERATURE_GRADIENT_K_PER_M
}

/// ISA static pressure (Pa) at an altitude (m), inverse of [`altitude_from_pressure`]
pub fn pressure_from_altitude(altitude_m: f32, sea_level_pa: f32) -> f32 {
    let exponent = -STANDARD_GRAVITY_M_PER_S2 / (AIR_GAS_CONSTANT_J_PER_KG_K * TEMPERATURE_GRADIENT_K_PER_M);
    let temperature_ratio =
        (SEA_LEVEL_TEMPERATURE_K + TEMPERATURE_GRADIENT_K_PER_M * altitude_m) / SEA_LEVEL_TEMPERATURE_K;

    sea_level_pa * libm::powf(temperature_ratio, exponent)
}

/// Dry-air density (kg/m³) from pressure (Pa) and temperature (°C)
pub fn density_from_pressure_and_temp(pressure_pa: f32, temperature_c: f32) -> f32 {
    pressure_pa / (AIR_GAS_CONSTANT_J_PER_KG_K * (temperature_c - ABSOLUTE_ZERO_CELSIUS))
}
