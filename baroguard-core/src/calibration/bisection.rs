//! Bounded bisection for the absolute pressure offset
//!
//! Solves for `x` in
//!
//! ```text
//! altitude(p - x) = target    (within tolerance)
//! ```
//!
//! Altitude falls as pressure rises, so a computed altitude above the
//! target means too much was subtracted and the upper half of the bracket
//! is dropped; below the target drops the lower half. The iteration cap
//! bounds the worst-case cost inside the real-time cycle.

use crate::atmosphere::AltitudeModel;
use crate::constants::calibration::{
    OFFSET_SEARCH_MAX_ITERATIONS, OFFSET_SEARCH_MAX_PA, OFFSET_SEARCH_MIN_PA, OFFSET_SEARCH_TOLERANCE_M,
};
use crate::errors::{CalibrationError, CalibrationResult};

/// Search bracket and stopping criteria
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetSearch {
    /// Lowest offset considered (Pa)
    pub lower: f32,
    /// Highest offset considered (Pa)
    pub upper: f32,
    /// Accepted altitude error (m)
    pub tolerance: f32,
    /// Iteration cap
    pub max_iterations: u32,
}

/// Converged search result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Offset to add to the existing offsets (Pa)
    pub offset: f32,
    /// Iterations used
    pub iterations: u32,
    /// Remaining altitude error (m)
    pub residual: f32,
}

impl Default for OffsetSearch {
    fn default() -> Self {
        Self {
            lower: OFFSET_SEARCH_MIN_PA,
            upper: OFFSET_SEARCH_MAX_PA,
            tolerance: OFFSET_SEARCH_TOLERANCE_M,
            max_iterations: OFFSET_SEARCH_MAX_ITERATIONS,
        }
    }
}

impl OffsetSearch {
    /// Find the offset that brings `pressure_pa` onto `target_altitude_m`
    ///
    /// Returns `NotConverged` when the cap is hit, which includes targets
    /// outside the bracket.
    pub fn solve<M: AltitudeModel + ?Sized>(
        &self,
        model: &M,
        pressure_pa: f32,
        sea_level_pa: f32,
        target_altitude_m: f32,
    ) -> CalibrationResult<SearchOutcome> {
        let mut low = self.lower;
        let mut high = self.upper;
        let mut residual = f32::NAN;

        for iteration in 0..self.max_iterations {
            let mid = low + (high - low) / 2.0;
            let altitude = model.altitude(pressure_pa - mid, sea_level_pa);
            residual = altitude - target_altitude_m;

            if residual > self.tolerance {
                high = mid;
            } else if residual < -self.tolerance {
                low = mid;
            } else {
                return Ok(SearchOutcome {
                    offset: mid,
                    iterations: iteration + 1,
                    residual,
                });
            }
        }

        Err(CalibrationError::NotConverged {
            iterations: self.max_iterations,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{pressure_from_altitude, StandardAtmosphere};
    use proptest::prelude::*;

    const QNH_PA: f32 = 101_325.0;

    #[test]
    fn finds_known_offset() {
        // sensor reads 120 Pa high at 500 m
        let true_pressure = pressure_from_altitude(500.0, QNH_PA);
        let outcome = OffsetSearch::default()
            .solve(&StandardAtmosphere, true_pressure + 120.0, QNH_PA, 500.0)
            .unwrap();

        assert!((outcome.offset - 120.0).abs() < 2.0);
        assert!(outcome.residual.abs() <= 0.1);
        assert!(outcome.iterations <= 100);
    }

    #[test]
    fn zero_offset_when_already_aligned() {
        let pressure = pressure_from_altitude(0.0, QNH_PA);
        let outcome = OffsetSearch::default()
            .solve(&StandardAtmosphere, pressure, QNH_PA, 0.0)
            .unwrap();
        assert_eq!(outcome.offset, 0.0);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn accepted_residual_stays_within_tolerance() {
        // rounding of `target ± tolerance` at this altitude used to let a
        // midpoint 0.1001 m off through
        let altitude = 3_053.970_7;
        let measured = pressure_from_altitude(altitude, QNH_PA) + 3_565.334_5;
        let outcome = OffsetSearch::default()
            .solve(&StandardAtmosphere, measured, QNH_PA, altitude)
            .unwrap();

        let corrected = StandardAtmosphere.altitude(measured - outcome.offset, QNH_PA);
        assert!((corrected - altitude).abs() <= 0.1);
        assert!(outcome.residual.abs() <= 0.1);
    }

    #[test]
    fn unreachable_target_does_not_converge() {
        let linear = |p: f32, p0: f32| (p0 - p) * 0.1;
        // reachable altitudes span (0 ± 10000) * 0.1 around p == p0
        let result = OffsetSearch::default().solve(&linear, QNH_PA, QNH_PA, 5_000.0);
        assert!(matches!(result, Err(CalibrationError::NotConverged { iterations: 100, .. })));
    }

    #[test]
    fn iteration_cap_is_respected() {
        let search = OffsetSearch { max_iterations: 3, ..OffsetSearch::default() };
        let pressure = pressure_from_altitude(100.0, QNH_PA);
        let result = search.solve(&StandardAtmosphere, pressure + 777.0, QNH_PA, 100.0);
        assert!(matches!(result, Err(CalibrationError::NotConverged { iterations: 3, .. })));
    }

    proptest! {
        #[test]
        fn converges_for_targets_in_bracket(
            altitude in -300.0f32..4_000.0,
            true_offset in -8_000.0f32..8_000.0,
        ) {
            let true_pressure = pressure_from_altitude(altitude, QNH_PA);
            let measured = true_pressure + true_offset;

            let outcome = OffsetSearch::default()
                .solve(&StandardAtmosphere, measured, QNH_PA, altitude)
                .unwrap();

            let corrected = StandardAtmosphere.altitude(measured - outcome.offset, QNH_PA);
            prop_assert!((corrected - altitude).abs() <= 0.1);
            prop_assert!(outcome.iterations <= 100);
        }

        #[test]
        fn converges_for_any_monotonic_model(
            target in -900.0f32..900.0,
            slope in 0.05f32..2.0,
        ) {
            let model = move |p: f32, p0: f32| (p0 - p) * slope;
            let outcome = OffsetSearch::default().solve(&model, QNH_PA, QNH_PA, target);

            // reachable: |target| < 10000 * slope
            if target.abs() < 10_000.0 * slope - 1.0 {
                let outcome = outcome.unwrap();
                prop_assert!((model.altitude(QNH_PA - outcome.offset, QNH_PA) - target).abs() <= 0.1);
            }
        }
    }
}
