//! Relative calibration: align secondary instances to the primary
//!
//! Static biases between sensors (port placement, manufacturing spread)
//! show up as a constant pressure difference. Averaged over the current
//! output window:
//!
//! ```text
//! new_offset_k = avg_pressure_k - avg_pressure_primary + offset_k
//! ```
//!
//! The averages are of corrected pressure, so the existing offset is folded
//! back in and the result is the full raw difference. Running the step
//! twice on static input leaves the offsets unchanged.

use super::{CalibrationWrite, CalibrationWrites};
use crate::constants::timing::RELATIVE_CALIBRATION_DELAY_MS;
use crate::errors::{CalibrationError, CalibrationResult};
use crate::sensor::SensorSlot;
use crate::time::{elapsed_ms, Timestamp};

/// One relative calibration attempt
///
/// The first call only records `now` in `t_first`; offsets are computed
/// once more than a second has passed. Returns the number of secondaries
/// whose offset was updated.
pub fn update_relative(
    now: Timestamp,
    t_first: &mut Option<Timestamp>,
    primary: usize,
    slots: &mut [SensorSlot],
    writes: &mut CalibrationWrites,
) -> CalibrationResult<usize> {
    let start = *t_first.get_or_insert(now);

    if elapsed_ms(start, now) <= RELATIVE_CALIBRATION_DELAY_MS {
        return Err(CalibrationError::Pending { reason: "driver start-up delay" });
    }

    let pressure_primary = slots
        .get(primary)
        .and_then(|slot| slot.accumulator.mean_pressure())
        .ok_or(CalibrationError::NoPrimaryData)?;

    let mut updated = 0;

    for (instance, slot) in slots.iter_mut().enumerate() {
        if instance == primary || slot.device_id() == 0 {
            continue;
        }

        let Some(pressure_secondary) = slot.accumulator.mean_pressure() else {
            continue;
        };

        let new_offset = pressure_secondary - pressure_primary + slot.calibration.offset();
        slot.calibration.set_offset(new_offset);

        log_info!(
            "baro #{} relative offset {:.2} Pa (device {})",
            instance,
            new_offset,
            slot.device_id()
        );

        // capacity covers every slot twice
        let _ = writes.push(CalibrationWrite { instance, entry: slot.calibration.entry() });
        updated += 1;
    }

    Ok(updated)
}
