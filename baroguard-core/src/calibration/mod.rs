//! Offset Calibration
//!
//! ## Overview
//!
//! Two calibrations run one after the other, at most one step per cycle:
//!
//! 1. **Relative**: align every secondary instance to the primary, so a
//!    failover does not produce an altitude step.
//! 2. **Absolute**: once relative is done (and autocal is enabled), shift
//!    every instance by a common offset so the primary agrees with an
//!    external altitude reference.
//!
//! ```text
//!           ┌──────────────┐  done   ┌──────────────┐  done
//!  cycle ──►│   relative   ├────────►│   absolute   ├────────► idle
//!           └──────┬───────┘         └──────┬───────┘
//!                  │ rearm (selection       │ autocal off
//!                  │ or device change)      ▼
//!                  ◄─────────────────────  idle
//! ```
//!
//! Every offset change is returned as a [`CalibrationWrite`] so the caller
//! can persist it; the engine also folds the writes back into its own
//! configuration snapshot.
//!
//! ## Components
//!
//! - [`update_relative`]: primary/secondary pressure alignment
//! - [`AbsoluteCalibration`]: filtered baro/reference delta with stability gate
//! - [`OffsetSearch`]: bounded bisection for the absolute offset
//! - [`LowPassFilter`]: single-pole filter used by the absolute stage

mod absolute;
mod bisection;
mod filter;
mod relative;

pub use absolute::{AbsoluteCalibration, ReferenceSample};
pub use bisection::{OffsetSearch, SearchOutcome};
pub use filter::LowPassFilter;
pub use relative::update_relative;

use heapless::Vec;

use crate::atmosphere::AltitudeModel;
use crate::config::CalibrationEntry;
use crate::constants::buffers::MAX_SENSOR_COUNT;
use crate::errors::{CalibrationError, CalibrationResult};
use crate::sensor::SensorSlot;
use crate::time::Timestamp;

/// Calibration entry to persist for a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationWrite {
    /// Slot the entry was computed for
    pub instance: usize,
    /// Entry to store
    pub entry: CalibrationEntry,
}

/// Writes produced by one cycle: a device registration and one
/// calibration step per slot at most
pub type CalibrationWrites = Vec<CalibrationWrite, { 2 * MAX_SENSOR_COUNT }>;

/// Progress of both calibrations
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationState {
    relative_done: bool,
    absolute_done: bool,
    calibration_t_first: Option<Timestamp>,
    absolute: AbsoluteCalibration,
}

impl CalibrationState {
    /// Nothing calibrated yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Run relative calibration again (new primary or new device)
    ///
    /// Any absolute window in progress is dropped with it, so both of its
    /// snapshots come from the same primary.
    pub fn rearm_relative(&mut self) {
        self.relative_done = false;
        self.calibration_t_first = None;
        self.absolute.reset();
    }

    /// Relative calibration finished for the current arming
    pub fn relative_done(&self) -> bool {
        self.relative_done
    }

    /// Absolute offset solved and applied
    pub fn absolute_done(&self) -> bool {
        self.absolute_done
    }

    /// Start of the current calibration window
    pub fn calibration_t_first(&self) -> Option<Timestamp> {
        self.calibration_t_first
    }

    /// Absolute calibration window
    pub fn absolute(&self) -> &AbsoluteCalibration {
        &self.absolute
    }

    /// Advance whichever calibration is due
    ///
    /// Returns the number of slots whose offset changed. `Ok(0)` means
    /// there is nothing left to do.
    #[allow(clippy::too_many_arguments)]
    pub fn step<M: AltitudeModel + ?Sized>(
        &mut self,
        now: Timestamp,
        model: &M,
        primary: usize,
        slots: &mut [SensorSlot],
        reference: Option<&ReferenceSample>,
        autocal_enabled: bool,
        sea_level_pa: f32,
        writes: &mut CalibrationWrites,
    ) -> CalibrationResult<usize> {
        if !self.relative_done {
            let updated = update_relative(now, &mut self.calibration_t_first, primary, slots, writes)?;
            self.relative_done = true;
            log_info!("relative baro calibration done ({} instances)", updated);
            return Ok(updated);
        }

        if self.absolute_done || !autocal_enabled {
            return Ok(0);
        }

        let reference = reference.ok_or(CalibrationError::Pending { reason: "no reference sample" })?;
        let pressure_primary = slots.get(primary).and_then(|slot| slot.accumulator.mean_pressure());

        let outcome = self.absolute.update(
            model,
            reference,
            &mut self.calibration_t_first,
            pressure_primary,
            sea_level_pa,
        )?;

        let mut updated = 0;
        for (instance, slot) in slots.iter_mut().enumerate() {
            if slot.device_id() == 0 || slot.accumulator.is_empty() {
                continue;
            }

            slot.calibration.set_offset(slot.calibration.offset() + outcome.offset);
            let _ = writes.push(CalibrationWrite { instance, entry: slot.calibration.entry() });
            updated += 1;
        }

        self.absolute_done = true;
        log_info!(
            "absolute baro calibration {:.2} Pa after {} iterations",
            outcome.offset,
            outcome.iterations
        );

        Ok(updated)
    }
}
