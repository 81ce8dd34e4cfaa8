//! Absolute calibration against an external altitude reference
//!
//! ## Overview
//!
//! A GNSS receiver (or any other source of MSL altitude with a vertical
//! error estimate) tells us where the vehicle is. The difference between
//! the barometric altitude of the primary and the reference is low-pass
//! filtered and watched for drift; once it holds still a single pressure
//! offset is solved for and applied to every instance, on top of the
//! relative offsets.
//!
//! ## Observation Window
//!
//! ```text
//!  anchor   first good sample                     snapshot t1            stability check
//!    │            │◄──────────── 2 s ──────────────►│◄──────── 2 s ─────────►│
//!    ●────────────●──────────────────────────────────●────────────────────────●──► solve
//!    │       filter reset to Δ, alpha from          │                        │
//!    │       (first - anchor)                    t1 = lpf               |lpf - t1| <= 4 m
//! ```
//!
//! Any sample with a vertical error above 8 m throws the window (and the
//! `t1` snapshot) away and re-anchors. A drift above 4 m between the
//! snapshots does the same and also drops the anchor, so the next sample
//! only re-anchors.
//!
//! The window start is shared with the relative calibration, which is
//! why it is passed in rather than owned here.

use super::bisection::{OffsetSearch, SearchOutcome};
use super::filter::LowPassFilter;
use crate::atmosphere::AltitudeModel;
use crate::constants::calibration::{OFFSET_DRIFT_TOLERANCE_M, OFFSET_LPF_WINDOW_MS, REFERENCE_EPV_MAX_M};
use crate::errors::{CalibrationError, CalibrationResult};
use crate::time::{elapsed_ms, ms_to_s, Timestamp};

/// Altitude reference sample (GNSS or equivalent)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceSample {
    /// Time of the fix (ms)
    pub timestamp: Timestamp,
    /// Altitude above mean sea level (m)
    pub altitude_msl: f32,
    /// Vertical position error estimate (m)
    pub vertical_error: f32,
}

/// State of the baro/reference offset estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteCalibration {
    lpf: LowPassFilter,
    reference_t_first: Option<Timestamp>,
    offset_t1: Option<f32>,
    search: OffsetSearch,
}

impl Default for AbsoluteCalibration {
    fn default() -> Self {
        Self::new(OffsetSearch::default())
    }
}

impl AbsoluteCalibration {
    /// Idle estimator using `search` for the final solve
    pub fn new(search: OffsetSearch) -> Self {
        Self {
            lpf: LowPassFilter::new(),
            reference_t_first: None,
            offset_t1: None,
            search,
        }
    }

    /// Feed one reference sample
    ///
    /// `t_first` is the shared calibration window start. Returns the
    /// solved offset once the filtered delta has been stable for two
    /// windows; every other outcome is an error describing why no offset
    /// was produced this time.
    pub fn update<M: AltitudeModel + ?Sized>(
        &mut self,
        model: &M,
        reference: &ReferenceSample,
        t_first: &mut Option<Timestamp>,
        pressure_primary: Option<f32>,
        sea_level_pa: f32,
    ) -> CalibrationResult<SearchOutcome> {
        let pressure = pressure_primary.ok_or(CalibrationError::NoPrimaryData)?;
        let target = reference.altitude_msl;
        let delta = model.altitude(pressure, sea_level_pa) - target;

        // bad fix (or NaN error estimate) or no anchor yet
        let accurate = reference.vertical_error <= REFERENCE_EPV_MAX_M;
        let Some(anchor) = self.reference_t_first.filter(|_| accurate) else {
            *t_first = None;
            self.offset_t1 = None;
            self.reference_t_first = Some(reference.timestamp);

            return Err(if accurate {
                CalibrationError::Pending { reason: "reference anchor" }
            } else {
                CalibrationError::ReferenceInaccurate {
                    epv: reference.vertical_error,
                    limit: REFERENCE_EPV_MAX_M,
                }
            });
        };

        let start = match *t_first {
            Some(start) => {
                self.lpf.update(delta);
                start
            }
            None => {
                let dt = ms_to_s(elapsed_ms(anchor, reference.timestamp));
                self.lpf.set_parameters(dt, ms_to_s(OFFSET_LPF_WINDOW_MS));
                self.lpf.reset(delta);
                *t_first = Some(reference.timestamp);
                reference.timestamp
            }
        };

        let elapsed = elapsed_ms(start, reference.timestamp);

        match self.offset_t1 {
            None if elapsed > OFFSET_LPF_WINDOW_MS => {
                self.offset_t1 = Some(self.lpf.state());
                log_debug!("baro/reference delta snapshot {:.2} m", self.lpf.state());
                return Err(CalibrationError::Pending { reason: "stability window" });
            }
            Some(t1) if elapsed > 2 * OFFSET_LPF_WINDOW_MS => {
                let drift = libm::fabsf(self.lpf.state() - t1);

                if drift > OFFSET_DRIFT_TOLERANCE_M {
                    self.offset_t1 = None;
                    self.reference_t_first = None;
                    *t_first = None;
                    return Err(CalibrationError::Unstable { drift, tolerance: OFFSET_DRIFT_TOLERANCE_M });
                }
            }
            _ => return Err(CalibrationError::Pending { reason: "observation window" }),
        }

        match self.search.solve(model, pressure, sea_level_pa, target) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log_warn!("absolute baro calibration discarded: {}", e);
                self.reset();
                *t_first = None;
                Err(e)
            }
        }
    }

    /// Drop the observation window and the anchor
    pub fn reset(&mut self) {
        self.reference_t_first = None;
        self.offset_t1 = None;
    }

    /// Filtered baro minus reference altitude (m)
    pub fn filtered_delta(&self) -> f32 {
        self.lpf.state()
    }

    /// First delta snapshot, once taken
    pub fn offset_t1(&self) -> Option<f32> {
        self.offset_t1
    }

    /// Time of the reference sample the current window is anchored to
    pub fn anchor(&self) -> Option<Timestamp> {
        self.reference_t_first
    }
}
