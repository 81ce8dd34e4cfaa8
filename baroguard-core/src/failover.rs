//! Failover Reporting
//!
//! The [`ValidatorBank`] only counts failovers. This module turns a new
//! failover into two actions:
//!
//! - **Demotion**: the failed instance drops to priority 1, the lowest
//!   priority that still keeps it enabled. It can win the vote again only
//!   when nothing better is fault-free.
//! - **Alert**: a [`FaultReport`] naming the instance and its fault
//!   reasons. Alerts are rate-limited to one per 3 s; demotion is not.
//!
//! A failover whose instance has already recovered by the time the check
//! runs produces neither.

use core::fmt;

use crate::constants::buffers::MAX_SENSOR_COUNT;
use crate::constants::timing::FAULT_REPORT_INTERVAL_MS;
use crate::time::Timestamp;
use crate::validator::{FaultFlags, ValidatorBank};

/// Operator alert for a failed instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultReport {
    /// Slot of the failed instance
    pub instance: usize,
    /// Device occupying the slot
    pub device_id: u32,
    /// Fault reasons at detection
    pub reasons: FaultFlags,
    /// Detection time (ms)
    pub timestamp: Timestamp,
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Baro #{} failed:", self.instance)?;
        for name in self.reasons.names() {
            write!(f, " {}", name)?;
        }
        write!(f, "!")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FaultReport {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Baro #{} failed: {} (device {})",
            self.instance,
            self.reasons,
            self.device_id
        )
    }
}

/// Result of one failover check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailoverOutcome {
    /// Instance to demote to the minimum priority
    pub demote: Option<usize>,
    /// Alert to forward, if not rate-limited
    pub report: Option<FaultReport>,
}

/// Tracks which failovers have been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailoverReporter {
    last_failover_count: u32,
    last_report: Option<Timestamp>,
}

impl FailoverReporter {
    /// No failover seen yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle failovers the bank detected since the previous check
    ///
    /// `device_id` maps a slot to the device occupying it.
    pub fn check(
        &mut self,
        now: Timestamp,
        bank: &ValidatorBank,
        device_id: impl Fn(usize) -> u32,
    ) -> FailoverOutcome {
        let mut outcome = FailoverOutcome::default();

        if bank.failover_count() == self.last_failover_count {
            return outcome;
        }
        self.last_failover_count = bank.failover_count();

        let reasons = bank.failover_state();
        let Some(instance) = bank.failover_index().filter(|&i| i < MAX_SENSOR_COUNT) else {
            return outcome;
        };
        if reasons.is_empty() {
            return outcome;
        }

        outcome.demote = Some(instance);

        let due = self
            .last_report
            .map_or(true, |last| now > last + FAULT_REPORT_INTERVAL_MS);

        if due {
            let report = FaultReport { instance, device_id: device_id(instance), reasons, timestamp: now };
            log_error!("{}", report);
            outcome.report = Some(report);
            self.last_report = Some(now);
        }

        outcome
    }

    /// Time of the last forwarded alert
    pub fn last_report(&self) -> Option<Timestamp> {
        self.last_report
    }
}
