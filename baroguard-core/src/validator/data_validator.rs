//! Single-sensor fault detector
//!
//! One [`DataValidator`] watches one barometer instance. It never looks at
//! other sensors; ranking across instances is done by the
//! [`ValidatorBank`](super::ValidatorBank).
//!
//! ## Checks
//!
//! Evaluated in this order, all of them every cycle:
//!
//! ```text
//! registered, never fed         → NO_DATA
//! now > last sample + timeout   → TIMEOUT
//! value frozen for N samples    → STALE_DATA
//! driver error count > limit    → HIGH_ERROR_COUNT
//! error density > window        → HIGH_ERROR_DENSITY
//! ```
//!
//! ## Error Density
//!
//! Drivers report a monotonically increasing error counter. The density
//! rises by the counter increment and decays by one for every clean
//! sample, so sporadic bus errors heal while a burst trips the flag:
//!
//! ```text
//! density += error_count - last_error_count   (new errors)
//! density -= 1                                 (clean sample, floor 0)
//! confidence = 1 - density / window
//! ```
//!
//! ## Signal Statistics
//!
//! Each data channel (pressure, temperature, altitude) keeps a Welford
//! running variance of the sample relative to the first sample. The RMS is
//! diagnostic only and does not feed the ranking.

use libm::{fabsf, sqrtf};

use super::flags::FaultFlags;
use super::ValidatorConfig;
use crate::time::Timestamp;

/// Number of data channels per sample: pressure, temperature, altitude
pub const VALIDATOR_DIMENSIONS: usize = 3;

/// Fault detector and statistics for one instance
#[derive(Debug, Clone)]
pub struct DataValidator {
    config: ValidatorConfig,
    used: bool,
    time_last: Option<Timestamp>,
    event_count: u64,
    error_count: u64,
    error_density: f32,
    priority: i32,
    value: [f32; VALIDATOR_DIMENSIONS],
    first: [f32; VALIDATOR_DIMENSIONS],
    mean: [f32; VALIDATOR_DIMENSIONS],
    m2: [f32; VALIDATOR_DIMENSIONS],
    rms: [f32; VALIDATOR_DIMENSIONS],
    value_equal_count: u32,
    state: FaultFlags,
    confidence: f32,
}

impl DataValidator {
    /// Unregistered validator without history
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            used: false,
            time_last: None,
            event_count: 0,
            error_count: 0,
            error_density: 0.0,
            priority: 0,
            value: [0.0; VALIDATOR_DIMENSIONS],
            first: [0.0; VALIDATOR_DIMENSIONS],
            mean: [0.0; VALIDATOR_DIMENSIONS],
            m2: [0.0; VALIDATOR_DIMENSIONS],
            rms: [0.0; VALIDATOR_DIMENSIONS],
            value_equal_count: 0,
            state: FaultFlags::NO_DATA,
            confidence: 0.0,
        }
    }

    /// Mark the validator as watching a live instance
    pub fn register(&mut self) {
        self.used = true;
    }

    /// Forget all history, keeping the configuration
    ///
    /// Used when a slot is taken over by a different device.
    pub fn reset(&mut self) {
        let config = self.config;
        *self = Self::new(config);
    }

    /// Replace the thresholds, keeping the history
    pub fn set_config(&mut self, config: ValidatorConfig) {
        self.config = config;
    }

    /// Feed one sample
    pub fn put(
        &mut self,
        timestamp: Timestamp,
        values: [f32; VALIDATOR_DIMENSIONS],
        error_count: u64,
        priority: i32,
    ) {
        self.used = true;
        self.event_count += 1;

        if error_count > self.error_count {
            self.error_density += (error_count - self.error_count) as f32;
        } else if self.error_density > 0.0 {
            self.error_density = (self.error_density - 1.0).max(0.0);
        }

        self.error_count = error_count;
        self.priority = priority;

        let first_sample = self.time_last.is_none();

        for i in 0..VALIDATOR_DIMENSIONS {
            if first_sample {
                self.first[i] = values[i];
                self.mean[i] = 0.0;
                self.m2[i] = 0.0;
            } else {
                let relative = values[i] - self.first[i];
                let delta = relative - self.mean[i];
                self.mean[i] += delta / self.event_count as f32;
                self.m2[i] += delta * (relative - self.mean[i]);
                self.rms[i] = sqrtf(self.m2[i] / (self.event_count - 1) as f32);
            }
        }

        if first_sample {
            self.value_equal_count = 0;
        } else if fabsf(self.value[0] - values[0]) < self.config.stale_epsilon {
            self.value_equal_count = self.value_equal_count.saturating_add(1);
        } else {
            self.value_equal_count = 0;
        }

        self.value = values;
        self.time_last = Some(timestamp);
    }

    /// Recompute the fault flags and confidence for `now`
    pub fn evaluate(&mut self, now: Timestamp) -> FaultFlags {
        let mut state = FaultFlags::empty();

        match self.time_last {
            None => state.set(FaultFlags::NO_DATA),
            Some(last) if now > last + self.config.timeout_ms => state.set(FaultFlags::TIMEOUT),
            Some(_) => {}
        }

        if self.value_equal_count > self.config.stale_equal_count_limit {
            state.set(FaultFlags::STALE_DATA);
        }

        if self.error_count > self.config.error_count_limit {
            state.set(FaultFlags::HIGH_ERROR_COUNT);
        }

        if self.error_density > self.config.error_density_window {
            state.set(FaultFlags::HIGH_ERROR_DENSITY);
            self.error_density = self.config.error_density_window;
        }

        self.confidence = if state.is_empty() {
            (1.0 - self.error_density / self.config.error_density_window).max(0.0)
        } else {
            0.0
        };

        self.state = state;
        state
    }

    /// Registered or fed at least once
    pub fn used(&self) -> bool {
        self.used
    }

    /// Flags from the last evaluation
    pub fn state(&self) -> FaultFlags {
        self.state
    }

    /// Priority passed with the latest sample
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Confidence from the last evaluation, 0 when faulted
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Latest driver error counter
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Current error density
    pub fn error_density(&self) -> f32 {
        self.error_density
    }

    /// Time after which the validator times out, if it has ever been fed
    pub fn deadline(&self) -> Option<Timestamp> {
        self.time_last.map(|t| t + self.config.timeout_ms)
    }

    /// Time of the latest sample
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.time_last
    }

    /// Latest sample
    pub fn value(&self) -> &[f32; VALIDATOR_DIMENSIONS] {
        &self.value
    }

    /// Per-channel RMS about the running mean
    pub fn rms(&self) -> &[f32; VALIDATOR_DIMENSIONS] {
        &self.rms
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}
