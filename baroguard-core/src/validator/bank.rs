//! Validator bank: ranking and failover detection across instances

use core::fmt;

use super::data_validator::{DataValidator, VALIDATOR_DIMENSIONS};
use super::flags::FaultFlags;
use super::ValidatorConfig;
use crate::constants::buffers::MAX_SENSOR_COUNT;
use crate::time::Timestamp;

/// One validator per instance slot plus best-instance bookkeeping
#[derive(Debug, Clone)]
pub struct ValidatorBank {
    validators: [DataValidator; MAX_SENSOR_COUNT],
    states: [FaultFlags; MAX_SENSOR_COUNT],
    previous_states: [FaultFlags; MAX_SENSOR_COUNT],
    current_best: Option<usize>,
    failover_count: u32,
    failover_index: Option<usize>,
}

impl ValidatorBank {
    /// Bank of unregistered validators sharing `config`
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            validators: core::array::from_fn(|_| DataValidator::new(config)),
            states: [FaultFlags::NO_DATA; MAX_SENSOR_COUNT],
            previous_states: [FaultFlags::empty(); MAX_SENSOR_COUNT],
            current_best: None,
            failover_count: 0,
            failover_index: None,
        }
    }

    /// Apply new thresholds to every validator, keeping their history
    pub fn set_config(&mut self, config: ValidatorConfig) {
        for validator in self.validators.iter_mut() {
            validator.set_config(config);
        }
    }

    /// Register the validator of a slot before its first sample
    ///
    /// Returns `false` if the slot does not exist or is already registered.
    pub fn add_validator(&mut self, instance: usize) -> bool {
        match self.validators.get_mut(instance) {
            Some(validator) if !validator.used() => {
                validator.register();
                true
            }
            _ => false,
        }
    }

    /// Drop the history of a slot taken over by a new device
    pub fn reset_validator(&mut self, instance: usize) {
        if let Some(validator) = self.validators.get_mut(instance) {
            validator.reset();
            self.states[instance] = FaultFlags::NO_DATA;
            self.previous_states[instance] = FaultFlags::empty();
        }
    }

    /// Feed one sample of an instance; out-of-range slots are ignored
    pub fn put(
        &mut self,
        instance: usize,
        timestamp: Timestamp,
        values: [f32; VALIDATOR_DIMENSIONS],
        error_count: u64,
        priority: i32,
    ) {
        if let Some(validator) = self.validators.get_mut(instance) {
            validator.put(timestamp, values, error_count, priority);
        }
    }

    /// Evaluate every validator and return the instance to trust
    ///
    /// Fault-free instances are ranked by priority, lowest index on ties.
    /// With no fault-free instance the previous best is returned unchanged.
    pub fn get_best(&mut self, now: Timestamp) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;

        for (index, validator) in self.validators.iter_mut().enumerate() {
            if !validator.used() {
                self.states[index] = FaultFlags::NO_DATA;
                continue;
            }

            let state = validator.evaluate(now);
            self.states[index] = state;

            if state.is_empty() {
                let priority = validator.priority();
                match best {
                    Some((_, best_priority)) if priority <= best_priority => {}
                    _ => best = Some((index, priority)),
                }
            }
        }

        if let Some(current) = self.current_best {
            if !self.states[current].is_empty() && self.previous_states[current].is_empty() {
                self.failover_count += 1;
                self.failover_index = Some(current);
            }
        }

        self.previous_states = self.states;

        if let Some((index, _)) = best {
            self.current_best = Some(index);
        }

        self.current_best
    }

    /// Number of failovers detected so far
    pub fn failover_count(&self) -> u32 {
        self.failover_count
    }

    /// Instance involved in the latest failover, if it is still faulted
    pub fn failover_index(&self) -> Option<usize> {
        self.failover_index.filter(|&index| !self.states[index].is_empty())
    }

    /// Current flags of the instance involved in the latest failover
    pub fn failover_state(&self) -> FaultFlags {
        self.failover_index()
            .map(|index| self.states[index])
            .unwrap_or_default()
    }

    /// Best instance from the last evaluation
    pub fn current_best(&self) -> Option<usize> {
        self.current_best
    }

    /// Flags of an instance from the last evaluation
    ///
    /// Unregistered or out-of-range slots report `NO_DATA`.
    pub fn sensor_state(&self, instance: usize) -> FaultFlags {
        match self.validators.get(instance) {
            Some(validator) if validator.used() => self.states[instance],
            _ => FaultFlags::NO_DATA,
        }
    }

    /// Priority the instance last reported
    pub fn sensor_priority(&self, instance: usize) -> i32 {
        self.validators.get(instance).map_or(0, DataValidator::priority)
    }

    /// Validator of a slot, for diagnostics
    pub fn validator(&self, instance: usize) -> Option<&DataValidator> {
        self.validators.get(instance)
    }
}

impl Default for ValidatorBank {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl fmt::Display for ValidatorBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validator bank: failovers {}", self.failover_count)?;

        for (index, validator) in self.validators.iter().enumerate() {
            if !validator.used() {
                continue;
            }

            let best = if self.current_best == Some(index) { "*" } else { " " };
            writeln!(
                f,
                "{}#{} prio {:>3} conf {:.2} err {:>5} rms {:.3} {:.3} {:.3} state {}",
                best,
                index,
                validator.priority(),
                validator.confidence(),
                validator.error_count(),
                validator.rms()[0],
                validator.rms()[1],
                validator.rms()[2],
                self.states[index],
            )?;
        }

        Ok(())
    }
}
