//! Air-Data Engine
//!
//! ## Overview
//!
//! [`AirDataEngine`] owns every piece of cycle-to-cycle state and runs one
//! run-to-completion cycle per call. The caller schedules it (at least every
//! 50 ms, plus whenever a selected feed delivers data) and moves data in and
//! out through plain values: samples through a [`SampleSource`], everything
//! else through [`CycleInput`] and [`CycleOutput`].
//!
//! ## Cycle Order
//!
//! ```text
//! ┌─────────────┐  ┌────────┐  ┌──────┐  ┌────────┐  ┌───────────┐  ┌─────────┐  ┌──────────┐  ┌────────┐
//! │ parameters  ├─►│ drain  ├─►│ vote ├─►│ select ├─►│ calibrate ├─►│ publish ├─►│ failover ├─►│ status │
//! └─────────────┘  └────────┘  └──────┘  └────────┘  └───────────┘  └─────────┘  └──────────┘  └────────┘
//!   snapshot        ≤ 4 per     get_best   hysteresis   relative or    interval     demote +     per-slot
//!   applied         slot                                absolute       gated        alert        health
//! ```
//!
//! The order is fixed. Calibration reads the accumulators before publishing
//! resets them, and failover handling is skipped in a cycle that applied a
//! parameter snapshot so a priority restore and a demotion never race.
//!
//! ## Slot Lifecycle
//!
//! A slot is claimed by the first sample carrying a device id and is
//! reinitialised in place when a different id shows up. On its first
//! sample an enabled device is registered with the validator bank, its feed
//! starts waking the cycle (until something is selected), and a device
//! without a stored calibration gets a default entry persisted.
//!
//! ## Example
//!
//! ```rust
//! use baroguard_core::config::AirDataConfig;
//! use baroguard_core::engine::{AirDataEngine, CycleInput};
//! use baroguard_core::sensor::BaroSample;
//! use baroguard_core::source::SampleQueues;
//!
//! let mut engine = AirDataEngine::new(AirDataConfig::default())?;
//! let mut queues: SampleQueues = SampleQueues::new();
//!
//! for t in (0..=200).step_by(50) {
//!     queues.push(0, BaroSample {
//!         timestamp: t,
//!         timestamp_sample: t,
//!         device_id: 0x2a,
//!         pressure: 101_325.0 + (t % 3) as f32,
//!         temperature: 25.0,
//!         error_count: 0,
//!     });
//!     let output = engine.run_cycle(t, &mut queues, CycleInput::default());
//!     assert_eq!(output.next_wakeup, t + 50);
//! }
//!
//! assert_eq!(engine.selected(), Some(0));
//! # Ok::<(), baroguard_core::errors::ConfigError>(())
//! ```

use crate::atmosphere::{density_from_pressure_and_temp, AltitudeModel, StandardAtmosphere};
use crate::calibration::{CalibrationState, CalibrationWrite, CalibrationWrites, ReferenceSample};
use crate::config::AirDataConfig;
use crate::constants::buffers::{MAX_SENSOR_COUNT, SAMPLE_QUEUE_DEPTH};
use crate::constants::timing::{CYCLE_INTERVAL_MS, PUBLISH_MAX_SAMPLE_AGE_MS};
use crate::constants::validation::PRIORITY_MIN;
use crate::errors::{CalibrationError, ConfigResult};
use crate::failover::{FailoverReporter, FaultReport};
use crate::records::{AirDataRecord, SensorsStatus};
use crate::selection::{SelectionChange, SelectionController};
use crate::sensor::{BaroSample, SensorSlot};
use crate::source::SampleSource;
use crate::temperature::{ambient_temperature, AirspeedTemperature};
use crate::time::{TimeSource, Timestamp};
use crate::validator::ValidatorBank;

/// Everything besides barometer samples that a cycle may consume
#[derive(Debug, Clone, Default)]
pub struct CycleInput {
    /// New configuration snapshot, only when the stored parameters changed
    pub parameters: Option<AirDataConfig>,
    /// Estimator baro-fault flag, when the estimator published this cycle
    pub estimator_baro_fault: Option<bool>,
    /// Fresh external altitude reference
    pub reference: Option<ReferenceSample>,
    /// Fresh airspeed sensor temperature
    pub airspeed_temperature: Option<AirspeedTemperature>,
}

/// Everything a cycle produced
#[derive(Debug, Clone, Default)]
pub struct CycleOutput {
    /// Published air data of the selected instance
    pub record: Option<AirDataRecord>,
    /// Per-slot health, once an instance is selected
    pub status: Option<SensorsStatus>,
    /// Rate-limited operator alert
    pub fault_report: Option<FaultReport>,
    /// Calibration entries to persist
    pub calibration_writes: CalibrationWrites,
    /// Selection transition applied this cycle
    pub selection_change: Option<SelectionChange>,
    /// A configuration snapshot was applied this cycle
    pub parameter_update: bool,
    /// Latest time the next cycle should run
    pub next_wakeup: Timestamp,
}

/// Redundant barometer voting, failover and calibration engine
#[derive(Debug, Clone)]
pub struct AirDataEngine<M: AltitudeModel = StandardAtmosphere> {
    config: AirDataConfig,
    model: M,
    slots: [SensorSlot; MAX_SENSOR_COUNT],
    bank: ValidatorBank,
    selection: SelectionController,
    calibration: CalibrationState,
    failover: FailoverReporter,
    last_status_baro_fault: bool,
    airspeed_temperature: Option<AirspeedTemperature>,
}

impl AirDataEngine<StandardAtmosphere> {
    /// Engine with the standard atmosphere altitude model
    pub fn new(config: AirDataConfig) -> ConfigResult<Self> {
        Self::with_model(config, StandardAtmosphere)
    }
}

impl<M: AltitudeModel> AirDataEngine<M> {
    /// Engine with a custom altitude model
    pub fn with_model(config: AirDataConfig, model: M) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            bank: ValidatorBank::new(config.validator),
            config,
            model,
            slots: [SensorSlot::new(); MAX_SENSOR_COUNT],
            selection: SelectionController::new(),
            calibration: CalibrationState::new(),
            failover: FailoverReporter::new(),
            last_status_baro_fault: false,
            airspeed_temperature: None,
        })
    }

    /// Run one cycle at the clock's current time
    pub fn run<T: TimeSource + ?Sized, S: SampleSource>(
        &mut self,
        clock: &T,
        source: &mut S,
        input: CycleInput,
    ) -> CycleOutput {
        self.run_cycle(clock.now(), source, input)
    }

    /// Run one cycle at `now`
    pub fn run_cycle<S: SampleSource>(&mut self, now: Timestamp, source: &mut S, input: CycleInput) -> CycleOutput {
        let mut output = CycleOutput {
            next_wakeup: now + CYCLE_INTERVAL_MS,
            ..CycleOutput::default()
        };

        output.parameter_update = match input.parameters {
            Some(config) => self.parameters_update(config),
            None => false,
        };

        if let Some(airspeed) = input.airspeed_temperature {
            self.airspeed_temperature = Some(airspeed);
        }

        let mut updated = [false; MAX_SENSOR_COUNT];

        for (instance, slot_updated) in updated.iter_mut().enumerate() {
            for _ in 0..SAMPLE_QUEUE_DEPTH {
                let Some(sample) = source.poll(instance) else {
                    break;
                };

                if self.ingest(instance, &sample, input.estimator_baro_fault, &mut output.calibration_writes) {
                    *slot_updated = true;
                }
            }
        }

        if let Some(fault) = input.estimator_baro_fault {
            self.last_status_baro_fault = fault;
        }

        let best = self.bank.get_best(now);

        if let Some(change) = self.selection.update(best, output.parameter_update) {
            if let Some(from) = change.from {
                log_info!(
                    "baro switch from #{} -> #{} ({} switches)",
                    from,
                    change.to,
                    self.selection.switch_count()
                );
            }
            self.calibration.rearm_relative();
            output.selection_change = Some(change);
        }

        self.calibrate(now, input.reference.as_ref(), &mut output.calibration_writes);

        output.record = self.publish(now, &updated);

        if !output.parameter_update {
            output.fault_report = self.check_failover(now);
        }

        output.status = self.update_status(now);

        output
    }

    /// Apply a configuration snapshot; invalid snapshots are dropped
    fn parameters_update(&mut self, config: AirDataConfig) -> bool {
        if let Err(e) = config.validate() {
            log_error!("rejected air data parameters: {}", e);
            return false;
        }

        self.config = config;
        self.bank.set_config(self.config.validator);

        for slot in self.slots.iter_mut() {
            slot.parameters_update(&self.config);
        }

        true
    }

    /// Handle one sample; returns whether it was accepted
    fn ingest(
        &mut self,
        instance: usize,
        sample: &BaroSample,
        estimator_baro_fault: Option<bool>,
        writes: &mut CalibrationWrites,
    ) -> bool {
        if self.slots[instance].device_id() != sample.device_id {
            self.slots[instance].take_over(sample.device_id, &self.config);
            self.bank.reset_validator(instance);
            self.calibration.rearm_relative();
        }

        if !self.slots[instance].calibration.enabled() {
            return false;
        }

        if !self.slots[instance].active {
            self.register(instance, writes);
        }

        let slot = &mut self.slots[instance];

        // rising edge only, and only for the instance the estimator was fed
        if estimator_baro_fault == Some(true)
            && !self.last_status_baro_fault
            && self.selection.is_selected(instance)
        {
            log_warn!("estimator reported baro fault, demoting #{}", instance);
            slot.priority = PRIORITY_MIN;
        }

        let pressure = slot.calibration.correct(sample.pressure);
        let altitude = self.model.altitude(pressure, self.config.sea_level_pa());

        self.bank.put(
            instance,
            sample.timestamp,
            [pressure, sample.temperature, altitude],
            sample.error_count,
            slot.priority,
        );

        slot.accumulator.add(pressure, sample.temperature, sample.timestamp_sample);
        slot.last_pressure = pressure;

        true
    }

    /// First sample of an enabled device in a slot
    fn register(&mut self, instance: usize, writes: &mut CalibrationWrites) {
        let slot = &mut self.slots[instance];
        slot.active = true;

        if !self.bank.add_validator(instance) {
            log_error!("failed to add validator for baro #{}", instance);
        }

        self.selection.feed_available(instance);

        if !slot.calibration.calibrated() {
            let entry = slot.calibration.entry();
            if let Err(e) = self.config.upsert_calibration(entry) {
                log_warn!("baro #{} calibration not stored: {}", instance, e);
            }
            let _ = writes.push(CalibrationWrite { instance, entry });
        }

        log_info!("baro #{} registered device {}", instance, slot.device_id());

        for slot in self.slots.iter_mut() {
            slot.parameters_update(&self.config);
        }
    }

    fn calibrate(&mut self, now: Timestamp, reference: Option<&ReferenceSample>, writes: &mut CalibrationWrites) {
        let Some(primary) = self.selection.selected() else {
            return;
        };

        let first_new = writes.len();

        let result = self.calibration.step(
            now,
            &self.model,
            primary,
            &mut self.slots,
            reference,
            self.config.autocal_enabled,
            self.config.sea_level_pa(),
            writes,
        );

        match result {
            Ok(_) | Err(CalibrationError::Pending { .. }) | Err(CalibrationError::NoPrimaryData) => {}
            Err(e) => {
                log_debug!("baro calibration: {}", e);
            }
        }

        for write in writes.iter().skip(first_new) {
            if let Err(e) = self.config.upsert_calibration(write.entry) {
                log_warn!("baro #{} calibration not stored: {}", write.instance, e);
            }
        }
    }

    /// Emit the selected instance's averages once per output interval
    ///
    /// Accumulators of every updated instance restart at the interval,
    /// published or not.
    fn publish(&mut self, now: Timestamp, updated: &[bool; MAX_SENSOR_COUNT]) -> Option<AirDataRecord> {
        let interval = self.config.publish_interval_ms()?;
        let mut record = None;

        for instance in 0..MAX_SENSOR_COUNT {
            if !updated[instance] {
                continue;
            }

            let slot = &self.slots[instance];
            let Some(timestamp_sample) = slot.accumulator.mean_timestamp_sample() else {
                continue;
            };

            if now < slot.last_publication.saturating_add(interval) {
                continue;
            }

            let publish = now <= timestamp_sample + PUBLISH_MAX_SAMPLE_AGE_MS
                && self.selection.is_selected(instance)
                && self.bank.sensor_state(instance).is_empty();

            if publish {
                record = self.record(now, instance, timestamp_sample);
            }

            let slot = &mut self.slots[instance];
            slot.last_publication = now;
            slot.accumulator.reset();
        }

        record
    }

    fn record(&self, now: Timestamp, instance: usize, timestamp_sample: Timestamp) -> Option<AirDataRecord> {
        let slot = &self.slots[instance];
        let pressure = slot.accumulator.mean_pressure()?;
        let baro_temperature = slot.accumulator.mean_temperature()?;

        let (temperature, source) = ambient_temperature(
            now,
            baro_temperature,
            slot.calibration.external(),
            self.airspeed_temperature.as_ref(),
        );

        Some(AirDataRecord {
            timestamp_sample,
            device_id: slot.device_id(),
            altitude: self.model.altitude(pressure, self.config.sea_level_pa()),
            ambient_temperature: temperature,
            temperature_source: source,
            pressure,
            air_density: density_from_pressure_and_temp(pressure, temperature),
            calibration_count: slot.calibration.calibration_count(),
            timestamp: now,
        })
    }

    fn check_failover(&mut self, now: Timestamp) -> Option<FaultReport> {
        let slots = &self.slots;
        let outcome = self.failover.check(now, &self.bank, |instance| {
            slots.get(instance).map_or(0, SensorSlot::device_id)
        });

        if let Some(instance) = outcome.demote {
            self.slots[instance].priority = PRIORITY_MIN;
        }

        outcome.report
    }

    fn update_status(&mut self, now: Timestamp) -> Option<SensorsStatus> {
        let primary = self.selection.selected()?;

        let (sum, count) = self
            .slots
            .iter()
            .filter(|slot| slot.calibration.enabled())
            .fold((0.0f32, 0u32), |(sum, count), slot| (sum + slot.last_pressure, count + 1));
        let mean = if count > 0 { sum / count as f32 } else { 0.0 };

        let mut status = SensorsStatus {
            device_id_primary: self.slots[primary].device_id(),
            timestamp: now,
            ..SensorsStatus::default()
        };

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.device_id() == 0 {
                continue;
            }

            slot.update_inconsistency(mean);

            status.device_ids[index] = slot.device_id();
            status.inconsistency[index] = slot.inconsistency;
            status.healthy[index] = self.bank.sensor_state(index).is_empty();
            status.priority[index] = self.bank.sensor_priority(index);
            status.enabled[index] = slot.calibration.enabled();
            status.external[index] = slot.calibration.external();
        }

        Some(status)
    }

    /// Active configuration, including applied calibrations
    pub fn config(&self) -> &AirDataConfig {
        &self.config
    }

    /// Altitude model in use
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Currently selected instance
    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// Selection state
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Slot by index
    pub fn slot(&self, instance: usize) -> Option<&SensorSlot> {
        self.slots.get(instance)
    }

    /// All slots
    pub fn slots(&self) -> &[SensorSlot; MAX_SENSOR_COUNT] {
        &self.slots
    }

    /// Validator bank
    pub fn bank(&self) -> &ValidatorBank {
        &self.bank
    }

    /// Calibration progress
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }
}
