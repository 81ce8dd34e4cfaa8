//! Common test utilities for integration tests
//!
//! This module provides:
//! - Simulated barometers with bias, noise, dropouts and frozen output
//! - A rig that drives the engine on a stepped clock
//! - Reference (GNSS) sample generation from the simulated truth

#![allow(dead_code)]

use baroguard_core::{
    atmosphere::altitude_from_pressure,
    calibration::ReferenceSample,
    config::{AirDataConfig, CalibrationEntry},
    constants::buffers::MAX_SENSOR_COUNT,
    engine::{AirDataEngine, CycleInput, CycleOutput},
    sensor::BaroSample,
    source::SampleQueues,
    time::{FixedTime, TimeSource, Timestamp},
};

pub mod harness;

use harness::{TestRng, Trace};

/// Cycle period used by the rig (ms)
pub const CYCLE_MS: u64 = 50;

/// Mean true static pressure of the simulated air mass (Pa)
pub const BASE_PRESSURE_PA: f32 = 100_000.0;

/// Simulated barometer driver
#[derive(Debug, Clone)]
pub struct SimulatedBaro {
    pub device_id: u32,
    /// Added to the true pressure (Pa)
    pub bias_pa: f32,
    /// Uniform noise amplitude (Pa)
    pub noise_pa: f32,
    pub temperature: f32,
    pub error_count: u64,
    /// Sample periods (start, end) without output
    pub silent: Vec<(Timestamp, Timestamp)>,
    /// Repeat the last reading from this time on
    pub frozen_from: Option<Timestamp>,
    last_pressure: f32,
}

impl SimulatedBaro {
    pub fn new(device_id: u32) -> Self {
        Self {
            device_id,
            bias_pa: 0.0,
            noise_pa: 0.0,
            temperature: 30.0,
            error_count: 0,
            silent: Vec::new(),
            frozen_from: None,
            last_pressure: BASE_PRESSURE_PA,
        }
    }

    pub fn with_bias(mut self, bias_pa: f32) -> Self {
        self.bias_pa = bias_pa;
        self
    }

    pub fn with_noise(mut self, noise_pa: f32) -> Self {
        self.noise_pa = noise_pa;
        self
    }

    pub fn silent_between(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.silent.push((start, end));
        self
    }

    pub fn frozen_from(mut self, t: Timestamp) -> Self {
        self.frozen_from = Some(t);
        self
    }

    fn sample(&mut self, now: Timestamp, true_pressure: f32, rng: &mut TestRng) -> Option<BaroSample> {
        if self.silent.iter().any(|&(start, end)| now >= start && now < end) {
            return None;
        }

        let frozen = self.frozen_from.is_some_and(|t| now >= t);
        if !frozen {
            let noise = if self.noise_pa > 0.0 { rng.gen_range(-self.noise_pa, self.noise_pa) } else { 0.0 };
            self.last_pressure = true_pressure + self.bias_pa + noise;
        }

        Some(BaroSample {
            timestamp: now,
            timestamp_sample: now,
            device_id: self.device_id,
            pressure: self.last_pressure,
            temperature: self.temperature,
            error_count: self.error_count,
        })
    }
}

/// True pressure at `now`: a small deterministic ripple on the base value
///
/// Every simulated baro sees the same ripple, so differences between them
/// are exactly their biases while no reading repeats for long.
pub fn true_pressure(now: Timestamp) -> f32 {
    BASE_PRESSURE_PA + ((now / CYCLE_MS) % 7) as f32 * 0.1
}

/// Altitude of the simulated air mass (m), mean of the ripple
pub fn true_altitude(sea_level_pa: f32) -> f32 {
    altitude_from_pressure(BASE_PRESSURE_PA + 0.3, sea_level_pa)
}

/// Engine plus simulated environment on a stepped clock
pub struct Rig {
    pub engine: AirDataEngine,
    pub queues: SampleQueues,
    pub clock: FixedTime,
    pub baros: [Option<SimulatedBaro>; MAX_SENSOR_COUNT],
    pub rng: TestRng,
    pub trace: Trace,
}

impl Rig {
    pub fn new(config: AirDataConfig) -> Self {
        Self {
            engine: AirDataEngine::new(config).expect("valid test configuration"),
            queues: SampleQueues::new(),
            clock: FixedTime::new(0),
            baros: Default::default(),
            rng: TestRng::new(0x5eed),
            trace: Trace::default(),
        }
    }

    pub fn with_baro(mut self, slot: usize, baro: SimulatedBaro) -> Self {
        self.baros[slot] = Some(baro);
        self
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Produce samples, run one cycle, advance the clock
    pub fn step(&mut self, input: CycleInput) -> CycleOutput {
        let now = self.clock.now();
        let pressure = true_pressure(now);

        for (slot, baro) in self.baros.iter_mut().enumerate() {
            if let Some(sample) = baro.as_mut().and_then(|b| b.sample(now, pressure, &mut self.rng)) {
                self.queues.push(slot, sample);
            }
        }

        let output = self.engine.run(&self.clock, &mut self.queues, input);
        self.trace.push(now, output.clone());
        self.clock.advance(CYCLE_MS);
        output
    }

    /// Run plain cycles until the clock reaches `end`
    pub fn run_until(&mut self, end: Timestamp) {
        while self.clock.now() < end {
            self.step(CycleInput::default());
        }
    }

    /// Run cycles until `end`, with a reference fix every 200 ms
    pub fn run_with_reference(&mut self, end: Timestamp, vertical_error: impl Fn(Timestamp) -> f32) {
        let altitude = true_altitude(self.engine.config().sea_level_pa());

        while self.clock.now() < end {
            let now = self.clock.now();
            let reference = (now % 200 == 0).then(|| ReferenceSample {
                timestamp: now,
                altitude_msl: altitude,
                vertical_error: vertical_error(now),
            });
            self.step(CycleInput { reference, ..CycleInput::default() });
        }
    }

    pub fn priority(&self, slot: usize) -> i32 {
        self.engine.slot(slot).map_or(0, |s| s.priority)
    }

    pub fn offset(&self, slot: usize) -> f32 {
        self.engine.slot(slot).map_or(0.0, |s| s.calibration.offset())
    }
}

/// Default configuration with stored priorities for the given devices
pub fn config_with_priorities(entries: &[(u32, i32)]) -> AirDataConfig {
    let mut config = AirDataConfig::default();
    for &(device_id, priority) in entries {
        config
            .upsert_calibration(CalibrationEntry::new(device_id, priority, 0.0, false))
            .expect("calibration table capacity");
    }
    config
}
