//! Deterministic helpers for integration tests
//!
//! Provides:
//! - Seeded random number generator (reproducible noise)
//! - Tolerance assertion macro
//! - Output trace with the queries the scenarios need

#![allow(dead_code)]

use baroguard_core::{
    engine::CycleOutput,
    failover::FaultReport,
    records::AirDataRecord,
    selection::SelectionChange,
    time::Timestamp,
};

#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let diff = ($actual - $expected).abs();
        if diff > $tolerance {
            panic!(
                "Value {} not within tolerance {} of expected {} (diff: {})",
                $actual, $tolerance, $expected, diff
            );
        }
    };
}

/// Deterministic random number generator for tests
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16_777_216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Cycle outputs tagged with the cycle time
#[derive(Default)]
pub struct Trace {
    pub cycles: Vec<(Timestamp, CycleOutput)>,
}

impl Trace {
    pub fn push(&mut self, now: Timestamp, output: CycleOutput) {
        self.cycles.push((now, output));
    }

    pub fn records(&self) -> impl Iterator<Item = (Timestamp, &AirDataRecord)> + '_ {
        self.cycles
            .iter()
            .filter_map(|(t, output)| output.record.as_ref().map(|record| (*t, record)))
    }

    pub fn switches(&self) -> Vec<(Timestamp, SelectionChange)> {
        self.cycles
            .iter()
            .filter_map(|(t, output)| output.selection_change.map(|change| (*t, change)))
            .collect()
    }

    pub fn fault_reports(&self) -> Vec<(Timestamp, FaultReport)> {
        self.cycles
            .iter()
            .filter_map(|(t, output)| output.fault_report.map(|report| (*t, report)))
            .collect()
    }

    pub fn last_record(&self) -> Option<&AirDataRecord> {
        self.records().last().map(|(_, record)| record)
    }
}
