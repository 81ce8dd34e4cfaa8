//! End-to-end scenarios for the air-data engine
//!
//! Covers:
//! - Relative calibration between a primary and a biased secondary
//! - Failover on silence, frozen output and driver errors
//! - Hysteresis against parameter updates
//! - Absolute calibration against a reference, including accuracy spikes

#![cfg(test)]

mod common;

use baroguard_core::{
    constants::validation::PRIORITY_MIN,
    engine::CycleInput,
    selection::SelectionChange,
    validator::FaultFlags,
};

use common::{config_with_priorities, true_altitude, Rig, SimulatedBaro};

#[test]
fn test_relative_calibration_aligns_secondaries() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80), (3, 60)]))
        .with_baro(0, SimulatedBaro::new(1))
        .with_baro(1, SimulatedBaro::new(2).with_bias(5.0))
        .with_baro(2, SimulatedBaro::new(3).with_bias(-3.0));

    rig.run_until(1_000);
    assert_eq!(rig.engine.selected(), Some(0));
    assert_eq!(rig.offset(1), 0.0);
    assert_eq!(rig.offset(2), 0.0);

    rig.run_until(1_200);
    assert!(rig.engine.calibration().relative_done());
    assert_within_tolerance!(rig.offset(1), 5.0, 0.02);
    assert_within_tolerance!(rig.offset(2), -3.0, 0.02);
    assert_eq!(rig.offset(0), 0.0);

    // persisted once per secondary, never for the primary
    let writes: Vec<_> = rig
        .trace
        .cycles
        .iter()
        .flat_map(|(_, output)| output.calibration_writes.iter().copied())
        .collect();
    assert_eq!(writes.len(), 2);
    assert_eq!((writes[0].instance, writes[0].entry.device_id, writes[0].entry.priority), (1, 2, 80));
    assert_eq!((writes[1].instance, writes[1].entry.device_id, writes[1].entry.priority), (2, 3, 60));
    assert_within_tolerance!(rig.engine.config().calibration(2).unwrap().offset, 5.0, 0.02);
    assert_within_tolerance!(rig.engine.config().calibration(3).unwrap().offset, -3.0, 0.02);

    // corrected readings now agree
    rig.run_until(2_000);
    let primary = rig.engine.slot(0).unwrap().last_pressure;
    for instance in 1..3 {
        let secondary = rig.engine.slot(instance).unwrap().last_pressure;
        assert_within_tolerance!(secondary, primary, 0.02);
    }

    // the primary kept publishing throughout
    assert!(rig.trace.records().all(|(_, record)| record.device_id == 1));
    assert_eq!(rig.trace.switches().len(), 1);
}

#[test]
fn test_silent_primary_fails_over() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80)]))
        .with_baro(0, SimulatedBaro::new(1).silent_between(2_000, 3_000))
        .with_baro(1, SimulatedBaro::new(2));

    // last sample at 1950, timeout after 300 ms
    rig.run_until(2_300);
    assert_eq!(rig.engine.selected(), Some(0));
    assert_eq!(rig.priority(0), 100);

    let output = rig.step(CycleInput::default());
    assert_eq!(output.selection_change, Some(SelectionChange { from: Some(0), to: 1 }));

    let report = output.fault_report.expect("failover alert");
    assert_eq!(report.instance, 0);
    assert_eq!(report.device_id, 1);
    assert!(report.reasons.contains(FaultFlags::TIMEOUT));
    assert_eq!(rig.priority(0), PRIORITY_MIN);
    assert_eq!(output.record.map(|r| r.device_id), Some(2));

    // the old primary comes back but does not win the vote again
    rig.run_until(4_000);
    assert_eq!(rig.engine.selected(), Some(1));
    assert_eq!(rig.priority(0), PRIORITY_MIN);

    let status = rig.trace.cycles.last().and_then(|(_, o)| o.status).unwrap();
    assert!(status.healthy[0]);
    assert!(status.healthy[1]);
    assert_eq!(status.device_id_primary, 2);
    assert_eq!(status.priority[0], PRIORITY_MIN);

    assert_eq!(rig.trace.fault_reports().len(), 1);
    assert_eq!(rig.trace.switches().len(), 2);
}

#[test]
fn test_parameter_update_defers_switch_and_report() {
    let config = config_with_priorities(&[(1, 100), (2, 80)]);
    let mut rig = Rig::new(config.clone())
        .with_baro(0, SimulatedBaro::new(1).silent_between(1_000, u64::MAX))
        .with_baro(1, SimulatedBaro::new(2));

    rig.run_until(1_300);

    let output = rig.step(CycleInput { parameters: Some(config), ..CycleInput::default() });
    assert!(output.parameter_update);
    assert_eq!(output.selection_change, None);
    assert_eq!(output.fault_report, None);
    assert_eq!(rig.engine.selected(), Some(0));

    let output = rig.step(CycleInput::default());
    assert_eq!(output.selection_change, Some(SelectionChange { from: Some(0), to: 1 }));
    assert!(output.fault_report.is_some());
}

#[test]
fn test_demotion_follows_parameter_changes() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80)]))
        .with_baro(0, SimulatedBaro::new(1).silent_between(1_000, 2_000))
        .with_baro(1, SimulatedBaro::new(2));

    rig.run_until(2_500);
    assert_eq!(rig.priority(0), PRIORITY_MIN);

    // unchanged configuration keeps the demotion
    let same = config_with_priorities(&[(1, 100), (2, 80)]);
    rig.step(CycleInput { parameters: Some(same), ..CycleInput::default() });
    assert_eq!(rig.priority(0), PRIORITY_MIN);

    // lowering clamps at the floor, raising shifts by the difference
    let lowered = config_with_priorities(&[(1, 60), (2, 80)]);
    rig.step(CycleInput { parameters: Some(lowered), ..CycleInput::default() });
    assert_eq!(rig.priority(0), PRIORITY_MIN);

    let raised = config_with_priorities(&[(1, 100), (2, 80)]);
    rig.step(CycleInput { parameters: Some(raised), ..CycleInput::default() });
    assert_eq!(rig.priority(0), 41);

    rig.run_until(3_500);
    assert_eq!(rig.engine.selected(), Some(1));
}

#[test]
fn test_frozen_sensor_is_flagged_stale() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80)]))
        .with_baro(0, SimulatedBaro::new(1).frozen_from(1_000))
        .with_baro(1, SimulatedBaro::new(2));

    rig.run_until(7_000);

    let switches = rig.trace.switches();
    assert_eq!(switches.len(), 2);
    let (t, change) = switches[1];
    assert_eq!(change, SelectionChange { from: Some(0), to: 1 });
    assert!((5_900..=6_100).contains(&t), "switched at {t}");

    let reports = rig.trace.fault_reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].1.reasons.contains(FaultFlags::STALE_DATA));
    assert!(!reports[0].1.reasons.contains(FaultFlags::TIMEOUT));
}

#[test]
fn test_driver_errors_stop_publication() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100)])).with_baro(0, SimulatedBaro::new(1));

    rig.run_until(1_000);
    assert!(rig.trace.records().count() > 15);

    if let Some(baro) = rig.baros[0].as_mut() {
        baro.error_count = 20_000;
    }
    rig.run_until(2_000);

    // no alternative: still selected, but nothing is published
    assert_eq!(rig.engine.selected(), Some(0));
    assert!(rig.trace.records().all(|(t, _)| t < 1_000));

    let reports = rig.trace.fault_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, 1_000);
    assert!(reports[0].1.reasons.contains(FaultFlags::HIGH_ERROR_COUNT));
    assert!(reports[0].1.reasons.contains(FaultFlags::HIGH_ERROR_DENSITY));
    assert_eq!(rig.priority(0), PRIORITY_MIN);

    let status = rig.trace.cycles.last().and_then(|(_, o)| o.status).unwrap();
    assert!(!status.healthy[0]);
}

#[test]
fn test_absolute_calibration_matches_reference() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80)]))
        .with_baro(0, SimulatedBaro::new(1).with_bias(100.0))
        .with_baro(1, SimulatedBaro::new(2).with_bias(100.0));

    rig.run_with_reference(5_000, |_| 2.0);
    assert!(rig.engine.calibration().relative_done());
    assert!(!rig.engine.calibration().absolute_done());
    assert_eq!(rig.offset(0), 0.0);

    rig.run_with_reference(8_000, |_| 2.0);
    assert!(rig.engine.calibration().absolute_done());
    assert_within_tolerance!(rig.offset(0), 100.0, 2.0);
    assert_within_tolerance!(rig.offset(1), rig.offset(0), 0.02);

    // exactly one absolute step, applied to both instances
    let absolute_writes: Vec<_> = rig
        .trace
        .cycles
        .iter()
        .filter(|(t, _)| *t > 1_200)
        .filter(|(_, output)| !output.calibration_writes.is_empty())
        .collect();
    assert_eq!(absolute_writes.len(), 1);
    assert_eq!(absolute_writes[0].1.calibration_writes.len(), 2);

    rig.run_until(9_000);
    let record = rig.trace.last_record().unwrap();
    let expected = true_altitude(rig.engine.config().sea_level_pa());
    assert_within_tolerance!(record.altitude, expected, 0.5);
    assert!(record.calibration_count > 1);
}

#[test]
fn test_reference_accuracy_spike_restarts_window() {
    let mut rig = Rig::new(config_with_priorities(&[(1, 100), (2, 80)]))
        .with_baro(0, SimulatedBaro::new(1).with_bias(100.0))
        .with_baro(1, SimulatedBaro::new(2).with_bias(100.0));

    let epv = |t: u64| if (3_000..3_400).contains(&t) { 12.0 } else { 2.0 };

    rig.run_with_reference(3_100, epv);
    assert_eq!(rig.engine.calibration().calibration_t_first(), None);

    // an undisturbed window would have produced the offset at 5.6 s
    rig.run_with_reference(7_000, epv);
    assert!(!rig.engine.calibration().absolute_done());
    assert_eq!(rig.offset(0), 0.0);

    rig.run_with_reference(8_000, epv);
    assert!(rig.engine.calibration().absolute_done());
    assert_within_tolerance!(rig.offset(0), 100.0, 2.0);
}

#[test]
fn test_autocal_disabled_keeps_offsets() {
    let config = config_with_priorities(&[(1, 100), (2, 80)]).with_autocal(false);
    let mut rig = Rig::new(config)
        .with_baro(0, SimulatedBaro::new(1).with_bias(100.0))
        .with_baro(1, SimulatedBaro::new(2).with_bias(103.0));

    rig.run_with_reference(8_000, |_| 1.0);

    assert!(rig.engine.calibration().relative_done());
    assert!(!rig.engine.calibration().absolute_done());
    assert_eq!(rig.offset(0), 0.0);
    assert_within_tolerance!(rig.offset(1), 3.0, 0.02);
}
