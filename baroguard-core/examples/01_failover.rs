//! Redundant Barometer Failover Example
//!
//! Two barometers feed the engine. The preferred one goes silent after two
//! seconds and the engine switches to the backup, raising one alert.
//!
//! ## What You'll Learn
//!
//! - Configuring stored priorities per device
//! - Pushing driver samples into the sample queues
//! - Reading records, selection changes and fault reports from a cycle
//!
//! ## Timeline
//!
//! | Time (ms)   | Event                                   |
//! |-------------|-----------------------------------------|
//! | 0           | Both devices register, device 1 selected |
//! | 1050        | Relative calibration aligns device 2    |
//! | 2000        | Device 1 stops reporting                |
//! | 2300        | Timeout: failover to device 2           |
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_failover
//! ```

use baroguard_core::{
    AirDataConfig, AirDataEngine, BaroSample, CalibrationEntry, CycleInput, FixedTime,
    SampleQueues, TimeSource,
};

const CYCLE_MS: u64 = 50;

fn sample(now: u64, device_id: u32, pressure: f32) -> BaroSample {
    BaroSample {
        timestamp: now,
        timestamp_sample: now,
        device_id,
        pressure,
        temperature: 25.0,
        error_count: 0,
    }
}

fn main() {
    println!("BaroGuard Failover Example");
    println!("==========================\n");

    let mut config = AirDataConfig::default();
    for (device_id, priority) in [(1, 100), (2, 75)] {
        config
            .upsert_calibration(CalibrationEntry::new(device_id, priority, 0.0, false))
            .expect("two entries fit the table");
    }

    let mut engine = AirDataEngine::new(config).expect("default configuration is valid");
    let mut queues: SampleQueues = SampleQueues::new();
    let mut clock = FixedTime::new(0);

    while clock.now() <= 3_000 {
        let now = clock.now();
        let ripple = ((now / CYCLE_MS) % 5) as f32 * 0.2;

        if now < 2_000 {
            queues.push(0, sample(now, 1, 101_325.0 + ripple));
        }
        // backup reads 12 Pa high until calibrated
        queues.push(1, sample(now, 2, 101_337.0 + ripple));

        let output = engine.run(&clock, &mut queues, CycleInput::default());

        if let Some(change) = output.selection_change {
            println!("[{now:>5} ms] selected instance {} (was {:?})", change.to, change.from);
        }
        for write in &output.calibration_writes {
            println!(
                "[{now:>5} ms] calibration: device {} offset {:.2} Pa",
                write.entry.device_id, write.entry.offset
            );
        }
        if let Some(report) = output.fault_report {
            println!("[{now:>5} ms] ALERT {report}");
        }
        if let Some(record) = output.record {
            if now % 500 == 0 {
                println!(
                    "[{now:>5} ms] {:.2} Pa  {:.2} m  from device {}",
                    record.pressure, record.altitude, record.device_id
                );
            }
        }

        clock.advance(CYCLE_MS);
    }

    println!("\nFinal priorities:");
    for (instance, slot) in engine.slots().iter().enumerate().filter(|(_, s)| s.device_id() != 0) {
        println!("  instance {instance}: device {} priority {}", slot.device_id(), slot.priority);
    }
}
