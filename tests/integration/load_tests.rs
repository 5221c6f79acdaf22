//! Scheduler tick → relay pin flows: telemetry polling, hysteresis and
//! output projection running together under `run_cycle`.

use stationmgmt::adapters::system::SystemRestart;
use stationmgmt::app::events::StationEvent;
use stationmgmt::app::runner::run_cycle;
use stationmgmt::app::service::StationService;
use stationmgmt::config::StationConfig;
use stationmgmt::scheduler::Scheduler;

use crate::mock_hw::{MockBus, MockHardware, RecordingSink, hardware};

/// Spacing that makes every 1000 ms job due on each tick.
const STEP_MS: u32 = 1001;

struct Rig {
    service: StationService,
    hw: MockHardware,
    sink: RecordingSink,
    scheduler: Scheduler,
    restart: SystemRestart,
}

impl Rig {
    fn new(battery_volts: f32) -> Self {
        let config = StationConfig::default();
        let hw = hardware(MockBus::with_battery(battery_volts));
        let mut sink = RecordingSink::default();
        let mut service = StationService::new(&config, &hw.store);
        service.start(&mut sink);
        Self {
            service,
            hw,
            sink,
            scheduler: Scheduler::from_config(&config),
            restart: SystemRestart::new(),
        }
    }

    /// Advance the uptime by one full control period and run a cycle.
    fn step(&mut self) {
        self.hw.clock.uptime_ms += STEP_MS;
        run_cycle(
            &mut self.scheduler,
            &mut self.service,
            &mut self.hw,
            &mut self.restart,
            &mut self.sink,
        );
    }

    fn step_at(&mut self, volts: f32) {
        self.hw.bus.set_battery(volts);
        self.step();
    }

    fn driven(&self) -> u8 {
        self.hw.relays.energized_bits()
    }
}

#[test]
fn nothing_runs_before_first_interval() {
    let mut rig = Rig::new(26.5);
    rig.hw.clock.uptime_ms = 0;
    run_cycle(
        &mut rig.scheduler,
        &mut rig.service,
        &mut rig.hw,
        &mut rig.restart,
        &mut rig.sink,
    );
    assert!(rig.hw.bus.reads.is_empty());
    assert_eq!(rig.hw.relays.writes, 0);
}

#[test]
fn charged_battery_energises_whole_bank() {
    let mut rig = Rig::new(26.5);
    rig.step();

    assert!(rig.service.load_enabled());
    // Blank store: every bank slot is on.
    assert_eq!(rig.driven(), 0xFF);
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::LoadChanged { enabled: true, .. })),
        1
    );
}

#[test]
fn jobs_poll_both_register_blocks() {
    let mut rig = Rig::new(25.0);
    rig.step();
    assert_eq!(rig.hw.bus.reads, vec![0x3100, 0x3200]);
    assert!(rig.service.context().telemetry.status().valid);
}

#[test]
fn hysteresis_over_a_discharge_cycle() {
    let mut rig = Rig::new(25.0);

    // Between thresholds from cold: stays off.
    rig.step();
    assert_eq!(rig.driven(), 0);

    rig.step_at(26.0);
    assert_eq!(rig.driven(), 0xFF, "on at exactly voltage_on");

    rig.step_at(24.5);
    assert_eq!(rig.driven(), 0xFF, "held inside the band");

    rig.step_at(24.0);
    assert_eq!(rig.driven(), 0, "shed at exactly voltage_off");

    rig.step_at(25.9);
    assert_eq!(rig.driven(), 0, "held off inside the band");

    rig.step_at(26.1);
    assert_eq!(rig.driven(), 0xFF);

    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::LoadChanged { .. })),
        3
    );
}

#[test]
fn lost_telemetry_freezes_the_decision() {
    let mut rig = Rig::new(26.5);
    rig.step();
    assert_eq!(rig.driven(), 0xFF);

    rig.hw.bus.offline = true;
    rig.hw.bus.set_battery(20.0);
    rig.step();
    rig.step();

    assert!(!rig.service.context().telemetry.snapshot().valid);
    assert!(rig.service.load_enabled());
    assert_eq!(rig.driven(), 0xFF);
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::TelemetryLost(_))),
        1
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::StatusLost(_))),
        1
    );

    // Back online at a low voltage: the load is shed on the next pass.
    rig.hw.bus.offline = false;
    rig.step();
    assert_eq!(rig.driven(), 0);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, StationEvent::TelemetryRestored(_))),
        2
    );
}

#[test]
fn bank_masks_outputs_within_one_cycle() {
    let mut rig = Rig::new(26.5);

    // Receive runs before apply in the same pass.
    rig.hw.transport.queue(&[b'O', 0, 0]);
    rig.hw.transport.queue(&[b'O', 7, 0]);
    rig.step();
    assert_eq!(rig.driven(), 0b1111_1110);
    // Only one datagram is consumed per receive job.
    assert_eq!(rig.hw.transport.outbox.len(), 1);
    assert_eq!(rig.hw.transport.inbox.len(), 1);

    rig.step();
    assert_eq!(rig.driven(), 0b0111_1110);
    assert_eq!(rig.hw.transport.outbox.len(), 2);
}

#[test]
fn glitched_pin_is_corrected_next_pass() {
    let mut rig = Rig::new(26.5);
    rig.step();
    rig.hw.relays.levels[4] = false;
    rig.step();
    assert_eq!(rig.driven(), 0xFF);
}
