//! Datagram → response flows through the full service stack.

use stationmgmt::adapters::system::SystemRestart;
use stationmgmt::app::events::StationEvent;
use stationmgmt::app::runner::run_cycle;
use stationmgmt::app::service::StationService;
use stationmgmt::config::StationConfig;
use stationmgmt::scheduler::Scheduler;
use stationmgmt::station::layout::{RELAY_BANK_OFFSET, VOLTAGE_ON_OFFSET};

use crate::mock_hw::{MockBus, MockHardware, RecordingSink, hardware, peer};

fn station() -> (StationService, MockHardware, RecordingSink) {
    let hw = hardware(MockBus::with_battery(25.0));
    let service = StationService::new(&StationConfig::default(), &hw.store);
    (service, hw, RecordingSink::default())
}

/// Queue one datagram, poll once and return the reply (if any).
fn exchange(
    service: &mut StationService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    datagram: &[u8],
) -> Option<Vec<u8>> {
    hw.transport.queue(datagram);
    let before = hw.transport.outbox.len();
    assert!(service.poll_transport(&mut hw.transport, &mut hw.clock, &mut hw.store, sink));
    hw.transport.outbox.get(before).map(|(bytes, to)| {
        assert_eq!(*to, peer());
        bytes.clone()
    })
}

fn config_set(id: u8, value: f32) -> Vec<u8> {
    let mut d = vec![b'C', id];
    d.extend_from_slice(&value.to_be_bytes());
    d
}

#[test]
fn ping_returns_epoch() {
    let (mut service, mut hw, mut sink) = station();
    hw.clock.epoch = 0x6543_2100;

    let reply = exchange(&mut service, &mut hw, &mut sink, b"p").unwrap();
    assert_eq!(reply, vec![b'p', 0x65, 0x43, 0x21, 0x00]);

    assert_eq!(
        sink.count(|e| matches!(e, StationEvent::CommandReceived { size: 1, .. })),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, StationEvent::ResponseSent { payload, .. } if payload.len() == 5)),
        1
    );
}

#[test]
fn empty_datagram_gets_no_reply() {
    let (mut service, mut hw, mut sink) = station();
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, b""), None);
    assert!(sink.events.is_empty());
}

#[test]
fn idle_transport_is_not_consumed() {
    let (mut service, mut hw, mut sink) = station();
    assert!(!service.poll_transport(&mut hw.transport, &mut hw.clock, &mut hw.store, &mut sink));
}

#[test]
fn blank_store_reads_default_thresholds() {
    let (mut service, mut hw, mut sink) = station();
    let reply = exchange(&mut service, &mut hw, &mut sink, b"co").unwrap();
    let mut expected = vec![b'c', b'o'];
    expected.extend_from_slice(&24.0f32.to_be_bytes());
    assert_eq!(reply, expected);
}

#[test]
fn config_set_persists_and_survives_reload() {
    let (mut service, mut hw, mut sink) = station();

    let request = config_set(b'O', 27.5);
    let reply = exchange(&mut service, &mut hw, &mut sink, &request).unwrap();
    assert_eq!(reply, request);
    assert_eq!(
        hw.store.bytes()[VOLTAGE_ON_OFFSET..VOLTAGE_ON_OFFSET + 4],
        27.5f32.to_le_bytes()
    );

    // A fresh service over the same store sees the new value.
    let mut reloaded = StationService::new(&StationConfig::default(), &hw.store);
    assert_eq!(reloaded.context().thresholds.voltage_on, 27.5);

    let reply = exchange(&mut reloaded, &mut hw, &mut sink, b"cO").unwrap();
    assert_eq!(&reply[2..], &27.5f32.to_be_bytes());
}

#[test]
fn config_set_with_storage_failure_still_updates_memory() {
    let (mut service, mut hw, mut sink) = station();
    hw.store.set_fail_writes(true);

    let request = config_set(b'o', 23.0);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &request).unwrap(), request);
    assert_eq!(service.context().thresholds.voltage_off, 23.0);
    assert_eq!(hw.store.bytes()[0], 0xFF);
}

#[test]
fn output_set_persists_bit_packed() {
    let (mut service, mut hw, mut sink) = station();

    let reply = exchange(&mut service, &mut hw, &mut sink, &[b'O', 3, 0]).unwrap();
    assert_eq!(reply, vec![b'O', 3, 0]);
    assert_eq!(hw.store.bytes()[RELAY_BANK_OFFSET], 0b1111_0111);

    let reply = exchange(&mut service, &mut hw, &mut sink, &[b'o', 3]).unwrap();
    assert_eq!(reply, vec![b'o', 3, 0]);

    let reloaded = StationService::new(&StationConfig::default(), &hw.store);
    assert_eq!(reloaded.context().relays.get(3), Some(false));
    assert_eq!(reloaded.context().relays.get(2), Some(true));
}

#[test]
fn output_set_retried_after_storage_failure_is_persisted() {
    let (mut service, mut hw, mut sink) = station();

    hw.store.set_fail_writes(true);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &[b'O', 3, 0]).unwrap(), vec![b'O', 3, 0]);
    assert_eq!(hw.store.bytes()[RELAY_BANK_OFFSET], 0xFF);
    let attempts = hw.store.commits();

    hw.store.set_fail_writes(false);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &[b'O', 3, 0]).unwrap(), vec![b'O', 3, 0]);
    assert_eq!(hw.store.commits(), attempts + 1);
    assert_eq!(hw.store.bytes()[RELAY_BANK_OFFSET], 0b1111_0111);

    let reloaded = StationService::new(&StationConfig::default(), &hw.store);
    assert_eq!(reloaded.context().relays.get(3), Some(false));
}

#[test]
fn any_nonzero_state_turns_relay_on() {
    let (mut service, mut hw, mut sink) = station();
    exchange(&mut service, &mut hw, &mut sink, &[b'O', 5, 0]).unwrap();
    let reply = exchange(&mut service, &mut hw, &mut sink, &[b'O', 5, 0x7F]).unwrap();
    assert_eq!(reply, vec![b'O', 5, 1]);
}

#[test]
fn rejected_requests() {
    let (mut service, mut hw, mut sink) = station();

    // Unknown command.
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, b"z").unwrap(), b"Nz");
    // Relay index out of range.
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &[b'O', 8, 1]).unwrap(), b"NO");
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &[b'o', 200]).unwrap(), b"No");
    // Missing arguments.
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, b"C").unwrap(), b"NC");
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &[b'R', 1, 2]).unwrap(), b"NR");
    // Non-finite threshold.
    let nan = config_set(b'O', f32::NAN);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &nan).unwrap(), b"NC");
    assert_eq!(service.context().thresholds.voltage_on, 26.0);
}

#[test]
fn unknown_config_id_echoes_id_only() {
    let (mut service, mut hw, mut sink) = station();
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, b"cx").unwrap(), b"cx");
    let request = config_set(b'x', 12.0);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &request).unwrap(), b"Cx");
}

#[test]
fn rtc_set_then_read() {
    let (mut service, mut hw, mut sink) = station();
    let mut request = vec![b'R'];
    request.extend_from_slice(&1_700_000_000u32.to_be_bytes());

    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &request).unwrap(), request);
    assert_eq!(hw.clock.epoch, 1_700_000_000);

    let reply = exchange(&mut service, &mut hw, &mut sink, b"r").unwrap();
    assert_eq!(&reply[1..], &1_700_000_000u32.to_be_bytes());
}

#[test]
fn telemetry_before_first_poll_is_zeroed() {
    let (mut service, mut hw, mut sink) = station();
    hw.clock.epoch = 7;
    let reply = exchange(&mut service, &mut hw, &mut sink, b"t").unwrap();
    assert_eq!(reply.len(), 22);
    assert_eq!(&reply[..5], &[b't', 0, 0, 0, 7]);
    assert!(reply[5..].iter().all(|b| *b == 0));
}

#[test]
fn telemetry_reports_snapshot_and_enable() {
    let (mut service, mut hw, mut sink) = station();
    hw.bus.set_battery(26.45);
    service.refresh_measurements(&mut hw.bus, &mut sink);
    service.evaluate_load(&mut sink);

    let reply = exchange(&mut service, &mut hw, &mut sink, b"t").unwrap();
    assert_eq!(reply.len(), 22);
    let f = |at: usize| f32::from_be_bytes([reply[at], reply[at + 1], reply[at + 2], reply[at + 3]]);
    assert!((f(5) - 18.5).abs() < 1e-4);
    assert!((f(9) - 3.12).abs() < 1e-4);
    assert!((f(13) - 26.45).abs() < 1e-4);
    assert!((f(17) - 2.75).abs() < 1e-4);
    assert_eq!(reply[21], 1);
}

#[test]
fn oversized_datagram_is_truncated_not_rejected() {
    let (mut service, mut hw, mut sink) = station();
    let mut request = vec![b'O', 1, 0];
    request.resize(48, 0xAA);
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, &request).unwrap(), vec![b'O', 1, 0]);
}

#[test]
fn send_failure_is_reported() {
    let (mut service, mut hw, mut sink) = station();
    hw.transport.fail_send = true;
    assert_eq!(exchange(&mut service, &mut hw, &mut sink, b"p"), None);
    assert_eq!(
        sink.count(|e| matches!(e, StationEvent::TransportFailed(_))),
        1
    );
}

#[test]
fn reset_restarts_after_reply_is_sent() {
    let (mut service, mut hw, mut sink) = station();
    let mut scheduler = Scheduler::from_config(&StationConfig::default());
    let mut restart = SystemRestart::new();

    hw.transport.queue(b"X");
    hw.clock.uptime_ms = 251;
    assert!(run_cycle(&mut scheduler, &mut service, &mut hw, &mut restart, &mut sink));

    assert_eq!(hw.transport.outbox, vec![(b"X".to_vec(), peer())]);
    assert_eq!(restart.requests(), 1);

    let sent = sink
        .events
        .iter()
        .position(|e| matches!(e, StationEvent::ResponseSent { .. }))
        .unwrap();
    let restarted = sink
        .events
        .iter()
        .position(|e| matches!(e, StationEvent::RestartRequested))
        .unwrap();
    assert!(sent < restarted);

    // The request is consumed.
    hw.clock.uptime_ms = 502;
    assert!(!run_cycle(&mut scheduler, &mut service, &mut hw, &mut restart, &mut sink));
    assert_eq!(restart.requests(), 1);
}
