//! Fuzz target: datagram decode + dispatch
//!
//! Feeds arbitrary bytes through `decode` → `dispatch` → `encode` against
//! a blank store and asserts the reply always fits one datagram and
//! names the request tag (echo or Nack).
//!
//! cargo fuzz run fuzz_datagram

#![no_main]

use libfuzzer_sys::fuzz_target;
use stationmgmt::adapters::eeprom::EepromAdapter;
use stationmgmt::adapters::time::SystemClock;
use stationmgmt::config::StationConfig;
use stationmgmt::protocol::dispatcher::dispatch;
use stationmgmt::protocol::{DATAGRAM_SIZE, Status, decode, encode};
use stationmgmt::station::StationContext;

fuzz_target!(|data: &[u8]| {
    let peer = "127.0.0.1:8888".parse().unwrap();
    let mut store = EepromAdapter::blank();
    let mut clock = SystemClock::new();
    let mut ctx = StationContext::load(&store, &StationConfig::default());

    let Some(request) = decode(peer, data) else {
        assert!(data.is_empty(), "non-empty datagram must decode");
        return;
    };
    let response = dispatch(&request, &mut ctx, &mut clock, &mut store);
    let wire = encode(&response);

    assert!(wire.len() <= DATAGRAM_SIZE);
    assert_eq!(wire.len(), response.wire_len());
    match response.status {
        Status::Nack => assert_eq!(wire.as_slice(), &[b'N', data[0]]),
        Status::Echo(cmd) => assert_eq!(cmd.tag(), data[0]),
    }
});
