//! Station controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EepromAdapter   SystemClock   ModbusClient   RelayDriver      │
//! │  (Store+Config)  (ClockPort)   (RegisterPort) (RelayOutputs)   │
//! │  UdpTransport    LogEventSink  SystemRestart                   │
//! │  (DatagramPort)  (EventSink)   (RestartPort)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            StationService (pure logic)                 │    │
//! │  │  Dispatcher · Hysteresis · Thresholds · Relay bank     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · Watchdog                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;

use stationmgmt::adapters::eeprom::EepromAdapter;
use stationmgmt::adapters::log_sink::LogEventSink;
use stationmgmt::adapters::modbus::{ModbusClient, Transceiver, UartLink};
use stationmgmt::adapters::system::SystemRestart;
use stationmgmt::adapters::time::SystemClock;
use stationmgmt::adapters::udp::UdpTransport;
use stationmgmt::adapters::wifi::{self, Credentials};
use stationmgmt::app::ports::ConfigPort;
use stationmgmt::app::runner::{Hardware, run_cycle};
use stationmgmt::app::service::StationService;
use stationmgmt::config::StationConfig;
use stationmgmt::drivers::relay::RelayDriver;
use stationmgmt::drivers::watchdog::Watchdog;
use stationmgmt::error::Error;
use stationmgmt::pins;
use stationmgmt::scheduler::Scheduler;
use stationmgmt::station::RELAY_COUNT;

/// Idle time between main-loop passes.
const LOOP_SLEEP_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Station MGMT v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let watchdog = Watchdog::new();
    let peripherals = Peripherals::take()?;

    // ── 2. Persistent store + config ──────────────────────────
    let store = EepromAdapter::new().map_err(Error::from)?;
    let config = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            StationConfig::default()
        }
    };

    // ── 3. Relay board + self test ────────────────────────────
    let mut relay_pins = heapless::Vec::<_, RELAY_COUNT>::new();
    for gpio in pins::RELAY_GPIOS {
        // SAFETY: each relay GPIO appears once in `pins` and nowhere else.
        let pin = PinDriver::output(unsafe { AnyOutputPin::new(gpio) })?;
        relay_pins
            .push(pin)
            .map_err(|_| Error::Init("relay pin table"))?;
    }
    let relay_pins = relay_pins
        .into_array()
        .map_err(|_| Error::Init("relay pin table"))?;
    let mut relays = RelayDriver::new(relay_pins);
    relays.self_test(&mut FreeRtos, config.self_test_step_ms);
    watchdog.feed();

    // ── 4. Charge controller bus ──────────────────────────────
    let uart_config = uart::config::Config::new().baudrate(Hertz(config.modbus_baudrate));
    // SAFETY: the RS-485 GPIOs are reserved for UART2 and the transceiver.
    let (tx, rx, de, re) = unsafe {
        (
            AnyIOPin::new(pins::RS485_TX_GPIO),
            AnyIOPin::new(pins::RS485_RX_GPIO),
            AnyOutputPin::new(pins::RS485_DE_GPIO),
            AnyOutputPin::new(pins::RS485_RE_GPIO),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart2,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let transceiver = Transceiver::new(PinDriver::output(de)?, PinDriver::output(re)?)
        .map_err(Error::from)?;
    let bus = ModbusClient::new(
        UartLink::new(uart, transceiver),
        config.modbus_unit_id,
        config.modbus_timeout_ms,
    );

    // ── 5. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let credentials = Credentials::from_build_env()?;
    // Dropping the driver would tear the interface down.
    let _wifi = wifi::connect_station(peripherals.modem, sysloop, &credentials)?;
    watchdog.feed();
    let transport = UdpTransport::bind(config.udp_port).map_err(Error::from)?;

    // ── 6. Application service ────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service = StationService::new(&config, &store);
    service.start(&mut sink);

    let mut hw = Hardware::new(store, SystemClock::new(), bus, relays, transport);
    let mut restart = SystemRestart::new();
    let mut scheduler = Scheduler::from_config(&config);

    info!("System ready. Entering main loop.");

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        run_cycle(&mut scheduler, &mut service, &mut hw, &mut restart, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_SLEEP_MS);
    }
}
