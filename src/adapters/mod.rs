//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                     |
//! |-------------|--------------|---------------------------------|
//! | `eeprom`    | ByteStore    | NVS blob / in-memory mirror     |
//! |             | ConfigPort   |                                 |
//! | `log_sink`  | EventSink    | Serial log output               |
//! | `modbus`    | RegisterPort | Charge controller over RS-485   |
//! | `system`    | RestartPort  | `esp_restart()`                 |
//! | `time`      | ClockPort    | ESP32 system timer + RTC        |
//! | `udp`       | DatagramPort | UDP socket (lwIP)               |
//! | `wifi`      | none         | ESP-IDF WiFi STA bring-up       |

pub mod eeprom;
pub mod log_sink;
pub mod modbus;
pub mod system;
pub mod time;
pub mod udp;
pub mod wifi;
