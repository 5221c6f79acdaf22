//! Binary UDP command protocol.
//!
//! ```text
//!  datagram ──▶ codec::decode ──▶ Request ──▶ dispatcher ──▶ Response ──▶ codec::encode
//! ```
//!
//! | Module       | Responsibility                                   |
//! |--------------|--------------------------------------------------|
//! | `command`    | Tag tables: commands, Nack, config parameter ids |
//! | `wire`       | Big-endian conversion of numeric fields          |
//! | `args`       | Bounds-checked argument buffer, high-water mark  |
//! | `codec`      | Datagram ⇄ `Request` / `Response`                |
//! | `dispatcher` | Per-command execution against the station state  |
//! | `hex`        | Payload dumps for the serial log                 |

pub mod args;
pub mod codec;
pub mod command;
pub mod dispatcher;
pub mod hex;
pub mod wire;

pub use args::{ARG_CAPACITY, Args};
pub use codec::{DATAGRAM_SIZE, Request, Response, decode, encode};
pub use command::{Command, ConfigParam, Status};
