//! Unified error types for the station controller firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! binary's error handling uniform.  All variants are `Copy` so they pass
//! through the dispatcher and job runner without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A datagram or argument buffer could not be processed.
    Protocol(ProtocolError),
    /// The persistent byte store failed.
    Storage(StorageError),
    /// The charge controller could not be polled.
    Telemetry(TelemetryError),
    /// The datagram transport failed.
    Transport(TransportError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Telemetry(e) => write!(f, "telemetry: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// A read or write touched bytes outside the argument buffer.
    OutOfBounds { offset: usize, len: usize },
    /// A request did not carry the arguments its command requires.
    MissingArgument,
    /// An argument was present but not acceptable (index, value).
    InvalidArgument,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, len } => {
                write!(f, "{len} byte(s) at offset {offset} out of bounds")
            }
            Self::MissingArgument => write!(f, "missing argument"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Offset plus length runs past the end of the store.
    OutOfRange,
    /// The backing flash rejected the commit.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "address out of range"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// No (or a partial) reply before the response timeout.
    Timeout,
    /// The reply failed its CRC check.
    CrcMismatch,
    /// The slave answered with a Modbus exception code.
    Exception(u8),
    /// The reply was well-formed but not what was asked for.
    UnexpectedReply,
    /// The serial link itself failed.
    LinkFailed,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "response timeout"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::Exception(code) => write!(f, "exception 0x{code:02x}"),
            Self::UnexpectedReply => write!(f, "unexpected reply"),
            Self::LinkFailed => write!(f, "serial link failed"),
        }
    }
}

impl From<TelemetryError> for Error {
    fn from(e: TelemetryError) -> Self {
        Self::Telemetry(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    ReceiveFailed,
    SendFailed,
    BindFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReceiveFailed => write!(f, "receive failed"),
            Self::SendFailed => write!(f, "send failed"),
            Self::BindFailed => write!(f, "bind failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}
