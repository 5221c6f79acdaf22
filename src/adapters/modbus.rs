//! Modbus RTU client for the charge controller.
//!
//! Implements [`RegisterPort`] with function 0x04 (read input registers)
//! over a half-duplex RS-485 [`SerialLink`].
//!
//! ```text
//!  request   unit │ 0x04 │ addr hi │ addr lo │ count hi │ count lo │ crc lo │ crc hi
//!  reply     unit │ 0x04 │ bytes=2n │ reg0 hi │ reg0 lo │ … │ crc lo │ crc hi
//!  exception unit │ 0x84 │ code │ crc lo │ crc hi
//! ```
//!
//! Frames are built and checked with `rmodbus` (CRC-16/MODBUS, low byte
//! first).  This module owns the bus timing: the 3-byte header is read
//! first to learn the frame length, then the rest.  A short or missing
//! reply is a timeout.  A reply that fails the CRC, comes from the wrong
//! unit or answers another function is rejected.

use embedded_hal::digital::OutputPin;
use log::debug;
use rmodbus::client::ModbusRequest;
use rmodbus::{ErrorKind, ModbusProto, guess_response_frame_len};

use crate::app::ports::RegisterPort;
use crate::error::TelemetryError;

const EXCEPTION_FLAG: u8 = 0x80;

/// Largest block this client reads in one request.
pub const MAX_REGISTERS: usize = 32;

const REQUEST_LEN: usize = 8;
const HEADER_LEN: usize = 3;
const CRC_LEN: usize = 2;
const MAX_REPLY_LEN: usize = HEADER_LEN + 2 * MAX_REGISTERS + CRC_LEN;

// ───────────────────────────────────────────────────────────────
// Serial link
// ───────────────────────────────────────────────────────────────

/// Byte pipe to the RS-485 bus.
pub trait SerialLink {
    /// Drop anything left in the receive buffer.
    fn discard_input(&mut self) {}

    /// Put `frame` on the bus.  Returns once the last byte has left the
    /// transmitter and the bus is released.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), TelemetryError>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout_ms`.
    /// Returns how many bytes arrived.
    fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TelemetryError>;
}

/// RS-485 transceiver direction control (DE / RE̅ lines).
///
/// Both lines high drives the bus, both low listens.  Starts listening.
pub struct Transceiver<DE, RE> {
    de: DE,
    re: RE,
}

impl<DE: OutputPin, RE: OutputPin> Transceiver<DE, RE> {
    pub fn new(de: DE, re: RE) -> Result<Self, TelemetryError> {
        let mut t = Self { de, re };
        t.listen()?;
        Ok(t)
    }

    pub fn drive(&mut self) -> Result<(), TelemetryError> {
        self.re.set_high().map_err(|_| TelemetryError::LinkFailed)?;
        self.de.set_high().map_err(|_| TelemetryError::LinkFailed)
    }

    pub fn listen(&mut self) -> Result<(), TelemetryError> {
        self.re.set_low().map_err(|_| TelemetryError::LinkFailed)?;
        self.de.set_low().map_err(|_| TelemetryError::LinkFailed)
    }
}

// ───────────────────────────────────────────────────────────────
// Framing
// ───────────────────────────────────────────────────────────────

fn frame_error(e: ErrorKind) -> TelemetryError {
    match e {
        ErrorKind::FrameCRCError => TelemetryError::CrcMismatch,
        ErrorKind::IllegalFunction => TelemetryError::Exception(0x01),
        ErrorKind::IllegalDataAddress => TelemetryError::Exception(0x02),
        ErrorKind::IllegalDataValue => TelemetryError::Exception(0x03),
        ErrorKind::SlaveDeviceFailure => TelemetryError::Exception(0x04),
        ErrorKind::Acknowledge => TelemetryError::Exception(0x05),
        ErrorKind::SlaveDeviceBusy => TelemetryError::Exception(0x06),
        other => {
            debug!("Modbus: rejected frame ({:?})", other);
            TelemetryError::UnexpectedReply
        }
    }
}

fn build_request(
    unit: u8,
    address: u16,
    count: u16,
) -> Result<(ModbusRequest, Vec<u8>), TelemetryError> {
    let mut request = ModbusRequest::new(unit, ModbusProto::Rtu);
    let mut frame = Vec::with_capacity(REQUEST_LEN);
    request
        .generate_get_inputs(address, count, &mut frame)
        .map_err(frame_error)?;
    Ok((request, frame))
}

/// Validate a complete reply against `request` and copy its registers
/// into `out`.
fn parse_reply(
    request: &ModbusRequest,
    reply: &[u8],
    out: &mut [u16],
) -> Result<(), TelemetryError> {
    if reply.len() < HEADER_LEN + CRC_LEN {
        return Err(TelemetryError::Timeout);
    }
    let mut regs: Vec<u16> = Vec::with_capacity(out.len());
    request.parse_u16(reply, &mut regs).map_err(frame_error)?;
    if regs.len() != out.len() {
        return Err(TelemetryError::UnexpectedReply);
    }
    out.copy_from_slice(&regs);
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

pub struct ModbusClient<L> {
    link: L,
    unit: u8,
    timeout_ms: u32,
}

impl<L: SerialLink> ModbusClient<L> {
    pub fn new(link: L, unit: u8, timeout_ms: u32) -> Self {
        Self {
            link,
            unit,
            timeout_ms,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Read exactly `len` bytes into `buf`, or time out.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TelemetryError> {
        let n = self.link.receive(buf, self.timeout_ms)?;
        if n < buf.len() {
            debug!("Modbus: short reply ({}/{} B)", n, buf.len());
            return Err(TelemetryError::Timeout);
        }
        Ok(())
    }
}

impl<L: SerialLink> RegisterPort for ModbusClient<L> {
    fn read_input_registers(
        &mut self,
        address: u16,
        out: &mut [u16],
    ) -> Result<(), TelemetryError> {
        if out.is_empty() || out.len() > MAX_REGISTERS {
            return Err(TelemetryError::UnexpectedReply);
        }

        let (request, frame) = build_request(self.unit, address, out.len() as u16)?;
        self.link.discard_input();
        self.link.transmit(&frame)?;

        let mut reply = [0u8; MAX_REPLY_LEN];
        self.read_exact(&mut reply[..HEADER_LEN])?;

        if reply[1] & EXCEPTION_FLAG == 0 && reply[2] as usize != out.len() * 2 {
            debug!(
                "Modbus: 0x{:04x} byte count {} (want {})",
                address,
                reply[2],
                out.len() * 2
            );
            return Err(TelemetryError::UnexpectedReply);
        }
        let total = guess_response_frame_len(&reply[..HEADER_LEN], ModbusProto::Rtu)
            .map_err(frame_error)? as usize;
        if !(HEADER_LEN..=MAX_REPLY_LEN).contains(&total) {
            return Err(TelemetryError::UnexpectedReply);
        }
        self.read_exact(&mut reply[HEADER_LEN..total])?;

        parse_reply(&request, &reply[..total], out)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP32 UART link
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_link::UartLink;

#[cfg(target_os = "espidf")]
mod esp_link {
    use embedded_hal::digital::OutputPin;
    use esp_idf_svc::hal::delay::TickType;
    use esp_idf_svc::hal::uart::UartDriver;
    use log::debug;

    use super::{SerialLink, Transceiver};
    use crate::error::TelemetryError;

    /// Transmit-done budget; a full request is under 1 ms at 115200 baud.
    const TX_DONE_TIMEOUT_MS: u64 = 50;

    pub struct UartLink<'d, DE, RE> {
        uart: UartDriver<'d>,
        transceiver: Transceiver<DE, RE>,
    }

    impl<'d, DE: OutputPin, RE: OutputPin> UartLink<'d, DE, RE> {
        pub fn new(uart: UartDriver<'d>, transceiver: Transceiver<DE, RE>) -> Self {
            Self { uart, transceiver }
        }
    }

    impl<DE: OutputPin, RE: OutputPin> SerialLink for UartLink<'_, DE, RE> {
        fn discard_input(&mut self) {
            if let Err(e) = self.uart.clear_rx() {
                debug!("Modbus: clear_rx failed ({})", e);
            }
        }

        fn transmit(&mut self, frame: &[u8]) -> Result<(), TelemetryError> {
            self.transceiver.drive()?;
            let written = self.uart.write(frame).and_then(|n| {
                self.uart
                    .wait_tx_done(TickType::new_millis(TX_DONE_TIMEOUT_MS).ticks())
                    .map(|()| n)
            });
            // Release the bus even if the write failed.
            self.transceiver.listen()?;
            match written {
                Ok(n) if n == frame.len() => Ok(()),
                Ok(_) => Err(TelemetryError::LinkFailed),
                Err(e) => {
                    debug!("Modbus: UART write failed ({})", e);
                    Err(TelemetryError::LinkFailed)
                }
            }
        }

        fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TelemetryError> {
            self.uart
                .read(buf, TickType::new_millis(timeout_ms as u64).ticks())
                .map_err(|e| {
                    debug!("Modbus: UART read failed ({})", e);
                    TelemetryError::LinkFailed
                })
        }
    }
}
