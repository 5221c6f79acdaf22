//! Command, status, and parameter tags of the station protocol.
//!
//! Every tag is a printable ASCII byte.  Raw bytes are mapped through
//! explicit lookup tables; anything outside a table becomes
//! [`Command::Unknown`] (or `None` for parameters) instead of a cast.

use core::fmt;

pub const TAG_PING: u8 = b'p';
pub const TAG_RESET: u8 = b'X';
pub const TAG_TELEMETRY: u8 = b't';
pub const TAG_RTC_READ: u8 = b'r';
pub const TAG_RTC_SET: u8 = b'R';
pub const TAG_CONFIG_READ: u8 = b'c';
pub const TAG_CONFIG_SET: u8 = b'C';
pub const TAG_OUTPUT_READ: u8 = b'o';
pub const TAG_OUTPUT_SET: u8 = b'O';

/// Response tag sent in place of the echoed command on rejection.
pub const TAG_NACK: u8 = b'N';

pub const PARAM_VOLTAGE_OFF: u8 = b'o';
pub const PARAM_VOLTAGE_ON: u8 = b'O';

/// A decoded request command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Reset,
    Telemetry,
    RtcRead,
    RtcSet,
    ConfigRead,
    ConfigSet,
    OutputRead,
    OutputSet,
    /// Any tag byte not in the table, kept so it can be echoed in a Nack.
    Unknown(u8),
}

impl Command {
    pub const fn from_tag(tag: u8) -> Self {
        match tag {
            TAG_PING => Self::Ping,
            TAG_RESET => Self::Reset,
            TAG_TELEMETRY => Self::Telemetry,
            TAG_RTC_READ => Self::RtcRead,
            TAG_RTC_SET => Self::RtcSet,
            TAG_CONFIG_READ => Self::ConfigRead,
            TAG_CONFIG_SET => Self::ConfigSet,
            TAG_OUTPUT_READ => Self::OutputRead,
            TAG_OUTPUT_SET => Self::OutputSet,
            other => Self::Unknown(other),
        }
    }

    pub const fn tag(self) -> u8 {
        match self {
            Self::Ping => TAG_PING,
            Self::Reset => TAG_RESET,
            Self::Telemetry => TAG_TELEMETRY,
            Self::RtcRead => TAG_RTC_READ,
            Self::RtcSet => TAG_RTC_SET,
            Self::ConfigRead => TAG_CONFIG_READ,
            Self::ConfigSet => TAG_CONFIG_SET,
            Self::OutputRead => TAG_OUTPUT_READ,
            Self::OutputSet => TAG_OUTPUT_SET,
            Self::Unknown(tag) => tag,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::Reset => "Reset",
            Self::Telemetry => "Telemetry",
            Self::RtcRead => "RTCRead",
            Self::RtcSet => "RTCSet",
            Self::ConfigRead => "ConfigRead",
            Self::ConfigSet => "ConfigSet",
            Self::OutputRead => "OutputRead",
            Self::OutputSet => "OutputSet",
            Self::Unknown(_) => "Unknown",
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(tag) => write!(f, "Unknown(0x{tag:02x})"),
            other => f.write_str(other.name()),
        }
    }
}

/// First byte of a response datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The request was executed; carries the echoed command.
    Echo(Command),
    /// The request was rejected.
    Nack,
}

impl Status {
    pub const fn tag(self) -> u8 {
        match self {
            Self::Echo(command) => command.tag(),
            Self::Nack => TAG_NACK,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo(command) => write!(f, "{command}"),
            Self::Nack => f.write_str("Nack"),
        }
    }
}

/// Identifier of a persisted threshold in ConfigRead / ConfigSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigParam {
    VoltageOff,
    VoltageOn,
}

impl ConfigParam {
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            PARAM_VOLTAGE_OFF => Some(Self::VoltageOff),
            PARAM_VOLTAGE_ON => Some(Self::VoltageOn),
            _ => None,
        }
    }

    pub const fn id(self) -> u8 {
        match self {
            Self::VoltageOff => PARAM_VOLTAGE_OFF,
            Self::VoltageOn => PARAM_VOLTAGE_ON,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::VoltageOff => "MainVoltageOff",
            Self::VoltageOn => "MainVoltageOn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [Command; 9] = [
        Command::Ping,
        Command::Reset,
        Command::Telemetry,
        Command::RtcRead,
        Command::RtcSet,
        Command::ConfigRead,
        Command::ConfigSet,
        Command::OutputRead,
        Command::OutputSet,
    ];

    #[test]
    fn every_known_tag_maps_back_to_itself() {
        for command in KNOWN {
            assert_eq!(Command::from_tag(command.tag()), command);
            assert!(command.is_known());
        }
    }

    #[test]
    fn tags_are_unique() {
        for (i, a) in KNOWN.iter().enumerate() {
            for b in &KNOWN[i + 1..] {
                assert_ne!(a.tag(), b.tag(), "{a} and {b} share a tag");
            }
        }
    }

    #[test]
    fn every_other_byte_is_unknown() {
        let known: Vec<u8> = KNOWN.iter().map(|c| c.tag()).collect();
        for raw in 0..=u8::MAX {
            if known.contains(&raw) {
                continue;
            }
            assert_eq!(Command::from_tag(raw), Command::Unknown(raw));
            assert_eq!(Command::from_tag(raw).tag(), raw);
        }
    }

    #[test]
    fn nack_tag_is_not_a_command() {
        assert!(!Command::from_tag(TAG_NACK).is_known());
        assert_eq!(Status::Nack.tag(), b'N');
        assert_eq!(Status::Echo(Command::Ping).tag(), b'p');
    }

    #[test]
    fn config_params() {
        assert_eq!(ConfigParam::from_id(b'o'), Some(ConfigParam::VoltageOff));
        assert_eq!(ConfigParam::from_id(b'O'), Some(ConfigParam::VoltageOn));
        assert_eq!(ConfigParam::from_id(b'x'), None);
        assert_eq!(ConfigParam::VoltageOn.id(), b'O');
    }

    #[test]
    fn display_includes_raw_tag_for_unknown() {
        assert_eq!(Command::from_tag(0xFF).to_string(), "Unknown(0xff)");
        assert_eq!(Command::RtcSet.to_string(), "RTCSet");
    }
}
