//! Protocol version 2: access codes and two-character commands
//!
//! ```text
//! 001 0 MV 00 <cs>\r                 read measurement value
//! 001 1 MV 07 1.23E-3 <cs>\r         reply (access code 0 + 1)
//! 001 7 MV 06 ERROR1 <cs>\r          error reply, sensor defect
//! ```
//!
//! Replies carry the request's access code plus one, except streaming (6)
//! and error (7) replies. Error replies carry one of a fixed set of
//! six-character messages, mapped here to numeric status codes so the
//! engine's fault table can classify them.

use heapless::Vec;
use vacuum_gauge_core::{
    FaultKind, FaultTable, FrameBuf, FrameCodec, FrameError, FrameFields, ProfileError,
};

use crate::frame::{open, seal, Address};

/// Smallest valid frame: address, access code, command, length, checksum, `\r`
pub const MIN_FRAME_LEN: usize = 10;

/// Largest data field this implementation accepts
pub const MAX_DATA_LEN: usize = 32;

/// Data field of a V2 frame
pub type Data = Vec<u8, MAX_DATA_LEN>;

/// Command that reads the current pressure
pub const MEASURE_VALUE: [u8; 2] = *b"MV";

/// Status code used for error replies with an unrecognised message
pub const UNKNOWN_ERROR_STATUS: u16 = 0;

/// Access code digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessCode {
    /// Read request
    Read,
    /// Reply to a read
    ReadReply,
    /// Write request
    Write,
    /// Reply to a write
    WriteReply,
    /// Restore factory default
    FactoryDefault,
    /// Reply to a factory-default request
    FactoryDefaultReply,
    /// Unsolicited streaming reply
    Streaming,
    /// Error reply
    Error,
    /// Binary transfer request
    Binary,
    /// Reply to a binary request
    BinaryReply,
}

impl AccessCode {
    /// Numeric code
    pub const fn code(self) -> u8 {
        match self {
            Self::Read => 0,
            Self::ReadReply => 1,
            Self::Write => 2,
            Self::WriteReply => 3,
            Self::FactoryDefault => 4,
            Self::FactoryDefaultReply => 5,
            Self::Streaming => 6,
            Self::Error => 7,
            Self::Binary => 8,
            Self::BinaryReply => 9,
        }
    }

    /// Access code for an ASCII digit
    pub fn from_ascii(digit: u8) -> Result<Self, FrameError> {
        Ok(match digit {
            b'0' => Self::Read,
            b'1' => Self::ReadReply,
            b'2' => Self::Write,
            b'3' => Self::WriteReply,
            b'4' => Self::FactoryDefault,
            b'5' => Self::FactoryDefaultReply,
            b'6' => Self::Streaming,
            b'7' => Self::Error,
            b'8' => Self::Binary,
            b'9' => Self::BinaryReply,
            _ => {
                return Err(FrameError::Malformed {
                    reason: "unknown access code",
                })
            }
        })
    }

    /// Access code a successful reply carries
    pub const fn reply(self) -> Self {
        match self {
            Self::Read => Self::ReadReply,
            Self::Write => Self::WriteReply,
            Self::FactoryDefault => Self::FactoryDefaultReply,
            Self::Binary => Self::BinaryReply,
            other => other,
        }
    }
}

/// Error messages a V2 gauge can reply with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMessage {
    /// `NO_DEF`
    NotDefined,
    /// `_LOGIC`
    Logic,
    /// `_RANGE`
    Range,
    /// `ERROR1`
    SensorError,
    /// `SYNTAX`
    Syntax,
    /// `LENGTH`
    Length,
    /// `_CD_RE`
    CalibrationReadError,
    /// `_EP_RE`
    EepromReadError,
    /// `_UNSUP`
    UnsupportedData,
    /// `_SEDIS`
    SensorDisabled,
}

impl ErrorMessage {
    /// Every message, in status-code order
    pub const ALL: [ErrorMessage; 10] = [
        Self::NotDefined,
        Self::Logic,
        Self::Range,
        Self::SensorError,
        Self::Syntax,
        Self::Length,
        Self::CalibrationReadError,
        Self::EepromReadError,
        Self::UnsupportedData,
        Self::SensorDisabled,
    ];

    /// Six-character wire text
    pub const fn text(self) -> &'static [u8; 6] {
        match self {
            Self::NotDefined => b"NO_DEF",
            Self::Logic => b"_LOGIC",
            Self::Range => b"_RANGE",
            Self::SensorError => b"ERROR1",
            Self::Syntax => b"SYNTAX",
            Self::Length => b"LENGTH",
            Self::CalibrationReadError => b"_CD_RE",
            Self::EepromReadError => b"_EP_RE",
            Self::UnsupportedData => b"_UNSUP",
            Self::SensorDisabled => b"_SEDIS",
        }
    }

    /// Message for wire text
    pub fn from_text(text: &[u8]) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| &m.text()[..] == text)
    }

    /// Status code reported to the engine (1-based)
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotDefined => 1,
            Self::Logic => 2,
            Self::Range => 3,
            Self::SensorError => 4,
            Self::Syntax => 5,
            Self::Length => 6,
            Self::CalibrationReadError => 7,
            Self::EepromReadError => 8,
            Self::UnsupportedData => 9,
            Self::SensorDisabled => 10,
        }
    }

    /// How the engine should classify the error
    pub const fn fault_kind(self) -> FaultKind {
        match self {
            Self::SensorError => FaultKind::FilamentFailure,
            Self::SensorDisabled => FaultKind::SensorOff,
            Self::CalibrationReadError | Self::EepromReadError => FaultKind::CommunicationError,
            Self::NotDefined
            | Self::Logic
            | Self::Range
            | Self::Syntax
            | Self::Length
            | Self::UnsupportedData => FaultKind::InvalidConfiguration,
        }
    }

    /// Human-readable description
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotDefined => "command not defined for device",
            Self::Logic => "access code invalid or command not logical",
            Self::Range => "value in request out of range",
            Self::SensorError => "sensor defective or stacked out",
            Self::Syntax => "data syntax wrong or mode not valid",
            Self::Length => "data length out of expected range",
            Self::CalibrationReadError => "calibration data read error",
            Self::EepromReadError => "EEPROM read error",
            Self::UnsupportedData => "unsupported data value",
            Self::SensorDisabled => "sensor element disabled",
        }
    }
}

/// Fault table classifying every V2 error message
pub fn fault_table() -> Result<FaultTable, ProfileError> {
    let mut table = FaultTable::new();
    for message in ErrorMessage::ALL {
        table.insert(message.status_code(), message.fault_kind())?;
    }
    Ok(table)
}

/// One V2 request or reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device address
    pub address: Address,
    /// Access code
    pub access: AccessCode,
    /// Two-character command
    pub command: [u8; 2],
    /// Data field
    pub data: Data,
}

impl Frame {
    /// Frame carrying `data`
    pub fn new(
        address: Address,
        access: AccessCode,
        command: [u8; 2],
        data: &[u8],
    ) -> Result<Self, FrameError> {
        Ok(Self {
            address,
            access,
            command,
            data: Data::from_slice(data).map_err(|_| FrameError::Overflow)?,
        })
    }

    /// Serialize with length, checksum and terminator
    pub fn encode(&self) -> Result<FrameBuf, FrameError> {
        let len = self.data.len();
        let mut body = FrameBuf::new();
        body.extend_from_slice(&self.address.to_ascii())
            .map_err(|_| FrameError::Overflow)?;
        body.push(b'0' + self.access.code())
            .map_err(|_| FrameError::Overflow)?;
        body.extend_from_slice(&self.command)
            .map_err(|_| FrameError::Overflow)?;
        body.extend_from_slice(&[b'0' + (len / 10) as u8, b'0' + (len % 10) as u8])
            .map_err(|_| FrameError::Overflow)?;
        body.extend_from_slice(&self.data)
            .map_err(|_| FrameError::Overflow)?;
        seal(body)
    }

    /// Parse one complete frame, terminator included
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let (address, payload) = open(frame, MIN_FRAME_LEN)?;
        let [access, c0, c1, l0, l1, data @ ..] = payload else {
            return Err(FrameError::TooShort {
                len: frame.len(),
                min: MIN_FRAME_LEN,
            });
        };
        if !l0.is_ascii_digit() || !l1.is_ascii_digit() {
            return Err(FrameError::Malformed {
                reason: "length field is not numeric",
            });
        }
        let len = ((l0 - b'0') * 10 + (l1 - b'0')) as usize;
        if len != data.len() {
            return Err(FrameError::Malformed {
                reason: "length field does not match data",
            });
        }
        Self::new(address, AccessCode::from_ascii(*access)?, [*c0, *c1], data)
    }

    /// Status code of an error reply, `None` for any other frame
    pub fn error_status(&self) -> Option<u16> {
        (self.access == AccessCode::Error).then(|| {
            ErrorMessage::from_text(&self.data)
                .map(ErrorMessage::status_code)
                .unwrap_or(UNKNOWN_ERROR_STATUS)
        })
    }
}

/// [`FrameCodec`] reading pressure with a read-access command (default `MV`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Codec {
    address: Address,
    command: [u8; 2],
    request_data: Data,
}

impl V2Codec {
    /// `MV` codec for the gauge at `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            command: MEASURE_VALUE,
            request_data: Data::new(),
        }
    }

    /// Use another measurement command, optionally with request data
    /// (such as a sensor selector)
    pub fn with_command(mut self, command: [u8; 2], data: &[u8]) -> Result<Self, FrameError> {
        self.command = command;
        self.request_data = Data::from_slice(data).map_err(|_| FrameError::Overflow)?;
        Ok(self)
    }
}

impl FrameCodec for V2Codec {
    fn measurement_request(&self) -> Result<FrameBuf, FrameError> {
        Frame::new(self.address, AccessCode::Read, self.command, &self.request_data)?.encode()
    }

    fn parse_measurement(&self, frame: &[u8]) -> Result<FrameFields, FrameError> {
        let reply = Frame::decode(frame)?;
        reply.address.expect(self.address)?;
        if reply.command != self.command {
            return Err(FrameError::UnexpectedCommand);
        }
        if let Some(status) = reply.error_status() {
            log_debug!("V2 error reply {:?} (status {})", reply.data, status);
            return Ok(FrameFields {
                value: None,
                status: Some(status),
            });
        }
        if reply.access != AccessCode::Read.reply() {
            return Err(FrameError::UnexpectedCommand);
        }
        let value = core::str::from_utf8(&reply.data)
            .ok()
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or(FrameError::Malformed {
                reason: "measurement is not a number",
            })?;
        Ok(FrameFields {
            value: Some(value),
            status: None,
        })
    }
}
