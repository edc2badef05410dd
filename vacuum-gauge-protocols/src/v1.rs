//! Protocol version 1: single-character commands
//!
//! ```text
//! 001M^\r          request: address 001, command M, no data
//! 001M123017X\r    reply:   pressure 1.23e-3 mbar
//! ```
//!
//! Minimum frame size is six bytes (address, command, checksum, `\r`);
//! the data field carries at most six characters. Uppercase commands read,
//! lowercase commands write.

use heapless::Vec;
use vacuum_gauge_core::{FrameBuf, FrameCodec, FrameError, FrameFields};

use crate::frame::{open, seal, Address};
use crate::number::decode_pressure;

/// Smallest valid frame
pub const MIN_FRAME_LEN: usize = 6;

/// Largest data field
pub const MAX_DATA_LEN: usize = 6;

/// Data field of a V1 frame
pub type Data = Vec<u8, MAX_DATA_LEN>;

/// Commands understood by V1 gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `T`: read gauge type
    Type,
    /// `M`: read pressure
    Measure,
    /// `m`: set the displayed pressure (emulators and adjustment)
    SetPressure,
    /// `S`: read setpoint 1 or 2
    ReadSetpoint,
    /// `s`: select, then write, a setpoint
    WriteSetpoint,
    /// `C`: read calibration factor 1 or 2
    ReadCalibration,
    /// `c`: select, then write, a calibration factor
    WriteCalibration,
    /// `I`: read Penning (cold-cathode) state
    ReadPenningState,
    /// `i`: switch the Penning element on or off
    WritePenningState,
    /// `W`: read Penning synchronisation
    ReadPenningSync,
    /// `w`: write Penning synchronisation
    WritePenningSync,
    /// `j`: select, then apply, atmosphere or zero adjustment
    Adjust,
}

impl Command {
    /// Wire character
    pub const fn code(self) -> u8 {
        match self {
            Self::Type => b'T',
            Self::Measure => b'M',
            Self::SetPressure => b'm',
            Self::ReadSetpoint => b'S',
            Self::WriteSetpoint => b's',
            Self::ReadCalibration => b'C',
            Self::WriteCalibration => b'c',
            Self::ReadPenningState => b'I',
            Self::WritePenningState => b'i',
            Self::ReadPenningSync => b'W',
            Self::WritePenningSync => b'w',
            Self::Adjust => b'j',
        }
    }

    /// Command for a wire character
    pub fn from_code(code: u8) -> Result<Self, FrameError> {
        Ok(match code {
            b'T' => Self::Type,
            b'M' => Self::Measure,
            b'm' => Self::SetPressure,
            b'S' => Self::ReadSetpoint,
            b's' => Self::WriteSetpoint,
            b'C' => Self::ReadCalibration,
            b'c' => Self::WriteCalibration,
            b'I' => Self::ReadPenningState,
            b'i' => Self::WritePenningState,
            b'W' => Self::ReadPenningSync,
            b'w' => Self::WritePenningSync,
            b'j' => Self::Adjust,
            _ => return Err(FrameError::UnexpectedCommand),
        })
    }
}

/// One V1 request or reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device address
    pub address: Address,
    /// Command
    pub command: Command,
    /// Data field (≤ 6 ASCII characters)
    pub data: Data,
}

impl Frame {
    /// Frame without data
    pub fn new(address: Address, command: Command) -> Self {
        Self {
            address,
            command,
            data: Data::new(),
        }
    }

    /// Frame carrying `data`
    pub fn with_data(address: Address, command: Command, data: &[u8]) -> Result<Self, FrameError> {
        Ok(Self {
            address,
            command,
            data: Data::from_slice(data).map_err(|_| FrameError::Overflow)?,
        })
    }

    /// Serialize with checksum and terminator
    pub fn encode(&self) -> Result<FrameBuf, FrameError> {
        let mut body = FrameBuf::new();
        body.extend_from_slice(&self.address.to_ascii())
            .map_err(|_| FrameError::Overflow)?;
        body.push(self.command.code())
            .map_err(|_| FrameError::Overflow)?;
        body.extend_from_slice(&self.data)
            .map_err(|_| FrameError::Overflow)?;
        seal(body)
    }

    /// Parse one complete frame, terminator included
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let (address, payload) = open(frame, MIN_FRAME_LEN)?;
        let (&code, data) = payload.split_first().ok_or(FrameError::TooShort {
            len: frame.len(),
            min: MIN_FRAME_LEN,
        })?;
        Self::with_data(address, Command::from_code(code)?, data)
    }
}

/// [`FrameCodec`] reading pressure with the `M` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V1Codec {
    address: Address,
}

impl V1Codec {
    /// Codec for the gauge at `address`
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Address requests are sent to
    pub fn address(&self) -> Address {
        self.address
    }
}

impl FrameCodec for V1Codec {
    fn measurement_request(&self) -> Result<FrameBuf, FrameError> {
        Frame::new(self.address, Command::Measure).encode()
    }

    fn parse_measurement(&self, frame: &[u8]) -> Result<FrameFields, FrameError> {
        let reply = Frame::decode(frame)?;
        reply.address.expect(self.address)?;
        if reply.command != Command::Measure {
            return Err(FrameError::UnexpectedCommand);
        }
        log_debug!("V1 measurement reply {:?}", reply.data);
        Ok(FrameFields {
            value: Some(decode_pressure(&reply.data)?),
            status: None,
        })
    }
}
