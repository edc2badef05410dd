//! Frame splitting and addresses shared by both protocol versions
//!
//! Every frame starts with a three-digit device address and ends with a
//! checksum byte followed by `\r`:
//!
//! ```text
//! ┌─────────┬──────────────────┬──────────┬────┐
//! │ AAA     │ payload          │ checksum │ \r │
//! └─────────┴──────────────────┴──────────┴────┘
//!   3 bytes   version specific    1 byte    1
//! ```

use vacuum_gauge_core::{FrameBuf, FrameError};

use crate::checksum::{checksum, verify};

/// Frame terminator
pub const TERMINATOR: u8 = b'\r';

/// Width of the address field
pub const ADDRESS_LEN: usize = 3;

/// Highest address that fits three digits
pub const MAX_ADDRESS: u16 = 999;

/// Validated device address (0–999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(u16);

impl Address {
    /// Address `value`, rejecting anything above 999
    pub const fn new(value: u16) -> Result<Self, FrameError> {
        if value > MAX_ADDRESS {
            Err(FrameError::Malformed {
                reason: "address exceeds three digits",
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Numeric value
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Three ASCII digits
    pub const fn to_ascii(self) -> [u8; ADDRESS_LEN] {
        let v = self.0;
        [
            b'0' + (v / 100) as u8,
            b'0' + (v / 10 % 10) as u8,
            b'0' + (v % 10) as u8,
        ]
    }

    /// Parse three ASCII digits
    pub fn from_ascii(digits: &[u8]) -> Result<Self, FrameError> {
        match digits {
            [a, b, c] if digits.iter().all(u8::is_ascii_digit) => Self::new(
                (a - b'0') as u16 * 100 + (b - b'0') as u16 * 10 + (c - b'0') as u16,
            ),
            _ => Err(FrameError::Malformed {
                reason: "address is not three digits",
            }),
        }
    }

    /// Fail unless `self` is the address a request was sent to
    pub fn expect(self, expected: Address) -> Result<(), FrameError> {
        if self == expected {
            Ok(())
        } else {
            Err(FrameError::AddressMismatch {
                expected: expected.0,
                actual: self.0,
            })
        }
    }
}

/// Locate the first complete frame in `buf`
///
/// Returns the frame including its terminator and the number of bytes it
/// occupies. The frame is not validated here; a frame with a bad checksum
/// still consumes its bytes.
pub fn split_frame(buf: &[u8]) -> Result<(&[u8], usize), FrameError> {
    match buf.iter().position(|&b| b == TERMINATOR) {
        Some(end) => Ok((&buf[..=end], end + 1)),
        None => Err(FrameError::Incomplete),
    }
}

/// Append checksum and terminator to `body` (address and payload)
pub(crate) fn seal(mut body: FrameBuf) -> Result<FrameBuf, FrameError> {
    let sum = checksum(&body);
    body.push(sum).map_err(|_| FrameError::Overflow)?;
    body.push(TERMINATOR).map_err(|_| FrameError::Overflow)?;
    Ok(body)
}

/// Check terminator, length and checksum; return address and payload
pub(crate) fn open(frame: &[u8], min_len: usize) -> Result<(Address, &[u8]), FrameError> {
    let Some((&TERMINATOR, rest)) = frame.split_last() else {
        return Err(FrameError::Incomplete);
    };
    if frame.len() < min_len {
        return Err(FrameError::TooShort {
            len: frame.len(),
            min: min_len,
        });
    }
    let (&actual, body) = rest.split_last().ok_or(FrameError::TooShort {
        len: frame.len(),
        min: min_len,
    })?;
    if !verify(body, actual) {
        return Err(FrameError::Checksum {
            expected: checksum(body),
            actual,
        });
    }
    let address = Address::from_ascii(&body[..ADDRESS_LEN.min(body.len())])?;
    Ok((address, &body[ADDRESS_LEN..]))
}
