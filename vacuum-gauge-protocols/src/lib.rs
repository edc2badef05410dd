//! RS485 ASCII wire formats for serial vacuum gauges
//!
//! Two protocol generations share addressing, checksum and framing:
//!
//! - [`v1`]: single-character commands with fixed six-digit data
//! - [`v2`]: access code, two-character command and length-prefixed data
//!
//! [`V1Codec`] and [`V2Codec`] implement the engine's `FrameCodec`, so a
//! serial profile decodes either generation through the same pipeline.
//! [`V1Emulator`] stands in for a gauge head during tests.
//!
//! ```no_run
//! use vacuum_gauge_core::{FrameCodec, SerialLink};
//! use vacuum_gauge_protocols::{Address, V1Codec, V1Emulator};
//!
//! # fn main() -> Result<(), vacuum_gauge_core::FrameError> {
//! let address = Address::new(1)?;
//! let codec = V1Codec::new(address);
//! let mut gauge = V1Emulator::new(address);
//! gauge.set_pressure(1.23e-3)?;
//!
//! let reply = gauge
//!     .query(&codec.measurement_request()?)
//!     .map_err(|_| vacuum_gauge_core::FrameError::Incomplete)?;
//! let fields = codec.parse_measurement(&reply)?;
//! assert_eq!(fields.value, Some(1.23e-3));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod checksum;
pub mod emulator;
pub mod frame;
pub mod number;
pub mod v1;
pub mod v2;

pub use checksum::checksum;
pub use emulator::V1Emulator;
pub use frame::{split_frame, Address};
pub use v1::V1Codec;
pub use v2::{fault_table as v2_fault_table, AccessCode, ErrorMessage, V2Codec};
