//! Signal interpretation and calibration engine for vacuum gauges
//!
//! Converts a raw transducer signal (an ADC voltage, or a frame read from a
//! serial gauge controller) into a calibrated, unit-tagged pressure reading.
//! Every gauge technology is described by data, a [`GaugeProfile`], so Pirani,
//! cold-cathode, capacitance and combination gauges share one decode contract.
//!
//! Key constraints:
//! - `no_std` capable (`alloc` is required for shared profiles)
//! - No heap allocation while decoding a sample
//! - Faults are values, never panics
//!
//! ```no_run
//! use vacuum_gauge_core::{
//!     presets, AnalogSample, AnalogTransport, CrossoverState, PressureUnit,
//!     ReadingPipeline, ReadingSettings,
//! };
//! # use vacuum_gauge_core::{AnalogInput, TransportError};
//! # struct Adc;
//! # impl AnalogInput for Adc {
//! #     fn sample(&mut self) -> nb::Result<AnalogSample, TransportError> {
//! #         Ok(AnalogSample::new(5.0, 0))
//! #     }
//! # }
//!
//! # fn main() -> Result<(), vacuum_gauge_core::ProfileError> {
//! let settings = ReadingSettings::new(presets::pirani_log()?, PressureUnit::Torr, 1.0);
//! let mut crossover = CrossoverState::default();
//! let mut transport = AnalogTransport::new(Adc);
//!
//! match ReadingPipeline::new(&settings, None, &mut crossover).run_blocking(&mut transport) {
//!     Ok(reading) => {}, // Calibrated pressure in Torr
//!     Err(fault) => {},  // Typed fault, never a stale value
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod constants;
pub mod decoder;
pub mod errors;
pub mod lookup;
pub mod pipeline;
pub mod profile;
pub mod retry;
pub mod time;
pub mod transport;
pub mod units;
pub mod validation;

// Public API
pub use decoder::{ActiveElement, CrossoverState, Decoded, SignalDecoder};
pub use errors::{Fault, FaultKind, FrameError, GaugeResult, ProfileError};
pub use pipeline::{PipelineState, Reading, ReadingPipeline, ReadingSettings};
pub use profile::{
    presets, CalibrationPoint, CalibrationTable, Crossover, FaultBand, FaultTable, GaugeId, GaugeProfile,
    GaugeProfileBuilder, GaugeType, Interpolation, PressureRange, Response, Segment, SegmentKind,
    TransferFunction,
};
pub use retry::{execute_blocking, JitterSource, NoJitter, RetryPolicy, RetryState, RetryStep};
pub use time::{FixedTime, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::SystemTime;
pub use transport::{
    AcquisitionRequest, AnalogInput, AnalogSample, AnalogTransport, FrameBuf, FrameCodec,
    FrameFields, RawSample, SerialLink, SerialTransport, Transport, TransportError,
};
pub use units::{convert, PressureUnit, PressureValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
