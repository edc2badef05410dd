//! Fault Types for Gauge Reading Failures
//!
//! ## Design Philosophy
//!
//! A failed read is an ordinary outcome for a vacuum gauge: filaments burn out,
//! cold-cathode discharges fail to ignite, RS485 links drop bytes. Every failure
//! therefore surfaces as a [`Fault`] value and the caller decides what to do.
//!
//! 1. **Small Size**: `Fault` is `Copy`, details are `&'static str`, so faults
//!    can be returned from hot paths and stored without allocation.
//!
//! 2. **Actionable Information**: each fault carries its [`FaultKind`], the
//!    pipeline stage that produced it, the raw hardware status code (if any),
//!    the offending value (if any) and the number of attempts spent on it.
//!
//! ## Fault Categories
//!
//! ### Retryable
//! - `CommunicationError`: framing error, link loss, unknown status code
//! - `Transient`: transport timeout
//!
//! ### Deterministic (never retried)
//! - `OutOfRange`: signal outside the transfer-function domain, or pressure
//!   outside the gauge's valid range
//! - `SensorOff`, `FilamentFailure`: reported by the hardware
//! - `UnsupportedUnit`: unit outside the closed set or the profile's set
//! - `InvalidConfiguration`: rejected configuration or profile
//!
//! ### Terminal
//! - `Cancelled`: the caller abandoned the read between attempts
//!
//! ## Handling Strategy
//!
//! ```rust
//! use vacuum_gauge_core::{Fault, FaultKind, PipelineState};
//!
//! fn handle(fault: Fault) {
//!     match fault.kind {
//!         FaultKind::OutOfRange if fault.stage == Some(PipelineState::Validating) => {
//!             // Decoded fine, but outside what this gauge can measure
//!         }
//!         FaultKind::OutOfRange => {
//!             // Signal outside the calibration curve, check wiring
//!         }
//!         FaultKind::FilamentFailure | FaultKind::SensorOff => {
//!             // Schedule maintenance
//!         }
//!         kind if kind.is_retryable() => {
//!             // Retries were already exhausted; fault.attempts says how many
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use core::fmt;

use thiserror_no_std::Error;

use crate::pipeline::PipelineState;
use crate::transport::TransportError;

/// Result type for gauge operations
pub type GaugeResult<T> = Result<T, Fault>;

/// Classification of a failed read or rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultKind {
    /// Signal or pressure outside the physically meaningful range
    OutOfRange,
    /// Sensor element switched off or disabled
    SensorOff,
    /// Filament or sensing element defective
    FilamentFailure,
    /// Link, framing or protocol failure (retryable)
    CommunicationError,
    /// Unit outside the closed set or not supported by the gauge
    UnsupportedUnit,
    /// Temporary disruption such as a timeout (retryable)
    Transient,
    /// Read abandoned by the caller
    Cancelled,
    /// Configuration or profile rejected
    InvalidConfiguration,
}

impl FaultKind {
    /// Only communication-level faults can change outcome on a second attempt
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::CommunicationError | Self::Transient)
    }

    /// Short human-readable description
    pub const fn describe(self) -> &'static str {
        match self {
            Self::OutOfRange => "pressure out of range",
            Self::SensorOff => "sensor off",
            Self::FilamentFailure => "filament failure",
            Self::CommunicationError => "communication error",
            Self::UnsupportedUnit => "unsupported unit",
            Self::Transient => "transient failure",
            Self::Cancelled => "cancelled",
            Self::InvalidConfiguration => "invalid configuration",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A typed failure returned instead of a reading
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{kind}: {detail}")]
pub struct Fault {
    /// What went wrong
    pub kind: FaultKind,
    /// Human-readable detail
    pub detail: &'static str,
    /// Raw status code reported by the gauge, preserved for diagnostics
    pub status_code: Option<u16>,
    /// Offending signal or pressure value
    pub value: Option<f64>,
    /// Pipeline stage in which the fault arose (None outside a pipeline)
    pub stage: Option<PipelineState>,
    /// Transport attempts spent before giving up (0 when no retry executor ran)
    pub attempts: u32,
}

impl Fault {
    /// Create a fault with no diagnostics attached
    pub const fn new(kind: FaultKind, detail: &'static str) -> Self {
        Self {
            kind,
            detail,
            status_code: None,
            value: None,
            stage: None,
            attempts: 0,
        }
    }

    /// Out-of-range fault carrying the offending value
    pub const fn out_of_range(detail: &'static str, value: f64) -> Self {
        Self::new(FaultKind::OutOfRange, detail).with_value(value)
    }

    /// Unit not in the closed set or not supported by the gauge
    pub const fn unsupported_unit(detail: &'static str) -> Self {
        Self::new(FaultKind::UnsupportedUnit, detail)
    }

    /// Configuration rejected
    pub const fn invalid_configuration(detail: &'static str) -> Self {
        Self::new(FaultKind::InvalidConfiguration, detail)
    }

    /// Read abandoned by the caller after `attempts` transport calls
    pub const fn cancelled(attempts: u32) -> Self {
        Self::new(FaultKind::Cancelled, "read cancelled").with_attempts(attempts)
    }

    /// Attach the raw hardware status code
    pub const fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Attach the offending value
    pub const fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Record the stage that produced the fault, keeping an earlier one
    pub const fn at_stage(mut self, stage: PipelineState) -> Self {
        if self.stage.is_none() {
            self.stage = Some(stage);
        }
        self
    }

    /// Record the number of transport attempts
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Whether the retry executor may try again
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<TransportError> for Fault {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Fault::new(FaultKind::Transient, "transport timeout"),
            TransportError::Framing => {
                Fault::new(FaultKind::CommunicationError, "transport framing error")
            }
            TransportError::LinkLost => Fault::new(FaultKind::CommunicationError, "link lost"),
            TransportError::Unavailable => {
                Fault::new(FaultKind::CommunicationError, "hardware unavailable")
            }
            TransportError::Unsupported => {
                Fault::invalid_configuration("request not supported by transport")
            }
        }
        .at_stage(PipelineState::Acquiring)
    }
}

/// Errors raised while splitting or parsing a serial frame
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// No terminator yet, more bytes are needed
    #[error("Incomplete frame")]
    Incomplete,

    /// Terminated frame shorter than the protocol minimum
    #[error("Frame too short: {len} bytes, need {min}")]
    TooShort {
        /// Bytes received
        len: usize,
        /// Protocol minimum
        min: usize,
    },

    /// Checksum byte does not match the payload
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    Checksum {
        /// Computed checksum
        expected: u8,
        /// Received checksum
        actual: u8,
    },

    /// Reply came from a different device address
    #[error("Address mismatch: expected {expected}, got {actual}")]
    AddressMismatch {
        /// Address the request was sent to
        expected: u16,
        /// Address in the reply
        actual: u16,
    },

    /// Reply to a different command
    #[error("Unexpected command in reply")]
    UnexpectedCommand,

    /// Field could not be parsed
    #[error("Malformed frame: {reason}")]
    Malformed {
        /// Which field was bad
        reason: &'static str,
    },

    /// Frame does not fit the fixed-size buffer
    #[error("Frame exceeds buffer capacity")]
    Overflow,
}

impl From<FrameError> for Fault {
    fn from(err: FrameError) -> Self {
        let detail = match err {
            FrameError::Incomplete => "incomplete frame",
            FrameError::TooShort { .. } => "frame too short",
            FrameError::Checksum { .. } => "frame checksum mismatch",
            FrameError::AddressMismatch { .. } => "reply from unexpected address",
            FrameError::UnexpectedCommand => "reply to unexpected command",
            FrameError::Malformed { reason } => reason,
            FrameError::Overflow => "frame exceeds buffer",
        };
        Fault::new(FaultKind::CommunicationError, detail)
    }
}

/// Errors raised when a gauge profile is inconsistent
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProfileError {
    /// Transfer function has no segments
    #[error("Transfer function has no segments")]
    Empty,

    /// Segment start is not below its end
    #[error("Segment domain [{start}, {end}] is empty or inverted")]
    InvalidDomain {
        /// Segment start
        start: f64,
        /// Segment end
        end: f64,
    },

    /// Segments leave part of the input domain uncovered
    #[error("Gap in transfer function domain at {at}")]
    Gap {
        /// Boundary where the gap starts
        at: f64,
    },

    /// Segments cover part of the input domain twice
    #[error("Overlapping segments at {at}")]
    Overlap {
        /// Boundary where the overlap starts
        at: f64,
    },

    /// Coefficient is NaN or infinite
    #[error("Non-finite coefficient")]
    NonFiniteCoefficient,

    /// Calibration table unsorted or too short
    #[error("Calibration table invalid: {reason}")]
    InvalidTable {
        /// What is wrong with the table
        reason: &'static str,
    },

    /// More segments, points, bands or codes than the fixed capacity
    #[error("Capacity exceeded: {what}")]
    CapacityExceeded {
        /// Which collection overflowed
        what: &'static str,
    },

    /// Valid range empty, negative or not finite
    #[error("Valid range [{min}, {max}] is invalid")]
    InvalidRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Crossover thresholds do not form a hysteresis band
    #[error("Crossover engage {engage_below} must be below release {release_above}")]
    InvalidCrossover {
        /// Switch to the fine element below this pressure
        engage_below: f64,
        /// Switch back to the coarse element above this pressure
        release_above: f64,
    },

    /// Gauge type and response shape disagree
    #[error("Gauge type does not match its response")]
    TypeMismatch,

    /// Default unit missing from the supported set
    #[error("Default unit not in supported unit set")]
    DefaultUnitUnsupported,

    /// Builder finished without a response
    #[error("Profile has no transfer function")]
    MissingResponse,
}

impl From<ProfileError> for Fault {
    fn from(err: ProfileError) -> Self {
        let fault = Fault::invalid_configuration("gauge profile rejected");
        match err {
            ProfileError::DefaultUnitUnsupported => {
                Fault::unsupported_unit("default unit not supported by profile")
            }
            _ => fault,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Fault {
    fn format(&self, fmt: defmt::Formatter) {
        match self.status_code {
            Some(code) => defmt::write!(
                fmt,
                "{}: {} (status {}, attempts {})",
                self.kind.describe(),
                self.detail,
                code,
                self.attempts
            ),
            None => defmt::write!(
                fmt,
                "{}: {} (attempts {})",
                self.kind.describe(),
                self.detail,
                self.attempts
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_communication_faults_retry() {
        assert!(FaultKind::CommunicationError.is_retryable());
        assert!(FaultKind::Transient.is_retryable());
        assert!(!FaultKind::OutOfRange.is_retryable());
        assert!(!FaultKind::SensorOff.is_retryable());
        assert!(!FaultKind::FilamentFailure.is_retryable());
        assert!(!FaultKind::UnsupportedUnit.is_retryable());
        assert!(!FaultKind::Cancelled.is_retryable());
    }

    #[test]
    fn timeout_is_transient_at_acquiring() {
        let fault = Fault::from(TransportError::Timeout);
        assert_eq!(fault.kind, FaultKind::Transient);
        assert_eq!(fault.stage, Some(PipelineState::Acquiring));

        let fault = Fault::from(TransportError::LinkLost);
        assert_eq!(fault.kind, FaultKind::CommunicationError);

        let fault = Fault::from(TransportError::Unsupported);
        assert!(!fault.is_retryable());
    }

    #[test]
    fn first_stage_wins() {
        let fault = Fault::new(FaultKind::OutOfRange, "x")
            .at_stage(PipelineState::Decoding)
            .at_stage(PipelineState::Failed);
        assert_eq!(fault.stage, Some(PipelineState::Decoding));
    }

    #[test]
    fn frame_errors_are_communication_faults() {
        let fault = Fault::from(FrameError::Checksum { expected: 70, actual: 65 });
        assert_eq!(fault.kind, FaultKind::CommunicationError);
        assert_eq!(fault.detail, "frame checksum mismatch");
    }

    #[test]
    fn display_includes_kind_and_detail() {
        let fault = Fault::out_of_range("signal outside calibration domain", 12.0);
        let text = format!("{}", fault);
        assert!(text.contains("out of range"));
        assert!(text.contains("calibration domain"));
    }
}
