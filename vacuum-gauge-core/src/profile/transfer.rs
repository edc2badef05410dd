//! Transfer functions: raw signal to native-unit pressure
//!
//! A transfer function is an ordered run of contiguous segments. Each segment
//! owns the half-open interval `[start, end)` of the signal axis, except the
//! last one which also owns its `end`:
//!
//! ```text
//!  start₀        end₀=start₁        end₁=start₂          end₂
//!    |── Linear ────|── Logarithmic ───|──── Lookup ──────|
//! ```
//!
//! Lookup is a binary search over segment ends, so evaluation cost grows with
//! log(segments) and never allocates.

use heapless::Vec;

use crate::constants::capacity::MAX_SEGMENTS;
use crate::errors::{Fault, GaugeResult, ProfileError};
use crate::lookup::CalibrationTable;
use crate::pipeline::PipelineState;
use crate::validation::Validatable;

/// Shape of one segment
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// `p = slope·x + offset`
    Linear {
        /// Pressure per signal unit
        slope: f64,
        /// Pressure at zero signal
        offset: f64,
    },
    /// `p = 10^(slope·x + offset)`
    Logarithmic {
        /// Decades per signal unit
        slope: f64,
        /// Decade offset
        offset: f64,
    },
    /// Interpolated calibration curve
    Lookup(CalibrationTable),
}

impl SegmentKind {
    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Linear { slope, offset } => slope * x + offset,
            Self::Logarithmic { slope, offset } => libm::pow(10.0, slope * x + offset),
            Self::Lookup(table) => table.evaluate(x),
        }
    }

    fn validate(&self, start: f64, end: f64) -> Result<(), ProfileError> {
        match self {
            Self::Linear { slope, offset } | Self::Logarithmic { slope, offset } => {
                if slope.is_valid() && offset.is_valid() {
                    Ok(())
                } else {
                    Err(ProfileError::NonFiniteCoefficient)
                }
            }
            Self::Lookup(table) => {
                table.validate()?;
                let (lo, hi) = table.span();
                if lo > start || hi < end {
                    return Err(ProfileError::InvalidTable {
                        reason: "table does not cover segment domain",
                    });
                }
                Ok(())
            }
        }
    }
}

/// One piece of a transfer function
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// First signal value covered
    pub start: f64,
    /// End of the covered signal range
    pub end: f64,
    /// Formula or table for this range
    pub kind: SegmentKind,
}

impl Segment {
    /// Linear segment over `[start, end]`
    pub const fn linear(start: f64, end: f64, slope: f64, offset: f64) -> Self {
        Self {
            start,
            end,
            kind: SegmentKind::Linear { slope, offset },
        }
    }

    /// Logarithmic segment over `[start, end]`
    pub const fn logarithmic(start: f64, end: f64, slope: f64, offset: f64) -> Self {
        Self {
            start,
            end,
            kind: SegmentKind::Logarithmic { slope, offset },
        }
    }

    /// Calibration-table segment over `[start, end]`
    pub fn lookup(start: f64, end: f64, table: CalibrationTable) -> Self {
        Self {
            start,
            end,
            kind: SegmentKind::Lookup(table),
        }
    }
}

/// Contiguous, sorted sequence of segments
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFunction {
    segments: Vec<Segment, MAX_SEGMENTS>,
}

impl TransferFunction {
    /// Build from segments sorted by ascending signal
    pub fn new(segments: &[Segment]) -> Result<Self, ProfileError> {
        let segments = Vec::from_slice(segments).map_err(|_| ProfileError::CapacityExceeded {
            what: "transfer function segments",
        })?;
        let tf = Self { segments };
        tf.validate()?;
        Ok(tf)
    }

    /// Single linear segment
    pub fn linear(start: f64, end: f64, slope: f64, offset: f64) -> Result<Self, ProfileError> {
        Self::new(&[Segment::linear(start, end, slope, offset)])
    }

    /// Single logarithmic segment
    pub fn logarithmic(
        start: f64,
        end: f64,
        slope: f64,
        offset: f64,
    ) -> Result<Self, ProfileError> {
        Self::new(&[Segment::logarithmic(start, end, slope, offset)])
    }

    /// Check domains, contiguity and coefficients
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.segments.is_empty() {
            return Err(ProfileError::Empty);
        }

        for segment in &self.segments {
            let (start, end) = (segment.start, segment.end);
            if !start.is_valid() || !end.is_valid() || start >= end {
                return Err(ProfileError::InvalidDomain { start, end });
            }
            segment.kind.validate(start, end)?;
        }

        for pair in self.segments.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start > prev.end {
                return Err(ProfileError::Gap { at: prev.end });
            }
            if next.start < prev.end {
                return Err(ProfileError::Overlap { at: next.start });
            }
        }

        Ok(())
    }

    /// Segments in ascending order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Union of all segment domains
    pub fn domain(&self) -> (f64, f64) {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 0.0),
        }
    }

    /// Whether `x` falls inside the domain
    pub fn covers(&self, x: f64) -> bool {
        let (start, end) = self.domain();
        !self.segments.is_empty() && x >= start && x <= end
    }

    /// Segment owning `x`
    fn locate(&self, x: f64) -> Option<&Segment> {
        if !self.covers(x) {
            return None;
        }
        let idx = self
            .segments
            .partition_point(|s| s.end <= x)
            .min(self.segments.len() - 1);
        self.segments.get(idx)
    }

    /// Pressure for signal `x`, in the profile's native unit
    ///
    /// Faults carry [`PipelineState::Decoding`] and the offending signal.
    pub fn evaluate(&self, x: f64) -> GaugeResult<f64> {
        if !x.is_valid() {
            return Err(Fault::out_of_range("signal is not a finite number", x)
                .at_stage(PipelineState::Decoding));
        }
        let segment = self.locate(x).ok_or_else(|| {
            Fault::out_of_range("signal outside transfer function domain", x)
                .at_stage(PipelineState::Decoding)
        })?;

        let pressure = segment.kind.evaluate(x);
        if !pressure.is_valid() || pressure < 0.0 {
            log_debug!("Segment produced unphysical pressure {} for signal {}", pressure, x);
            return Err(Fault::out_of_range("transfer function produced unphysical pressure", x)
                .at_stage(PipelineState::Decoding));
        }
        Ok(pressure)
    }
}
