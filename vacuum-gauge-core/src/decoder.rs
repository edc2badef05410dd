//! Signal decoding
//!
//! Turns one [`RawSample`] into an uncorrected pressure in the profile's
//! native unit:
//!
//! ```text
//! Frame  ──► codec ──► status? ──yes──► profile fault table ──► Fault
//!                         │ no
//!                         ▼
//! Analog ──► fault band? ─┴─no──► response ──► PressureValue (native unit)
//!               │ yes                │
//!               ▼                    └─ combination: coarse estimate drives
//!             Fault                     the crossover; the secondary signal is
//!                                       band-checked and decoded only while
//!                                       the fine element is engaged
//! ```
//!
//! The decoder is stateless apart from the [`CrossoverState`] the caller
//! passes in, which persists between readings of the same combination gauge.

use crate::errors::{Fault, FaultKind, GaugeResult};
use crate::pipeline::PipelineState;
use crate::profile::{Crossover, GaugeProfile, Response, TransferFunction};
use crate::transport::{FrameCodec, RawSample};
use crate::units::PressureValue;

/// Sensing element that produced a pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActiveElement {
    /// Only element of a single-element gauge
    Single,
    /// High-pressure element of a combination gauge (Pirani)
    Coarse,
    /// Low-pressure element of a combination gauge (cold cathode)
    Fine,
}

/// Hysteresis memory of a combination gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossoverState {
    fine_engaged: bool,
}

impl CrossoverState {
    /// Whether the fine element is currently in use
    pub fn fine_engaged(&self) -> bool {
        self.fine_engaged
    }

    /// Forget the active element (new gauge selected)
    pub fn reset(&mut self) {
        self.fine_engaged = false;
    }

    /// Apply the hysteresis rule to a coarse-element estimate
    pub fn update(&mut self, coarse_estimate: f64, crossover: &Crossover) -> ActiveElement {
        if self.fine_engaged {
            if coarse_estimate > crossover.release_above {
                log_debug!(
                    "Crossover: {} above {}, coarse element active",
                    coarse_estimate,
                    crossover.release_above
                );
                self.fine_engaged = false;
            }
        } else if coarse_estimate < crossover.engage_below {
            log_debug!(
                "Crossover: {} below {}, fine element active",
                coarse_estimate,
                crossover.engage_below
            );
            self.fine_engaged = true;
        }

        if self.fine_engaged {
            ActiveElement::Fine
        } else {
            ActiveElement::Coarse
        }
    }
}

/// Result of decoding one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    /// Uncorrected pressure in the profile's native unit
    pub pressure: PressureValue,
    /// Element that produced it
    pub element: ActiveElement,
    /// Signal fed to that element
    pub signal: f64,
}

/// Decoder bound to one profile and, for serial gauges, one frame codec
#[derive(Clone, Copy)]
pub struct SignalDecoder<'a> {
    profile: &'a GaugeProfile,
    codec: Option<&'a dyn FrameCodec>,
}

impl<'a> SignalDecoder<'a> {
    /// Create a decoder
    pub fn new(profile: &'a GaugeProfile, codec: Option<&'a dyn FrameCodec>) -> Self {
        Self { profile, codec }
    }

    /// Decode one sample
    ///
    /// Every fault carries [`PipelineState::Decoding`].
    pub fn decode(
        &self,
        sample: &RawSample,
        crossover: &mut CrossoverState,
    ) -> GaugeResult<Decoded> {
        self.decode_inner(sample, crossover)
            .map_err(|fault| fault.at_stage(PipelineState::Decoding))
    }

    fn decode_inner(
        &self,
        sample: &RawSample,
        crossover: &mut CrossoverState,
    ) -> GaugeResult<Decoded> {
        let (primary, secondary) = match sample {
            RawSample::Frame { bytes, .. } => {
                let codec = self.codec.ok_or(Fault::invalid_configuration(
                    "frame received but no codec configured",
                ))?;
                let fields = codec.parse_measurement(bytes)?;
                if let Some(code) = fields.status {
                    log_debug!("Gauge {} reported status {}", self.profile.id(), code);
                    return Err(self.profile.fault_for_status(code));
                }
                let value = fields.value.ok_or(Fault::new(
                    FaultKind::CommunicationError,
                    "reply carries no measurement",
                ))?;
                (value, None)
            }
            RawSample::Analog(sample) => {
                self.check_band(sample.primary)?;
                (sample.primary, sample.secondary)
            }
        };

        match self.profile.response() {
            Response::Single(tf) => self.evaluate(tf, primary, ActiveElement::Single),
            Response::Combination {
                coarse,
                fine,
                crossover: thresholds,
            } => {
                let estimate = coarse.evaluate(primary)?;
                match crossover.update(estimate, thresholds) {
                    ActiveElement::Fine => {
                        // The fine element only has a signal on dual-output heads
                        let signal = secondary.ok_or(
                            Fault::invalid_configuration(
                                "fine element active but sample has no secondary signal",
                            )
                            .with_value(estimate),
                        )?;
                        self.check_band(signal)?;
                        self.evaluate(fine, signal, ActiveElement::Fine)
                    }
                    _ => self.native(estimate, primary, ActiveElement::Coarse),
                }
            }
        }
    }

    fn check_band(&self, signal: f64) -> GaugeResult<()> {
        match self.profile.faults().check_signal(signal) {
            Some(fault) => {
                log_debug!("Signal {} in fault band ({})", signal, fault.kind);
                Err(fault)
            }
            None => Ok(()),
        }
    }

    fn evaluate(
        &self,
        tf: &TransferFunction,
        signal: f64,
        element: ActiveElement,
    ) -> GaugeResult<Decoded> {
        let pressure = tf.evaluate(signal)?;
        self.native(pressure, signal, element)
    }

    fn native(&self, pressure: f64, signal: f64, element: ActiveElement) -> GaugeResult<Decoded> {
        Ok(Decoded {
            pressure: PressureValue::new(pressure, self.profile.native_unit())?,
            element,
            signal,
        })
    }
}
