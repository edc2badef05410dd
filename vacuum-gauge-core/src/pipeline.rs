//! Reading pipeline
//!
//! One pipeline produces at most one reading from exactly one acquisition:
//!
//! ```text
//! Idle ──► Acquiring ──► Decoding ──► Validating ──► Correcting ──► Done
//!   │          │             │             │              │
//!   └──────────┴─────────────┴─────────────┴──────────────┴──────► Failed
//! ```
//!
//! The acquisition itself happens outside the pipeline so the same state
//! machine serves blocking and async transports: ask for the
//! [`AcquisitionRequest`], hand it to whatever transport is in use, and feed
//! the outcome to [`ReadingPipeline::finish`]. `finish` consumes the pipeline,
//! so a second acquisition needs a second pipeline. Retrying is never the
//! pipeline's business.

use alloc::sync::Arc;

use crate::decoder::{ActiveElement, CrossoverState, SignalDecoder};
use crate::errors::{Fault, GaugeResult};
use crate::profile::{GaugeId, GaugeProfile};
use crate::time::Timestamp;
use crate::transport::{AcquisitionRequest, FrameCodec, RawSample, Transport, TransportError};
use crate::units::{PressureUnit, PressureValue};
use crate::validation::{check_pressure, Validatable};

/// Stage of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipelineState {
    /// Created, nothing requested yet
    Idle,
    /// Waiting for the transport
    Acquiring,
    /// Turning the raw sample into pressure
    Decoding,
    /// Checking the pressure against the gauge range
    Validating,
    /// Applying gas correction and unit conversion
    Correcting,
    /// Reading produced
    Done,
    /// Fault produced
    Failed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipelineState {
    fn format(&self, fmt: defmt::Formatter) {
        let name = match self {
            Self::Idle => "Idle",
            Self::Acquiring => "Acquiring",
            Self::Decoding => "Decoding",
            Self::Validating => "Validating",
            Self::Correcting => "Correcting",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        defmt::write!(fmt, "{}", name)
    }
}

/// Configuration a pipeline runs with
///
/// The controller builds one of these per read, so a configuration change
/// never lands in the middle of a pipeline.
#[derive(Debug, Clone)]
pub struct ReadingSettings {
    /// Active gauge
    pub profile: Arc<GaugeProfile>,
    /// Unit the reading is reported in
    pub unit: PressureUnit,
    /// Multiplier for gases other than the calibration gas
    pub gas_correction: f64,
}

impl ReadingSettings {
    /// Bundle a profile with output unit and gas-correction factor
    pub fn new(
        profile: impl Into<Arc<GaugeProfile>>,
        unit: PressureUnit,
        gas_correction: f64,
    ) -> Self {
        Self {
            profile: profile.into(),
            unit,
            gas_correction,
        }
    }

    /// Reject units the profile does not support and non-positive factors
    pub fn validate(&self) -> GaugeResult<()> {
        if !self.profile.supports(self.unit) {
            return Err(Fault::unsupported_unit("unit not supported by gauge"));
        }
        if !self.gas_correction.is_valid() || self.gas_correction <= 0.0 {
            return Err(Fault::invalid_configuration(
                "gas correction factor must be positive",
            )
            .with_value(self.gas_correction));
        }
        Ok(())
    }
}

/// A validated, corrected measurement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reading {
    pressure: PressureValue,
    uncorrected: PressureValue,
    timestamp: Timestamp,
    gas_correction: f64,
    gauge: GaugeId,
    sensor: ActiveElement,
}

impl Reading {
    /// Corrected pressure in the configured unit
    pub fn pressure(&self) -> PressureValue {
        self.pressure
    }

    /// Magnitude in [`Self::unit`]
    pub fn magnitude(&self) -> f64 {
        self.pressure.magnitude()
    }

    /// Configured unit
    pub fn unit(&self) -> PressureUnit {
        self.pressure.unit()
    }

    /// Decoded pressure before correction, in the gauge's native unit
    pub fn uncorrected(&self) -> PressureValue {
        self.uncorrected
    }

    /// When the raw sample was taken
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Gas-correction factor that was applied
    pub fn gas_correction(&self) -> f64 {
        self.gas_correction
    }

    /// Gauge the reading came from
    pub fn gauge(&self) -> &GaugeId {
        &self.gauge
    }

    /// Sensing element that produced the reading
    pub fn sensor(&self) -> ActiveElement {
        self.sensor
    }
}

/// One pass from raw sample to reading
pub struct ReadingPipeline<'a> {
    settings: &'a ReadingSettings,
    codec: Option<&'a dyn FrameCodec>,
    crossover: &'a mut CrossoverState,
    state: PipelineState,
}

impl<'a> ReadingPipeline<'a> {
    /// Pipeline bound to `settings`; `codec` is required for serial gauges
    pub fn new(
        settings: &'a ReadingSettings,
        codec: Option<&'a dyn FrameCodec>,
        crossover: &'a mut CrossoverState,
    ) -> Self {
        Self {
            settings,
            codec,
            crossover,
            state: PipelineState::Idle,
        }
    }

    /// Current stage
    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn enter(&mut self, next: PipelineState) {
        log_trace!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, fault: Fault) -> Fault {
        let fault = fault.at_stage(self.state);
        self.enter(PipelineState::Failed);
        fault
    }

    /// Move to `Acquiring` and describe what the transport must do
    pub fn acquisition_request(&mut self) -> GaugeResult<AcquisitionRequest> {
        if self.state != PipelineState::Idle {
            return Err(self.fail(Fault::invalid_configuration(
                "pipeline already acquired a sample",
            )));
        }
        if let Err(fault) = self.settings.validate() {
            return Err(self.fail(fault));
        }

        self.enter(PipelineState::Acquiring);
        match self.codec {
            Some(codec) => match codec.measurement_request() {
                Ok(frame) => Ok(AcquisitionRequest::Query(frame)),
                Err(err) => Err(self.fail(err.into())),
            },
            None => Ok(AcquisitionRequest::Sample),
        }
    }

    /// Turn the transport outcome into a reading or a fault
    pub fn finish(mut self, outcome: Result<RawSample, TransportError>) -> GaugeResult<Reading> {
        if self.state != PipelineState::Acquiring {
            return Err(self.fail(Fault::invalid_configuration(
                "pipeline finished without an acquisition",
            )));
        }
        match self.process(outcome) {
            Ok(reading) => {
                self.enter(PipelineState::Done);
                Ok(reading)
            }
            Err(fault) => Err(self.fail(fault)),
        }
    }

    fn process(&mut self, outcome: Result<RawSample, TransportError>) -> GaugeResult<Reading> {
        let sample = outcome?;
        let settings = self.settings;
        let profile = &settings.profile;

        self.enter(PipelineState::Decoding);
        let decoded = SignalDecoder::new(profile, self.codec).decode(&sample, self.crossover)?;

        self.enter(PipelineState::Validating);
        let range = profile.valid_range();
        check_pressure(&decoded.pressure, range.min, range.max)?;

        self.enter(PipelineState::Correcting);
        let pressure = decoded
            .pressure
            .scaled(settings.gas_correction)?
            .to(settings.unit);

        Ok(Reading {
            pressure,
            uncorrected: decoded.pressure,
            timestamp: sample.timestamp(),
            gas_correction: settings.gas_correction,
            gauge: profile.id().clone(),
            sensor: decoded.element,
        })
    }

    /// Acquire through a blocking transport and finish
    pub fn run_blocking<T: Transport + ?Sized>(mut self, transport: &mut T) -> GaugeResult<Reading> {
        let request = self.acquisition_request()?;
        let outcome = transport.acquire(&request);
        self.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaultKind;
    use crate::profile::{GaugeType, TransferFunction};
    use crate::transport::AnalogSample;

    fn scenario() -> ReadingSettings {
        let profile = GaugeProfile::builder("cdg", GaugeType::Capacitance)
            .transfer(TransferFunction::linear(0.0, 10.0, 133.322, 0.0).unwrap())
            .native_unit(PressureUnit::Pascal)
            .valid_range(1e-3, 1e5)
            .build()
            .unwrap();
        ReadingSettings::new(profile, PressureUnit::Torr, 1.0)
    }

    fn volts(v: f64) -> Result<RawSample, TransportError> {
        Ok(RawSample::Analog(AnalogSample::new(v, 7)))
    }

    #[test]
    fn five_volts_is_five_torr() {
        let settings = scenario();
        let mut crossover = CrossoverState::default();
        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        assert_eq!(
            pipeline.acquisition_request().unwrap(),
            AcquisitionRequest::Sample
        );
        assert_eq!(pipeline.state(), PipelineState::Acquiring);

        let reading = pipeline.finish(volts(5.0)).unwrap();
        assert!((reading.uncorrected().magnitude() - 666.61).abs() < 1e-9);
        assert_eq!(reading.unit(), PressureUnit::Torr);
        assert!((reading.magnitude() - 5.0).abs() < 1e-3);
        assert_eq!(reading.timestamp(), 7);
        assert_eq!(reading.gauge().as_str(), "cdg");
    }

    #[test]
    fn decode_and_validate_faults_are_distinguished() {
        let settings = scenario();
        let mut crossover = CrossoverState::default();

        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        pipeline.acquisition_request().unwrap();
        let fault = pipeline.finish(volts(12.0)).unwrap_err();
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        assert_eq!(fault.stage, Some(PipelineState::Decoding));

        // 0 V decodes to 0 Pa, inside the domain but below the valid range
        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        pipeline.acquisition_request().unwrap();
        let fault = pipeline.finish(volts(0.0)).unwrap_err();
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        assert_eq!(fault.stage, Some(PipelineState::Validating));
    }

    #[test]
    fn gas_correction_applies_in_native_unit() {
        let mut settings = scenario();
        settings.gas_correction = 2.0;
        let mut crossover = CrossoverState::default();
        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        pipeline.acquisition_request().unwrap();
        let reading = pipeline.finish(volts(5.0)).unwrap();
        assert!((reading.magnitude() - 10.0).abs() < 1e-3);
        assert_eq!(reading.gas_correction(), 2.0);
    }

    #[test]
    fn transport_errors_fail_at_acquiring() {
        let settings = scenario();
        let mut crossover = CrossoverState::default();
        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        pipeline.acquisition_request().unwrap();
        let fault = pipeline.finish(Err(TransportError::Timeout)).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Transient);
        assert_eq!(fault.stage, Some(PipelineState::Acquiring));
    }

    #[test]
    fn settings_are_checked_before_acquiring() {
        let mut settings = scenario();
        settings.gas_correction = 0.0;
        let mut crossover = CrossoverState::default();
        let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        let fault = pipeline.acquisition_request().unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidConfiguration);
        assert_eq!(fault.stage, Some(PipelineState::Idle));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn finish_requires_acquisition() {
        let settings = scenario();
        let mut crossover = CrossoverState::default();
        let pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
        assert!(pipeline.finish(volts(5.0)).is_err());
    }
}
