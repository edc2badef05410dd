//! Shared fixtures for core integration tests
//!
//! - Scripted transports that replay a fixed sequence of outcomes
//! - The reference linear profile (133.322 Pa/V over 0–10 V)
//! - A minimal `[status, value]` frame codec

#![allow(dead_code)]

use std::collections::VecDeque;

use vacuum_gauge_core::{
    AcquisitionRequest, AnalogSample, FrameBuf, FrameCodec, FrameError, FrameFields,
    GaugeProfile, GaugeType, PressureUnit, RawSample, Transport, TransferFunction,
    TransportError,
};

/// Transport replaying scripted outcomes, counting every call
pub struct ScriptedTransport {
    script: VecDeque<Result<RawSample, TransportError>>,
    pub calls: u32,
    pub requests: Vec<AcquisitionRequest>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Result<RawSample, TransportError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
            requests: Vec::new(),
        }
    }

    /// `failures` timeouts followed by one good analog sample
    pub fn flaky(failures: usize, volts: f64) -> Self {
        Self::new(
            std::iter::repeat(Err(TransportError::Timeout))
                .take(failures)
                .chain(std::iter::once(Ok(analog(volts)))),
        )
    }
}

impl Transport for ScriptedTransport {
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        self.calls += 1;
        self.requests.push(request.clone());
        self.script.pop_front().unwrap_or(Err(TransportError::LinkLost))
    }
}

pub fn analog(volts: f64) -> RawSample {
    RawSample::Analog(AnalogSample::new(volts, 1_000))
}

pub fn frame(bytes: &[u8]) -> RawSample {
    RawSample::Frame {
        bytes: FrameBuf::from_slice(bytes).unwrap(),
        timestamp: 2_000,
    }
}

/// `y = 133.322·x` Pa over 0–10 V, valid 1e-3..1e5 Pa
pub fn linear_profile() -> GaugeProfile {
    GaugeProfile::builder("linear-133", GaugeType::Capacitance)
        .transfer(TransferFunction::linear(0.0, 10.0, 133.322, 0.0).unwrap())
        .native_unit(PressureUnit::Pascal)
        .valid_range(1e-3, 1e5)
        .build()
        .unwrap()
}

/// Frame layout `[status, value]`; status 0 means healthy
pub struct ByteCodec;

impl FrameCodec for ByteCodec {
    fn measurement_request(&self) -> Result<FrameBuf, FrameError> {
        FrameBuf::from_slice(b"M").map_err(|_| FrameError::Overflow)
    }

    fn parse_measurement(&self, frame: &[u8]) -> Result<FrameFields, FrameError> {
        match frame {
            [0, value] => Ok(FrameFields {
                value: Some(*value as f64),
                status: None,
            }),
            [status, _] => Ok(FrameFields {
                value: None,
                status: Some(*status as u16),
            }),
            _ => Err(FrameError::TooShort {
                len: frame.len(),
                min: 2,
            }),
        }
    }
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
