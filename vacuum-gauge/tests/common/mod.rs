//! Shared fixtures for controller tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vacuum_gauge::AsyncTransport;
use vacuum_gauge_core::{
    AcquisitionRequest, AnalogSample, FrameBuf, GaugeProfile, GaugeType, PressureUnit, RawSample,
    ReadingSettings, RetryPolicy, TransferFunction, TransportError,
};

/// Counters shared between a test and its transport
#[derive(Clone, Default)]
pub struct Probe {
    calls: Arc<AtomicU32>,
    overlaps: Arc<AtomicU32>,
    in_flight: Arc<AtomicBool>,
}

impl Probe {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that started while another was still running
    pub fn overlaps(&self) -> u32 {
        self.overlaps.load(Ordering::SeqCst)
    }
}

/// Async transport replaying scripted outcomes, optionally slowly
pub struct ScriptedAsync {
    script: VecDeque<Result<RawSample, TransportError>>,
    delay: Duration,
    probe: Probe,
}

impl ScriptedAsync {
    pub fn new(script: impl IntoIterator<Item = Result<RawSample, TransportError>>) -> (Self, Probe) {
        let probe = Probe::default();
        let transport = Self {
            script: script.into_iter().collect(),
            delay: Duration::ZERO,
            probe: probe.clone(),
        };
        (transport, probe)
    }

    /// Each call takes `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl AsyncTransport for ScriptedAsync {
    async fn acquire(&mut self, _request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        if self.probe.in_flight.swap(true, Ordering::SeqCst) {
            self.probe.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.probe.in_flight.store(false, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(Err(TransportError::LinkLost))
    }
}

pub fn analog(volts: f64) -> Result<RawSample, TransportError> {
    Ok(RawSample::Analog(AnalogSample::new(volts, 1_000)))
}

pub fn dual(primary: f64, secondary: f64) -> Result<RawSample, TransportError> {
    Ok(RawSample::Analog(AnalogSample::dual(primary, secondary, 1_000)))
}

pub fn frame(bytes: &[u8]) -> Result<RawSample, TransportError> {
    Ok(RawSample::Frame {
        bytes: FrameBuf::from_slice(bytes).unwrap(),
        timestamp: 2_000,
    })
}

pub fn timeouts(n: usize) -> impl Iterator<Item = Result<RawSample, TransportError>> {
    std::iter::repeat(Err(TransportError::Timeout)).take(n)
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

pub fn torr_settings() -> ReadingSettings {
    ReadingSettings::new(linear_profile(), PressureUnit::Torr, 1.0)
}

/// Three attempts, 50 ms doubling backoff, 250 ms per attempt
pub fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(50), 2.0)
}

/// Pirani output voltage for `mbar` on the logarithmic preset curve
pub fn pirani_volts(mbar: f64) -> f64 {
    (mbar.log10() + 6.143) / 1.286
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
