//! Transport contracts
//!
//! The engine never talks to hardware itself. It asks a [`Transport`] for one
//! raw sample per reading and interprets whatever comes back.
//!
//! ```text
//!  ADC driver ──► AnalogInput ──► AnalogTransport ─┐
//!                                                  ├─► Transport::acquire ──► RawSample
//!  RS485 port ──► SerialLink ───► SerialTransport ─┘
//! ```
//!
//! Serial transports move bytes only. Turning a reply frame into a value and
//! a status code is the job of a [`FrameCodec`], which the decoder owns.

use thiserror_no_std::Error;

use crate::constants::capacity::MAX_FRAME_LEN;
use crate::errors::FrameError;
use crate::time::{TimeSource, Timestamp};

/// Fixed-capacity byte buffer for request and reply frames
pub type FrameBuf = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Failures reported by the hardware layer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No reply within the allotted time
    #[error("Transport timeout")]
    Timeout,

    /// Bytes arrived but did not form a frame
    #[error("Framing error")]
    Framing,

    /// Link dropped mid-exchange
    #[error("Link lost")]
    LinkLost,

    /// Hardware absent or not powered
    #[error("Hardware unavailable")]
    Unavailable,

    /// Request kind not served by this transport
    #[error("Request not supported by transport")]
    Unsupported,
}

/// One analog reading from the gauge head
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogSample {
    /// Main output (volts or milliamps)
    pub primary: f64,
    /// Second element output of a dual-output combination head
    pub secondary: Option<f64>,
    /// When the sample was taken
    pub timestamp: Timestamp,
}

impl AnalogSample {
    /// Single-channel sample
    pub const fn new(primary: f64, timestamp: Timestamp) -> Self {
        Self {
            primary,
            secondary: None,
            timestamp,
        }
    }

    /// Dual-channel sample
    pub const fn dual(primary: f64, secondary: f64, timestamp: Timestamp) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
            timestamp,
        }
    }
}

/// What the transport produced for one acquisition
#[derive(Debug, Clone, PartialEq)]
pub enum RawSample {
    /// Analog signal
    Analog(AnalogSample),
    /// Reply frame from a serial gauge
    Frame {
        /// Raw reply bytes
        bytes: FrameBuf,
        /// When the reply arrived
        timestamp: Timestamp,
    },
}

impl RawSample {
    /// When the sample was taken
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Analog(sample) => sample.timestamp,
            Self::Frame { timestamp, .. } => *timestamp,
        }
    }
}

/// What the pipeline asks the transport for
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionRequest {
    /// Sample the analog input
    Sample,
    /// Send a command frame and return the reply
    Query(FrameBuf),
}

/// Non-blocking ADC-style input
pub trait AnalogInput {
    /// Take a sample, or `WouldBlock` while a conversion is in progress
    fn sample(&mut self) -> nb::Result<AnalogSample, TransportError>;
}

/// Command/response serial link
pub trait SerialLink {
    /// Send `command` and return the complete reply frame
    fn query(&mut self, command: &[u8]) -> Result<FrameBuf, TransportError>;
}

/// Synchronous acquisition of one raw sample
pub trait Transport {
    /// Serve one request
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        (**self).acquire(request)
    }
}

impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        (**self).acquire(request)
    }
}

/// [`Transport`] over an [`AnalogInput`]
#[derive(Debug)]
pub struct AnalogTransport<A> {
    input: A,
}

impl<A: AnalogInput> AnalogTransport<A> {
    /// Wrap an analog input
    pub fn new(input: A) -> Self {
        Self { input }
    }

    /// Recover the input
    pub fn into_inner(self) -> A {
        self.input
    }
}

impl<A: AnalogInput> Transport for AnalogTransport<A> {
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        match request {
            AcquisitionRequest::Sample => {
                let sample = nb::block!(self.input.sample())?;
                Ok(RawSample::Analog(sample))
            }
            AcquisitionRequest::Query(_) => Err(TransportError::Unsupported),
        }
    }
}

/// [`Transport`] over a [`SerialLink`], stamping replies with `clock`
#[derive(Debug)]
pub struct SerialTransport<L, C> {
    link: L,
    clock: C,
}

impl<L: SerialLink, C: TimeSource> SerialTransport<L, C> {
    /// Wrap a link
    pub fn new(link: L, clock: C) -> Self {
        Self { link, clock }
    }

    /// The wrapped link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<L: SerialLink, C: TimeSource> Transport for SerialTransport<L, C> {
    fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        match request {
            AcquisitionRequest::Query(command) => {
                let bytes = self.link.query(command)?;
                Ok(RawSample::Frame {
                    bytes,
                    timestamp: self.clock.now(),
                })
            }
            AcquisitionRequest::Sample => Err(TransportError::Unsupported),
        }
    }
}

/// Fields extracted from a measurement reply
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameFields {
    /// Reported pressure or signal
    pub value: Option<f64>,
    /// Reported fault status, absent when the gauge is healthy
    pub status: Option<u16>,
}

/// Wire format of a serial gauge protocol
pub trait FrameCodec: Send + Sync {
    /// Frame asking the gauge for its current measurement
    fn measurement_request(&self) -> Result<FrameBuf, FrameError>;

    /// Extract value and status from a reply frame
    fn parse_measurement(&self, frame: &[u8]) -> Result<FrameFields, FrameError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedTime;

    struct SlowAdc {
        busy: u32,
        volts: f64,
    }

    impl AnalogInput for SlowAdc {
        fn sample(&mut self) -> nb::Result<AnalogSample, TransportError> {
            if self.busy > 0 {
                self.busy -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(AnalogSample::new(self.volts, 42))
        }
    }

    struct Echo;

    impl SerialLink for Echo {
        fn query(&mut self, command: &[u8]) -> Result<FrameBuf, TransportError> {
            FrameBuf::from_slice(command).map_err(|_| TransportError::Framing)
        }
    }

    #[test]
    fn analog_transport_waits_for_conversion() {
        let mut transport = AnalogTransport::new(SlowAdc { busy: 3, volts: 5.0 });
        let sample = transport.acquire(&AcquisitionRequest::Sample).unwrap();
        assert_eq!(sample, RawSample::Analog(AnalogSample::new(5.0, 42)));
        assert_eq!(transport.into_inner().busy, 0);
    }

    #[test]
    fn serial_transport_stamps_replies() {
        let mut transport = SerialTransport::new(Echo, FixedTime::new(1_000));
        let request = AcquisitionRequest::Query(FrameBuf::from_slice(b"001M^\r").unwrap());
        let sample = transport.acquire(&request).unwrap();
        assert_eq!(sample.timestamp(), 1_000);
        match sample {
            RawSample::Frame { bytes, .. } => assert_eq!(&bytes[..], b"001M^\r"),
            other => panic!("unexpected sample {:?}", other),
        }
    }

    #[test]
    fn serial_transport_reads_clock_per_reply() {
        let ticks = core::cell::Cell::new(0u64);
        let mut transport = SerialTransport::new(Echo, || {
            ticks.set(ticks.get() + 250);
            ticks.get()
        });
        let request = AcquisitionRequest::Query(FrameBuf::from_slice(b"001M^\r").unwrap());
        assert_eq!(transport.acquire(&request).unwrap().timestamp(), 250);
        assert_eq!(transport.acquire(&request).unwrap().timestamp(), 500);
    }

    #[test]
    fn mismatched_requests_are_unsupported() {
        let mut analog = AnalogTransport::new(SlowAdc { busy: 0, volts: 1.0 });
        let query = AcquisitionRequest::Query(FrameBuf::new());
        assert_eq!(analog.acquire(&query), Err(TransportError::Unsupported));

        let mut serial = SerialTransport::new(Echo, FixedTime::new(0));
        assert_eq!(
            serial.acquire(&AcquisitionRequest::Sample),
            Err(TransportError::Unsupported)
        );
    }
}
