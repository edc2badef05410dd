//! Reply clocks
//!
//! Analog samples carry the timestamp their ADC driver took. Serial replies
//! have none, so [`SerialTransport`](crate::SerialTransport) stamps each one
//! with its clock the moment `query` returns. A `Reading` inherits that stamp.

/// Milliseconds on the clock that stamped the sample
///
/// The epoch is whatever the clock counts from: the Unix epoch for
/// [`SystemTime`], boot for a tick counter, anything at all for [`FixedTime`].
pub type Timestamp = u64;

/// Clock read once per serial reply
pub trait TimeSource {
    /// Current time in milliseconds
    fn now(&self) -> Timestamp;
}

/// Any `Fn() -> Timestamp`, e.g. a board's millisecond tick counter
impl<F: Fn() -> Timestamp> TimeSource for F {
    fn now(&self) -> Timestamp {
        self()
    }
}

/// Unix-epoch milliseconds from the host clock
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as Timestamp)
    }
}

/// Clock that always reads the same value, for reproducible readings
#[derive(Debug, Clone, Copy)]
pub struct FixedTime(Timestamp);

impl FixedTime {
    /// Clock stuck at `timestamp`
    pub const fn new(timestamp: Timestamp) -> Self {
        Self(timestamp)
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.0
    }
}
