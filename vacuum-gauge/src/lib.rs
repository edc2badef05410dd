//! Async gauge controller
//!
//! Puts the calibration engine behind an async API: one [`GaugeController`]
//! per gauge, reads serialised on the transport, retries with jittered
//! backoff and per-attempt timeouts, and atomic reconfiguration.
//!
//! ```no_run
//! use vacuum_gauge::{Blocking, GaugeController};
//! use vacuum_gauge_core::{
//!     presets, FaultTable, FixedTime, GaugeType, PressureUnit, ReadingSettings, RetryPolicy,
//!     SerialTransport,
//! };
//! use vacuum_gauge_protocols::{Address, V1Codec, V1Emulator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let address = Address::new(1)?;
//! let link = SerialTransport::new(V1Emulator::new(address), FixedTime::new(0));
//! let profile = presets::serial_direct(
//!     GaugeType::Pirani,
//!     PressureUnit::Millibar,
//!     5e-4,
//!     1000.0,
//!     FaultTable::new(),
//! )?;
//! let settings = ReadingSettings::new(profile, PressureUnit::Torr, 1.0);
//!
//! let controller =
//!     GaugeController::with_settings(Blocking::new(link), settings, RetryPolicy::default())?
//!         .with_codec(V1Codec::new(address));
//! let reading = controller.read().await?;
//! println!("{}", reading.pressure());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod retry;
pub mod transport;

pub use config::{ConfigError, ControllerConfig, GaugeSource, Preset};
pub use controller::{ConfigUpdate, GaugeController};
pub use retry::{execute, RandJitter, RetryExecutor};
pub use transport::{AsyncTransport, Blocking};

pub use tokio_util::sync::CancellationToken;
