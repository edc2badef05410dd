//! Constants for the Vacuum Gauge Core
//!
//! Centralised, documented constants used throughout the engine. Every numeric
//! value lives here with its unit in the name and its source in the docs.
//!
//! ## Organization
//!
//! - **Units**: Conversion factors between pressure units
//! - **Gauges**: Transfer-function coefficients, ranges and crossover points of
//!   common gauge technologies
//! - **Timing**: Retry and timeout defaults
//! - **Capacity**: Fixed sizes of the `heapless` tables
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include the unit in the constant name
//! 3. Reference the standard or datasheet the value comes from

/// Pressure unit conversion factors.
pub mod units;

/// Gauge transfer functions, ranges and crossover thresholds.
pub mod gauges;

/// Retry, backoff and timeout defaults.
pub mod timing;

/// Fixed capacities of segment, calibration, fault and frame tables.
pub mod capacity;

pub use units::{PA_PER_MBAR, PA_PER_TORR};

pub use timing::{
    DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_BACKOFF_MS,
    DEFAULT_JITTER_MS, DEFAULT_MAX_ATTEMPTS,
};

pub use capacity::{
    MAX_CALIBRATION_POINTS, MAX_FAULT_BANDS, MAX_FAULT_CODES, MAX_FRAME_LEN, MAX_GAUGE_ID_LEN,
    MAX_SEGMENTS, MAX_SUPPORTED_UNITS,
};
