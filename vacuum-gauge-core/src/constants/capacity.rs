//! Table Capacities
//!
//! Gauge profiles are built from fixed-size `heapless` collections so a
//! profile never allocates while decoding.

/// Maximum transfer-function segments per sensing element.
pub const MAX_SEGMENTS: usize = 8;

/// Maximum points in a calibration lookup table.
pub const MAX_CALIBRATION_POINTS: usize = 32;

/// Maximum hardware status codes in a fault table.
pub const MAX_FAULT_CODES: usize = 16;

/// Maximum analog fault bands in a fault table.
pub const MAX_FAULT_BANDS: usize = 4;

/// Maximum units a profile can list as supported.
pub const MAX_SUPPORTED_UNITS: usize = 10;

/// Maximum length of a gauge identifier.
pub const MAX_GAUGE_ID_LEN: usize = 32;

/// Maximum length of a serial frame, terminator included.
pub const MAX_FRAME_LEN: usize = 64;
