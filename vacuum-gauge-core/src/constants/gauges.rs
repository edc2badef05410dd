//! Gauge Technology Constants
//!
//! Transfer functions of the common analog gauge outputs. The logarithmic
//! outputs follow `p = 10^(a·U + b)` with `U` in volts and `p` in mbar.
//!
//! ```text
//! Technology          Range (mbar)        Output          Formula
//! ---------------------------------------------------------------------------
//! Pirani (log)        5e-4 .. 1000        2.2 .. 8.5 V    10^(1.286 U - 6.143)
//! Cold cathode (log)  1e-9 .. 1e-2        1.8 .. 8.6 V    10^(1.667 U - 11.33)
//! Capacitance         FS/10^4 .. FS       0 .. 10 V       FS · U / 10
//! ```

// ===== PIRANI =====

/// Slope of the Pirani log output (decades per volt).
///
/// Source: thermal-conductivity gauge datasheets, `p = 10^(1.286 U - 6.143)`
pub const PIRANI_LOG_SLOPE: f64 = 1.286;

/// Offset of the Pirani log output (decades).
pub const PIRANI_LOG_OFFSET: f64 = -6.143;

/// Lowest Pirani output voltage on the calibration curve (V).
///
/// Below this the output signals a sensor error.
pub const PIRANI_SIGNAL_MIN_V: f64 = 2.2;

/// Highest Pirani output voltage on the calibration curve (V).
pub const PIRANI_SIGNAL_MAX_V: f64 = 8.5;

/// Lower limit of the Pirani measuring range (mbar).
pub const PIRANI_RANGE_MIN_MBAR: f64 = 5.0e-4;

/// Upper limit of the Pirani measuring range (mbar).
pub const PIRANI_RANGE_MAX_MBAR: f64 = 1_000.0;

// ===== COLD CATHODE =====

/// Slope of the cold-cathode log output (decades per volt).
///
/// Source: inverted-magnetron gauge datasheets, `p = 10^(1.667 U - 11.33)`
pub const COLD_CATHODE_LOG_SLOPE: f64 = 1.667;

/// Offset of the cold-cathode log output (decades).
pub const COLD_CATHODE_LOG_OFFSET: f64 = -11.33;

/// Lowest cold-cathode output voltage on the calibration curve (V).
pub const COLD_CATHODE_SIGNAL_MIN_V: f64 = 1.8;

/// Highest cold-cathode output voltage on the calibration curve (V).
pub const COLD_CATHODE_SIGNAL_MAX_V: f64 = 8.6;

/// Lower limit of the cold-cathode measuring range (mbar).
pub const COLD_CATHODE_RANGE_MIN_MBAR: f64 = 1.0e-9;

/// Upper limit of the cold-cathode measuring range (mbar).
///
/// Above this the discharge current saturates and the reading is meaningless.
pub const COLD_CATHODE_RANGE_MAX_MBAR: f64 = 1.0e-2;

// ===== CAPACITANCE MANOMETER =====

/// Full-scale output voltage of a capacitance manometer (V).
pub const CAPACITANCE_FULL_SCALE_V: f64 = 10.0;

/// Over-range headroom of the capacitance output (V).
///
/// Heads drive up to ~11 V when over-pressured.
pub const CAPACITANCE_SIGNAL_MAX_V: f64 = 11.0;

/// Usable dynamic range of a capacitance manometer (decades below full scale).
pub const CAPACITANCE_DECADES: f64 = 4.0;

// ===== COMBINATION (PIRANI + COLD CATHODE) =====

/// Pirani-estimated pressure below which the cold-cathode element takes over (mbar).
pub const COMBINATION_ENGAGE_BELOW_MBAR: f64 = 5.5e-3;

/// Pirani-estimated pressure above which the Pirani element takes over again (mbar).
///
/// Higher than the engage threshold so readings near the crossover do not
/// flap between elements.
pub const COMBINATION_RELEASE_ABOVE_MBAR: f64 = 1.0e-2;

// ===== ANALOG FAULT SIGNALLING =====

/// Output voltage below which an analog gauge head reports a sensor error (V).
pub const ANALOG_ERROR_BELOW_V: f64 = 0.5;

/// Output voltage above which an analog gauge head reports a switched-off or
/// failed sensor (V).
pub const ANALOG_ERROR_ABOVE_V: f64 = 9.5;
