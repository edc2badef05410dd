//! Pressure Unit Conversion Factors
//!
//! All factors express one unit in pascal. Values are exact by definition
//! except where noted.

/// Pascal per hectopascal.
pub const PA_PER_HPA: f64 = 100.0;

/// Pascal per kilopascal.
pub const PA_PER_KPA: f64 = 1_000.0;

/// Pascal per millibar.
///
/// Numerically identical to the hectopascal. Most European gauge controllers
/// report in mbar.
pub const PA_PER_MBAR: f64 = 100.0;

/// Pascal per bar.
pub const PA_PER_BAR: f64 = 100_000.0;

/// Pascal per standard atmosphere.
///
/// Source: 10th CGPM (1954), Resolution 4
pub const PA_PER_ATM: f64 = 101_325.0;

/// Pascal per torr.
///
/// The torr is defined as exactly 1/760 of a standard atmosphere,
/// ≈ 133.322368 Pa.
pub const PA_PER_TORR: f64 = PA_PER_ATM / 760.0;

/// Pascal per millitorr (and per micron of mercury).
///
/// The micron of mercury differs from the millitorr by less than one part in
/// seven million, below any gauge's resolution, so both share this factor.
pub const PA_PER_MTORR: f64 = PA_PER_TORR / 1_000.0;

/// Pascal per pound-force per square inch.
///
/// Source: NIST Special Publication 811, Appendix B.8
pub const PA_PER_PSI: f64 = 6_894.757_293_168;
