//! Pressure Units and Conversion
//!
//! Vacuum work mixes unit systems freely: gauge heads are calibrated in mbar,
//! process recipes are written in Torr, leak detectors talk in Pa and older
//! equipment in microns of mercury. Every unit here is a fixed multiple of the
//! pascal, so conversion is a single multiply and a single divide.
//!
//! ```text
//! Unit          Pascal equivalent          Typical use
//! ---------------------------------------------------------------
//! Pa            1                          SI, leak rates
//! hPa / mbar    100                        European gauge controllers
//! Torr          101325 / 760 ≈ 133.3224    US process recipes
//! mTorr/micron  ≈ 0.1333224                Rough vacuum, freeze dryers
//! psi           6894.757293168             Gas supply, vent lines
//! atm           101325                     Reference atmosphere
//! ```

use core::fmt;
use core::str::FromStr;

use crate::constants::units::{
    PA_PER_ATM, PA_PER_BAR, PA_PER_HPA, PA_PER_KPA, PA_PER_MBAR, PA_PER_MTORR, PA_PER_PSI,
    PA_PER_TORR,
};
use crate::errors::{Fault, GaugeResult};
use crate::validation::Validatable;

/// Closed set of pressure units understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PressureUnit {
    /// Pascal (SI)
    Pascal,
    /// Hectopascal
    Hectopascal,
    /// Kilopascal
    Kilopascal,
    /// Millibar
    Millibar,
    /// Bar
    Bar,
    /// Torr (1/760 standard atmosphere)
    Torr,
    /// Millitorr
    Millitorr,
    /// Micron of mercury, numerically equal to the millitorr
    Micron,
    /// Pound-force per square inch
    Psi,
    /// Standard atmosphere
    Atmosphere,
}

impl PressureUnit {
    /// Every unit, in wire-code order
    pub const ALL: [PressureUnit; 10] = [
        Self::Pascal,
        Self::Hectopascal,
        Self::Kilopascal,
        Self::Millibar,
        Self::Bar,
        Self::Torr,
        Self::Millitorr,
        Self::Micron,
        Self::Psi,
        Self::Atmosphere,
    ];

    /// Size of one unit in pascal
    pub const fn pascals(self) -> f64 {
        match self {
            Self::Pascal => 1.0,
            Self::Hectopascal => PA_PER_HPA,
            Self::Kilopascal => PA_PER_KPA,
            Self::Millibar => PA_PER_MBAR,
            Self::Bar => PA_PER_BAR,
            Self::Torr => PA_PER_TORR,
            Self::Millitorr | Self::Micron => PA_PER_MTORR,
            Self::Psi => PA_PER_PSI,
            Self::Atmosphere => PA_PER_ATM,
        }
    }

    /// Conventional symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Pascal => "Pa",
            Self::Hectopascal => "hPa",
            Self::Kilopascal => "kPa",
            Self::Millibar => "mbar",
            Self::Bar => "bar",
            Self::Torr => "Torr",
            Self::Millitorr => "mTorr",
            Self::Micron => "micron",
            Self::Psi => "psi",
            Self::Atmosphere => "atm",
        }
    }

    /// Numeric code used in configuration and wire formats
    pub const fn code(self) -> u8 {
        match self {
            Self::Pascal => 0,
            Self::Hectopascal => 1,
            Self::Kilopascal => 2,
            Self::Millibar => 3,
            Self::Bar => 4,
            Self::Torr => 5,
            Self::Millitorr => 6,
            Self::Micron => 7,
            Self::Psi => 8,
            Self::Atmosphere => 9,
        }
    }

    /// Unit for a numeric code; codes outside the closed set are unsupported
    pub fn from_code(code: u8) -> GaugeResult<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(Fault::unsupported_unit("unknown unit code").with_value(code as f64))
    }

    /// Parse a unit symbol, case-insensitively
    pub fn from_symbol(symbol: &str) -> GaugeResult<Self> {
        const ALIASES: [(&str, PressureUnit); 3] = [
            ("pascal", PressureUnit::Pascal),
            ("um", PressureUnit::Micron),
            ("atmosphere", PressureUnit::Atmosphere),
        ];

        let symbol = symbol.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.symbol().eq_ignore_ascii_case(symbol))
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(symbol))
                    .map(|(_, unit)| *unit)
            })
            .ok_or(Fault::unsupported_unit("unknown unit symbol"))
    }
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PressureUnit {
    type Err = Fault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

/// Convert a magnitude between units
///
/// Pure multiplicative transform through the pascal; the only loss is
/// floating-point rounding.
#[inline]
pub fn convert(magnitude: f64, from: PressureUnit, to: PressureUnit) -> f64 {
    if from == to {
        return magnitude;
    }
    magnitude * from.pascals() / to.pascals()
}

/// Non-negative, finite pressure tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PressureValue {
    magnitude: f64,
    unit: PressureUnit,
}

impl PressureValue {
    /// Create a pressure, rejecting negative and non-finite magnitudes
    pub fn new(magnitude: f64, unit: PressureUnit) -> GaugeResult<Self> {
        if !magnitude.is_valid() {
            return Err(Fault::out_of_range("pressure is not a finite number", magnitude));
        }
        if magnitude < 0.0 {
            return Err(Fault::out_of_range("pressure is negative", magnitude));
        }
        Ok(Self { magnitude, unit })
    }

    /// Numeric value in [`Self::unit`]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Unit of the magnitude
    pub fn unit(&self) -> PressureUnit {
        self.unit
    }

    /// Same pressure expressed in another unit
    pub fn to(&self, unit: PressureUnit) -> Self {
        Self {
            magnitude: convert(self.magnitude, self.unit, unit),
            unit,
        }
    }

    /// Value in pascal
    pub fn pascals(&self) -> f64 {
        self.magnitude * self.unit.pascals()
    }

    /// Multiply by a positive factor, staying in the same unit
    pub(crate) fn scaled(&self, factor: f64) -> GaugeResult<Self> {
        Self::new(self.magnitude * factor, self.unit)
    }
}

impl fmt::Display for PressureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e} {}", self.magnitude, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaultKind;

    fn approx(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs()).max(f64::MIN_POSITIVE)
    }

    #[test]
    fn torr_to_pascal() {
        assert!(approx(convert(1.0, PressureUnit::Torr, PressureUnit::Pascal), 133.322368, 1e-6));
        assert!(approx(convert(760.0, PressureUnit::Torr, PressureUnit::Atmosphere), 1.0, 1e-12));
    }

    #[test]
    fn millibar_and_hectopascal_agree() {
        assert_eq!(
            convert(1013.25, PressureUnit::Millibar, PressureUnit::Hectopascal),
            1013.25
        );
    }

    #[test]
    fn micron_equals_millitorr() {
        assert!(approx(convert(1000.0, PressureUnit::Micron, PressureUnit::Torr), 1.0, 1e-12));
        assert_eq!(
            convert(42.0, PressureUnit::Micron, PressureUnit::Millitorr),
            42.0
        );
    }

    #[test]
    fn symbols_parse_case_insensitively() {
        assert_eq!(PressureUnit::from_symbol("TORR").unwrap(), PressureUnit::Torr);
        assert_eq!("mbar".parse::<PressureUnit>().unwrap(), PressureUnit::Millibar);
        for unit in PressureUnit::ALL {
            assert_eq!(PressureUnit::from_symbol(unit.symbol()).unwrap(), unit);
        }
    }

    #[test]
    fn unknown_unit_is_unsupported() {
        let err = PressureUnit::from_symbol("inHg").unwrap_err();
        assert_eq!(err.kind, FaultKind::UnsupportedUnit);

        let err = PressureUnit::from_code(42).unwrap_err();
        assert_eq!(err.kind, FaultKind::UnsupportedUnit);
    }

    #[test]
    fn codes_round_trip() {
        for unit in PressureUnit::ALL {
            assert_eq!(PressureUnit::from_code(unit.code()).unwrap(), unit);
        }
    }

    #[test]
    fn pressure_value_rejects_unphysical() {
        assert!(PressureValue::new(-1.0, PressureUnit::Pascal).is_err());
        assert!(PressureValue::new(f64::NAN, PressureUnit::Pascal).is_err());
        assert!(PressureValue::new(f64::INFINITY, PressureUnit::Pascal).is_err());
        assert!(PressureValue::new(0.0, PressureUnit::Pascal).is_ok());
    }

    #[test]
    fn pressure_value_conversion() {
        let p = PressureValue::new(666.61, PressureUnit::Pascal).unwrap();
        let torr = p.to(PressureUnit::Torr);
        assert_eq!(torr.unit(), PressureUnit::Torr);
        assert!(approx(torr.magnitude(), 5.0, 1e-4));
        assert!(approx(torr.pascals(), 666.61, 1e-12));
    }
}
