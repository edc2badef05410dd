//! Range validation shared by the decoder and the pipeline
//!
//! Two different range checks guard a reading:
//!
//! ```text
//! signal ──► [transfer-function domain] ──► pressure ──► [valid range] ──► reading
//!               decode-stage OutOfRange                 validate-stage OutOfRange
//! ```
//!
//! The first rejects signals the calibration curve does not cover (broken
//! cable, wrong gauge selected). The second rejects pressures the curve can
//! express but the gauge cannot actually measure (a cold-cathode head at
//! atmosphere). Both are deterministic, so neither is ever retried.

use crate::errors::{Fault, GaugeResult};
use crate::units::PressureValue;

/// Trait for values that can be validated
pub trait Validatable {
    /// Check if the value is physically valid (not NaN, infinite, etc)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

/// Check that `value` lies within `[min, max]`
pub fn check_range(value: f64, min: f64, max: f64, detail: &'static str) -> GaugeResult<()> {
    if !value.is_valid() || value < min || value > max {
        Err(Fault::out_of_range(detail, value))
    } else {
        Ok(())
    }
}

/// Check a pressure against bounds expressed in the pressure's own unit
pub fn check_pressure(pressure: &PressureValue, min: f64, max: f64) -> GaugeResult<()> {
    check_range(
        pressure.magnitude(),
        min,
        max,
        "pressure outside gauge measuring range",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaultKind;
    use crate::units::PressureUnit;

    #[test]
    fn range_check() {
        assert!(check_range(5.0, 0.0, 10.0, "x").is_ok());
        assert!(check_range(0.0, 0.0, 10.0, "x").is_ok());
        assert!(check_range(10.0, 0.0, 10.0, "x").is_ok());
        assert!(check_range(-1.0, 0.0, 10.0, "x").is_err());
        assert!(check_range(11.0, 0.0, 10.0, "x").is_err());
        assert!(check_range(f64::NAN, 0.0, 10.0, "x").is_err());
    }

    #[test]
    fn pressure_fault_keeps_value() {
        let p = PressureValue::new(2.0e5, PressureUnit::Pascal).unwrap();
        let fault = check_pressure(&p, 1e-3, 1e5).unwrap_err();
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        assert_eq!(fault.value, Some(2.0e5));
    }

    #[test]
    fn validatable_floats() {
        assert!(5.0f64.is_valid());
        assert!(!f64::NAN.is_valid());
        assert!(!f32::INFINITY.is_valid());
    }
}
