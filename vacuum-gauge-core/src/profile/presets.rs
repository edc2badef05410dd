//! Profiles for common gauge families
//!
//! Characteristics follow the usual analog outputs of each gauge family.
//! Individual heads may deviate, in which case build a profile with
//! [`GaugeProfile::builder`](super::GaugeProfile::builder) instead.

use super::{
    Crossover, FaultBand, FaultTable, GaugeProfile, GaugeType, TransferFunction,
};
use crate::constants::gauges::*;
use crate::errors::{FaultKind, ProfileError};
use crate::units::PressureUnit;

const DISPLAY_UNITS: [PressureUnit; 6] = [
    PressureUnit::Millibar,
    PressureUnit::Torr,
    PressureUnit::Pascal,
    PressureUnit::Hectopascal,
    PressureUnit::Millitorr,
    PressureUnit::Micron,
];

fn analog_faults() -> Result<FaultTable, ProfileError> {
    FaultTable::new()
        .with_band(FaultBand::below(ANALOG_ERROR_BELOW_V, FaultKind::SensorOff))?
        .with_band(FaultBand::above(ANALOG_ERROR_ABOVE_V, FaultKind::FilamentFailure))
}

fn pirani_curve() -> Result<TransferFunction, ProfileError> {
    TransferFunction::logarithmic(
        PIRANI_SIGNAL_MIN_V,
        PIRANI_SIGNAL_MAX_V,
        PIRANI_LOG_SLOPE,
        PIRANI_LOG_OFFSET,
    )
}

fn cold_cathode_curve() -> Result<TransferFunction, ProfileError> {
    TransferFunction::logarithmic(
        COLD_CATHODE_SIGNAL_MIN_V,
        COLD_CATHODE_SIGNAL_MAX_V,
        COLD_CATHODE_LOG_SLOPE,
        COLD_CATHODE_LOG_OFFSET,
    )
}

/// Pirani gauge with logarithmic voltage output, `p = 10^(1.286·U − 6.143)` mbar
pub fn pirani_log() -> Result<GaugeProfile, ProfileError> {
    GaugeProfile::builder("pirani-log", GaugeType::Pirani)
        .transfer(pirani_curve()?)
        .native_unit(PressureUnit::Millibar)
        .valid_range(PIRANI_RANGE_MIN_MBAR, PIRANI_RANGE_MAX_MBAR)
        .units(&DISPLAY_UNITS)
        .faults(analog_faults()?)
        .build()
}

/// Cold-cathode gauge with logarithmic voltage output, `p = 10^(1.667·U − 11.33)` mbar
pub fn cold_cathode_log() -> Result<GaugeProfile, ProfileError> {
    GaugeProfile::builder("cold-cathode-log", GaugeType::ColdCathode)
        .transfer(cold_cathode_curve()?)
        .native_unit(PressureUnit::Millibar)
        .valid_range(COLD_CATHODE_RANGE_MIN_MBAR, COLD_CATHODE_RANGE_MAX_MBAR)
        .units(&DISPLAY_UNITS)
        .faults(analog_faults()?)
        .build()
}

/// Capacitance manometer with a linear 0–10 V output for `full_scale`
///
/// Over-range is readable up to the 11 V signal limit. The lower end of the
/// range sits four decades below full scale.
pub fn capacitance(full_scale: f64, unit: PressureUnit) -> Result<GaugeProfile, ProfileError> {
    if !full_scale.is_finite() || full_scale <= 0.0 {
        return Err(ProfileError::InvalidRange {
            min: 0.0,
            max: full_scale,
        });
    }
    let slope = full_scale / CAPACITANCE_FULL_SCALE_V;
    let min = full_scale / libm::pow(10.0, CAPACITANCE_DECADES);

    GaugeProfile::builder("capacitance", GaugeType::Capacitance)
        .transfer(TransferFunction::linear(
            0.0,
            CAPACITANCE_SIGNAL_MAX_V,
            slope,
            0.0,
        )?)
        .native_unit(unit)
        .valid_range(min, slope * CAPACITANCE_SIGNAL_MAX_V)
        .default_unit(unit)
        .build()
}

/// Pirani / cold-cathode combination head
///
/// The cold-cathode element takes over below 5.5e-3 mbar and hands back above
/// 1e-2 mbar. A dual-output head reports the cold-cathode signal as the
/// secondary channel. Samples without one can only be read while the Pirani
/// element is active.
pub fn combination() -> Result<GaugeProfile, ProfileError> {
    GaugeProfile::builder("pirani-cold-cathode", GaugeType::Combination)
        .combination(
            pirani_curve()?,
            cold_cathode_curve()?,
            Crossover::new(
                COMBINATION_ENGAGE_BELOW_MBAR,
                COMBINATION_RELEASE_ABOVE_MBAR,
            )?,
        )
        .native_unit(PressureUnit::Millibar)
        .valid_range(COLD_CATHODE_RANGE_MIN_MBAR, PIRANI_RANGE_MAX_MBAR)
        .units(&DISPLAY_UNITS)
        .faults(analog_faults()?)
        .build()
}

/// Serial gauge that reports pressure directly in `unit`
///
/// The frame value passes through an identity transfer function; `faults`
/// maps the status codes the gauge's protocol reports. A combination head
/// merges its elements internally, so describe it by the element type it
/// reports; `GaugeType::Combination` is rejected with a type mismatch.
pub fn serial_direct(
    gauge_type: GaugeType,
    unit: PressureUnit,
    min: f64,
    max: f64,
    faults: FaultTable,
) -> Result<GaugeProfile, ProfileError> {
    GaugeProfile::builder("serial-direct", gauge_type)
        .transfer(TransferFunction::linear(0.0, f64::MAX, 1.0, 0.0)?)
        .native_unit(unit)
        .valid_range(min, max)
        .units(&DISPLAY_UNITS)
        .default_unit(unit)
        .faults(faults)
        .build()
}
