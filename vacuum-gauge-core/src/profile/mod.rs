//! Gauge profiles
//!
//! A [`GaugeProfile`] is everything the engine knows about one gauge model:
//! how its signal maps to pressure, which pressures it can actually measure,
//! how it reports faults, and which units it can be read in. New gauge models
//! are new profile data, never new code paths.
//!
//! ```text
//! GaugeProfile
//! ├── gauge_type    Pirani | ColdCathode | Capacitance | Combination
//! ├── response      Single(tf) | Combination { coarse, fine, crossover }
//! ├── valid_range   [min, max] in native unit
//! ├── native_unit   unit the transfer function produces
//! ├── faults        status codes + analog fault bands
//! └── units         supported set, default unit ∈ set
//! ```
//!
//! Profiles are validated once, when built or deserialized, and are read-only
//! afterwards. They are shared between readings through `Arc`.

mod faults;
pub mod presets;
mod transfer;

pub use faults::{FaultBand, FaultTable};
pub use transfer::{Segment, SegmentKind, TransferFunction};

pub use crate::lookup::{CalibrationPoint, CalibrationTable, Interpolation};

use heapless::Vec;

use crate::constants::capacity::{MAX_GAUGE_ID_LEN, MAX_SUPPORTED_UNITS};
use crate::errors::{Fault, ProfileError};
use crate::units::PressureUnit;
use crate::validation::Validatable;

/// Gauge model identifier
pub type GaugeId = heapless::String<MAX_GAUGE_ID_LEN>;

/// Measuring principle of the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaugeType {
    /// Thermal conductivity gauge
    Pirani,
    /// Inverted magnetron / Penning gauge
    ColdCathode,
    /// Capacitance diaphragm manometer
    Capacitance,
    /// Pirani and cold-cathode elements in one head
    Combination,
}

/// Closed pressure interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PressureRange {
    /// Lowest measurable pressure
    pub min: f64,
    /// Highest measurable pressure
    pub max: f64,
}

impl PressureRange {
    /// Create a range; bounds must be finite, non-negative and ordered
    pub fn new(min: f64, max: f64) -> Result<Self, ProfileError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Check bounds
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.min.is_valid() || !self.max.is_valid() || self.min < 0.0 || self.min > self.max
        {
            return Err(ProfileError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Whether `pressure` lies in the range
    pub fn contains(&self, pressure: f64) -> bool {
        pressure >= self.min && pressure <= self.max
    }
}

/// Switch-over thresholds of a combination gauge, in native unit
///
/// The fine element takes over once the coarse estimate drops below
/// `engage_below` and hands back once it climbs above `release_above`.
/// Between the two thresholds the active element does not change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crossover {
    /// Engage the fine element below this pressure
    pub engage_below: f64,
    /// Release back to the coarse element above this pressure
    pub release_above: f64,
}

impl Crossover {
    /// Create thresholds; `engage_below` must be strictly below `release_above`
    pub fn new(engage_below: f64, release_above: f64) -> Result<Self, ProfileError> {
        let crossover = Self {
            engage_below,
            release_above,
        };
        crossover.validate()?;
        Ok(crossover)
    }

    /// Check that the thresholds form a hysteresis band
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.engage_below.is_valid()
            || !self.release_above.is_valid()
            || self.engage_below <= 0.0
            || self.engage_below >= self.release_above
        {
            return Err(ProfileError::InvalidCrossover {
                engage_below: self.engage_below,
                release_above: self.release_above,
            });
        }
        Ok(())
    }
}

/// How the profile turns signal into pressure
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Response {
    /// One sensing element
    Single(TransferFunction),
    /// Coarse and fine elements with hysteresis between them
    Combination {
        /// Element used at higher pressures (Pirani)
        coarse: TransferFunction,
        /// Element used at lower pressures (cold cathode)
        fine: TransferFunction,
        /// Switch-over thresholds
        crossover: Crossover,
    },
}

impl Response {
    /// Validate every transfer function and the crossover
    pub fn validate(&self) -> Result<(), ProfileError> {
        match self {
            Self::Single(tf) => tf.validate(),
            Self::Combination {
                coarse,
                fine,
                crossover,
            } => {
                coarse.validate()?;
                fine.validate()?;
                crossover.validate()
            }
        }
    }
}

/// Immutable description of one gauge model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaugeProfile {
    id: GaugeId,
    gauge_type: GaugeType,
    response: Response,
    valid_range: PressureRange,
    native_unit: PressureUnit,
    units: Vec<PressureUnit, MAX_SUPPORTED_UNITS>,
    default_unit: PressureUnit,
    #[cfg_attr(feature = "serde", serde(default))]
    faults: FaultTable,
}

impl GaugeProfile {
    /// Start building a profile
    pub fn builder(id: &str, gauge_type: GaugeType) -> GaugeProfileBuilder {
        GaugeProfileBuilder::new(id, gauge_type)
    }

    /// Check every invariant; required after deserialization
    pub fn validate(&self) -> Result<(), ProfileError> {
        self.response.validate()?;
        let combined = matches!(self.response, Response::Combination { .. });
        if combined != (self.gauge_type == GaugeType::Combination) {
            return Err(ProfileError::TypeMismatch);
        }
        self.valid_range.validate()?;
        self.faults.validate()?;
        if !self.units.contains(&self.default_unit) {
            return Err(ProfileError::DefaultUnitUnsupported);
        }
        Ok(())
    }

    /// Model identifier
    pub fn id(&self) -> &GaugeId {
        &self.id
    }

    /// Measuring principle
    pub fn gauge_type(&self) -> GaugeType {
        self.gauge_type
    }

    /// Signal-to-pressure response
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Measurable pressures, in native unit
    pub fn valid_range(&self) -> PressureRange {
        self.valid_range
    }

    /// Unit the transfer functions produce
    pub fn native_unit(&self) -> PressureUnit {
        self.native_unit
    }

    /// Units readings may be requested in
    pub fn units(&self) -> &[PressureUnit] {
        &self.units
    }

    /// Unit used when nothing else is configured
    pub fn default_unit(&self) -> PressureUnit {
        self.default_unit
    }

    /// Fault codes and bands
    pub fn faults(&self) -> &FaultTable {
        &self.faults
    }

    /// Whether readings can be produced in `unit`
    pub fn supports(&self, unit: PressureUnit) -> bool {
        self.units.contains(&unit)
    }

    /// Fault for a hardware status code
    pub fn fault_for_status(&self, code: u16) -> Fault {
        self.faults.lookup(code)
    }
}

/// Incremental construction of a [`GaugeProfile`]
///
/// Errors are collected and reported by [`GaugeProfileBuilder::build`].
#[derive(Debug, Clone)]
pub struct GaugeProfileBuilder {
    id: GaugeId,
    gauge_type: GaugeType,
    response: Option<Response>,
    valid_range: PressureRange,
    native_unit: PressureUnit,
    units: Vec<PressureUnit, MAX_SUPPORTED_UNITS>,
    default_unit: Option<PressureUnit>,
    faults: FaultTable,
    error: Option<ProfileError>,
}

impl GaugeProfileBuilder {
    /// Start a profile; ids longer than the fixed capacity are rejected at build
    pub fn new(id: &str, gauge_type: GaugeType) -> Self {
        let mut gauge_id = GaugeId::new();
        let error = gauge_id
            .push_str(id)
            .err()
            .map(|_| ProfileError::CapacityExceeded { what: "gauge id" });
        Self {
            id: gauge_id,
            gauge_type,
            response: None,
            valid_range: PressureRange {
                min: 0.0,
                max: f64::MAX,
            },
            native_unit: PressureUnit::Millibar,
            units: Vec::new(),
            default_unit: None,
            faults: FaultTable::new(),
            error,
        }
    }

    fn fail(&mut self, err: ProfileError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Single-element response
    pub fn transfer(mut self, tf: TransferFunction) -> Self {
        self.response = Some(Response::Single(tf));
        self
    }

    /// Combination response
    pub fn combination(
        mut self,
        coarse: TransferFunction,
        fine: TransferFunction,
        crossover: Crossover,
    ) -> Self {
        self.response = Some(Response::Combination {
            coarse,
            fine,
            crossover,
        });
        self
    }

    /// Measurable range in native unit
    pub fn valid_range(mut self, min: f64, max: f64) -> Self {
        self.valid_range = PressureRange { min, max };
        self
    }

    /// Unit the transfer function produces (default: mbar)
    pub fn native_unit(mut self, unit: PressureUnit) -> Self {
        self.native_unit = unit;
        self
    }

    /// Supported units (default: all)
    pub fn units(mut self, units: &[PressureUnit]) -> Self {
        self.units.clear();
        for unit in units {
            if !self.units.contains(unit) && self.units.push(*unit).is_err() {
                self.fail(ProfileError::CapacityExceeded {
                    what: "supported units",
                });
            }
        }
        self
    }

    /// Default unit (default: native unit)
    pub fn default_unit(mut self, unit: PressureUnit) -> Self {
        self.default_unit = Some(unit);
        self
    }

    /// Fault codes and bands
    pub fn faults(mut self, faults: FaultTable) -> Self {
        self.faults = faults;
        self
    }

    /// Map a status code
    pub fn fault_code(mut self, code: u16, kind: crate::errors::FaultKind) -> Self {
        if let Err(err) = self.faults.insert(code, kind) {
            self.fail(err);
        }
        self
    }

    /// Reserve an analog fault band
    pub fn fault_band(mut self, band: FaultBand) -> Self {
        if let Err(err) = self.faults.add_band(band) {
            self.fail(err);
        }
        self
    }

    /// Validate and finish
    pub fn build(self) -> Result<GaugeProfile, ProfileError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let response = self.response.ok_or(ProfileError::MissingResponse)?;
        let units = if self.units.is_empty() {
            Vec::from_slice(&PressureUnit::ALL).map_err(|_| ProfileError::CapacityExceeded {
                what: "supported units",
            })?
        } else {
            self.units
        };

        let profile = GaugeProfile {
            id: self.id,
            gauge_type: self.gauge_type,
            response,
            valid_range: self.valid_range,
            native_unit: self.native_unit,
            units,
            default_unit: self.default_unit.unwrap_or(self.native_unit),
            faults: self.faults,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaultKind;

    fn linear() -> TransferFunction {
        TransferFunction::linear(0.0, 10.0, 133.322, 0.0).unwrap()
    }

    #[test]
    fn builder_defaults() {
        let profile = GaugeProfile::builder("CDG-10", GaugeType::Capacitance)
            .transfer(linear())
            .native_unit(PressureUnit::Pascal)
            .valid_range(1e-3, 1e5)
            .build()
            .unwrap();

        assert_eq!(profile.id().as_str(), "CDG-10");
        assert_eq!(profile.default_unit(), PressureUnit::Pascal);
        assert_eq!(profile.units().len(), PressureUnit::ALL.len());
        assert!(profile.valid_range().contains(666.61));
    }

    #[test]
    fn default_unit_must_be_supported() {
        let result = GaugeProfile::builder("g", GaugeType::Pirani)
            .transfer(linear())
            .units(&[PressureUnit::Pascal, PressureUnit::Torr])
            .default_unit(PressureUnit::Millibar)
            .build();
        assert_eq!(result, Err(ProfileError::DefaultUnitUnsupported));
    }

    #[test]
    fn type_and_response_must_agree() {
        let result = GaugeProfile::builder("g", GaugeType::Combination)
            .transfer(linear())
            .build();
        assert_eq!(result, Err(ProfileError::TypeMismatch));

        let crossover = Crossover::new(5.5e-3, 1e-2).unwrap();
        let result = GaugeProfile::builder("g", GaugeType::Pirani)
            .combination(linear(), linear(), crossover)
            .build();
        assert_eq!(result, Err(ProfileError::TypeMismatch));
    }

    #[test]
    fn missing_response_and_long_id() {
        let result = GaugeProfile::builder("g", GaugeType::Pirani).build();
        assert_eq!(result, Err(ProfileError::MissingResponse));

        let long = "x".repeat(MAX_GAUGE_ID_LEN + 1);
        let result = GaugeProfile::builder(&long, GaugeType::Pirani)
            .transfer(linear())
            .build();
        assert!(matches!(result, Err(ProfileError::CapacityExceeded { .. })));
    }

    #[test]
    fn crossover_needs_hysteresis() {
        assert!(Crossover::new(1e-2, 1e-2).is_err());
        assert!(Crossover::new(1e-2, 5e-3).is_err());
        assert!(Crossover::new(5e-3, 1e-2).is_ok());
    }

    #[test]
    fn invalid_range_is_rejected() {
        let result = GaugeProfile::builder("g", GaugeType::Pirani)
            .transfer(linear())
            .valid_range(10.0, 1.0)
            .build();
        assert!(matches!(result, Err(ProfileError::InvalidRange { .. })));
    }

    #[test]
    fn status_codes_resolve_through_profile() {
        let profile = GaugeProfile::builder("g", GaugeType::Pirani)
            .transfer(linear())
            .fault_code(7, FaultKind::FilamentFailure)
            .build()
            .unwrap();
        assert_eq!(profile.fault_for_status(7).kind, FaultKind::FilamentFailure);
        assert_eq!(
            profile.fault_for_status(8).kind,
            FaultKind::CommunicationError
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn profile_survives_json() {
        let profile = GaugeProfile::builder("g", GaugeType::Pirani)
            .transfer(linear())
            .fault_code(7, FaultKind::FilamentFailure)
            .build()
            .unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        let back: GaugeProfile = serde_json::from_str(&json).unwrap();
        assert!(back.validate().is_ok());
        assert_eq!(back.id(), profile.id());
        assert_eq!(back.faults(), profile.faults());
    }
}
