//! Hardware fault reporting
//!
//! Serial gauges report faults as status codes inside their reply frames.
//! Analog gauges have no status channel, so they signal faults by driving the
//! output into a reserved voltage band (typically below 0.5 V or above
//! 9.5 V). A [`FaultTable`] describes both for one gauge model.

use heapless::Vec;

use crate::constants::capacity::{MAX_FAULT_BANDS, MAX_FAULT_CODES};
use crate::errors::{Fault, FaultKind, ProfileError};
use crate::validation::Validatable;

/// Signal interval `(low, high)`, exclusive at both ends, reserved for a fault
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultBand {
    /// Lower bound (exclusive)
    pub low: f64,
    /// Upper bound (exclusive)
    pub high: f64,
    /// Fault reported while the signal sits in the band
    pub kind: FaultKind,
}

impl FaultBand {
    /// Band covering every signal below `threshold`
    pub const fn below(threshold: f64, kind: FaultKind) -> Self {
        Self {
            low: f64::MIN,
            high: threshold,
            kind,
        }
    }

    /// Band covering every signal above `threshold`
    pub const fn above(threshold: f64, kind: FaultKind) -> Self {
        Self {
            low: threshold,
            high: f64::MAX,
            kind,
        }
    }

    /// Whether `signal` lies inside the band
    pub fn contains(&self, signal: f64) -> bool {
        signal > self.low && signal < self.high
    }
}

/// Status codes and signal bands a gauge uses to report faults
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultTable {
    codes: Vec<(u16, FaultKind), MAX_FAULT_CODES>,
    bands: Vec<FaultBand, MAX_FAULT_BANDS>,
}

impl FaultTable {
    /// Empty table: every status code is unknown, no band is reserved
    pub const fn new() -> Self {
        Self {
            codes: Vec::new(),
            bands: Vec::new(),
        }
    }

    /// Map `code` to `kind`, replacing an earlier mapping
    pub fn insert(&mut self, code: u16, kind: FaultKind) -> Result<(), ProfileError> {
        if let Some(entry) = self.codes.iter_mut().find(|(c, _)| *c == code) {
            entry.1 = kind;
            return Ok(());
        }
        self.codes
            .push((code, kind))
            .map_err(|_| ProfileError::CapacityExceeded { what: "fault codes" })
    }

    /// Reserve a signal band
    pub fn add_band(&mut self, band: FaultBand) -> Result<(), ProfileError> {
        if band.low.is_nan() || band.high.is_nan() || band.low >= band.high {
            return Err(ProfileError::InvalidRange {
                min: band.low,
                max: band.high,
            });
        }
        self.bands
            .push(band)
            .map_err(|_| ProfileError::CapacityExceeded { what: "fault bands" })
    }

    /// Builder form of [`Self::insert`]
    pub fn with_code(mut self, code: u16, kind: FaultKind) -> Result<Self, ProfileError> {
        self.insert(code, kind)?;
        Ok(self)
    }

    /// Builder form of [`Self::add_band`]
    pub fn with_band(mut self, band: FaultBand) -> Result<Self, ProfileError> {
        self.add_band(band)?;
        Ok(self)
    }

    /// Check for duplicate codes and malformed bands
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (i, (code, _)) in self.codes.iter().enumerate() {
            if self.codes[i + 1..].iter().any(|(c, _)| c == code) {
                return Err(ProfileError::InvalidTable {
                    reason: "duplicate fault code",
                });
            }
        }
        for band in &self.bands {
            if !band.low.is_valid() || !band.high.is_valid() || band.low >= band.high {
                return Err(ProfileError::InvalidRange {
                    min: band.low,
                    max: band.high,
                });
            }
        }
        Ok(())
    }

    /// Kind mapped to `code`, if any
    pub fn kind_for(&self, code: u16) -> Option<FaultKind> {
        self.codes
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// Fault for a hardware status code
    ///
    /// Unknown codes become [`FaultKind::CommunicationError`]. The raw code is
    /// kept on the fault either way.
    pub fn lookup(&self, code: u16) -> Fault {
        match self.kind_for(code) {
            Some(kind) => Fault::new(kind, "gauge reported fault"),
            None => {
                log_debug!("Unknown gauge status code {}", code);
                Fault::new(FaultKind::CommunicationError, "unknown gauge status code")
            }
        }
        .with_status(code)
    }

    /// Fault for a signal inside a reserved band
    pub fn check_signal(&self, signal: f64) -> Option<Fault> {
        self.bands
            .iter()
            .find(|band| band.contains(signal))
            .map(|band| Fault::new(band.kind, "signal in fault band").with_value(signal))
    }

    /// Mapped status codes
    pub fn codes(&self) -> &[(u16, FaultKind)] {
        &self.codes
    }

    /// Reserved signal bands
    pub fn bands(&self) -> &[FaultBand] {
        &self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        let table = FaultTable::new()
            .with_code(3, FaultKind::FilamentFailure)
            .unwrap();

        let fault = table.lookup(3);
        assert_eq!(fault.kind, FaultKind::FilamentFailure);
        assert_eq!(fault.status_code, Some(3));

        let fault = table.lookup(99);
        assert_eq!(fault.kind, FaultKind::CommunicationError);
        assert_eq!(fault.status_code, Some(99));
    }

    #[test]
    fn insert_replaces() {
        let mut table = FaultTable::new();
        table.insert(1, FaultKind::SensorOff).unwrap();
        table.insert(1, FaultKind::FilamentFailure).unwrap();
        assert_eq!(table.codes().len(), 1);
        assert_eq!(table.kind_for(1), Some(FaultKind::FilamentFailure));
    }

    #[test]
    fn bands_are_exclusive() {
        let table = FaultTable::new()
            .with_band(FaultBand::below(0.5, FaultKind::SensorOff))
            .unwrap()
            .with_band(FaultBand::above(9.5, FaultKind::FilamentFailure))
            .unwrap();

        assert_eq!(table.check_signal(0.2).map(|f| f.kind), Some(FaultKind::SensorOff));
        assert!(table.check_signal(0.5).is_none());
        assert!(table.check_signal(5.0).is_none());
        assert!(table.check_signal(9.5).is_none());
        assert_eq!(
            table.check_signal(9.8).map(|f| f.kind),
            Some(FaultKind::FilamentFailure)
        );
    }

    #[test]
    fn capacity_is_enforced() {
        let mut table = FaultTable::new();
        for code in 0..MAX_FAULT_CODES as u16 {
            table.insert(code, FaultKind::SensorOff).unwrap();
        }
        assert!(table.insert(1000, FaultKind::SensorOff).is_err());
    }

    #[test]
    fn inverted_band_is_rejected() {
        let mut table = FaultTable::new();
        let band = FaultBand {
            low: 2.0,
            high: 1.0,
            kind: FaultKind::SensorOff,
        };
        assert!(table.add_band(band).is_err());
    }
}
