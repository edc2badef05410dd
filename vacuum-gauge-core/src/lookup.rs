//! Calibration Tables for Non-Analytic Transfer Curves
//!
//! ## Motivation
//!
//! Some gauge heads have no closed-form characteristic. Thermal-conductivity
//! gauges in particular flatten out at both ends of their range, and vendors
//! publish their curves as a table of (signal, pressure) points instead of a
//! formula. A [`CalibrationTable`] stores such a curve in fixed capacity and
//! interpolates between its points.
//!
//! ## Interpolation
//!
//! ```text
//! Linear:        p = p₀ + (p₁ - p₀)·t
//! LogPressure:   p = 10^(log p₀ + (log p₁ - log p₀)·t)
//!
//! Where t = (x - x₀) / (x₁ - x₀)
//! ```
//!
//! Pressure curves usually span several decades, so log-pressure
//! interpolation tracks them far better than linear interpolation with the
//! same number of points. It requires every tabulated pressure to be
//! strictly positive.
//!
//! ## Clamping
//!
//! Inputs outside the first and last point are clamped to the end of the
//! table and a warning is logged. Transfer functions only pass inputs from
//! their own segment domain, which must lie inside the table.

use heapless::Vec;

use crate::constants::capacity::MAX_CALIBRATION_POINTS;
use crate::errors::ProfileError;
use crate::validation::Validatable;

/// How to interpolate between adjacent calibration points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Straight line in pressure
    #[default]
    Linear,
    /// Straight line in log10(pressure)
    LogPressure,
}

/// One tabulated point of a calibration curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationPoint {
    /// Raw signal (volts, milliamps or frame units)
    pub signal: f64,
    /// Pressure in the profile's native unit
    pub pressure: f64,
}

impl CalibrationPoint {
    /// Create a point
    pub const fn new(signal: f64, pressure: f64) -> Self {
        Self { signal, pressure }
    }
}

/// Piecewise calibration curve with strictly increasing signal values
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationTable {
    points: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>,
    interpolation: Interpolation,
}

impl CalibrationTable {
    /// Build a table from points sorted by ascending signal
    pub fn new(
        points: &[CalibrationPoint],
        interpolation: Interpolation,
    ) -> Result<Self, ProfileError> {
        let points = Vec::from_slice(points).map_err(|_| ProfileError::CapacityExceeded {
            what: "calibration points",
        })?;
        let table = Self {
            points,
            interpolation,
        };
        table.validate()?;
        Ok(table)
    }

    /// Check ordering, finiteness and positivity of the points
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.points.len() < 2 {
            return Err(ProfileError::InvalidTable {
                reason: "need at least two points",
            });
        }

        for point in &self.points {
            if !point.signal.is_valid() || !point.pressure.is_valid() {
                return Err(ProfileError::NonFiniteCoefficient);
            }
            let positive = match self.interpolation {
                Interpolation::Linear => point.pressure >= 0.0,
                Interpolation::LogPressure => point.pressure > 0.0,
            };
            if !positive {
                return Err(ProfileError::InvalidTable {
                    reason: "pressure must be positive",
                });
            }
        }

        if self.points.windows(2).any(|w| w[1].signal <= w[0].signal) {
            return Err(ProfileError::InvalidTable {
                reason: "signal values must strictly increase",
            });
        }

        Ok(())
    }

    /// Tabulated points
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Interpolation mode
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Signal range covered by the table
    pub fn span(&self) -> (f64, f64) {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first.signal, last.signal),
            _ => (0.0, 0.0),
        }
    }

    /// Interpolated pressure for `signal`
    pub fn evaluate(&self, signal: f64) -> f64 {
        let (lo, hi) = self.span();
        let x = if signal < lo {
            lo
        } else if signal > hi {
            hi
        } else {
            signal
        };
        if x != signal {
            log_warn!("Calibration lookup: input clamped ({} -> {})", signal, x);
        }

        // First point strictly above x, minus one, is the left end of the interval
        let upper = self
            .points
            .partition_point(|p| p.signal <= x)
            .clamp(1, self.points.len().saturating_sub(1).max(1));
        let (a, b) = match (self.points.get(upper - 1), self.points.get(upper)) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => return a.pressure,
            _ => return 0.0,
        };

        let t = (x - a.signal) / (b.signal - a.signal);
        match self.interpolation {
            Interpolation::Linear => a.pressure + (b.pressure - a.pressure) * t,
            Interpolation::LogPressure => {
                let la = libm::log10(a.pressure);
                let lb = libm::log10(b.pressure);
                libm::pow(10.0, la + (lb - la) * t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn linear_interpolation_between_points() {
        let table = CalibrationTable::new(
            &[
                CalibrationPoint::new(0.0, 0.0),
                CalibrationPoint::new(1.0, 10.0),
                CalibrationPoint::new(3.0, 50.0),
            ],
            Interpolation::Linear,
        )
        .unwrap();

        assert!(approx(table.evaluate(0.5), 5.0));
        assert!(approx(table.evaluate(1.0), 10.0));
        assert!(approx(table.evaluate(2.0), 30.0));
        assert!(approx(table.evaluate(3.0), 50.0));
    }

    #[test]
    fn log_interpolation_is_geometric() {
        let table = CalibrationTable::new(
            &[
                CalibrationPoint::new(2.0, 1e-3),
                CalibrationPoint::new(4.0, 1e-1),
            ],
            Interpolation::LogPressure,
        )
        .unwrap();

        assert!(approx(table.evaluate(3.0), 1e-2));
    }

    #[test]
    fn clamps_outside_table() {
        let table = CalibrationTable::new(
            &[
                CalibrationPoint::new(1.0, 2.0),
                CalibrationPoint::new(2.0, 4.0),
            ],
            Interpolation::Linear,
        )
        .unwrap();

        assert!(approx(table.evaluate(-5.0), 2.0));
        assert!(approx(table.evaluate(9.0), 4.0));
    }

    #[test]
    fn rejects_unsorted_and_short_tables() {
        let unsorted = CalibrationTable::new(
            &[
                CalibrationPoint::new(2.0, 1.0),
                CalibrationPoint::new(1.0, 2.0),
            ],
            Interpolation::Linear,
        );
        assert!(matches!(unsorted, Err(ProfileError::InvalidTable { .. })));

        let short = CalibrationTable::new(&[CalibrationPoint::new(1.0, 1.0)], Interpolation::Linear);
        assert!(matches!(short, Err(ProfileError::InvalidTable { .. })));
    }

    #[test]
    fn log_table_needs_positive_pressure() {
        let table = CalibrationTable::new(
            &[
                CalibrationPoint::new(0.0, 0.0),
                CalibrationPoint::new(1.0, 1.0),
            ],
            Interpolation::LogPressure,
        );
        assert!(table.is_err());
    }

    #[test]
    fn capacity_is_enforced() {
        let points: std::vec::Vec<_> = (0..=MAX_CALIBRATION_POINTS)
            .map(|i| CalibrationPoint::new(i as f64, i as f64))
            .collect();
        let table = CalibrationTable::new(&points, Interpolation::Linear);
        assert!(matches!(table, Err(ProfileError::CapacityExceeded { .. })));
    }
}
