//! Excitation loads

use serde::{Deserialize, Serialize};

use super::subsystem::{SubsystemId, SubsystemKind};
use crate::error::ValidationError;

/// Physical nature of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    /// Injected power in W
    Power,
    /// RMS point force in N on a structure
    Force,
    /// RMS diffuse-field pressure in Pa on one face of a plate
    Pressure,
}

impl LoadKind {
    /// Whether a load of this kind can drive a subsystem of `kind`
    pub fn accepts(&self, kind: SubsystemKind) -> bool {
        match self {
            LoadKind::Power => true,
            LoadKind::Force => kind.is_structural(),
            LoadKind::Pressure => kind == SubsystemKind::Plate,
        }
    }
}

/// One point of a load shape: scale factor applied at `frequency`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub frequency: f64,
    pub factor: f64,
}

/// An excitation applied to one subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub kind: LoadKind,
    pub target: SubsystemId,
    /// Magnitude in SI units of `kind`
    pub magnitude: f64,
    /// Frequency shape; flat when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<Vec<SpectrumPoint>>,
}

impl Load {
    pub fn new(name: &str, kind: LoadKind, target: SubsystemId, magnitude: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            target,
            magnitude,
            spectrum: None,
        }
    }

    pub fn power(name: &str, target: SubsystemId, watts: f64) -> Self {
        Self::new(name, LoadKind::Power, target, watts)
    }

    pub fn force(name: &str, target: SubsystemId, newtons: f64) -> Self {
        Self::new(name, LoadKind::Force, target, newtons)
    }

    pub fn pressure(name: &str, target: SubsystemId, pascals: f64) -> Self {
        Self::new(name, LoadKind::Pressure, target, pascals)
    }

    /// Shape the load with `(frequency, factor)` points
    pub fn with_spectrum(mut self, points: &[(f64, f64)]) -> Self {
        self.spectrum = Some(
            points
                .iter()
                .map(|&(frequency, factor)| SpectrumPoint { frequency, factor })
                .collect(),
        );
        self
    }

    /// Shape factor at `frequency`
    ///
    /// Linear interpolation between points, held constant beyond the first
    /// and last point.
    pub fn shape_factor(&self, frequency: f64) -> f64 {
        let points = match &self.spectrum {
            Some(points) if !points.is_empty() => points,
            _ => return 1.0,
        };

        let first = points[0];
        let last = points[points.len() - 1];
        if frequency <= first.frequency {
            return first.factor;
        }
        if frequency >= last.frequency {
            return last.factor;
        }

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if frequency <= b.frequency {
                let t = (frequency - a.frequency) / (b.frequency - a.frequency);
                return a.factor + t * (b.factor - a.factor);
            }
        }
        last.factor
    }

    /// Magnitude at `frequency` after shaping
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        self.magnitude * self.shape_factor(frequency)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidLoad {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !(self.magnitude.is_finite() && self.magnitude >= 0.0) {
            return Err(invalid("magnitude must be a non-negative number"));
        }
        if let Some(points) = &self.spectrum {
            if points
                .iter()
                .any(|p| !(p.factor.is_finite() && p.factor >= 0.0 && p.frequency > 0.0))
            {
                return Err(invalid("spectrum points need positive frequencies and non-negative factors"));
            }
            if points.windows(2).any(|w| w[1].frequency <= w[0].frequency) {
                return Err(invalid("spectrum frequencies must be strictly increasing"));
            }
        }
        Ok(())
    }
}
