//! Slender beams carrying bending waves

use super::{angular, Mobility, WaveSystem};
use crate::model::{SubsystemId, SubsystemKind};

/// Euler-Bernoulli beam with a rectangular section
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSystem {
    pub id: SubsystemId,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub density: f64,
    pub youngs_modulus: f64,
    pub loss_factor: f64,
}

impl BeamSystem {
    /// Mass per unit length m′ in kg/m
    pub fn mass_per_length(&self) -> f64 {
        self.density * self.width * self.height
    }

    /// Bending stiffness EI with I = wh³/12
    pub fn bending_stiffness(&self) -> f64 {
        self.youngs_modulus * self.width * self.height.powi(3) / 12.0
    }

    pub fn bending_wavenumber(&self, frequency: f64) -> f64 {
        let omega = angular(frequency);
        (omega * omega * self.mass_per_length() / self.bending_stiffness()).powf(0.25)
    }

    /// Drive-point mobility of the infinite beam, (1 − i) / (4 m′ c_b)
    pub fn drive_point_mobility(&self, frequency: f64) -> Mobility {
        let magnitude = 1.0 / (4.0 * self.mass_per_length() * self.wave_speed(frequency));
        Mobility::new(magnitude, -magnitude)
    }
}

impl WaveSystem for BeamSystem {
    fn id(&self) -> SubsystemId {
        self.id
    }

    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Beam
    }

    /// n(f) = L / c_b
    fn modal_density(&self, frequency: f64) -> f64 {
        self.length / self.wave_speed(frequency)
    }

    fn wave_speed(&self, frequency: f64) -> f64 {
        angular(frequency) / self.bending_wavenumber(frequency)
    }

    fn group_velocity(&self, frequency: f64) -> f64 {
        2.0 * self.wave_speed(frequency)
    }

    fn loss_factor(&self, _frequency: f64) -> f64 {
        self.loss_factor
    }

    fn mass(&self) -> f64 {
        self.mass_per_length() * self.length
    }
}
