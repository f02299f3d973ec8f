//! Acoustic cavities

use std::f64::consts::PI;

use super::WaveSystem;
use crate::model::{SubsystemId, SubsystemKind};

/// Fluid volume with a diffuse sound field
#[derive(Debug, Clone, PartialEq)]
pub struct CavitySystem {
    pub id: SubsystemId,
    pub volume: f64,
    pub surface_area: f64,
    pub edge_length: f64,
    pub density: f64,
    pub speed_of_sound: f64,
    pub material_loss_factor: f64,
    /// Replaces the material and absorption losses when set
    pub damping_loss_factor: Option<f64>,
    /// Equivalent absorption area in m²
    pub absorption_area: f64,
}

impl CavitySystem {
    /// Characteristic impedance ρc
    pub fn impedance(&self) -> f64 {
        self.density * self.speed_of_sound
    }

    /// Loss factor of the absorption area, cA / (8πfV)
    pub fn absorption_loss_factor(&self, frequency: f64) -> f64 {
        self.speed_of_sound * self.absorption_area / (8.0 * PI * frequency * self.volume)
    }

    /// Mean-square pressure of a diffuse field holding `energy` J
    pub fn mean_square_pressure(&self, energy: f64) -> f64 {
        energy * self.density * self.speed_of_sound.powi(2) / self.volume
    }
}

impl WaveSystem for CavitySystem {
    fn id(&self) -> SubsystemId {
        self.id
    }

    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Cavity
    }

    /// n(f) = 4πf²V/c³ + πfS/(2c²) + L/(8c)
    fn modal_density(&self, frequency: f64) -> f64 {
        let c = self.speed_of_sound;
        4.0 * PI * frequency * frequency * self.volume / c.powi(3)
            + PI * frequency * self.surface_area / (2.0 * c * c)
            + self.edge_length / (8.0 * c)
    }

    fn wave_speed(&self, _frequency: f64) -> f64 {
        self.speed_of_sound
    }

    fn group_velocity(&self, _frequency: f64) -> f64 {
        self.speed_of_sound
    }

    fn loss_factor(&self, frequency: f64) -> f64 {
        match self.damping_loss_factor {
            Some(eta) => eta,
            None => self.material_loss_factor + self.absorption_loss_factor(frequency),
        }
    }

    fn mass(&self) -> f64 {
        self.density * self.volume
    }
}
