//! Material definitions

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Elastic description of a material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Elasticity {
    /// Isotropic solid
    Solid {
        youngs_modulus: f64,
        poisson_ratio: f64,
    },
    /// Compressible fluid
    Fluid { speed_of_sound: f64 },
}

/// A named material shared by subsystems
///
/// Materials are never edited in place; a subsystem keeps referring to the
/// same record for the lifetime of the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Density in kg/m³
    pub density: f64,
    /// Intrinsic damping loss factor
    pub loss_factor: f64,
    pub elasticity: Elasticity,
}

impl Material {
    pub fn solid(
        name: &str,
        density: f64,
        youngs_modulus: f64,
        poisson_ratio: f64,
        loss_factor: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            density,
            loss_factor,
            elasticity: Elasticity::Solid {
                youngs_modulus,
                poisson_ratio,
            },
        }
    }

    pub fn fluid(name: &str, density: f64, speed_of_sound: f64, loss_factor: f64) -> Self {
        Self {
            name: name.to_string(),
            density,
            loss_factor,
            elasticity: Elasticity::Fluid { speed_of_sound },
        }
    }

    pub fn is_fluid(&self) -> bool {
        matches!(self.elasticity, Elasticity::Fluid { .. })
    }

    /// Bulk modulus `ρc²` of a fluid
    pub fn bulk_modulus(&self) -> Option<f64> {
        match self.elasticity {
            Elasticity::Fluid { speed_of_sound } => Some(self.density * speed_of_sound.powi(2)),
            Elasticity::Solid { .. } => None,
        }
    }

    /// Characteristic impedance `ρc` of a fluid
    pub fn characteristic_impedance(&self) -> Option<f64> {
        match self.elasticity {
            Elasticity::Fluid { speed_of_sound } => Some(self.density * speed_of_sound),
            Elasticity::Solid { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidMaterial {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(invalid("density must be positive"));
        }
        if !(self.loss_factor.is_finite() && self.loss_factor >= 0.0) {
            return Err(invalid("loss factor must be non-negative"));
        }
        match self.elasticity {
            Elasticity::Solid {
                youngs_modulus,
                poisson_ratio,
            } => {
                if !(youngs_modulus.is_finite() && youngs_modulus > 0.0) {
                    return Err(invalid("Young's modulus must be positive"));
                }
                if !(0.0..0.5).contains(&poisson_ratio) {
                    return Err(invalid("Poisson ratio must lie in [0, 0.5)"));
                }
            }
            Elasticity::Fluid { speed_of_sound } => {
                if !(speed_of_sound.is_finite() && speed_of_sound > 0.0) {
                    return Err(invalid("speed of sound must be positive"));
                }
            }
        }
        Ok(())
    }
}
