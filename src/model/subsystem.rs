//! Subsystem records and their per-kind geometry

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeaError};

/// Caller-assigned integer identifier of a subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsystemId(pub u32);

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubsystemId {
    fn from(value: u32) -> Self {
        SubsystemId(value)
    }
}

/// Wave-field family of a subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemKind {
    /// Flat plate carrying bending waves
    Plate,
    /// Slender beam carrying bending waves
    Beam,
    /// Acoustic volume
    Cavity,
}

impl SubsystemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsystemKind::Plate => "plate",
            SubsystemKind::Beam => "beam",
            SubsystemKind::Cavity => "cavity",
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, SubsystemKind::Cavity)
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions of a subsystem, in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Plate { lx: f64, ly: f64, thickness: f64 },
    /// Rectangular cross-section `width` x `height`, bending in the height direction
    Beam { length: f64, width: f64, height: f64 },
    /// Rectangular room
    Cavity { lx: f64, ly: f64, lz: f64 },
    /// Cavity known only through its volume, surface and total edge length
    GeneralCavity {
        volume: f64,
        surface_area: f64,
        edge_length: f64,
    },
}

impl Geometry {
    pub fn kind(&self) -> SubsystemKind {
        match self {
            Geometry::Plate { .. } => SubsystemKind::Plate,
            Geometry::Beam { .. } => SubsystemKind::Beam,
            Geometry::Cavity { .. } | Geometry::GeneralCavity { .. } => SubsystemKind::Cavity,
        }
    }

    /// Named dimensions, in declaration order
    pub fn dimensions(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Geometry::Plate { lx, ly, thickness } => {
                vec![("lx", lx), ("ly", ly), ("thickness", thickness)]
            }
            Geometry::Beam {
                length,
                width,
                height,
            } => vec![("length", length), ("width", width), ("height", height)],
            Geometry::Cavity { lx, ly, lz } => vec![("lx", lx), ("ly", ly), ("lz", lz)],
            Geometry::GeneralCavity {
                volume,
                surface_area,
                edge_length,
            } => vec![
                ("volume", volume),
                ("surface_area", surface_area),
                ("edge_length", edge_length),
            ],
        }
    }

    /// Reject any required dimension that is not a positive finite number
    pub fn validate(&self, subsystem: &str) -> Result<()> {
        for (name, value) in self.dimensions() {
            if !(value.is_finite() && value > 0.0) {
                return Err(SeaError::InvalidGeometry {
                    subsystem: subsystem.to_string(),
                    reason: format!("{} must be positive, got {}", name, value),
                });
            }
        }
        Ok(())
    }

    /// Enclosed volume of a cavity
    pub fn volume(&self) -> Option<f64> {
        match *self {
            Geometry::Cavity { lx, ly, lz } => Some(lx * ly * lz),
            Geometry::GeneralCavity { volume, .. } => Some(volume),
            _ => None,
        }
    }

    /// Wall area of a cavity or face area of a plate
    pub fn surface_area(&self) -> Option<f64> {
        match *self {
            Geometry::Cavity { lx, ly, lz } => Some(2.0 * (lx * ly + ly * lz + lx * lz)),
            Geometry::GeneralCavity { surface_area, .. } => Some(surface_area),
            Geometry::Plate { lx, ly, .. } => Some(lx * ly),
            Geometry::Beam { .. } => None,
        }
    }

    /// Total edge length of a cavity or perimeter of a plate
    pub fn edge_length(&self) -> Option<f64> {
        match *self {
            Geometry::Cavity { lx, ly, lz } => Some(4.0 * (lx + ly + lz)),
            Geometry::GeneralCavity { edge_length, .. } => Some(edge_length),
            Geometry::Plate { lx, ly, .. } => Some(2.0 * (lx + ly)),
            Geometry::Beam { .. } => None,
        }
    }
}

/// A vibro-acoustic subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsystem {
    pub id: SubsystemId,
    pub name: String,
    pub geometry: Geometry,
    /// Name of a material held by the same project
    pub material: String,
    /// Replaces the material loss factor when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping_loss_factor: Option<f64>,
    /// Equivalent absorption area in m² (cavities only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_area: Option<f64>,
}

impl Subsystem {
    pub fn new(id: impl Into<SubsystemId>, name: &str, geometry: Geometry, material: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            geometry,
            material: material.to_string(),
            damping_loss_factor: None,
            absorption_area: None,
        }
    }

    pub fn plate(
        id: impl Into<SubsystemId>,
        name: &str,
        lx: f64,
        ly: f64,
        thickness: f64,
        material: &str,
    ) -> Self {
        Self::new(id, name, Geometry::Plate { lx, ly, thickness }, material)
    }

    pub fn beam(
        id: impl Into<SubsystemId>,
        name: &str,
        length: f64,
        width: f64,
        height: f64,
        material: &str,
    ) -> Self {
        Self::new(
            id,
            name,
            Geometry::Beam {
                length,
                width,
                height,
            },
            material,
        )
    }

    pub fn cavity(
        id: impl Into<SubsystemId>,
        name: &str,
        lx: f64,
        ly: f64,
        lz: f64,
        material: &str,
    ) -> Self {
        Self::new(id, name, Geometry::Cavity { lx, ly, lz }, material)
    }

    pub fn with_damping(mut self, loss_factor: f64) -> Self {
        self.damping_loss_factor = Some(loss_factor);
        self
    }

    pub fn with_absorption(mut self, area: f64) -> Self {
        self.absorption_area = Some(area);
        self
    }

    pub fn kind(&self) -> SubsystemKind {
        self.geometry.kind()
    }
}
