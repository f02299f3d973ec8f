//! Junction records

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::subsystem::SubsystemId;

/// How the connected subsystems share geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionKind {
    /// Shared surface (plate/cavity, cavity/cavity)
    Area,
    /// Shared edge between plates
    Line,
    /// Single connection point between structures
    Point,
    /// Radiation from a structure into an unbounded fluid
    SemiInfinite,
}

impl JunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JunctionKind::Area => "area",
            JunctionKind::Line => "line",
            JunctionKind::Point => "point",
            JunctionKind::SemiInfinite => "semi_infinite",
        }
    }
}

/// A coupling element between two or three subsystems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub name: String,
    pub kind: JunctionKind,
    /// Connected subsystems, in junction order
    pub systems: Vec<SubsystemId>,
    /// Shared area in m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    /// Shared edge length in m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Orientation of each member around a line junction, in radians
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angles: Option<Vec<f64>>,
}

impl Junction {
    pub fn new(name: &str, kind: JunctionKind, systems: &[SubsystemId]) -> Self {
        Self {
            name: name.to_string(),
            kind,
            systems: systems.to_vec(),
            area: None,
            length: None,
            angles: None,
        }
    }

    pub fn area(name: &str, systems: &[SubsystemId]) -> Self {
        Self::new(name, JunctionKind::Area, systems)
    }

    pub fn line(name: &str, systems: &[SubsystemId], length: f64) -> Self {
        Self::new(name, JunctionKind::Line, systems).with_length(length)
    }

    pub fn point(name: &str, systems: &[SubsystemId]) -> Self {
        Self::new(name, JunctionKind::Point, systems)
    }

    pub fn semi_infinite(name: &str, structure: SubsystemId, fluid: SubsystemId) -> Self {
        Self::new(name, JunctionKind::SemiInfinite, &[structure, fluid])
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_angles(mut self, angles: &[f64]) -> Self {
        self.angles = Some(angles.to_vec());
        self
    }

    pub fn involves(&self, id: SubsystemId) -> bool {
        self.systems.contains(&id)
    }

    /// Member orientations, falling back to 0, π/2, π
    pub fn member_angles(&self) -> Vec<f64> {
        match &self.angles {
            Some(angles) => angles.clone(),
            None => [0.0, PI / 2.0, PI]
                .into_iter()
                .take(self.systems.len())
                .collect(),
        }
    }
}
