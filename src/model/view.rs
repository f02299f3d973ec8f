//! Topology projection for 3D viewers
//!
//! Independent of any analysis: only geometry and connectivity are exposed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::junction::{Junction, JunctionKind};
use super::subsystem::{Geometry, Subsystem, SubsystemId, SubsystemKind};

/// Geometry of a whole project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryView {
    pub subsystems: Vec<SubsystemShape>,
    pub junctions: Vec<JunctionShape>,
}

/// Drawable description of one subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemShape {
    pub id: SubsystemId,
    pub name: String,
    pub kind: SubsystemKind,
    pub dimensions: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_area: Option<f64>,
    pub faces: Vec<Face>,
}

/// Rectangular face in the subsystem's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub name: String,
    pub center: [f64; 3],
    pub size: [f64; 2],
    pub normal: [f64; 3],
}

/// Connectivity of one junction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionShape {
    pub name: String,
    pub kind: JunctionKind,
    pub systems: Vec<SubsystemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl SubsystemShape {
    pub fn from_subsystem(subsystem: &Subsystem) -> Self {
        let geometry = &subsystem.geometry;
        let dimensions = geometry
            .dimensions()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        Self {
            id: subsystem.id,
            name: subsystem.name.clone(),
            kind: subsystem.kind(),
            dimensions,
            volume: geometry.volume(),
            surface_area: geometry.surface_area(),
            faces: faces(geometry),
        }
    }
}

impl JunctionShape {
    pub fn from_junction(junction: &Junction) -> Self {
        Self {
            name: junction.name.clone(),
            kind: junction.kind,
            systems: junction.systems.clone(),
            area: junction.area,
            length: junction.length,
        }
    }
}

fn face(name: &str, center: [f64; 3], size: [f64; 2], normal: [f64; 3]) -> Face {
    Face {
        name: name.to_string(),
        center,
        size,
        normal,
    }
}

fn faces(geometry: &Geometry) -> Vec<Face> {
    match *geometry {
        Geometry::Plate { lx, ly, .. } => {
            vec![face("plate", [lx / 2.0, ly / 2.0, 0.0], [lx, ly], [0.0, 0.0, 1.0])]
        }
        Geometry::Beam { length, height, .. } => {
            vec![face("beam", [length / 2.0, 0.0, 0.0], [length, height], [0.0, 1.0, 0.0])]
        }
        Geometry::Cavity { lx, ly, lz } => {
            let (cx, cy, cz) = (lx / 2.0, ly / 2.0, lz / 2.0);
            vec![
                face("floor", [cx, cy, 0.0], [lx, ly], [0.0, 0.0, -1.0]),
                face("ceiling", [cx, cy, lz], [lx, ly], [0.0, 0.0, 1.0]),
                face("wall_x1", [0.0, cy, cz], [lz, ly], [-1.0, 0.0, 0.0]),
                face("wall_x2", [lx, cy, cz], [lz, ly], [1.0, 0.0, 0.0]),
                face("wall_y1", [cx, 0.0, cz], [lx, lz], [0.0, -1.0, 0.0]),
                face("wall_y2", [cx, ly, cz], [lx, lz], [0.0, 1.0, 0.0]),
            ]
        }
        // Only volume and surface are known: nothing to draw
        Geometry::GeneralCavity { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_has_six_faces() {
        let room = Subsystem::cavity(1, "room", 3.0, 4.0, 2.5, "air");
        let shape = SubsystemShape::from_subsystem(&room);
        assert_eq!(shape.faces.len(), 6);
        assert_eq!(shape.volume, Some(30.0));
        assert_eq!(shape.dimensions["lz"], 2.5);
    }

    #[test]
    fn test_plate_face() {
        let plate = Subsystem::plate(2, "wall", 4.0, 2.5, 0.1, "concrete");
        let shape = SubsystemShape::from_subsystem(&plate);
        assert_eq!(shape.faces.len(), 1);
        assert_eq!(shape.faces[0].size, [4.0, 2.5]);
        assert_eq!(shape.volume, None);
    }
}
