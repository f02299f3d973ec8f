//! Template Generator
//!
//! Canonical topologies built from a few parameters. Templates return fresh
//! entities and never see a project; `Project::insert_template` adds them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::library::standard_material;
use crate::model::{Geometry, Junction, Material, Subsystem, SubsystemId};

/// Entities produced by a template, loads excluded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub materials: Vec<Material>,
    pub subsystems: Vec<Subsystem>,
    pub junctions: Vec<Junction>,
}

impl TemplateModel {
    /// Shift every subsystem id by `offset`
    pub fn with_id_offset(mut self, offset: u32) -> Self {
        for subsystem in &mut self.subsystems {
            subsystem.id = SubsystemId(subsystem.id.0 + offset);
        }
        for junction in &mut self.junctions {
            for id in &mut junction.systems {
                *id = SubsystemId(id.0 + offset);
            }
        }
        self
    }

    /// Prefix subsystem and junction names, e.g. `"left/"`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for subsystem in &mut self.subsystems {
            subsystem.name = format!("{}{}", prefix, subsystem.name);
        }
        for junction in &mut self.junctions {
            junction.name = format!("{}{}", prefix, junction.name);
        }
        self
    }

    /// Id of the subsystem called `name`
    pub fn id_of(&self, name: &str) -> Option<SubsystemId> {
        self.subsystems.iter().find(|s| s.name == name).map(|s| s.id)
    }
}

fn material(name: &str) -> Result<Material> {
    standard_material(name).ok_or_else(|| ValidationError::UnknownMaterial(name.to_string()).into())
}

/// Two rooms side by side with a separating wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoRoomParams {
    /// Source room `[lx, ly, lz]` in m; the wall spans `ly × lz`
    pub room1: [f64; 3],
    pub room2: [f64; 3],
    pub wall_thickness: f64,
    pub wall_material: String,
    pub room1_absorption: f64,
    pub room2_absorption: f64,
    pub wall_damping: f64,
}

impl Default for TwoRoomParams {
    fn default() -> Self {
        Self {
            room1: [3.0, 4.0, 2.5],
            room2: [4.0, 4.0, 2.5],
            wall_thickness: 0.2,
            wall_material: "concrete".to_string(),
            room1_absorption: 8.0,
            room2_absorption: 10.0,
            wall_damping: 0.03,
        }
    }
}

/// Rooms `room1` (1) and `room2` (3) separated by `wall` (2)
pub fn two_rooms(params: &TwoRoomParams) -> Result<TemplateModel> {
    let wall_material = material(&params.wall_material)?;
    let air = material("air")?;
    let [x1, y1, z1] = params.room1;
    let [x2, y2, z2] = params.room2;

    let subsystems = vec![
        Subsystem::cavity(1, "room1", x1, y1, z1, &air.name).with_absorption(params.room1_absorption),
        Subsystem::plate(2, "wall", y1, z1, params.wall_thickness, &wall_material.name)
            .with_damping(params.wall_damping),
        Subsystem::cavity(3, "room2", x2, y2, z2, &air.name).with_absorption(params.room2_absorption),
    ];
    let junctions = vec![Junction::area(
        "room1-wall-room2",
        &[SubsystemId(1), SubsystemId(2), SubsystemId(3)],
    )];

    Ok(TemplateModel {
        materials: vec![wall_material, air],
        subsystems,
        junctions,
    })
}

/// One trim panel of a vehicle cabin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelParams {
    pub name: String,
    pub lx: f64,
    pub ly: f64,
    pub thickness: f64,
    pub material: String,
    pub damping: f64,
}

impl PanelParams {
    pub fn new(name: &str, lx: f64, ly: f64, thickness: f64) -> Self {
        Self {
            name: name.to_string(),
            lx,
            ly,
            thickness,
            material: "steel".to_string(),
            damping: 0.01,
        }
    }
}

/// Cabin cavity known by volume and surface, with its panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinParams {
    pub volume: f64,
    pub surface_area: f64,
    pub absorption_area: f64,
    pub panels: Vec<PanelParams>,
}

impl Default for CabinParams {
    fn default() -> Self {
        Self {
            volume: 3.0,
            surface_area: 13.0,
            absorption_area: 1.5,
            panels: vec![
                PanelParams::new("roof", 1.8, 1.2, 0.0008),
                PanelParams::new("floor", 1.8, 1.3, 0.001),
                PanelParams::new("firewall", 1.4, 0.5, 0.0012),
                PanelParams::new("door_left", 1.1, 0.9, 0.0008),
                PanelParams::new("door_right", 1.1, 0.9, 0.0008),
                PanelParams::new("windscreen", 1.4, 0.8, 0.005),
            ],
        }
    }
}

/// Cabin (1) coupled to each panel (2, 3, ...) through its area
pub fn vehicle_cabin(params: &CabinParams) -> Result<TemplateModel> {
    let air = material("air")?;
    // Edge length of a cube with the same volume
    let edge_length = 12.0 * params.volume.cbrt();
    let cabin = Subsystem::new(
        1,
        "cabin",
        Geometry::GeneralCavity {
            volume: params.volume,
            surface_area: params.surface_area,
            edge_length,
        },
        &air.name,
    )
    .with_absorption(params.absorption_area);

    let mut model = TemplateModel {
        materials: vec![air],
        subsystems: vec![cabin],
        junctions: Vec::new(),
    };
    for (i, panel) in params.panels.iter().enumerate() {
        if !model.materials.iter().any(|m| m.name == panel.material) {
            model.materials.push(material(&panel.material)?);
        }
        let id = SubsystemId(i as u32 + 2);
        model.subsystems.push(
            Subsystem::plate(id, &panel.name, panel.lx, panel.ly, panel.thickness, &panel.material)
                .with_damping(panel.damping),
        );
        model.junctions.push(Junction::area(
            &format!("{}-cabin", panel.name),
            &[id, SubsystemId(1)],
        ));
    }
    Ok(model)
}

/// Closed box of six plates around an air cavity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosureParams {
    /// Inner `[lx, ly, lz]` in m
    pub dimensions: [f64; 3],
    pub plate_thickness: f64,
    pub material: String,
    pub plate_damping: f64,
    /// Lines the inside with absorbent covering a fifth of the walls
    pub with_treatment: bool,
}

impl Default for EnclosureParams {
    fn default() -> Self {
        Self {
            dimensions: [0.8, 0.6, 0.5],
            plate_thickness: 0.002,
            material: "steel".to_string(),
            plate_damping: 0.01,
            with_treatment: false,
        }
    }
}

/// Cavity (1) inside faces top, bottom, front, back, left, right (2..=7)
///
/// Each face couples to the cavity through its area and to its four
/// neighbours through right-angle line junctions.
pub fn box_enclosure(params: &EnclosureParams) -> Result<TemplateModel> {
    let shell = material(&params.material)?;
    let air = material("air")?;
    let [lx, ly, lz] = params.dimensions;
    let h = params.plate_thickness;

    let mut cavity = Subsystem::cavity(1, "enclosure_cavity", lx, ly, lz, &air.name);
    if params.with_treatment {
        cavity = cavity.with_absorption(0.2 * 2.0 * (lx * ly + ly * lz + lx * lz));
    }

    // (name, edge a, edge b, axis the face is normal to)
    let faces = [
        ("top", lx, ly, 2),
        ("bottom", lx, ly, 2),
        ("front", lx, lz, 1),
        ("back", lx, lz, 1),
        ("left", ly, lz, 0),
        ("right", ly, lz, 0),
    ];
    let mut subsystems = vec![cavity];
    let mut junctions = Vec::new();
    for (i, &(name, a, b, _)) in faces.iter().enumerate() {
        let id = SubsystemId(i as u32 + 2);
        subsystems.push(Subsystem::plate(id, name, a, b, h, &shell.name).with_damping(params.plate_damping));
        junctions.push(Junction::area(&format!("{}-cavity", name), &[id, SubsystemId(1)]));
    }

    // Faces normal to different axes meet along an edge parallel to the
    // remaining axis
    let dims = [lx, ly, lz];
    for (i, &(name_a, _, _, axis_a)) in faces.iter().enumerate() {
        for (j, &(name_b, _, _, axis_b)) in faces.iter().enumerate().skip(i + 1) {
            if axis_a == axis_b {
                continue;
            }
            let length = dims[3 - axis_a - axis_b];
            junctions.push(Junction::line(
                &format!("{}-{}", name_a, name_b),
                &[SubsystemId(i as u32 + 2), SubsystemId(j as u32 + 2)],
                length,
            ));
        }
    }

    Ok(TemplateModel {
        materials: vec![shell, air],
        subsystems,
        junctions,
    })
}

/// Names accepted by [`build_template`]
pub fn list_templates() -> Vec<&'static str> {
    vec!["two_rooms", "vehicle_cabin", "box_enclosure"]
}

/// Build a template with default parameters by name
pub fn build_template(name: &str) -> Result<TemplateModel> {
    match name {
        "two_rooms" => two_rooms(&TwoRoomParams::default()),
        "vehicle_cabin" => vehicle_cabin(&CabinParams::default()),
        "box_enclosure" => box_enclosure(&EnclosureParams::default()),
        other => Err(ValidationError::NotFound {
            kind: "template",
            name: other.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JunctionKind, Load, Project};
    use crate::solver::{solve, SolveConfig};

    #[test]
    fn test_every_template_inserts_and_solves() {
        for name in list_templates() {
            let model = build_template(name).unwrap();
            let mut project = Project::named(name);
            project.insert_template(&model).unwrap();
            let source = model.subsystems[0].id;
            project
                .add_load(Load::power("source", source, 0.01))
                .unwrap();

            let result = solve(&project, &SolveConfig::default()).unwrap();
            assert!(result.is_complete(), "{} has failed bands", name);
            for id in project.subsystems().iter().map(|s| s.id) {
                for energy in result.energies(id) {
                    let e = energy.unwrap();
                    assert!(e.is_finite() && e >= 0.0, "{}: {} has energy {}", name, id, e);
                }
            }
        }
    }

    #[test]
    fn test_enclosure_topology() {
        let model = box_enclosure(&EnclosureParams::default()).unwrap();
        assert_eq!(model.subsystems.len(), 7);
        let lines: Vec<&Junction> = model
            .junctions
            .iter()
            .filter(|j| j.kind == JunctionKind::Line)
            .collect();
        assert_eq!(lines.len(), 12);
        let top_front = lines.iter().find(|j| j.name == "top-front").unwrap();
        assert_eq!(top_front.length, Some(0.8));
        let front_left = lines.iter().find(|j| j.name == "front-left").unwrap();
        assert_eq!(front_left.length, Some(0.5));
    }

    #[test]
    fn test_composition_with_offset_and_prefix() {
        let left = two_rooms(&TwoRoomParams::default()).unwrap().with_prefix("left/");
        let right = two_rooms(&TwoRoomParams::default())
            .unwrap()
            .with_id_offset(10)
            .with_prefix("right/");
        assert_eq!(right.id_of("right/wall"), Some(SubsystemId(12)));
        assert_eq!(right.junctions[0].systems[2], SubsystemId(13));

        let mut project = Project::new();
        project.insert_template(&left).unwrap();
        project.insert_template(&right).unwrap();
        assert_eq!(project.subsystems().len(), 6);
        assert_eq!(project.materials().len(), 2);
    }

    #[test]
    fn test_failed_insert_leaves_project_untouched() {
        let model = two_rooms(&TwoRoomParams::default()).unwrap();
        let mut project = Project::new();
        project.insert_template(&model).unwrap();
        let before = project.clone();
        // Same ids again
        assert!(project.insert_template(&model).is_err());
        assert_eq!(project, before);
    }

    #[test]
    fn test_unknown_names() {
        let params = TwoRoomParams {
            wall_material: "cheese".to_string(),
            ..TwoRoomParams::default()
        };
        assert_eq!(two_rooms(&params).unwrap_err().error_code(), "UNKNOWN_MATERIAL");
        assert_eq!(build_template("castle").unwrap_err().error_code(), "NOT_FOUND");
    }
}
