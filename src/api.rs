//! Engine boundary
//!
//! Free functions consumed by embedding layers (HTTP handlers, viewers).
//! Each one forwards to the component that owns the behavior.

use crate::error::Result;
use crate::model::{EntityId, GeometryView, Junction, Load, Material, Project, Subsystem};
use crate::results::{AnalysisResult, ExportDocument, UnitConfig};
use crate::solver::SolveConfig;

/// Empty project with the default third-octave axis
pub fn create_project() -> Project {
    Project::new()
}

pub fn add_material(project: &mut Project, material: Material) -> Result<EntityId> {
    project.add_material(material)
}

pub fn add_subsystem(project: &mut Project, subsystem: Subsystem) -> Result<EntityId> {
    project.add_subsystem(subsystem)
}

pub fn add_junction(project: &mut Project, junction: Junction) -> Result<EntityId> {
    project.add_junction(junction)
}

pub fn add_load(project: &mut Project, load: Load) -> Result<EntityId> {
    project.add_load(load)
}

/// Analyze every band; the project itself is never modified
pub fn solve(project: &Project, config: &SolveConfig) -> Result<AnalysisResult> {
    crate::solver::solve(project, config)
}

/// Topology projection for 3D display, independent of any analysis
pub fn get_geometry(project: &Project) -> GeometryView {
    project.geometry()
}

pub fn export(result: &AnalysisResult, units: &UnitConfig) -> ExportDocument {
    crate::results::export(result, units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubsystemId;

    #[test]
    fn test_boundary_round_trip() {
        let mut project = create_project();
        assert_eq!(
            add_material(&mut project, Material::fluid("air", 1.21, 343.0, 0.0)).unwrap(),
            EntityId::Material("air".to_string())
        );
        add_material(&mut project, Material::solid("glass", 2500.0, 70e9, 0.22, 0.002)).unwrap();
        assert_eq!(
            add_subsystem(&mut project, Subsystem::cavity(1, "room", 3.0, 3.0, 3.0, "air")).unwrap(),
            EntityId::Subsystem(SubsystemId(1))
        );
        add_subsystem(&mut project, Subsystem::plate(2, "window", 1.2, 1.0, 0.006, "glass")).unwrap();
        add_junction(&mut project, Junction::area("window-room", &[SubsystemId(2), SubsystemId(1)]))
            .unwrap();
        add_load(&mut project, Load::pressure("traffic", SubsystemId(2), 0.2)).unwrap();

        let geometry = get_geometry(&project);
        assert_eq!(geometry.subsystems.len(), 2);
        assert_eq!(geometry.junctions.len(), 1);

        let before = project.clone();
        let result = solve(&project, &SolveConfig::default()).unwrap();
        assert_eq!(project, before);

        let doc = export(&result, &UnitConfig::default());
        assert_eq!(doc.subsystems.len(), 2);
        assert!(doc.subsystems[1].energy.iter().all(|e| e.map_or(false, |e| e > 0.0)));
    }

    #[test]
    fn test_dangling_load_rejected() {
        let mut project = create_project();
        let err = add_load(&mut project, Load::power("p", SubsystemId(4), 1.0)).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SUBSYSTEM");
        assert!(project.loads().is_empty());
    }
}
