//! Project Tests
//!
//! Topology validation and persistence through the public API.

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use sea_engine::error::ValidationError;
use sea_engine::library::standard_material;
use sea_engine::model::EntityId;
use sea_engine::templates::{vehicle_cabin, CabinParams};
use sea_engine::{
    AxisSpec, FrequencyAxis, Junction, Load, Project, SeaError, Subsystem, SubsystemId,
};

fn cabin_project() -> Project {
    let mut project = Project::named("cabin");
    project.set_frequency_axis(FrequencyAxis::build(AxisSpec::octave(63.0, 8000.0)).unwrap());
    project
        .insert_template(&vehicle_cabin(&CabinParams::default()).unwrap())
        .unwrap();
    project
        .add_load(Load::force("engine", SubsystemId(4), 5.0).with_spectrum(&[(63.0, 1.0), (2000.0, 0.1)]))
        .unwrap();
    project
}

// === Persistence ===

#[test]
fn test_save_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cabin.json");
    let project = cabin_project();
    project.save(&path).unwrap();

    let loaded = Project::load(&path).unwrap();
    assert_eq!(loaded, project);
    assert_eq!(loaded.metadata().id, project.metadata().id);
}

#[test]
fn test_document_keys() {
    let value = serde_json::to_value(cabin_project()).unwrap();
    for key in ["materials", "subsystems", "junctions", "loads", "frequency_axis"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["frequency_axis"]["spacing"]["type"], "octave");
}

#[test]
fn test_tampered_document_rejected() {
    let mut value = serde_json::to_value(cabin_project()).unwrap();
    value["loads"][0]["target"] = serde_json::json!(99);
    let err = Project::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(
        err,
        SeaError::Validation(ValidationError::UnknownSubsystem(SubsystemId(99)))
    ));
}

// === Referential Integrity ===

#[test]
fn test_delete_referenced_subsystem_fails() {
    let mut project = cabin_project();
    let before = project.clone();

    match project.remove_subsystem(SubsystemId(4)) {
        Err(SeaError::Validation(ValidationError::InUse { dependents, .. })) => {
            assert!(dependents.iter().any(|d| d.contains("junction")));
            assert!(dependents.iter().any(|d| d.contains("load 'engine'")));
        }
        other => panic!("expected an in-use error, got {:?}", other),
    }
    assert_eq!(project, before);

    // Dependents first, then the subsystem
    project.remove_load("engine").unwrap();
    let junction = project
        .junctions()
        .iter()
        .find(|j| j.involves(SubsystemId(4)))
        .map(|j| j.name.clone())
        .unwrap();
    project.remove_junction(&junction).unwrap();
    assert!(project.remove_subsystem(SubsystemId(4)).is_ok());
}

#[test]
fn test_invalid_entities_never_enter() {
    let mut project = Project::new();
    project.add_material(standard_material("air").unwrap()).unwrap();
    project.add_material(standard_material("steel").unwrap()).unwrap();
    assert_eq!(
        project
            .add_subsystem(Subsystem::cavity(1, "a", 2.0, 2.0, 2.0, "air"))
            .unwrap(),
        EntityId::Subsystem(SubsystemId(1))
    );
    project
        .add_subsystem(Subsystem::cavity(2, "b", 2.0, 2.0, 2.0, "air"))
        .unwrap();

    let bad_geometry = project.add_subsystem(Subsystem::plate(3, "p", 1.0, 0.0, 0.001, "steel"));
    assert_eq!(bad_geometry.unwrap_err().error_code(), "INVALID_GEOMETRY");

    let line = project.add_junction(Junction::line("l", &[SubsystemId(1), SubsystemId(2)], 1.0));
    assert_eq!(line.unwrap_err().error_code(), "UNSUPPORTED_JUNCTION");

    let lonely = project.add_junction(Junction::area("x", &[SubsystemId(1)]));
    assert_eq!(lonely.unwrap_err().error_code(), "JUNCTION_MEMBER_COUNT");

    let dangling = project.add_junction(Junction::area("y", &[SubsystemId(1), SubsystemId(9)]).with_area(1.0));
    assert_eq!(dangling.unwrap_err().error_code(), "UNKNOWN_SUBSYSTEM");

    let force_on_air = project.add_load(Load::force("f", SubsystemId(1), 1.0));
    assert_eq!(force_on_air.unwrap_err().error_code(), "INVALID_LOAD");

    assert_eq!(project.subsystems().len(), 2);
    assert!(project.junctions().is_empty());
    assert!(project.loads().is_empty());
}
