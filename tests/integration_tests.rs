//! Integration Tests
//!
//! End-to-end tests for the SEA analysis pipeline.

use approx::assert_relative_eq;

use sea_engine::api;
use sea_engine::coupling::junction_couplings;
use sea_engine::error::{BandError, SeaError, SolveError};
use sea_engine::library::standard_material;
use sea_engine::results::{export, ResultTable, UnitConfig};
use sea_engine::solver::{solve_with_cancel, CancelToken, ProjectSession};
use sea_engine::subsystems::{SubsystemRegistry, WaveSystem};
use sea_engine::templates::{box_enclosure, two_rooms, EnclosureParams, TwoRoomParams};
use sea_engine::{
    solve, AxisSpec, FrequencyAxis, Junction, Load, Material, Project, SolveConfig, Subsystem,
    SubsystemId,
};

/// Room, concrete wall and area junction driven by 1 mW in the room
fn room_and_wall() -> Project {
    let mut project = api::create_project();
    api::add_material(&mut project, Material::fluid("air", 1.21, 343.0, 0.0)).unwrap();
    api::add_material(&mut project, Material::solid("concrete", 2400.0, 30e9, 0.2, 0.03)).unwrap();
    api::add_subsystem(&mut project, Subsystem::cavity(1, "room1", 3.0, 4.0, 2.5, "air").with_damping(0.01))
        .unwrap();
    api::add_subsystem(&mut project, Subsystem::plate(2, "wall", 4.0, 2.5, 0.1, "concrete")).unwrap();
    api::add_junction(&mut project, Junction::area("room1-wall", &[SubsystemId(1), SubsystemId(2)]))
        .unwrap();
    api::add_load(&mut project, Load::power("speaker", SubsystemId(1), 0.001)).unwrap();
    project
}

// === Scenario ===

#[test]
fn test_room_wall_scenario() {
    let project = room_and_wall();
    assert_eq!(project.frequency_axis().spec(), &AxisSpec::third_octave(100.0, 5000.0));

    let result = solve(&project, &SolveConfig::default()).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.band_count(), project.frequency_axis().len());

    for band in 0..result.band_count() {
        let room = result.energy(SubsystemId(1), band).unwrap();
        let wall = result.energy(SubsystemId(2), band).unwrap();
        assert!(room.is_finite() && room >= 0.0);
        assert!(wall.is_finite() && wall >= 0.0);
    }

    // Source dominance at low frequencies
    for band in 0..3 {
        let room = result.energy(SubsystemId(1), band).unwrap();
        let wall = result.energy(SubsystemId(2), band).unwrap();
        assert!(room > wall, "band {}: room {} <= wall {}", band, room, wall);
    }
}

#[test]
fn test_library_room_wall_scenario() {
    // Lossless library air: the room only loses energy into the wall
    let mut project = api::create_project();
    api::add_material(&mut project, standard_material("air").unwrap()).unwrap();
    api::add_material(&mut project, standard_material("concrete").unwrap()).unwrap();
    api::add_subsystem(&mut project, Subsystem::cavity(1, "room1", 3.0, 4.0, 2.5, "air")).unwrap();
    api::add_subsystem(&mut project, Subsystem::plate(2, "wall", 4.0, 2.5, 0.1, "concrete")).unwrap();
    api::add_junction(&mut project, Junction::area("room1-wall", &[SubsystemId(1), SubsystemId(2)]))
        .unwrap();
    api::add_load(&mut project, Load::power("speaker", SubsystemId(1), 0.001)).unwrap();

    let result = api::solve(&project, &SolveConfig::default()).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.band_count(), FrequencyAxis::default().len());

    for band in 0..result.band_count() {
        let room = result.energy(SubsystemId(1), band).unwrap();
        let wall = result.energy(SubsystemId(2), band).unwrap();
        assert!(room.is_finite() && room >= 0.0);
        assert!(wall.is_finite() && wall >= 0.0);

        // Everything injected is dissipated in the wall
        let eta_wall = standard_material("concrete").unwrap().loss_factor;
        let n_wall = result.modal_density(SubsystemId(2), band).unwrap();
        assert_relative_eq!(n_wall * eta_wall * wall, 0.001, max_relative = 1e-9);
    }

    for band in 0..3 {
        let room = result.energy(SubsystemId(1), band).unwrap();
        let wall = result.energy(SubsystemId(2), band).unwrap();
        assert!(room > wall, "band {}: room {} <= wall {}", band, room, wall);
    }
}

#[test]
fn test_rejected_update_keeps_project_solvable() {
    let mut project = room_and_wall();
    let before = project.clone();

    let err = project
        .update_subsystem(Subsystem::cavity(2, "wall", 4.0, 2.5, 0.1, "air"))
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_JUNCTION");
    assert_eq!(project, before);

    let result = solve(&project, &SolveConfig::default()).unwrap();
    assert!(result.is_complete());

    let restored = Project::from_json(&project.to_json().unwrap()).unwrap();
    assert_eq!(restored, project);
}

#[test]
fn test_power_balance_is_satisfied() {
    // Injected power equals power dissipated in every band
    let project = room_and_wall();
    let result = solve(&project, &SolveConfig::serial()).unwrap();
    let registry = SubsystemRegistry::from_project(&project).unwrap();

    for (band, &f) in project.frequency_axis().centers().iter().enumerate() {
        let dissipated: f64 = registry
            .iter()
            .map(|s| {
                let e = result.energy(s.id(), band).unwrap();
                s.modal_density(f) * s.loss_factor(f) * e
            })
            .sum();
        assert_relative_eq!(dissipated, 0.001, max_relative = 1e-9);
    }
}

// === Closed Form ===

#[test]
fn test_uncoupled_energies_closed_form() {
    let mut project = Project::new();
    project.add_material(Material::fluid("air", 1.21, 343.0, 0.0)).unwrap();
    project
        .add_subsystem(Subsystem::cavity(1, "a", 2.0, 3.0, 2.0, "air").with_damping(0.02))
        .unwrap();
    project
        .add_subsystem(Subsystem::cavity(2, "b", 5.0, 3.0, 2.0, "air").with_damping(0.005))
        .unwrap();
    project.add_load(Load::power("pa", SubsystemId(1), 0.5)).unwrap();
    project.add_load(Load::power("pb", SubsystemId(2), 0.25)).unwrap();

    let result = solve(&project, &SolveConfig::default()).unwrap();
    for band in 0..result.band_count() {
        for (id, power, eta) in [(SubsystemId(1), 0.5, 0.02), (SubsystemId(2), 0.25, 0.005)] {
            let n = result.modal_density(id, band).unwrap();
            assert_relative_eq!(
                result.energy(id, band).unwrap(),
                power / (n * eta),
                max_relative = 1e-12
            );
        }
    }
}

// === Frequency Axis ===

#[test]
fn test_third_octave_axis() {
    let axis = FrequencyAxis::build(AxisSpec::third_octave(100.0, 5000.0)).unwrap();
    let centers = axis.centers();
    assert!(centers.windows(2).all(|w| w[1] > w[0]));
    for &f in centers {
        let n = (3.0 * (f / 1000.0).log2()).round();
        let nominal = 1000.0 * 2.0_f64.powf(n / 3.0);
        assert!((f - nominal).abs() / nominal < 1e-3);
        assert!((100.0..=5000.0).contains(&f));
    }

    let err = FrequencyAxis::build(AxisSpec::octave(500.0, 100.0)).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_RANGE");
    assert!(FrequencyAxis::build(AxisSpec::linear(100.0, 200.0, 0)).is_err());
}

// === Reciprocity ===

#[test]
fn test_reciprocity_across_template_junctions() {
    let mut project = Project::new();
    project
        .insert_template(&box_enclosure(&EnclosureParams::default()).unwrap())
        .unwrap();
    let rooms = two_rooms(&TwoRoomParams::default())
        .unwrap()
        .with_id_offset(100)
        .with_prefix("building/");
    project.insert_template(&rooms).unwrap();

    let registry = SubsystemRegistry::from_project(&project).unwrap();
    for &f in project.frequency_axis().centers() {
        for junction in project.junctions() {
            let couplings = junction_couplings(junction, &registry, f).unwrap();
            for t in &couplings.transfers {
                let back = couplings.eta(t.receiver, t.source).unwrap();
                let n_i = registry.get(t.source).unwrap().modal_density(f);
                let n_j = registry.get(t.receiver).unwrap().modal_density(f);
                assert_relative_eq!(n_i * t.eta, n_j * back, max_relative = 1e-9);
            }
        }
    }
}

// === Failures ===

#[test]
fn test_undamped_island_reported_with_ids() {
    let mut project = room_and_wall();
    project
        .add_material(Material::solid("ideal", 7800.0, 210e9, 0.3, 0.0))
        .unwrap();
    project
        .add_subsystem(Subsystem::plate(7, "ideal-a", 1.0, 1.0, 0.002, "ideal"))
        .unwrap();
    project
        .add_subsystem(Subsystem::plate(8, "ideal-b", 1.0, 1.0, 0.002, "ideal"))
        .unwrap();
    project
        .add_junction(Junction::line("ideal-edge", &[SubsystemId(7), SubsystemId(8)], 1.0))
        .unwrap();

    match solve(&project, &SolveConfig::default()) {
        Err(SeaError::Solve(SolveError::AllBandsFailed(report))) => {
            assert_eq!(report.len(), project.frequency_axis().len());
            for (band, err) in &report.failures {
                match err {
                    BandError::Singular(singular) => {
                        assert_eq!(singular.band, *band);
                        assert_eq!(singular.subsystems, vec![SubsystemId(7), SubsystemId(8)]);
                    }
                    other => panic!("unexpected failure {:?}", other),
                }
            }
        }
        other => panic!("expected singular bands, got {:?}", other.map(|r| r.band_count())),
    }
}

#[test]
fn test_cancelled_analysis() {
    let token = CancelToken::new();
    token.cancel();
    let err = solve_with_cancel(&room_and_wall(), &SolveConfig::default(), &token).unwrap_err();
    match err {
        SeaError::Solve(SolveError::AllBandsFailed(report)) => {
            assert!(report
                .failures
                .values()
                .all(|e| matches!(e, BandError::Cancelled { .. })));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

// === Results ===

#[test]
fn test_export_and_table() {
    let project = room_and_wall();
    let session = ProjectSession::new(project.clone());
    let result = session.solve(&SolveConfig::default()).unwrap();

    let doc = export(&result, &UnitConfig::default());
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["frequency"]["hz"].as_array().unwrap().len(), result.band_count());
    assert_eq!(json["subsystems"][0]["name"], "room1");

    let registry = SubsystemRegistry::from_project(&project).unwrap();
    let table = ResultTable::build(&result, &registry);
    let pair = table.pair(SubsystemId(1), SubsystemId(2)).unwrap();
    assert_eq!(pair.level_difference.len(), result.band_count());
}
