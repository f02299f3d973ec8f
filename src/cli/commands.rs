//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs::{self, File};
use std::path::Path;

use log::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::library::{list_materials, standard_material};
use crate::model::{Elasticity, Project};
use crate::results::{export, write_csv};
use crate::solver::solve;
use crate::templates::build_template;

fn load_config(config: Option<&Path>) -> Result<EngineConfig> {
    match config {
        Some(config_path) => EngineConfig::from_file(config_path),
        None => Ok(EngineConfig::default()),
    }
}

/// Write an empty project.
pub fn new_project(path: &Path, name: Option<&str>, config: Option<&Path>) -> Result<()> {
    info!("Creating new project at: {}", path.display());

    let engine = load_config(config)?;
    let mut project = Project::named(name.unwrap_or("untitled"));
    project.set_frequency_axis(engine.frequency_axis()?);
    project.save(path)?;

    println!("Project created: {}", path.display());
    println!("Project id: {}", project.metadata().id);

    Ok(())
}

/// Write a project populated from a named template.
pub fn template_project(kind: &str, path: &Path, config: Option<&Path>) -> Result<()> {
    info!("Building '{}' template at: {}", kind, path.display());

    let engine = load_config(config)?;
    let model = build_template(kind)?;
    let mut project = Project::named(kind);
    project.set_frequency_axis(engine.frequency_axis()?);
    project.insert_template(&model)?;
    project.save(path)?;

    println!(
        "Project created: {} ({} subsystems, {} junctions)",
        path.display(),
        project.subsystems().len(),
        project.junctions().len()
    );
    if project.loads().is_empty() {
        println!("No loads defined yet; add one before solving.");
    }

    Ok(())
}

/// Solve a project and write the export document.
pub fn solve_project(
    path: &Path,
    config: Option<&Path>,
    serial: bool,
    out: Option<&Path>,
    csv: Option<&Path>,
) -> Result<()> {
    let mut engine = load_config(config)?;
    if serial {
        engine.solver.parallel = false;
    }

    let project = Project::load(path)?;
    let result = solve(&project, &engine.solver)?;

    let failures = result.failures();
    if !failures.is_empty() {
        warn!("{}", failures);
    }

    let document = export(&result, &engine.export);
    let json = serde_json::to_string_pretty(&document)?;
    match out {
        Some(out_path) => {
            fs::write(out_path, json)?;
            println!("Results written: {}", out_path.display());
        }
        None => println!("{}", json),
    }

    if let Some(csv_path) = csv {
        write_csv(&result, &engine.export, File::create(csv_path)?)?;
        info!("CSV table written: {}", csv_path.display());
    }

    Ok(())
}

/// Print the geometry projection of a project.
pub fn print_geometry(path: &Path) -> Result<()> {
    let project = Project::load(path)?;

    let json = serde_json::to_string_pretty(&project.geometry())?;
    println!("{}", json);

    Ok(())
}

/// List the standard materials.
pub fn print_materials() -> Result<()> {
    println!("{:<12} {:>10} {:>12} {:>8}", "name", "density", "E / c", "eta");
    println!("{:-<46}", "");

    for material in list_materials().into_iter().filter_map(standard_material) {
        let stiffness = match material.elasticity {
            Elasticity::Solid { youngs_modulus, .. } => format!("{:.1e} Pa", youngs_modulus),
            Elasticity::Fluid { speed_of_sound } => format!("{} m/s", speed_of_sound),
        };
        println!(
            "{:<12} {:>10} {:>12} {:>8}",
            material.name, material.density, stiffness, material.loss_factor
        );
    }

    Ok(())
}
