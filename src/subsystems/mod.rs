//! Subsystem Registry
//!
//! Resolves project subsystems against their materials into physical wave
//! systems. Every system exposes modal density, wave speeds and damping as
//! pure functions of frequency (Hz).

mod beam;
mod cavity;
mod plate;

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::Complex;

pub use beam::BeamSystem;
pub use cavity::CavitySystem;
pub use plate::PlateSystem;

use crate::error::{Result, ValidationError};
use crate::model::{Elasticity, Geometry, Material, Project, Subsystem, SubsystemId, SubsystemKind};

/// Angular frequency of `frequency` Hz
pub fn angular(frequency: f64) -> f64 {
    2.0 * PI * frequency
}

/// Complex point mobility in m/(N·s)
pub type Mobility = Complex<f64>;

/// Frequency-dependent properties every SEA subsystem provides
pub trait WaveSystem {
    fn id(&self) -> SubsystemId;

    fn kind(&self) -> SubsystemKind;

    /// Modes per Hz, never negative
    fn modal_density(&self, frequency: f64) -> f64;

    /// Phase speed of the carried wave in m/s
    fn wave_speed(&self, frequency: f64) -> f64;

    /// Energy transport speed in m/s
    fn group_velocity(&self, frequency: f64) -> f64;

    /// Internal (damping plus absorption) loss factor
    fn loss_factor(&self, frequency: f64) -> f64;

    /// Total mass in kg
    fn mass(&self) -> f64;

    /// Modal overlap factor `f · η · n(f)`
    fn modal_overlap(&self, frequency: f64) -> f64 {
        frequency * self.loss_factor(frequency) * self.modal_density(frequency)
    }
}

/// A subsystem with its material folded in
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalSubsystem {
    Plate(PlateSystem),
    Beam(BeamSystem),
    Cavity(CavitySystem),
}

impl PhysicalSubsystem {
    /// Combine a subsystem record with its material
    pub fn resolve(subsystem: &Subsystem, material: &Material) -> Result<Self> {
        subsystem.geometry.validate(&subsystem.name)?;
        let own_loss = subsystem.damping_loss_factor;
        let mismatch = || ValidationError::InvalidMaterial {
            name: material.name.clone(),
            reason: format!("cannot build a {} from it", subsystem.kind()),
        };

        let resolved = match (subsystem.geometry, material.elasticity) {
            (
                Geometry::Plate { lx, ly, thickness },
                Elasticity::Solid {
                    youngs_modulus,
                    poisson_ratio,
                },
            ) => PhysicalSubsystem::Plate(PlateSystem {
                id: subsystem.id,
                lx,
                ly,
                thickness,
                density: material.density,
                youngs_modulus,
                poisson_ratio,
                loss_factor: own_loss.unwrap_or(material.loss_factor),
            }),
            (
                Geometry::Beam {
                    length,
                    width,
                    height,
                },
                Elasticity::Solid { youngs_modulus, .. },
            ) => PhysicalSubsystem::Beam(BeamSystem {
                id: subsystem.id,
                length,
                width,
                height,
                density: material.density,
                youngs_modulus,
                loss_factor: own_loss.unwrap_or(material.loss_factor),
            }),
            (geometry @ (Geometry::Cavity { .. } | Geometry::GeneralCavity { .. }), Elasticity::Fluid { speed_of_sound }) => {
                PhysicalSubsystem::Cavity(CavitySystem {
                    id: subsystem.id,
                    // Cavity geometries always report all three measures
                    volume: geometry.volume().unwrap_or_default(),
                    surface_area: geometry.surface_area().unwrap_or_default(),
                    edge_length: geometry.edge_length().unwrap_or_default(),
                    density: material.density,
                    speed_of_sound,
                    material_loss_factor: material.loss_factor,
                    damping_loss_factor: own_loss,
                    absorption_area: subsystem.absorption_area.unwrap_or(0.0),
                })
            }
            _ => return Err(mismatch().into()),
        };
        Ok(resolved)
    }

    pub fn as_plate(&self) -> Option<&PlateSystem> {
        match self {
            PhysicalSubsystem::Plate(plate) => Some(plate),
            _ => None,
        }
    }

    pub fn as_beam(&self) -> Option<&BeamSystem> {
        match self {
            PhysicalSubsystem::Beam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_cavity(&self) -> Option<&CavitySystem> {
        match self {
            PhysicalSubsystem::Cavity(cavity) => Some(cavity),
            _ => None,
        }
    }

    /// Infinite-system drive-point mobility of a structure
    pub fn drive_point_mobility(&self, frequency: f64) -> Option<Mobility> {
        match self {
            PhysicalSubsystem::Plate(plate) => Some(plate.drive_point_mobility()),
            PhysicalSubsystem::Beam(beam) => Some(beam.drive_point_mobility(frequency)),
            PhysicalSubsystem::Cavity(_) => None,
        }
    }

    fn inner(&self) -> &dyn WaveSystem {
        match self {
            PhysicalSubsystem::Plate(plate) => plate,
            PhysicalSubsystem::Beam(beam) => beam,
            PhysicalSubsystem::Cavity(cavity) => cavity,
        }
    }
}

impl WaveSystem for PhysicalSubsystem {
    fn id(&self) -> SubsystemId {
        self.inner().id()
    }

    fn kind(&self) -> SubsystemKind {
        self.inner().kind()
    }

    fn modal_density(&self, frequency: f64) -> f64 {
        self.inner().modal_density(frequency)
    }

    fn wave_speed(&self, frequency: f64) -> f64 {
        self.inner().wave_speed(frequency)
    }

    fn group_velocity(&self, frequency: f64) -> f64 {
        self.inner().group_velocity(frequency)
    }

    fn loss_factor(&self, frequency: f64) -> f64 {
        self.inner().loss_factor(frequency)
    }

    fn mass(&self) -> f64 {
        self.inner().mass()
    }
}

/// Physical subsystems of one project, in project order
#[derive(Debug, Clone)]
pub struct SubsystemRegistry {
    systems: Vec<PhysicalSubsystem>,
    names: Vec<String>,
    index: HashMap<SubsystemId, usize>,
}

impl SubsystemRegistry {
    pub fn from_project(project: &Project) -> Result<Self> {
        let mut systems = Vec::with_capacity(project.subsystems().len());
        let mut names = Vec::with_capacity(project.subsystems().len());
        let mut index = HashMap::new();

        for subsystem in project.subsystems() {
            let material = project
                .material(&subsystem.material)
                .ok_or_else(|| ValidationError::UnknownMaterial(subsystem.material.clone()))?;
            index.insert(subsystem.id, systems.len());
            systems.push(PhysicalSubsystem::resolve(subsystem, material)?);
            names.push(subsystem.name.clone());
        }

        Ok(Self {
            systems,
            names,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Matrix row of a subsystem
    pub fn index_of(&self, id: SubsystemId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, id: SubsystemId) -> Option<&PhysicalSubsystem> {
        self.index_of(id).map(|i| &self.systems[i])
    }

    pub fn name(&self, id: SubsystemId) -> Option<&str> {
        self.index_of(id).map(|i| self.names[i].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicalSubsystem> {
        self.systems.iter()
    }

    pub fn ids(&self) -> Vec<SubsystemId> {
        self.systems.iter().map(|s| s.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn concrete() -> Material {
        Material::solid("concrete", 2400.0, 30e9, 0.2, 0.03)
    }

    fn air() -> Material {
        Material::fluid("air", 1.21, 343.0, 0.0)
    }

    #[test]
    fn test_resolve_applies_override() {
        let wall = Subsystem::plate(1, "wall", 4.0, 2.5, 0.1, "concrete").with_damping(0.05);
        let system = PhysicalSubsystem::resolve(&wall, &concrete()).unwrap();
        assert_relative_eq!(system.loss_factor(500.0), 0.05);

        let wall = Subsystem::plate(1, "wall", 4.0, 2.5, 0.1, "concrete");
        let system = PhysicalSubsystem::resolve(&wall, &concrete()).unwrap();
        assert_relative_eq!(system.loss_factor(500.0), 0.03);
    }

    #[test]
    fn test_resolve_rejects_mismatched_material() {
        let wall = Subsystem::plate(1, "wall", 4.0, 2.5, 0.1, "air");
        assert!(PhysicalSubsystem::resolve(&wall, &air()).is_err());
    }

    #[test]
    fn test_modal_density_consistent_with_mobility() {
        // n(f) = 4 M Re(Y) for infinite-system drive-point mobilities
        let wall = Subsystem::plate(1, "wall", 4.0, 2.5, 0.1, "concrete");
        let plate = PhysicalSubsystem::resolve(&wall, &concrete()).unwrap();
        let beam = Subsystem::beam(2, "joist", 3.0, 0.1, 0.2, "concrete");
        let beam = PhysicalSubsystem::resolve(&beam, &concrete()).unwrap();
        for f in [100.0, 1000.0, 4000.0] {
            for system in [&plate, &beam] {
                let y = system.drive_point_mobility(f).unwrap();
                assert_relative_eq!(
                    system.modal_density(f),
                    4.0 * system.mass() * y.re,
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_modal_overlap() {
        let room = Subsystem::cavity(1, "room", 3.0, 4.0, 2.5, "air").with_damping(0.01);
        let room = PhysicalSubsystem::resolve(&room, &air()).unwrap();
        let f = 1000.0;
        assert_relative_eq!(
            room.modal_overlap(f),
            f * 0.01 * room.modal_density(f),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_registry_order_and_lookup() {
        let mut project = Project::new();
        project.add_material(air()).unwrap();
        project.add_material(concrete()).unwrap();
        project
            .add_subsystem(Subsystem::plate(7, "wall", 4.0, 2.5, 0.1, "concrete"))
            .unwrap();
        project
            .add_subsystem(Subsystem::cavity(3, "room", 3.0, 4.0, 2.5, "air"))
            .unwrap();

        let registry = SubsystemRegistry::from_project(&project).unwrap();
        assert_eq!(registry.ids(), vec![SubsystemId(7), SubsystemId(3)]);
        assert_eq!(registry.index_of(SubsystemId(3)), Some(1));
        assert_eq!(registry.name(SubsystemId(7)), Some("wall"));
        assert!(registry.get(SubsystemId(3)).unwrap().as_cavity().is_some());
    }
}
