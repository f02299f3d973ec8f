//! Power Balance Assembler
//!
//! Builds the loss-factor matrix `L` and input power vector `P` of one band.
//! Row `i` reads `n_i (η_i + Σ_j η_ij) E_i − Σ_j n_i η_ij E_j = P_i`, with
//! subsystems in project order.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use crate::coupling::{self, JunctionCouplings};
use crate::error::Result;
use crate::library::AIR_SPEED_OF_SOUND;
use crate::model::{Load, LoadKind, Project};
use crate::subsystems::{PhysicalSubsystem, SubsystemRegistry, WaveSystem};

/// Power balance of a single band
#[derive(Debug, Clone)]
pub struct BandSystem {
    pub band: usize,
    pub frequency: f64,
    pub matrix: DMatrix<f64>,
    pub input_power: DVector<f64>,
    /// `n_i` per subsystem
    pub modal_density: Vec<f64>,
    /// Internal loss per subsystem, external sinks included
    pub loss_factor: Vec<f64>,
    /// Matrix index pairs with a non-zero coupling
    pub edges: Vec<(usize, usize)>,
    /// Contribution of every junction, in project order
    pub couplings: Vec<JunctionCouplings>,
}

impl BandSystem {
    /// Energy leaving subsystem `i` through damping and sinks, `n_i η_i`
    pub fn dissipation(&self, i: usize) -> f64 {
        self.modal_density[i] * self.loss_factor[i]
    }
}

/// Input power of `load` on `system` at `frequency`
pub fn load_power(load: &Load, system: &PhysicalSubsystem, frequency: f64) -> f64 {
    let magnitude = load.magnitude_at(frequency);
    match load.kind {
        LoadKind::Power => magnitude,
        LoadKind::Force => system
            .drive_point_mobility(frequency)
            .map_or(0.0, |y| magnitude * magnitude * y.re),
        LoadKind::Pressure => match system.as_plate() {
            Some(plate) => {
                let c0 = AIR_SPEED_OF_SOUND;
                let sigma = plate.radiation_efficiency(frequency, c0);
                magnitude * magnitude * c0 * c0 * sigma * plate.modal_density(frequency)
                    / (4.0 * PI * frequency * frequency * plate.mass_per_area())
            }
            None => 0.0,
        },
    }
}

pub struct PowerBalanceAssembler<'a> {
    project: &'a Project,
    registry: &'a SubsystemRegistry,
}

impl<'a> PowerBalanceAssembler<'a> {
    pub fn new(project: &'a Project, registry: &'a SubsystemRegistry) -> Self {
        Self { project, registry }
    }

    pub fn registry(&self) -> &SubsystemRegistry {
        self.registry
    }

    /// Modal density and modal overlap of every subsystem at `frequency`
    pub fn modal_properties(&self, frequency: f64) -> (Vec<f64>, Vec<f64>) {
        self.registry
            .iter()
            .map(|s| (s.modal_density(frequency), s.modal_overlap(frequency)))
            .unzip()
    }

    pub fn assemble(&self, band: usize, frequency: f64) -> Result<BandSystem> {
        let size = self.registry.len();
        let modal_density: Vec<f64> = self
            .registry
            .iter()
            .map(|s| s.modal_density(frequency))
            .collect();
        let mut loss_factor: Vec<f64> = self
            .registry
            .iter()
            .map(|s| s.loss_factor(frequency))
            .collect();
        let mut matrix = DMatrix::zeros(size, size);
        let mut edges = Vec::new();
        let mut junction_couplings = Vec::with_capacity(self.project.junctions().len());

        for junction in self.project.junctions() {
            let couplings = coupling::junction_couplings(junction, self.registry, frequency)?;
            for sink in &couplings.sinks {
                if let Some(i) = self.registry.index_of(sink.subsystem) {
                    loss_factor[i] += sink.eta;
                }
            }
            for transfer in &couplings.transfers {
                let (Some(i), Some(j)) = (
                    self.registry.index_of(transfer.source),
                    self.registry.index_of(transfer.receiver),
                ) else {
                    continue;
                };
                let flow = modal_density[i] * transfer.eta;
                matrix[(i, i)] += flow;
                matrix[(i, j)] -= flow;
                if transfer.eta > 0.0 {
                    edges.push((i, j));
                }
            }
            junction_couplings.push(couplings);
        }

        for i in 0..size {
            matrix[(i, i)] += modal_density[i] * loss_factor[i];
        }

        let mut input_power = DVector::zeros(size);
        for load in self.project.loads() {
            if let (Some(i), Some(system)) = (
                self.registry.index_of(load.target),
                self.registry.get(load.target),
            ) {
                input_power[i] += load_power(load, system, frequency);
            }
        }

        Ok(BandSystem {
            band,
            frequency,
            matrix,
            input_power,
            modal_density,
            loss_factor,
            edges,
            couplings: junction_couplings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Junction, Material, Subsystem, SubsystemId};
    use approx::assert_relative_eq;

    fn project() -> Project {
        let mut project = Project::new();
        project
            .add_material(Material::fluid("air", 1.21, 343.0, 0.0))
            .unwrap();
        project
            .add_material(Material::solid("concrete", 2400.0, 30e9, 0.2, 0.03))
            .unwrap();
        project
            .add_subsystem(Subsystem::cavity(1, "room1", 3.0, 4.0, 2.5, "air").with_damping(0.01))
            .unwrap();
        project
            .add_subsystem(Subsystem::plate(2, "wall", 4.0, 2.5, 0.1, "concrete"))
            .unwrap();
        project
            .add_subsystem(Subsystem::cavity(3, "isolated", 2.0, 2.0, 2.0, "air").with_damping(0.02))
            .unwrap();
        project
            .add_junction(Junction::area("wall-room1", &[SubsystemId(2), SubsystemId(1)]))
            .unwrap();
        project
            .add_load(Load::power("speaker", SubsystemId(1), 0.001))
            .unwrap();
        project
            .add_load(Load::power("shaped", SubsystemId(1), 0.002).with_spectrum(&[(100.0, 0.0), (300.0, 1.0)]))
            .unwrap();
        project
    }

    #[test]
    fn test_matrix_structure() {
        let project = project();
        let registry = SubsystemRegistry::from_project(&project).unwrap();
        let system = PowerBalanceAssembler::new(&project, &registry)
            .assemble(0, 200.0)
            .unwrap();
        let l = &system.matrix;

        // Reciprocity makes L symmetric
        assert_relative_eq!(l[(0, 1)], l[(1, 0)], max_relative = 1e-9);
        assert!(l[(0, 1)] < 0.0);
        // Rows sum to the dissipation term
        for i in 0..2 {
            let row: f64 = (0..3).map(|j| l[(i, j)]).sum();
            assert_relative_eq!(row, system.dissipation(i), max_relative = 1e-9);
        }
        // Unconnected subsystem is an isolated diagonal block
        assert_eq!(l[(2, 0)], 0.0);
        assert_eq!(l[(0, 2)], 0.0);
        assert_relative_eq!(l[(2, 2)], system.dissipation(2));
        assert_eq!(system.edges.len(), 2);
    }

    #[test]
    fn test_input_power_sums_shaped_loads() {
        let project = project();
        let registry = SubsystemRegistry::from_project(&project).unwrap();
        let assembler = PowerBalanceAssembler::new(&project, &registry);
        // Shaped load is at half weight midway between its points
        let system = assembler.assemble(0, 200.0).unwrap();
        assert_relative_eq!(system.input_power[0], 0.001 + 0.001, max_relative = 1e-12);
        assert_eq!(system.input_power[1], 0.0);
        // Below the first point the shape holds its first factor
        let system = assembler.assemble(0, 50.0).unwrap();
        assert_relative_eq!(system.input_power[0], 0.001, max_relative = 1e-12);
    }

    #[test]
    fn test_force_and_pressure_power() {
        let project = project();
        let registry = SubsystemRegistry::from_project(&project).unwrap();
        let wall = registry.get(SubsystemId(2)).unwrap();
        let f = 500.0;

        let force = Load::force("shaker", SubsystemId(2), 2.0);
        let y = wall.drive_point_mobility(f).unwrap();
        assert_relative_eq!(load_power(&force, wall, f), 4.0 * y.re, max_relative = 1e-12);

        let weak = load_power(&Load::pressure("p", SubsystemId(2), 1.0), wall, f);
        let strong = load_power(&Load::pressure("p", SubsystemId(2), 2.0), wall, f);
        assert!(weak > 0.0);
        assert_relative_eq!(strong, 4.0 * weak, max_relative = 1e-12);
    }
}
