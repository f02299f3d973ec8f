//! Couplings through a shared surface

use std::f64::consts::PI;

use super::{unsupported, JunctionCouplings};
use crate::error::Result;
use crate::model::Junction;
use crate::subsystems::{angular, CavitySystem, PhysicalSubsystem, PlateSystem};

/// CLF from a plate into the fluid of `fluid` through `area`
///
/// η = ρ₀c₀ σ S / (ω m″ A_p)
pub fn radiation_loss_factor(
    plate: &PlateSystem,
    fluid: &CavitySystem,
    area: f64,
    frequency: f64,
) -> f64 {
    let sigma = plate.radiation_efficiency(frequency, fluid.speed_of_sound);
    fluid.impedance() * sigma * area / (angular(frequency) * plate.mass_per_area() * plate.area())
}

/// Non-resonant (mass-law) transmission through a plate in `fluid`
pub fn mass_law_transmission(plate: &PlateSystem, fluid: &CavitySystem, frequency: f64) -> f64 {
    let ratio = angular(frequency) * plate.mass_per_area() / (2.0 * fluid.impedance());
    1.0 / (1.0 + ratio * ratio)
}

/// Diffuse-field CLF out of `source` through `area` with transmission `tau`
fn cavity_transfer(source: &CavitySystem, area: f64, tau: f64, frequency: f64) -> f64 {
    source.speed_of_sound * area * tau / (8.0 * PI * frequency * source.volume)
}

pub(super) fn couple(
    junction: &Junction,
    members: &[&PhysicalSubsystem],
    frequency: f64,
    out: &mut JunctionCouplings,
) -> Result<()> {
    let plates: Vec<&PlateSystem> = members.iter().filter_map(|m| m.as_plate()).collect();
    let cavities: Vec<&CavitySystem> = members.iter().filter_map(|m| m.as_cavity()).collect();

    match (plates.as_slice(), cavities.as_slice()) {
        ([plate], [fluid]) => {
            let area = junction.area.unwrap_or_else(|| plate.area());
            let eta = radiation_loss_factor(plate, fluid, area, frequency);
            out.push_pair(*plate, *fluid, eta, frequency);
        }
        ([], [first, second]) => {
            let area = junction
                .area
                .ok_or_else(|| unsupported(junction, "cavity-to-cavity coupling needs a shared area"))?;
            let (z1, z2) = (first.impedance(), second.impedance());
            let tau = 4.0 * z1 * z2 / ((z1 + z2) * (z1 + z2));
            let eta = cavity_transfer(first, area, tau, frequency);
            out.push_pair(*first, *second, eta, frequency);
        }
        ([plate], [first, second]) => {
            let area = junction.area.unwrap_or_else(|| plate.area());
            for fluid in [first, second] {
                let eta = radiation_loss_factor(plate, fluid, area, frequency);
                out.push_pair(*plate, *fluid, eta, frequency);
            }
            let tau = mass_law_transmission(plate, first, frequency);
            let eta = cavity_transfer(first, area, tau, frequency);
            out.push_pair(*first, *second, eta, frequency);
        }
        _ => {
            return Err(unsupported(
                junction,
                "area junctions join a plate or cavity to cavities",
            ))
        }
    }
    Ok(())
}
