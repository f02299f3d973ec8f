//! Bending-wave coupling of plates along a shared edge

use std::f64::consts::PI;

use super::{unsupported, JunctionCouplings};
use crate::error::Result;
use crate::model::Junction;
use crate::subsystems::{angular, PhysicalSubsystem, PlateSystem, WaveSystem};

/// Diffuse-field bending transmission from `source` into `receiver`
///
/// `theta` is the angle between the two plates. Uses the wavenumber ratio
/// χ = k₁/k₂ and the stiffness ratio ψ = D₂k₂²/(D₁k₁²).
pub fn bending_transmission(
    source: &PlateSystem,
    receiver: &PlateSystem,
    theta: f64,
    frequency: f64,
) -> f64 {
    let k1 = source.bending_wavenumber(frequency);
    let k2 = receiver.bending_wavenumber(frequency);
    let chi = k1 / k2;
    let psi = receiver.bending_stiffness() * k2 * k2 / (source.bending_stiffness() * k1 * k1);
    let mismatch = (chi.sqrt() + 1.0 / chi.sqrt()) * (psi.sqrt() + 1.0 / psi.sqrt()) / 4.0;
    (0.5 * theta).sin().powi(2) / (mismatch * mismatch)
}

fn line_loss_factor(
    source: &PlateSystem,
    receiver: &PlateSystem,
    length: f64,
    theta: f64,
    frequency: f64,
) -> f64 {
    let tau = bending_transmission(source, receiver, theta, frequency);
    source.group_velocity(frequency) * length * tau / (PI * angular(frequency) * source.area())
}

pub(super) fn couple(
    junction: &Junction,
    members: &[&PhysicalSubsystem],
    frequency: f64,
    out: &mut JunctionCouplings,
) -> Result<()> {
    let plates = members
        .iter()
        .map(|m| {
            m.as_plate()
                .ok_or_else(|| unsupported(junction, "line junctions connect plates only"))
        })
        .collect::<Result<Vec<&PlateSystem>>>()?;

    let length = match junction.length {
        Some(length) => length,
        None => plates
            .iter()
            .map(|p| p.min_edge())
            .fold(f64::INFINITY, f64::min),
    };
    let angles = junction.member_angles();
    if angles.len() != plates.len() {
        return Err(unsupported(junction, "one angle is needed per plate"));
    }

    for i in 0..plates.len() {
        for j in i + 1..plates.len() {
            let theta = angles[j] - angles[i];
            let eta = line_loss_factor(plates[i], plates[j], length, theta, frequency);
            out.push_pair(plates[i], plates[j], eta, frequency);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubsystemId;
    use approx::assert_relative_eq;

    fn plate(id: u32, thickness: f64) -> PlateSystem {
        PlateSystem {
            id: SubsystemId(id),
            lx: 3.0,
            ly: 2.0,
            thickness,
            density: 2400.0,
            youngs_modulus: 30e9,
            poisson_ratio: 0.2,
            loss_factor: 0.02,
        }
    }

    #[test]
    fn test_identical_plates() {
        let (a, b) = (plate(1, 0.1), plate(2, 0.1));
        assert_relative_eq!(bending_transmission(&a, &b, PI, 500.0), 1.0, max_relative = 1e-12);
        assert_relative_eq!(
            bending_transmission(&a, &b, PI / 2.0, 500.0),
            0.5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_mismatch_reduces_transmission() {
        let (thin, thick) = (plate(1, 0.05), plate(2, 0.2));
        let matched = bending_transmission(&thin, &plate(3, 0.05), PI / 2.0, 1000.0);
        let mismatched = bending_transmission(&thin, &thick, PI / 2.0, 1000.0);
        assert!(mismatched < matched);
        // τ depends on the pair, not the direction
        assert_relative_eq!(
            mismatched,
            bending_transmission(&thick, &thin, PI / 2.0, 1000.0),
            max_relative = 1e-12
        );
    }
}
