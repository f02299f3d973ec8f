//! Structures joined at a single point

use super::{unsupported, JunctionCouplings};
use crate::error::Result;
use crate::model::Junction;
use crate::subsystems::{angular, Mobility, PhysicalSubsystem, WaveSystem};

/// η_ij = Re(Y_j) / (ω M_i |ΣY|²) over all members meeting at the point
pub(super) fn couple(
    junction: &Junction,
    members: &[&PhysicalSubsystem],
    frequency: f64,
    out: &mut JunctionCouplings,
) -> Result<()> {
    let mobilities = members
        .iter()
        .map(|m| {
            m.drive_point_mobility(frequency)
                .ok_or_else(|| unsupported(junction, "point junctions connect structures only"))
        })
        .collect::<Result<Vec<Mobility>>>()?;
    let total = mobilities.iter().sum::<Mobility>().norm_sqr();
    let omega = angular(frequency);

    for i in 0..members.len() {
        for j in i + 1..members.len() {
            let eta = mobilities[j].re / (omega * members[i].mass() * total);
            out.push_pair(members[i], members[j], eta, frequency);
        }
    }
    Ok(())
}
