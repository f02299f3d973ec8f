//! Band Solver
//!
//! Solves `L E = P` for a single band. A band with no dissipation path is
//! reported with the subsystems responsible instead of producing garbage.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::assembler::BandSystem;
use crate::error::{BandError, SingularSystemError};
use crate::model::SubsystemId;

/// Energies of one successfully solved band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSolution {
    /// Energy per subsystem in J, project order
    pub energy: Vec<f64>,
    /// Injected power per subsystem in W
    pub input_power: Vec<f64>,
    /// Subsystems that came out with negative energy
    pub negative: Vec<SubsystemId>,
}

/// Either the band's energies or why it has none
pub type BandOutcome = std::result::Result<BandSolution, BandError>;

/// Groups of matrix indices connected by couplings
fn components(system: &BandSystem) -> Vec<Vec<usize>> {
    let size = system.modal_density.len();
    let mut adjacency = vec![Vec::new(); size];
    for &(i, j) in &system.edges {
        adjacency[i].push(j);
        adjacency[j].push(i);
    }

    let mut seen = vec![false; size];
    let mut groups = Vec::new();
    for start in 0..size {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut stack = vec![start];
        let mut group = Vec::new();
        while let Some(i) = stack.pop() {
            group.push(i);
            for &j in &adjacency[i] {
                if !seen[j] {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}

/// Indices of subsystems whose coupled group cannot shed energy
fn undamped(system: &BandSystem, tolerance: f64) -> Vec<usize> {
    let scale: f64 = system.matrix.diagonal().iter().map(|v| v.abs()).sum();
    let mut blamed: Vec<usize> = components(system)
        .into_iter()
        .filter(|group| {
            let dissipation: f64 = group.iter().map(|&i| system.dissipation(i)).sum();
            !(dissipation > tolerance * scale)
        })
        .flatten()
        .collect();
    blamed.sort_unstable();
    blamed
}

/// Indices of every coupled group that contains one of `rows`
fn groups_containing(system: &BandSystem, rows: &[usize]) -> Vec<usize> {
    let mut blamed: Vec<usize> = components(system)
        .into_iter()
        .filter(|group| group.iter().any(|i| rows.contains(i)))
        .flatten()
        .collect();
    blamed.sort_unstable();
    blamed
}

/// Solve one band
///
/// `ids` maps matrix rows back to subsystem ids.
pub fn solve_band(system: &BandSystem, ids: &[SubsystemId], tolerance: f64) -> BandOutcome {
    let singular = |rows: Vec<usize>| -> BandError {
        let err = SingularSystemError {
            band: system.band,
            frequency: system.frequency,
            subsystems: rows.into_iter().map(|i| ids[i]).collect(),
        };
        warn!("{}", err);
        BandError::Singular(err)
    };

    let blamed = undamped(system, tolerance);
    if !blamed.is_empty() {
        return Err(singular(blamed));
    }

    let lu = system.matrix.clone().lu();
    let pivots: Vec<f64> = lu.u().diagonal().iter().map(|v| v.abs()).collect();
    let largest = pivots.iter().copied().fold(0.0, f64::max);
    // Row pivoting only, so pivot k belongs to the energy of subsystem k
    let weak: Vec<usize> = pivots
        .iter()
        .enumerate()
        .filter(|(_, pivot)| !(**pivot > tolerance * largest))
        .map(|(k, _)| k)
        .collect();
    if !weak.is_empty() {
        return Err(singular(groups_containing(system, &weak)));
    }

    let energy = match lu.solve(&system.input_power) {
        Some(energy) => energy,
        None => return Err(singular((0..ids.len()).collect())),
    };

    let negative: Vec<SubsystemId> = energy
        .iter()
        .zip(ids)
        .filter(|(e, _)| **e < 0.0)
        .map(|(_, id)| *id)
        .collect();
    if !negative.is_empty() {
        warn!(
            "band {} ({:.1} Hz): negative energy for subsystem(s) {:?}",
            system.band, system.frequency, negative
        );
    }
    debug!(
        "band {} ({:.1} Hz) solved, total energy {:.3e} J",
        system.band,
        system.frequency,
        energy.iter().sum::<f64>()
    );

    Ok(BandSolution {
        energy: energy.iter().copied().collect(),
        input_power: system.input_power.iter().copied().collect(),
        negative,
    })
}
