//! Junction / Coupling Model
//!
//! Turns a junction and the physical subsystems it references into coupling
//! loss factors for one frequency. Each pair is evaluated in one direction
//! and the reverse factor follows from `n_i η_ij = n_j η_ji`.

mod area;
mod line;
mod point;

use log::trace;

use crate::error::{Result, SeaError, ValidationError};
use crate::model::{Junction, JunctionKind, SubsystemId, SubsystemKind};
use crate::subsystems::{PhysicalSubsystem, SubsystemRegistry, WaveSystem};

pub use area::{mass_law_transmission, radiation_loss_factor};
pub use line::bending_transmission;

/// Energy transfer from `source` into `receiver`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingLossFactor {
    pub source: SubsystemId,
    pub receiver: SubsystemId,
    pub eta: f64,
}

/// Loss into something outside the model, added to a subsystem's damping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dissipation {
    pub subsystem: SubsystemId,
    pub eta: f64,
}

/// Everything one junction contributes at one frequency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JunctionCouplings {
    pub transfers: Vec<CouplingLossFactor>,
    pub sinks: Vec<Dissipation>,
}

impl JunctionCouplings {
    /// Record `eta_ab` and its reciprocal
    fn push_pair(&mut self, a: &dyn WaveSystem, b: &dyn WaveSystem, eta_ab: f64, frequency: f64) {
        let eta_ba = a.modal_density(frequency) * eta_ab / b.modal_density(frequency);
        self.transfers.push(CouplingLossFactor {
            source: a.id(),
            receiver: b.id(),
            eta: eta_ab,
        });
        self.transfers.push(CouplingLossFactor {
            source: b.id(),
            receiver: a.id(),
            eta: eta_ba,
        });
    }

    /// Coupling loss factor from `source` to `receiver`, if coupled
    pub fn eta(&self, source: SubsystemId, receiver: SubsystemId) -> Option<f64> {
        self.transfers
            .iter()
            .find(|t| t.source == source && t.receiver == receiver)
            .map(|t| t.eta)
    }
}

fn unsupported(junction: &Junction, reason: &str) -> SeaError {
    SeaError::UnsupportedJunction {
        junction: junction.name.clone(),
        reason: reason.to_string(),
    }
}

/// Check that a coupling model exists for `junction` joining `kinds`
///
/// `kinds` lists the member kinds in junction order.
pub fn check_supported(junction: &Junction, kinds: &[SubsystemKind]) -> Result<()> {
    let count = |kind: SubsystemKind| kinds.iter().filter(|k| **k == kind).count();
    let (plates, beams, cavities) = (
        count(SubsystemKind::Plate),
        count(SubsystemKind::Beam),
        count(SubsystemKind::Cavity),
    );

    match junction.kind {
        JunctionKind::Area => {
            if beams > 0 {
                return Err(unsupported(junction, "area junctions cannot involve beams"));
            }
            if cavities == 0 {
                return Err(unsupported(junction, "area junctions need at least one cavity"));
            }
            if kinds.len() == 3 && !(plates == 1 && cavities == 2) {
                return Err(unsupported(
                    junction,
                    "three-member area junctions must be cavity-plate-cavity",
                ));
            }
        }
        JunctionKind::Line => {
            if plates != kinds.len() {
                return Err(unsupported(junction, "line junctions connect plates only"));
            }
        }
        JunctionKind::Point => {
            if cavities > 0 {
                return Err(unsupported(junction, "point junctions connect structures only"));
            }
        }
        JunctionKind::SemiInfinite => {
            if kinds != [SubsystemKind::Plate, SubsystemKind::Cavity] {
                return Err(unsupported(
                    junction,
                    "semi-infinite junctions take exactly a plate then a cavity",
                ));
            }
        }
    }
    Ok(())
}

/// Coupling and sink loss factors of `junction` at `frequency`
pub fn junction_couplings(
    junction: &Junction,
    registry: &SubsystemRegistry,
    frequency: f64,
) -> Result<JunctionCouplings> {
    let members = junction
        .systems
        .iter()
        .map(|id| registry.get(*id).ok_or(ValidationError::UnknownSubsystem(*id)))
        .collect::<std::result::Result<Vec<&PhysicalSubsystem>, _>>()?;
    let kinds: Vec<SubsystemKind> = members.iter().map(|m| m.kind()).collect();
    check_supported(junction, &kinds)?;

    let mut couplings = JunctionCouplings::default();
    match junction.kind {
        JunctionKind::Area => area::couple(junction, &members, frequency, &mut couplings)?,
        JunctionKind::Line => line::couple(junction, &members, frequency, &mut couplings)?,
        JunctionKind::Point => point::couple(junction, &members, frequency, &mut couplings)?,
        JunctionKind::SemiInfinite => match members.as_slice() {
            [PhysicalSubsystem::Plate(plate), PhysicalSubsystem::Cavity(fluid)] => {
                let area = junction.area.unwrap_or_else(|| plate.area());
                couplings.sinks.push(Dissipation {
                    subsystem: plate.id,
                    eta: radiation_loss_factor(plate, fluid, area, frequency),
                });
            }
            _ => {
                return Err(unsupported(
                    junction,
                    "semi-infinite junctions take exactly a plate then a cavity",
                ))
            }
        },
    }

    trace!(
        "junction '{}' at {:.1} Hz: {} transfer(s), {} sink(s)",
        junction.name,
        frequency,
        couplings.transfers.len(),
        couplings.sinks.len()
    );
    Ok(couplings)
}

/// Unordered subsystem pairs exchanging energy through `junction`
pub fn coupled_pairs(junction: &Junction) -> Vec<(SubsystemId, SubsystemId)> {
    if junction.kind == JunctionKind::SemiInfinite {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    for (i, a) in junction.systems.iter().enumerate() {
        for b in &junction.systems[i + 1..] {
            pairs.push((*a, *b));
        }
    }
    pairs
}
