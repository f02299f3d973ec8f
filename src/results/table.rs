//! Level tables derived from an analysis

use serde::{Deserialize, Serialize};

use super::AnalysisResult;
use crate::model::{SubsystemId, SubsystemKind};
use crate::subsystems::{CavitySystem, PhysicalSubsystem, SubsystemRegistry, WaveSystem};

/// Reference RMS pressure, 20 µPa
pub const P_REF: f64 = 2e-5;

/// Reference RMS velocity, 1 nm/s
pub const V_REF: f64 = 1e-9;

/// Sound pressure level in dB of a diffuse field holding `energy`
pub fn sound_pressure_level(cavity: &CavitySystem, energy: f64) -> Option<f64> {
    decibels(cavity.mean_square_pressure(energy) / (P_REF * P_REF))
}

/// Spatially averaged velocity level in dB of a structure of `mass` kg
pub fn velocity_level(mass: f64, energy: f64) -> Option<f64> {
    decibels(energy / mass / (V_REF * V_REF))
}

fn decibels(ratio: f64) -> Option<f64> {
    (ratio > 0.0 && ratio.is_finite()).then(|| 10.0 * ratio.log10())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    /// dB re 20 µPa
    SoundPressure,
    /// dB re 1 nm/s
    Velocity,
}

/// All per-band quantities of one subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemSeries {
    pub id: SubsystemId,
    pub name: String,
    pub kind: SubsystemKind,
    pub level_kind: LevelKind,
    pub energy: Vec<Option<f64>>,
    pub modal_energy: Vec<Option<f64>>,
    pub level: Vec<Option<f64>>,
}

/// Modal energy level difference `10 log10(e_source / e_receiver)` per band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRatio {
    pub source: SubsystemId,
    pub receiver: SubsystemId,
    pub level_difference: Vec<Option<f64>>,
}

/// Subsystem × band table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub frequencies: Vec<f64>,
    pub subsystems: Vec<SubsystemSeries>,
    pub pairs: Vec<PairRatio>,
}

impl ResultTable {
    /// Derive levels and pair ratios; `registry` must come from the solved project
    pub fn build(result: &AnalysisResult, registry: &SubsystemRegistry) -> Self {
        let bands = result.band_count();
        let subsystems = result
            .subsystems()
            .iter()
            .filter_map(|info| {
                let system = registry.get(info.id)?;
                let energy = result.energies(info.id);
                let modal_energy = (0..bands).map(|b| result.modal_energy(info.id, b)).collect();
                let level = energy
                    .iter()
                    .map(|e| e.and_then(|e| level_of(system, e)))
                    .collect();
                Some(SubsystemSeries {
                    id: info.id,
                    name: info.name.clone(),
                    kind: info.kind,
                    level_kind: info.level_kind,
                    energy,
                    modal_energy,
                    level,
                })
            })
            .collect();

        let pairs = result
            .pairs()
            .iter()
            .map(|&(source, receiver)| PairRatio {
                source,
                receiver,
                level_difference: (0..bands)
                    .map(|b| {
                        let ratio =
                            result.modal_energy(source, b)? / result.modal_energy(receiver, b)?;
                        decibels(ratio)
                    })
                    .collect(),
            })
            .collect();

        Self {
            frequencies: result.frequency_axis().centers().to_vec(),
            subsystems,
            pairs,
        }
    }

    pub fn series(&self, id: SubsystemId) -> Option<&SubsystemSeries> {
        self.subsystems.iter().find(|s| s.id == id)
    }

    pub fn pair(&self, source: SubsystemId, receiver: SubsystemId) -> Option<&PairRatio> {
        self.pairs
            .iter()
            .find(|p| p.source == source && p.receiver == receiver)
    }
}

/// Level of `system` holding `energy`, by its kind
pub(crate) fn level_of(system: &PhysicalSubsystem, energy: f64) -> Option<f64> {
    match system {
        PhysicalSubsystem::Cavity(cavity) => sound_pressure_level(cavity, energy),
        _ => velocity_level(system.mass(), energy),
    }
}
