//! Results Aggregator
//!
//! `AnalysisResult` is created once per solve and only read afterwards.
//! Tables of levels and pair ratios are derived from it on demand.

pub mod export;
pub mod table;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::coupling::JunctionCouplings;
use crate::error::{BandError, BandFailureReport};
use crate::frequency::FrequencyAxis;
use crate::model::{Junction, Load, Subsystem, SubsystemId, SubsystemKind};
use crate::solver::{BandOutcome, BandSolution};

pub use export::{
    export, write_csv, EnergyUnit, ExportDocument, JunctionExport, LevelExport, LoadExport,
    PowerUnit, SeaMatrixExport, UnitConfig,
};
pub use table::{
    sound_pressure_level, velocity_level, LevelKind, PairRatio, ResultTable, SubsystemSeries,
    P_REF, V_REF,
};

/// Identity of a solved subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemInfo {
    pub id: SubsystemId,
    pub name: String,
    pub kind: SubsystemKind,
    pub level_kind: LevelKind,
}

impl SubsystemInfo {
    pub fn from_subsystem(subsystem: &Subsystem) -> Self {
        let kind = subsystem.kind();
        Self {
            id: subsystem.id,
            name: subsystem.name.clone(),
            kind,
            level_kind: match kind {
                SubsystemKind::Cavity => LevelKind::SoundPressure,
                _ => LevelKind::Velocity,
            },
        }
    }
}

/// Assembled power balance of one band
#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix {
    /// Loss-factor matrix `L`, subsystems in project order
    pub matrix: DMatrix<f64>,
    /// Contribution of every junction, in project order
    pub couplings: Vec<JunctionCouplings>,
}

/// Energies of every subsystem in every band
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    frequency_axis: FrequencyAxis,
    subsystems: Vec<SubsystemInfo>,
    bands: Vec<BandOutcome>,
    /// `[band][subsystem]`
    modal_density: Vec<Vec<f64>>,
    /// `[band][subsystem]`
    modal_overlap: Vec<Vec<f64>>,
    pairs: Vec<(SubsystemId, SubsystemId)>,
    junctions: Vec<Junction>,
    loads: Vec<Load>,
    /// `None` where the band was never assembled
    matrices: Vec<Option<BandMatrix>>,
    /// `[band][subsystem]` in dB
    levels: Vec<Vec<Option<f64>>>,
}

impl AnalysisResult {
    pub(crate) fn new(
        frequency_axis: FrequencyAxis,
        subsystems: Vec<SubsystemInfo>,
        bands: Vec<BandOutcome>,
        modal_density: Vec<Vec<f64>>,
        modal_overlap: Vec<Vec<f64>>,
        pairs: Vec<(SubsystemId, SubsystemId)>,
    ) -> Self {
        let band_count = bands.len();
        Self {
            frequency_axis,
            subsystems,
            bands,
            modal_density,
            modal_overlap,
            pairs,
            junctions: Vec::new(),
            loads: Vec::new(),
            matrices: vec![None; band_count],
            levels: Vec::new(),
        }
    }

    /// Attach the analyzed junctions and loads
    pub(crate) fn with_topology(mut self, junctions: Vec<Junction>, loads: Vec<Load>) -> Self {
        self.junctions = junctions;
        self.loads = loads;
        self
    }

    /// Attach per-band matrices and levels, both indexed by band
    pub(crate) fn with_band_details(
        mut self,
        matrices: Vec<Option<BandMatrix>>,
        levels: Vec<Vec<Option<f64>>>,
    ) -> Self {
        self.matrices = matrices;
        self.levels = levels;
        self
    }

    pub fn frequency_axis(&self) -> &FrequencyAxis {
        &self.frequency_axis
    }

    pub fn subsystems(&self) -> &[SubsystemInfo] {
        &self.subsystems
    }

    /// Outcome of every band, in axis order
    pub fn bands(&self) -> &[BandOutcome] {
        &self.bands
    }

    /// Coupled pairs of the analyzed topology
    pub fn pairs(&self) -> &[(SubsystemId, SubsystemId)] {
        &self.pairs
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Column of `id` in per-band vectors
    pub fn index_of(&self, id: SubsystemId) -> Option<usize> {
        self.subsystems.iter().position(|s| s.id == id)
    }

    pub fn solution(&self, band: usize) -> Option<&BandSolution> {
        self.bands.get(band)?.as_ref().ok()
    }

    pub fn band_error(&self, band: usize) -> Option<&BandError> {
        self.bands.get(band)?.as_ref().err()
    }

    /// Failed bands keyed by band index
    pub fn failures(&self) -> BandFailureReport {
        let mut report = BandFailureReport::default();
        for (band, outcome) in self.bands.iter().enumerate() {
            if let Err(err) = outcome {
                report.failures.insert(band, err.clone());
            }
        }
        report
    }

    pub fn is_complete(&self) -> bool {
        self.bands.iter().all(|b| b.is_ok())
    }

    /// Energy of `id` in `band` in J; `None` for failed bands
    pub fn energy(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let i = self.index_of(id)?;
        self.solution(band)?.energy.get(i).copied()
    }

    /// Energy of `id` across all bands
    pub fn energies(&self, id: SubsystemId) -> Vec<Option<f64>> {
        (0..self.bands.len()).map(|b| self.energy(id, b)).collect()
    }

    pub fn input_power(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let i = self.index_of(id)?;
        self.solution(band)?.input_power.get(i).copied()
    }

    pub fn modal_density(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let i = self.index_of(id)?;
        self.modal_density.get(band)?.get(i).copied()
    }

    pub fn modal_overlap(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let i = self.index_of(id)?;
        self.modal_overlap.get(band)?.get(i).copied()
    }

    /// Energy per mode, `E / n`
    pub fn modal_energy(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let n = self.modal_density(id, band)?;
        Some(self.energy(id, band)? / n)
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn band_matrix(&self, band: usize) -> Option<&BandMatrix> {
        self.matrices.get(band)?.as_ref()
    }

    /// Coupling loss factor of junction `name` from `source` to `receiver`
    pub fn coupling_loss_factor(
        &self,
        name: &str,
        source: SubsystemId,
        receiver: SubsystemId,
        band: usize,
    ) -> Option<f64> {
        let index = self.junctions.iter().position(|j| j.name == name)?;
        self.band_matrix(band)?
            .couplings
            .get(index)?
            .eta(source, receiver)
    }

    /// Sound pressure level of a cavity or velocity level of a structure, in dB
    pub fn level(&self, id: SubsystemId, band: usize) -> Option<f64> {
        let i = self.index_of(id)?;
        *self.levels.get(band)?.get(i)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SingularSystemError;

    fn result() -> AnalysisResult {
        let axis = crate::frequency::AxisSpec::octave(100.0, 300.0).build().unwrap();
        assert_eq!(axis.len(), 2);
        let subsystems = vec![
            SubsystemInfo {
                id: SubsystemId(5),
                name: "room".to_string(),
                kind: SubsystemKind::Cavity,
                level_kind: LevelKind::SoundPressure,
            },
            SubsystemInfo {
                id: SubsystemId(9),
                name: "wall".to_string(),
                kind: SubsystemKind::Plate,
                level_kind: LevelKind::Velocity,
            },
        ];
        let bands = vec![
            Ok(BandSolution {
                energy: vec![2.0, 0.5],
                input_power: vec![1e-3, 0.0],
                negative: vec![],
            }),
            Err(BandError::Singular(SingularSystemError {
                band: 1,
                frequency: 250.0,
                subsystems: vec![SubsystemId(9)],
            })),
        ];
        AnalysisResult::new(
            axis,
            subsystems,
            bands,
            vec![vec![4.0, 0.25], vec![8.0, 0.25]],
            vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            vec![(SubsystemId(5), SubsystemId(9))],
        )
    }

    #[test]
    fn test_lookup_by_id() {
        let result = result();
        assert_eq!(result.energy(SubsystemId(9), 0), Some(0.5));
        assert_eq!(result.modal_energy(SubsystemId(5), 0), Some(0.5));
        assert_eq!(result.input_power(SubsystemId(5), 0), Some(1e-3));
        assert_eq!(result.modal_overlap(SubsystemId(9), 1), Some(0.4));
        assert_eq!(result.energy(SubsystemId(1), 0), None);
    }

    #[test]
    fn test_failed_band_is_marked() {
        let result = result();
        assert!(!result.is_complete());
        assert_eq!(result.energies(SubsystemId(5)), vec![Some(2.0), None]);
        // Modal properties do not depend on the solve
        assert_eq!(result.modal_density(SubsystemId(5), 1), Some(8.0));
        let failures = result.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.failures[&1].error_code(), "SINGULAR_SYSTEM");
        assert_eq!(result.band_error(1).unwrap().subsystems(), &[SubsystemId(9)]);
        // Nothing attached yet
        assert!(result.band_matrix(0).is_none());
        assert_eq!(result.level(SubsystemId(5), 0), None);
    }
}
