//! Multi-band SEA analysis
//!
//! Every band is assembled and solved on its own. Bands share nothing but
//! read-only views of the project and its subsystem registry, so they run on
//! the rayon pool when `parallel` is set and are merged back by band index.

pub mod assembler;
pub mod band;
pub mod session;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coupling;
use crate::error::{BandError, BandFailureReport, Result, SolveError};
use crate::model::Project;
use crate::results::{table, AnalysisResult, BandMatrix, SubsystemInfo};
use crate::subsystems::SubsystemRegistry;

pub use assembler::{load_power, BandSystem, PowerBalanceAssembler};
pub use band::{solve_band, BandOutcome, BandSolution};
pub use session::ProjectSession;

/// Recognized solve options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveConfig {
    /// Solve bands on worker threads
    pub parallel: bool,
    /// Relative dissipation / pivot size below which a band is singular
    pub singularity_tolerance: f64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            singularity_tolerance: 1e-12,
        }
    }
}

impl SolveConfig {
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Coarse cancellation of a running analysis
///
/// Bands that have not started when the token fires are skipped and
/// reported as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-band output before merging
struct BandRecord {
    modal_density: Vec<f64>,
    modal_overlap: Vec<f64>,
    outcome: BandOutcome,
    matrix: Option<BandMatrix>,
    levels: Vec<Option<f64>>,
}

/// Solve the power balance of `project` in every band
pub fn solve(project: &Project, config: &SolveConfig) -> Result<AnalysisResult> {
    solve_with_cancel(project, config, &CancelToken::new())
}

/// Like [`solve`], stopping early once `cancel` fires
pub fn solve_with_cancel(
    project: &Project,
    config: &SolveConfig,
    cancel: &CancelToken,
) -> Result<AnalysisResult> {
    if project.subsystems().is_empty() {
        return Err(SolveError::EmptyProject.into());
    }

    let registry = SubsystemRegistry::from_project(project)?;
    let assembler = PowerBalanceAssembler::new(project, &registry);
    let axis = project.frequency_axis();
    let ids = registry.ids();

    info!(
        "Solving '{}': {} subsystem(s), {} junction(s), {} band(s){}",
        project.metadata().name,
        registry.len(),
        project.junctions().len(),
        axis.len(),
        if config.parallel { " in parallel" } else { "" }
    );

    let run = |band: usize| -> BandRecord {
        let frequency = axis.centers()[band];
        let (modal_density, modal_overlap) = assembler.modal_properties(frequency);
        let (outcome, matrix) = if cancel.is_cancelled() {
            (Err(BandError::Cancelled { band }), None)
        } else {
            match assembler.assemble(band, frequency) {
                Ok(system) => {
                    let outcome = solve_band(&system, &ids, config.singularity_tolerance);
                    let matrix = BandMatrix {
                        matrix: system.matrix,
                        couplings: system.couplings,
                    };
                    (outcome, Some(matrix))
                }
                Err(err) => {
                    warn!("band {} ({:.1} Hz): {}", band, frequency, err);
                    let failure = BandError::Assembly {
                        band,
                        code: err.error_code(),
                        message: err.to_string(),
                    };
                    (Err(failure), None)
                }
            }
        };
        let levels = match &outcome {
            Ok(solution) => registry
                .iter()
                .zip(&solution.energy)
                .map(|(system, &energy)| table::level_of(system, energy))
                .collect(),
            Err(_) => vec![None; ids.len()],
        };
        BandRecord {
            modal_density,
            modal_overlap,
            outcome,
            matrix,
            levels,
        }
    };

    let records: Vec<BandRecord> = if config.parallel {
        (0..axis.len()).into_par_iter().map(&run).collect()
    } else {
        (0..axis.len()).map(&run).collect()
    };

    let mut report = BandFailureReport::default();
    for (band, record) in records.iter().enumerate() {
        if let Err(err) = &record.outcome {
            report.failures.insert(band, err.clone());
        }
    }
    if report.len() == records.len() {
        return Err(SolveError::AllBandsFailed(report).into());
    }
    if !report.is_empty() {
        warn!("{} of {} band(s) failed: {}", report.len(), records.len(), report);
    }

    let subsystems = project
        .subsystems()
        .iter()
        .map(SubsystemInfo::from_subsystem)
        .collect();
    let pairs = project
        .junctions()
        .iter()
        .flat_map(coupling::coupled_pairs)
        .collect();

    let mut bands = Vec::with_capacity(records.len());
    let mut modal_density = Vec::with_capacity(records.len());
    let mut modal_overlap = Vec::with_capacity(records.len());
    let mut matrices = Vec::with_capacity(records.len());
    let mut levels = Vec::with_capacity(records.len());
    for record in records {
        bands.push(record.outcome);
        modal_density.push(record.modal_density);
        modal_overlap.push(record.modal_overlap);
        matrices.push(record.matrix);
        levels.push(record.levels);
    }

    info!(
        "Analysis of '{}' finished: {} band(s) solved",
        project.metadata().name,
        bands.len() - report.len()
    );

    Ok(AnalysisResult::new(
        axis.clone(),
        subsystems,
        bands,
        modal_density,
        modal_overlap,
        pairs,
    )
    .with_topology(project.junctions().to_vec(), project.loads().to_vec())
    .with_band_details(matrices, levels))
}
