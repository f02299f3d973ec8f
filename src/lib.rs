//! SEA Engine - Statistical Energy Analysis of coupled vibro-acoustic systems
//!
//! Plates, beams and acoustic cavities are joined by junctions and driven by
//! loads. For every frequency band the engine solves the power balance for
//! the steady-state energy of each subsystem.
//!
//! # Architecture
//!
//! - `model`: project document (materials, subsystems, junctions, loads)
//! - `subsystems`: modal density and damping per subsystem kind
//! - `coupling`: coupling loss factors per junction kind
//! - `solver`: per-band assembly and solution, run across bands in parallel
//! - `results`: levels, pair ratios and export documents

pub mod api;
pub mod cli;
pub mod config;
pub mod coupling;
pub mod error;
pub mod frequency;
pub mod library;
pub mod model;
pub mod results;
pub mod solver;
pub mod subsystems;
pub mod templates;

pub use error::{Result, SeaError, SolveError, ValidationError};
pub use frequency::{AxisSpec, BandSpacing, FrequencyAxis};
pub use model::{Junction, JunctionKind, Load, LoadKind, Material, Project, Subsystem, SubsystemId};
pub use results::AnalysisResult;
pub use solver::{solve, SolveConfig};
