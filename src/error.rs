//! Error handling for the SEA engine
//!
//! Construction-time errors are returned before an entity enters a project.
//! Solve-time errors are collected per frequency band.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::SubsystemId;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SeaError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum SeaError {
    #[error("Invalid frequency range: {reason}")]
    InvalidRange { reason: String },

    #[error("Invalid geometry for subsystem {subsystem}: {reason}")]
    InvalidGeometry { subsystem: String, reason: String },

    #[error("Unsupported junction '{junction}': {reason}")]
    UnsupportedJunction { junction: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    SingularSystem(#[from] SingularSystemError),

    #[error("Solve failed: {0}")]
    Solve(#[from] SolveError),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SeaError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SeaError::InvalidRange { .. } => "INVALID_RANGE",
            SeaError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            SeaError::UnsupportedJunction { .. } => "UNSUPPORTED_JUNCTION",
            SeaError::Validation(inner) => inner.error_code(),
            SeaError::SingularSystem(_) => "SINGULAR_SYSTEM",
            SeaError::Solve(inner) => inner.error_code(),
            SeaError::Io(_) => "IO_ERROR",
            SeaError::Serialization(_) => "SERIALIZATION_ERROR",
            SeaError::Csv(_) => "CSV_ERROR",
        }
    }

    /// Check if the caller can fix this error by changing its input and retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            SeaError::InvalidRange { .. }
            | SeaError::InvalidGeometry { .. }
            | SeaError::UnsupportedJunction { .. }
            | SeaError::Validation(_)
            | SeaError::SingularSystem(_) => true,
            SeaError::Solve(inner) => !matches!(inner, SolveError::EmptyProject),
            SeaError::Io(_) | SeaError::Serialization(_) | SeaError::Csv(_) => false,
        }
    }
}

/// Referential-integrity and entity-shape failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown subsystem id {0}")]
    UnknownSubsystem(SubsystemId),

    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("subsystem id {0} already exists")]
    DuplicateSubsystem(SubsystemId),

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("junction '{junction}' connects {count} subsystems (expected 2 or 3)")]
    MemberCount { junction: String, count: usize },

    #[error("junction '{junction}' lists subsystem {id} more than once")]
    RepeatedMember { junction: String, id: SubsystemId },

    #[error("{entity} is still referenced by {}", dependents.join(", "))]
    InUse {
        entity: String,
        dependents: Vec<String>,
    },

    #[error("invalid material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },

    #[error("invalid junction '{name}': {reason}")]
    InvalidJunction { name: String, reason: String },

    #[error("invalid load '{name}': {reason}")]
    InvalidLoad { name: String, reason: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

impl ValidationError {
    /// Get the error code for this validation failure
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::UnknownSubsystem(_) => "UNKNOWN_SUBSYSTEM",
            ValidationError::UnknownMaterial(_) => "UNKNOWN_MATERIAL",
            ValidationError::DuplicateSubsystem(_) => "DUPLICATE_SUBSYSTEM",
            ValidationError::DuplicateName { .. } => "DUPLICATE_NAME",
            ValidationError::MemberCount { .. } => "JUNCTION_MEMBER_COUNT",
            ValidationError::RepeatedMember { .. } => "JUNCTION_REPEATED_MEMBER",
            ValidationError::InUse { .. } => "ENTITY_IN_USE",
            ValidationError::InvalidMaterial { .. } => "INVALID_MATERIAL",
            ValidationError::InvalidJunction { .. } => "INVALID_JUNCTION",
            ValidationError::InvalidLoad { .. } => "INVALID_LOAD",
            ValidationError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

/// A band whose power balance has no dissipation path
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "singular power balance at band {band} ({frequency:.1} Hz): no dissipation path for subsystem(s) {}",
    format_ids(subsystems)
)]
pub struct SingularSystemError {
    pub band: usize,
    pub frequency: f64,
    pub subsystems: Vec<SubsystemId>,
}

fn format_ids(ids: &[SubsystemId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a single band produced no energies
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandError {
    #[error(transparent)]
    Singular(#[from] SingularSystemError),

    #[error("band {band} skipped after cancellation")]
    Cancelled { band: usize },

    /// The band's power balance could not be built
    #[error("band {band} could not be assembled: {message}")]
    Assembly {
        band: usize,
        code: &'static str,
        message: String,
    },
}

impl BandError {
    pub fn error_code(&self) -> &'static str {
        match self {
            BandError::Singular(_) => "SINGULAR_SYSTEM",
            BandError::Cancelled { .. } => "CANCELLED",
            BandError::Assembly { code, .. } => *code,
        }
    }

    /// Subsystems blamed for the failure (empty unless singular)
    pub fn subsystems(&self) -> &[SubsystemId] {
        match self {
            BandError::Singular(err) => &err.subsystems,
            BandError::Cancelled { .. } | BandError::Assembly { .. } => &[],
        }
    }
}

/// Per-band failures of one analysis, keyed by band index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandFailureReport {
    pub failures: BTreeMap<usize, BandError>,
}

impl BandFailureReport {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

impl std::fmt::Display for BandFailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} band(s) failed", self.failures.len())?;
        for (band, err) in &self.failures {
            write!(f, "; [{}] {}", band, err)?;
        }
        Ok(())
    }
}

/// Failure of a whole analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("project has no subsystems to analyze")]
    EmptyProject,

    #[error("every band failed: {0}")]
    AllBandsFailed(BandFailureReport),
}

impl SolveError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SolveError::EmptyProject => "EMPTY_PROJECT",
            SolveError::AllBandsFailed(_) => "ALL_BANDS_FAILED",
        }
    }
}
