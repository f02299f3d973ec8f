//! Export document for consumers outside the engine

use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnalysisResult, LevelKind};
use crate::error::Result;
use crate::model::{JunctionKind, LoadKind, SubsystemId, SubsystemKind};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[default]
    #[serde(rename = "J")]
    Joule,
    #[serde(rename = "mJ")]
    Millijoule,
}

impl EnergyUnit {
    /// Multiplier from J to this unit
    pub fn scale(&self) -> f64 {
        match self {
            EnergyUnit::Joule => 1.0,
            EnergyUnit::Millijoule => 1e3,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            EnergyUnit::Joule => "J",
            EnergyUnit::Millijoule => "mJ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUnit {
    #[default]
    #[serde(rename = "W")]
    Watt,
    #[serde(rename = "mW")]
    Milliwatt,
}

impl PowerUnit {
    /// Multiplier from W to this unit
    pub fn scale(&self) -> f64 {
        match self {
            PowerUnit::Watt => 1.0,
            PowerUnit::Milliwatt => 1e3,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PowerUnit::Watt => "W",
            PowerUnit::Milliwatt => "mW",
        }
    }
}

/// Units used in an export document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitConfig {
    pub energy: EnergyUnit,
    pub power: PowerUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub analysis_type: String,
    pub format_version: String,
    pub units: UnitConfig,
    pub generated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyExport {
    pub hz: Vec<f64>,
    pub rad_s: Vec<f64>,
}

/// Per-band series of one subsystem; failed bands are `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemExport {
    pub id: SubsystemId,
    pub name: String,
    pub kind: SubsystemKind,
    pub energy: Vec<Option<f64>>,
    pub input_power: Vec<Option<f64>>,
    pub modal_density: Vec<Option<f64>>,
    pub modal_overlap: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureExport {
    pub band: usize,
    pub frequency: f64,
    pub code: String,
    pub message: String,
    pub subsystems: Vec<SubsystemId>,
}

/// Junction geometry with its coupling loss factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionExport {
    pub name: String,
    pub kind: JunctionKind,
    pub systems: Vec<SubsystemId>,
    pub area: Option<f64>,
    pub length: Option<f64>,
    pub angles: Option<Vec<f64>>,
    /// `[band][i][j]` from member `i` into member `j`; `null` for unassembled bands
    pub coupling_loss_factor: Vec<Option<Vec<Vec<f64>>>>,
}

/// Loss-factor matrix of every band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeaMatrixExport {
    /// `[band][row][column]`; `null` for unassembled bands
    pub matrix: Vec<Option<Vec<Vec<f64>>>>,
    pub frequency: Vec<f64>,
    pub system_ids: Vec<SubsystemId>,
    pub system_types: Vec<SubsystemKind>,
}

/// A load and its magnitude per band
///
/// Power loads use the document's power unit; forces and pressures stay in N and Pa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadExport {
    pub name: String,
    pub kind: LoadKind,
    pub target: SubsystemId,
    pub spectrum: Vec<f64>,
}

/// Level series of one subsystem in dB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelExport {
    pub id: SubsystemId,
    pub level_kind: LevelKind,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub frequency: FrequencyExport,
    pub subsystems: Vec<SubsystemExport>,
    pub junctions: Vec<JunctionExport>,
    pub sea_matrix: SeaMatrixExport,
    pub loads: Vec<LoadExport>,
    pub result: Vec<LevelExport>,
    pub failures: Vec<FailureExport>,
}

/// Structured export of `result` in `units`
pub fn export(result: &AnalysisResult, units: &UnitConfig) -> ExportDocument {
    let axis = result.frequency_axis();
    let bands = result.band_count();
    let (energy_scale, power_scale) = (units.energy.scale(), units.power.scale());

    let subsystems = result
        .subsystems()
        .iter()
        .map(|info| {
            let series = |f: &dyn Fn(usize) -> Option<f64>| (0..bands).map(f).collect::<Vec<_>>();
            SubsystemExport {
                id: info.id,
                name: info.name.clone(),
                kind: info.kind,
                energy: series(&|b| result.energy(info.id, b).map(|e| e * energy_scale)),
                input_power: series(&|b| result.input_power(info.id, b).map(|p| p * power_scale)),
                modal_density: series(&|b| result.modal_density(info.id, b)),
                modal_overlap: series(&|b| result.modal_overlap(info.id, b)),
            }
        })
        .collect();

    let junctions = result
        .junctions()
        .iter()
        .enumerate()
        .map(|(index, junction)| JunctionExport {
            name: junction.name.clone(),
            kind: junction.kind,
            systems: junction.systems.clone(),
            area: junction.area,
            length: junction.length,
            angles: junction.angles.clone(),
            coupling_loss_factor: (0..bands)
                .map(|b| {
                    let couplings = result.band_matrix(b)?.couplings.get(index)?;
                    let rows = junction
                        .systems
                        .iter()
                        .map(|&source| {
                            junction
                                .systems
                                .iter()
                                .map(|&receiver| couplings.eta(source, receiver).unwrap_or(0.0))
                                .collect()
                        })
                        .collect();
                    Some(rows)
                })
                .collect(),
        })
        .collect();

    let sea_matrix = SeaMatrixExport {
        matrix: (0..bands)
            .map(|b| {
                let matrix = &result.band_matrix(b)?.matrix;
                Some(
                    matrix
                        .row_iter()
                        .map(|row| row.iter().copied().collect())
                        .collect(),
                )
            })
            .collect(),
        frequency: axis.centers().to_vec(),
        system_ids: result.subsystems().iter().map(|s| s.id).collect(),
        system_types: result.subsystems().iter().map(|s| s.kind).collect(),
    };

    let loads = result
        .loads()
        .iter()
        .map(|load| {
            let scale = match load.kind {
                LoadKind::Power => power_scale,
                LoadKind::Force | LoadKind::Pressure => 1.0,
            };
            LoadExport {
                name: load.name.clone(),
                kind: load.kind,
                target: load.target,
                spectrum: axis
                    .centers()
                    .iter()
                    .map(|&f| load.magnitude_at(f) * scale)
                    .collect(),
            }
        })
        .collect();

    let levels = result
        .subsystems()
        .iter()
        .map(|info| LevelExport {
            id: info.id,
            level_kind: info.level_kind,
            data: (0..bands).map(|b| result.level(info.id, b)).collect(),
        })
        .collect();

    let failures = result
        .failures()
        .failures
        .into_iter()
        .map(|(band, err)| FailureExport {
            band,
            frequency: axis.centers().get(band).copied().unwrap_or_default(),
            code: err.error_code().to_string(),
            message: err.to_string(),
            subsystems: err.subsystems().to_vec(),
        })
        .collect();

    ExportDocument {
        metadata: ExportMetadata {
            analysis_type: "SEA".to_string(),
            format_version: EXPORT_FORMAT_VERSION.to_string(),
            units: *units,
            generated: Utc::now(),
        },
        frequency: FrequencyExport {
            hz: axis.centers().to_vec(),
            rad_s: axis.angular(),
        },
        subsystems,
        junctions,
        sea_matrix,
        loads,
        result: levels,
        failures,
    }
}

/// Write one row per band: frequency, then energy, input power and level per subsystem
///
/// Failed bands leave their energy, power and level cells empty.
pub fn write_csv<W: io::Write>(result: &AnalysisResult, units: &UnitConfig, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["frequency_hz".to_string()];
    for info in result.subsystems() {
        header.push(format!("energy_{}_{}", info.id, units.energy.symbol()));
        header.push(format!("input_power_{}_{}", info.id, units.power.symbol()));
        header.push(format!("level_{}_db", info.id));
    }
    csv.write_record(&header)?;

    let cell = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    for (band, frequency) in result.frequency_axis().centers().iter().enumerate() {
        let mut row = vec![frequency.to_string()];
        for info in result.subsystems() {
            row.push(cell(result.energy(info.id, band).map(|e| e * units.energy.scale())));
            row.push(cell(result.input_power(info.id, band).map(|p| p * units.power.scale())));
            row.push(cell(result.level(info.id, band)));
        }
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}
