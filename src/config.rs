//! Engine configuration file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frequency::{AxisSpec, FrequencyAxis};
use crate::results::UnitConfig;
use crate::solver::SolveConfig;

/// Settings shared by the CLI and embedding applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub solver: SolveConfig,
    pub export: UnitConfig,
    /// Axis given to new projects
    pub frequency: AxisSpec,
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolveConfig::default(),
            export: UnitConfig::default(),
            frequency: AxisSpec::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.frequency_axis()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Axis described by `frequency`
    pub fn frequency_axis(&self) -> Result<FrequencyAxis> {
        self.frequency.build()
    }
}
