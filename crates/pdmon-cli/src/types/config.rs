use std::path::Path;

use pdmon_core::DetectorConfig;
use pdmon_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{ReplayError, Result};
use crate::imu::RawScale;

/// Configuration for a session replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Detector parameters (window, bands, references, freeze thresholds)
    pub detector: DetectorConfig,
    /// Scheduler periods and reporting options
    pub engine: EngineConfig,
    /// How the session file is interpreted
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub format: InputFormat,
    /// Register scale applied when `format` is `raw` or `register_dump`
    pub scale: RawScale,
}

/// Layout of the session file and units of its sensor values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Acceleration in g, angular rate in dps
    #[default]
    Physical,
    /// Signed 16-bit register counts
    Raw,
    /// Binary capture of 12-byte output register burst reads, no CSV
    RegisterDump,
}

impl MonitorConfig {
    /// Load and validate a YAML configuration. Every field may be omitted.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate().map_err(ReplayError::InvalidConfig)?;
        if self.engine.sample_period_ms == 0 || self.engine.analysis_period_ms == 0 {
            log::warn!(
                "zero scheduler period (sample {} ms, analysis {} ms) is clamped to 1 ms",
                self.engine.sample_period_ms,
                self.engine.analysis_period_ms
            );
        }
        Ok(())
    }
}
