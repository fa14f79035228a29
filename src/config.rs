use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CABLES_FILE, DEFAULT_CONFIG_FILE, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE,
    DEFAULT_TRACKING_AMOUNT,
};
use crate::error::{PackerError, Result};
use crate::pipeline::processing::packaging::CapacityTables;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub files: FilesConfig,
    pub capacity: CapacityTables,
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Normalized order table
    pub input: PathBuf,
    /// Merged shipment table
    pub output: PathBuf,
    /// Single-column list of cable item codes
    pub cables: PathBuf,
    /// Optional JSON review report
    pub report: Option<PathBuf>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            cables: PathBuf::from(DEFAULT_CABLES_FILE),
            report: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Order amount from which untracked orders are sent tracked
    pub tracking_amount: f64,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            tracking_amount: DEFAULT_TRACKING_AMOUNT,
        }
    }
}

impl Config {
    /// Loads `path`, or `packer.toml` in the working directory when no path is given.
    /// A missing default file yields the built-in defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            PackerError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.capacity.validate()?;
        Ok(config)
    }
}
