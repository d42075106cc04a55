//! Configuration for the test data manager.

use crate::error::{Result, TdmError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "tdm.toml";

/// Environment variable selecting the test environment.
pub const ENV_VAR_ENVIRONMENT: &str = "TEST_ENV";

/// Environment variable sharing one run id across harness processes.
pub const ENV_VAR_RUN_ID: &str = "TDM_RUN_ID";

/// Project-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Static data document layout.
    #[serde(default)]
    pub data: DataConfig,

    /// Durable tier configuration.
    #[serde(default)]
    pub durable: DurableConfig,

    /// Run defaults.
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from `<root>/tdm.toml`.
    ///
    /// A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| TdmError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| TdmError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to `<root>/tdm.toml`.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        let content = self.to_toml()?;
        fs::write(&path, content)
            .map_err(|e| TdmError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Renders the configuration as `tdm.toml` content.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TdmError::ConfigError(format!("failed to serialize config: {}", e)))
    }

    /// Environment to use: `TEST_ENV` if set and non-empty, else the configured default.
    pub fn environment(&self) -> String {
        crate::context::environment_or(&self.run.environment)
    }

    /// Absolute directory holding the per-feature data documents.
    pub fn features_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.data.features_dir)
    }

    /// Absolute directory holding durable run files.
    pub fn results_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.durable.results_dir)
    }
}

/// Static data document layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory (relative to the project root) containing one folder per feature.
    pub features_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("features"),
        }
    }
}

/// Durable tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurableConfig {
    /// Directory (relative to the project root) for `persistent-data-*.json` files.
    pub results_dir: PathBuf,

    /// How concurrent writers to the same run file are handled.
    #[serde(default)]
    pub write_mode: WriteMode,

    /// What `store_data` does when the durable write fails.
    #[serde(default)]
    pub on_write_failure: WriteFailurePolicy,
}

impl Default for DurableConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("test-results"),
            write_mode: WriteMode::default(),
            on_write_failure: WriteFailurePolicy::default(),
        }
    }
}

/// Run defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    /// Environment used when `TEST_ENV` is unset (default: "qa").
    pub environment: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            environment: crate::context::DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

/// Concurrency mode for durable file writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Whole-file read-modify-write without locking.
    ///
    /// Concurrent writers from different scenarios may lose each other's
    /// updates; the last whole-file write wins.
    #[default]
    LastWriteWins,

    /// Read-modify-write under an exclusive advisory lock on a sidecar file.
    Locked,
}

/// Behaviour of `store_data` when the durable write fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WriteFailurePolicy {
    /// Log a warning and report `StoreOutcome::NotPersisted`.
    #[default]
    Warn,

    /// Return `TdmError::Persist` to the caller.
    Fail,
}
