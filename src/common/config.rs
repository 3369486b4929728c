//! Configuration file handling

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How playbooks are invoked
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Settings for invoking the external tool
#[derive(Debug, Deserialize, Clone)]
pub struct RunnerConfig {
    /// Executable run for every prebuild and scenario, resolved via PATH
    #[serde(default = "default_program")]
    pub program: String,

    /// Default per-scenario timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of scenarios running at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Variables added on top of the inherited environment
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout(),
            jobs: default_jobs(),
            env: default_env(),
        }
    }
}

fn default_program() -> String {
    "ansible-playbook".to_string()
}

fn default_timeout() -> u64 {
    1800
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn default_env() -> BTreeMap<String, String> {
    BTreeMap::from([("ANSIBLE_FORCE_COLOR".to_string(), "1".to_string())])
}

impl RunnerConfig {
    /// Default timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings that would make every run fail or hang
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(super::Error::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(super::Error::Config("jobs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.runner.validate()?;
        Ok(config)
    }

    /// Look up the configured program on PATH
    ///
    /// A missing program is only reported here; each scenario still gets
    /// its own execution error when the launch fails.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        match which::which(&self.runner.program) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(program = %self.runner.program, "Program not found on PATH: {}", e);
                None
            }
        }
    }
}
