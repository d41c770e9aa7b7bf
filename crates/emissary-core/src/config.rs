use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// Process configuration. Always passed in explicitly — nothing in the core
/// reads module or spool locations from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Directory scanned for module executables at start-up.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,

    /// Root of the status spool for non-blocking requests.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    /// Sampling interval used when polling the spool for completion.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_modules_dir() -> PathBuf {
    PathBuf::from("modules")
}

fn default_spool_dir() -> PathBuf {
    std::env::temp_dir().join("emissary")
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            modules_dir: default_modules_dir(),
            spool_dir: default_spool_dir(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AgentConfig {
    /// Read configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Load `path` if given, else the default config file when present,
    /// else built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let fallback = Path::new(paths::DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
