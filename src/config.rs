use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Configuration for an sshaudit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input log configuration
    pub input: InputConfig,
    /// Classification and detection thresholds
    pub detection: DetectionConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Input log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the auth log to analyze
    pub file_path: PathBuf,
    /// Process tag identifying the SSH daemon
    pub daemon_tag: String,
}

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Brute-force window length in seconds (inclusive span)
    pub window_seconds: i64,
    /// Failed attempts within one window needed for a finding
    pub attempt_threshold: usize,
    /// Username used for suspicious connections with no user in the message
    pub placeholder_username: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "json" (pretty) or "compact"
    pub format: String,
    /// Security events JSON array
    pub events_path: PathBuf,
    /// Brute-force findings JSON array
    pub bruteforce_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            file_path: PathBuf::from("/data/auth.log"),
            daemon_tag: "sshd".to_string(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            window_seconds: 600,
            attempt_threshold: 5,
            placeholder_username: "unknown".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "json".to_string(),
            events_path: PathBuf::from("/output/ssh_security_events.json"),
            bruteforce_path: PathBuf::from("/output/ssh_bruteforce_attacks.json"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: InputConfig::default(),
            detection: DetectionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}
