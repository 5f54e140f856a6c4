//! Configuration for the demo driver
//!
//! Loads settings from `config/demo.json` or creates default if missing

use anyhow::{Context, Result};
use netcode::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Logging verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Drones spawned and pushed onto the roster at startup
    pub spawn_count: usize,

    /// Position for the inserted drone
    pub insert_index: usize,

    /// Position removed with `remove_at`
    pub remove_index: usize,

    /// Position overwritten with a fresh drone
    pub value_index: usize,

    /// Drones at or below this battery level are recalled
    pub recall_battery: u32,

    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            spawn_count: 5,
            insert_index: 1,
            remove_index: 0,
            value_index: 2,
            recall_battery: 20,
            registry: RegistryConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from the default path, or create default if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: DemoConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        Path::new("config").join("demo.json")
    }
}
