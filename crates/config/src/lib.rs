//! Ditto Configuration Management
//!
//! Loads engine options from a plain `key = value` text file.

use ditto_core::DittoError;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for DittoError {
    fn from(err: ConfigError) -> Self {
        DittoError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Default options file looked up by the runner
pub const DEFAULT_CONFIG_FILE: &str = "ditto.txt";

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Root folder for script and behaviour resources (from "data_path")
    pub data_path: PathBuf,
    /// Behaviour resource, relative to `data_path` (from "behaviours")
    pub behaviours: PathBuf,
    /// Default log filter (from "log_level")
    pub log_level: String,
    /// Game frames per second (from "tick_rate")
    pub tick_rate: u32,
    /// Where compiled scripts dump their AST and command listing (from "dump_dir")
    pub dump_dir: Option<PathBuf>,
    /// Upper bound on ticks the runner waits for a script (from "max_ticks")
    pub max_ticks: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data"),
            behaviours: PathBuf::from("behaviours.json"),
            log_level: "info".into(),
            tick_rate: 30,
            dump_dir: None,
            max_ticks: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse options file content
    ///
    /// Unknown keys are logged and ignored; malformed numbers are errors.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                config.parse_option(key, value)?;
            }
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_path" => self.data_path = value.into(),
            "behaviours" => self.behaviours = value.into(),
            "log_level" => self.log_level = value.into(),
            "tick_rate" => {
                self.tick_rate = parse_number(key, value)?;
                if self.tick_rate == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.into(),
                        value: value.into(),
                    });
                }
            }
            "dump_dir" => {
                self.dump_dir = if value.is_empty() {
                    None
                } else {
                    Some(value.into())
                };
            }
            "max_ticks" => self.max_ticks = parse_number(key, value)?,
            _ => {
                tracing::debug!("Unknown config option: {} = {}", key, value);
            }
        }

        Ok(())
    }

    /// Full path of the behaviour resource
    pub fn behaviours_path(&self) -> PathBuf {
        self.data_path.join(&self.behaviours)
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Engine configuration:");
        tracing::info!("    Data path: {}", self.data_path.display());
        tracing::info!("    Behaviours: {}", self.behaviours_path().display());
        tracing::info!("    Tick rate: {} fps", self.tick_rate);
        tracing::info!("    Max ticks: {}", self.max_ticks);
        match &self.dump_dir {
            Some(dir) => tracing::info!("    Dump dir: {}", dir.display()),
            None => tracing::info!("    Dump dir: (disabled)"),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.into(),
        value: value.into(),
    })
}
