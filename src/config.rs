use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::OutputFormat;
use crate::logging::LogConfig;
use crate::report::RaceDistance;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,

    /// Calculator tables
    #[serde(default)]
    pub calculator: CalculatorSettings,

    /// Logging setup
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Output format used when `--format` is not given
    pub output_format: OutputFormat,

    /// Evaluate training groups in parallel
    pub parallel_groups: bool,
}

/// Calculator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Races listed in the equivalent-times table
    pub equivalent_distances: Vec<RaceDistance>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            metadata: ConfigMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            calculator: CalculatorSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            parallel_groups: true,
        }
    }
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            equivalent_distances: RaceDistance::standard(),
        }
    }
}

/// Keys accepted by [`AppConfig::get`] and [`AppConfig::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "settings.output_format",
    "settings.parallel_groups",
    "logging.level",
    "logging.format",
    "logging.file_path",
    "logging.rotation",
    "logging.include_spans",
];

impl AppConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// `~/.paceplan/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".paceplan")
            .join("config.toml")
    }

    /// Load `path`, or the default path when `None`.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Read a single setting as a string
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "settings.output_format" => self.settings.output_format.to_string(),
            "settings.parallel_groups" => self.settings.parallel_groups.to_string(),
            "logging.level" => self.logging.level.to_filter().to_string(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => self
                .logging
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "logging.rotation" => self.logging.rotation.to_string(),
            "logging.include_spans" => self.logging.include_spans.to_string(),
            _ => bail!("Unknown config key: {} (expected one of {})", key, CONFIG_KEYS.join(", ")),
        };
        Ok(value)
    }

    /// Update a single setting from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "settings.output_format" => {
                self.settings.output_format = value.parse()?;
            }
            "settings.parallel_groups" => {
                self.settings.parallel_groups = parse_bool(key, value)?;
            }
            "logging.level" => {
                self.logging.level = value.parse().map_err(anyhow::Error::msg)?;
            }
            "logging.format" => {
                self.logging.format = value.parse().map_err(anyhow::Error::msg)?;
            }
            "logging.file_path" => {
                self.logging.file_path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value.trim()))
                };
            }
            "logging.rotation" => {
                self.logging.rotation = parse_bool(key, value)?;
            }
            "logging.include_spans" => {
                self.logging.include_spans = parse_bool(key, value)?;
            }
            _ => bail!("Unknown config key: {} (expected one of {})", key, CONFIG_KEYS.join(", ")),
        }
        Ok(())
    }

    /// Every settable key with its current value
    pub fn list(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|&key| self.get(key).ok().map(|value| (key, value)))
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("Invalid boolean for {}: {}", key, value),
    }
}
