use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::LiftRsError;
use crate::health::HealthScoringConfig;
use crate::logging::LogConfig;
use crate::models::WeightUnit;
use crate::plates::{PlateConfig, PlateSet};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Health scoring reference ranges and cache policy
    pub health: HealthScoringConfig,

    /// Bar and plate inventories
    pub plates: PlateConfig,

    /// Logging output
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

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory holding the workout database
    pub data_dir: PathBuf,

    /// Database file name inside `data_dir`
    pub database_file: String,

    /// Unit weights are entered and displayed in
    pub weight_unit: WeightUnit,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: dirs::data_local_dir()
                .map(|dir| dir.join("liftrs"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            database_file: "liftrs.db".to_string(),
            weight_unit: WeightUnit::Kg,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            settings: AppSettings::default(),
            health: HealthScoringConfig::default(),
            plates: PlateConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        debug!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load a config file, or the defaults when no file exists at `path`
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_if_exists<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Load an explicit file if given, otherwise the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_if_exists(Self::default_config_path()),
        }
    }

    /// Write a default configuration to `path`, refusing to overwrite
    pub fn init_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }

        let mut config = Self::default();
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Full path of the workout database
    pub fn database_path(&self) -> PathBuf {
        self.settings.data_dir.join(&self.settings.database_file)
    }

    /// Reject reference ranges the scoring formulas cannot use
    pub fn validate(&self) -> crate::error::Result<()> {
        let health = &self.health;

        if health.sleep_target_hours <= 0.0 {
            return Err(config_error("health.sleep_target_hours must be positive"));
        }
        if health.hrv_max <= health.hrv_min {
            return Err(config_error("health.hrv_max must be greater than health.hrv_min"));
        }
        if health.rhr_max <= health.rhr_min {
            return Err(config_error("health.rhr_max must be greater than health.rhr_min"));
        }
        if health.exertion_volume_reference <= 0.0
            || health.exertion_duration_reference_minutes <= 0.0
        {
            return Err(config_error("health exertion references must be positive"));
        }
        if health.summary_window_days == 0 {
            return Err(config_error("health.summary_window_days must be at least 1"));
        }

        validate_plate_set("plates.kg", &self.plates.kg)?;
        validate_plate_set("plates.lbs", &self.plates.lbs)?;

        Ok(())
    }
}

fn config_error(message: &str) -> LiftRsError {
    LiftRsError::Configuration(message.to_string())
}

fn validate_plate_set(name: &str, set: &PlateSet) -> crate::error::Result<()> {
    if set.bar_weight < 0.0 {
        return Err(config_error(&format!("{}.bar_weight must not be negative", name)));
    }
    if set.plates.iter().any(|p| *p <= 0.0) {
        return Err(config_error(&format!("{}.plates must all be positive", name)));
    }
    if set.plates.windows(2).any(|w| w[0] < w[1]) {
        return Err(config_error(&format!("{}.plates must be listed heaviest first", name)));
    }
    Ok(())
}
