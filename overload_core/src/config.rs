//! Configuration file support for overload.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/overload/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Progressive-overload planner parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Kilograms added after the top of the rep range is completed
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,

    /// Starting weight when an exercise has no history
    #[serde(default = "default_cold_start_weight")]
    pub cold_start_weight: f64,

    /// Minimum reps used when a rep range cannot be parsed
    #[serde(default = "default_min_reps")]
    pub default_min_reps: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            weight_increment: default_weight_increment(),
            cold_start_weight: default_cold_start_weight(),
            default_min_reps: default_min_reps(),
        }
    }
}

/// How much history commands load from the session store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Most recent sessions considered by history and stats commands
    #[serde(default = "default_session_limit")]
    pub session_limit: usize,

    /// Entries shown in the top performances list
    #[serde(default = "default_top_performances")]
    pub top_performances: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            session_limit: default_session_limit(),
            top_performances: default_top_performances(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("overload")
}

fn default_weight_increment() -> f64 {
    2.5
}

fn default_cold_start_weight() -> f64 {
    40.0
}

fn default_min_reps() -> u32 {
    8
}

fn default_session_limit() -> usize {
    50
}

fn default_top_performances() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the planner cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.planner.weight_increment.is_finite() || self.planner.weight_increment < 0.0 {
            return Err(Error::Config(format!(
                "planner.weight_increment must be a non-negative number, got {}",
                self.planner.weight_increment
            )));
        }
        if !self.planner.cold_start_weight.is_finite() || self.planner.cold_start_weight < 0.0 {
            return Err(Error::Config(format!(
                "planner.cold_start_weight must be a non-negative number, got {}",
                self.planner.cold_start_weight
            )));
        }
        if self.planner.default_min_reps == 0 {
            return Err(Error::Config(
                "planner.default_min_reps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("overload").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.planner.weight_increment, 2.5);
        assert_eq!(config.planner.cold_start_weight, 40.0);
        assert_eq!(config.planner.default_min_reps, 8);
        assert_eq!(config.history.session_limit, 50);
        assert_eq!(config.history.top_performances, 5);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[planner]
weight_increment = 1.25
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planner.weight_increment, 1.25);
        assert_eq!(config.planner.cold_start_weight, 40.0); // default
        assert_eq!(config.history.session_limit, 50); // default
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.planner.cold_start_weight = 20.0;
        config.data.data_dir = temp_dir.path().join("data");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.planner, config.planner);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_invalid_planner_values_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\ndefault_min_reps = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
