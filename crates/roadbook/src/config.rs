//! Configuration management for roadbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use roadbook_core::{DeliveryStatus, ReferencePoint};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roadbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "roadbook.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROADBOOK_`)
/// 2. TOML config file at `~/.config/roadbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dispatch configuration.
    pub dispatch: DispatchConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/roadbook/roadbook.db`
    pub database_path: Option<PathBuf>,
}

/// Settings for the driver route view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Depot latitude, used as the reference point when no position is given.
    pub depot_latitude: Option<f64>,
    /// Depot longitude, used as the reference point when no position is given.
    pub depot_longitude: Option<f64>,
    /// How long to wait for a position fix, in milliseconds.
    pub location_timeout_ms: u64,
    /// Statuses shown on a route when none are requested explicitly.
    pub route_statuses: Vec<DeliveryStatus>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            depot_latitude: None,
            depot_longitude: None,
            location_timeout_ms: 3000,
            route_statuses: DeliveryStatus::ALL
                .into_iter()
                .filter(DeliveryStatus::is_active)
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROADBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let dispatch = &self.dispatch;

        match (dispatch.depot_latitude, dispatch.depot_longitude) {
            (Some(lat), Some(lon)) => {
                validate_coordinate("depot_latitude", lat, 90.0)?;
                validate_coordinate("depot_longitude", lon, 180.0)?;
            }
            (None, None) => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: "depot_latitude and depot_longitude must be set together"
                        .to_string(),
                });
            }
        }

        if dispatch.location_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "location_timeout_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The configured depot as a reference point, if one is set.
    #[must_use]
    pub fn depot(&self) -> Option<ReferencePoint> {
        match (self.dispatch.depot_latitude, self.dispatch.depot_longitude) {
            (Some(lat), Some(lon)) => Some(ReferencePoint::new(lat, lon)),
            _ => None,
        }
    }

    /// Get the location timeout as a Duration.
    #[must_use]
    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.location_timeout_ms)
    }
}

fn validate_coordinate(name: &str, value: f64, limit: f64) -> Result<()> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(Error::ConfigValidation {
            message: format!("{name} must be within ±{limit}, got {value}"),
        })
    }
}
