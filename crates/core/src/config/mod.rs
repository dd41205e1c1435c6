//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for
//! layered configuration loading from multiple sources:
//!
//! 1. Environment variables (RECAP_*)
//! 2. TOML config file (if RECAP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which storage backend the cache opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Transactional SQLite database. Safe under concurrent callers.
    Sqlite,
    /// Single JSON file rewritten per mutation. Last writer wins.
    Json,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (RECAP_*)
/// 2. TOML config file (if RECAP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage backend for the summary cache.
    ///
    /// Set via RECAP_BACKEND environment variable ("sqlite" or "json").
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// Path to the SQLite cache database.
    ///
    /// Set via RECAP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the JSON store file (json backend only).
    ///
    /// Set via RECAP_STORE_PATH environment variable.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Maximum number of live cache records.
    ///
    /// Set via RECAP_CACHE_CAPACITY environment variable.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_backend() -> Backend {
    Backend::Sqlite
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./recap-cache.sqlite")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./recap-cache.json")
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_path: default_db_path(),
            store_path: default_store_path(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `RECAP_`
    /// 2. TOML file from `RECAP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("RECAP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("RECAP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
