//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use thiserror::Error;

use crate::config::{AppConfig, Backend};

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_capacity` is 0 or exceeds 100 000
    /// - the active backend's path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_capacity > 100_000 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity".into(),
                reason: "must not exceed 100000".into(),
            });
        }

        match self.backend {
            Backend::Sqlite if self.db_path.as_os_str().is_empty() => Err(ConfigError::Invalid {
                field: "db_path".into(),
                reason: "must not be empty".into(),
            }),
            Backend::Json if self.store_path.as_os_str().is_empty() => Err(ConfigError::Invalid {
                field: "store_path".into(),
                reason: "must not be empty".into(),
            }),
            _ => Ok(()),
        }
    }
}
