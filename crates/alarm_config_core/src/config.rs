//! Process configuration loaded from TOML.
//!
//! Every section is optional; missing keys fall back to defaults. The
//! `ALARM_CONFIG_DB` and `ALARM_CONFIG_LOG_LEVEL` environment variables
//! override the file when set.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use crate::repo::alarm_config_repo::DEFAULT_LIST_LIMIT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "ALARM_CONFIG_DB";
pub const LOG_LEVEL_ENV: &str = "ALARM_CONFIG_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("paging.default_limit must be greater than zero")]
    ZeroPageSize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. `:memory:` opens a throwaway in-memory store.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("alarm_config.db"),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: std::env::temp_dir().join("alarm_config_logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_limit: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl AppConfig {
    /// Reads `path`, applies environment overrides and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        parsed.with_env_overrides().validated()
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides().validated()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var_os(DB_PATH_ENV).map(PathBuf::from),
            std::env::var(LOG_LEVEL_ENV).ok(),
        )
    }

    fn with_overrides(mut self, db_path: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(path) = db_path {
            self.database.path = path;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.logging.level = normalize_level(&self.logging.level)?.to_string();
        if self.paging.default_limit == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(self)
    }
}
