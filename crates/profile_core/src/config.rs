//! Service configuration.
//!
//! # Responsibility
//! - Describe where the store lives, how logs are written and how long the
//!   profile snapshot stays valid.
//! - Read overrides from `PROFILE_*` environment variables.
//!
//! # Invariants
//! - A validated config has a non-zero snapshot TTL, a known log level and
//!   an absolute log directory when one is set.

use crate::cache::snapshot::DEFAULT_SNAPSHOT_TTL;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "PROFILE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PROFILE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PROFILE_LOG_DIR";
pub const ENV_SNAPSHOT_TTL_SECS: &str = "PROFILE_SNAPSHOT_TTL_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    ZeroSnapshotTtl,
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::ZeroSnapshotTtl => f.write_str("snapshot TTL must be greater than zero"),
            Self::InvalidLogLevel(message) => f.write_str(message),
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration for a profile service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// SQLite file; `None` runs against a private in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub snapshot_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `PROFILE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_SNAPSHOT_TTL_SECS) {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_SNAPSHOT_TTL_SECS,
                value: raw.clone(),
            })?;
            config.snapshot_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot_ttl.is_zero() {
            return Err(ConfigError::ZeroSnapshotTtl);
        }
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}
