//! Runtime configuration for core callers.
//!
//! # Invariants
//! - Unknown fields are rejected so typos do not silently fall back to
//!   defaults.
//! - `log_level` is validated with the same rules as `init_logging`.

use crate::logging::{default_log_level, init_logging, normalize_level};
use crate::store::{LocalStore, MemoryStore, SqliteStore, StoreBackend, StoreResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading `CoreConfig`.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidLogLevel(String),
    /// `log_dir` is set but logging could not start.
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidLogLevel(message) => write!(f, "invalid config: {message}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidLogLevel(_) | Self::Logging(_) => None,
        }
    }
}

/// Top-level core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite store file. `None` keeps all state in memory.
    pub store_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Artificial delay applied before login/register, in milliseconds.
    pub auth_latency_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            auth_latency_ms: 0,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON config document. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.log_level = normalize_level(&config.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` without touching the logger when `log_dir` is
    /// `None`.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        let log_dir = log_dir.to_str().ok_or_else(|| {
            ConfigError::Logging(format!(
                "log_dir `{}` is not valid UTF-8",
                log_dir.display()
            ))
        })?;
        init_logging(&self.log_level, log_dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }

    /// Opens the configured store, creating the SQLite file if needed.
    ///
    /// Without `store_path` the store is in memory and lost on drop.
    pub fn open_store(&self) -> StoreResult<LocalStore<StoreBackend>> {
        self.open_backend(|path| SqliteStore::open(path))
    }

    /// Like `open_store`, but a missing SQLite file is an error.
    pub fn open_existing_store(&self) -> StoreResult<LocalStore<StoreBackend>> {
        self.open_backend(|path| SqliteStore::open_existing(path))
    }

    fn open_backend(
        &self,
        open_sqlite: impl FnOnce(&Path) -> StoreResult<SqliteStore>,
    ) -> StoreResult<LocalStore<StoreBackend>> {
        let backend = match &self.store_path {
            Some(path) => StoreBackend::Sqlite(open_sqlite(path)?),
            None => StoreBackend::Memory(MemoryStore::new()),
        };
        info!(
            "event=store_open module=config status=ok backend={}",
            backend.kind()
        );
        Ok(LocalStore::new(backend))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            simulated_latency: Duration::from_millis(self.auth_latency_ms),
        }
    }
}

/// Settings consumed by `AuthSession`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Blocking sleep before login/register do any work. Not cancellable.
    pub simulated_latency: Duration,
}
