use crate::notifier::DEFAULT_TOLERANCE_SECS;
use crate::persistence::{JsonFileStore, PersistenceResult, TrackerStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "PHYSIO_TRACKER_CONFIG";
pub const HTTP_ADDR_ENV: &str = "PHYSIO_TRACKER_HTTP_ADDR";
pub const DB_PATH_ENV: &str = "PHYSIO_TRACKER_DB";
pub const DEFAULT_CONFIG_PATH: &str = "physio-tracker.toml";
pub const DEFAULT_QUOTE_URL: &str = "https://type.fit/api/quotes";
pub const DEFAULT_FALLBACK_QUOTE: &str = "Stay consistent and results will follow!";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub reminders: ReminderConfig,
    pub quotes: QuoteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub backend: StorageBackend,
    /// Seed the sample exercises into an empty store.
    pub seed_samples: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.json"),
            backend: StorageBackend::Json,
            seed_samples: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub poll_interval_secs: u64,
    pub tolerance_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 60,
            tolerance_secs: DEFAULT_TOLERANCE_SECS as u64,
        }
    }
}

impl ReminderConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn tolerance(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.tolerance_secs as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub url: String,
    pub fallback: String,
    pub timeout_secs: u64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QUOTE_URL.to_string(),
            fallback: DEFAULT_FALLBACK_QUOTE.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reads the config file named by `PHYSIO_TRACKER_CONFIG` (or
    /// `physio-tracker.toml`) when it exists, then applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            self.server.addr = addr;
        }
        if let Some(path) = lookup(DB_PATH_ENV) {
            self.storage.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let reminders = &self.reminders;
        if reminders.poll_interval_secs == 0 || reminders.tolerance_secs == 0 {
            return Err(ConfigError::Invalid(
                "reminders.poll_interval_secs and reminders.tolerance_secs must be positive".into(),
            ));
        }
        // A poll has to land inside every tolerance window or reminders are missed.
        if reminders.poll_interval_secs > reminders.tolerance_secs {
            return Err(ConfigError::Invalid(format!(
                "reminders.poll_interval_secs ({}) must not exceed reminders.tolerance_secs ({})",
                reminders.poll_interval_secs, reminders.tolerance_secs
            )));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.path must not be empty".into()));
        }
        Ok(())
    }

    pub fn open_store(&self) -> PersistenceResult<Box<dyn TrackerStore>> {
        match self.storage.backend {
            StorageBackend::Json => Ok(Box::new(JsonFileStore::new(&self.storage.path))),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => Ok(Box::new(crate::persistence::sqlite::SqliteStore::new(
                &self.storage.path,
            )?)),
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => Err(crate::persistence::PersistenceError::InvalidData(
                "rebuild with the `sqlite` feature to use the sqlite backend".into(),
            )),
        }
    }
}
