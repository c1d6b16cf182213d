//! Application configuration.
//!
//! Loaded from an optional TOML file, then overridden by `ROSTER_*`
//! environment variables. Every key has a default, so an empty file is a
//! valid configuration.

use crate::cache::PersonalCache;
use crate::db::{BootstrapPolicy, DatabaseConfig, ScriptSource};
use crate::logging::default_log_level;
use crate::storage::FileFormat;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "ROSTER_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level settings shared by the service and database bootstrap.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `personal.<ext>` files.
    pub data_directory: PathBuf,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    /// Formats written by `export_enabled`.
    pub output_formats: Vec<FileFormat>,
    pub database_url: String,
    pub database_init_tables: bool,
    pub database_init_data: bool,
    pub bootstrap_policy: BootstrapPolicy,
    /// Overrides the bundled `schema.sql`.
    pub schema_script: Option<PathBuf>,
    /// Overrides the bundled `data.sql`.
    pub data_script: Option<PathBuf>,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_directory: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data"),
            cache_capacity: 10,
            cache_ttl_secs: 60,
            output_formats: FileFormat::ALL.to_vec(),
            database_url: "sqlite::memory:".to_string(),
            database_init_tables: true,
            database_init_data: true,
            bootstrap_policy: BootstrapPolicy::default(),
            schema_script: None,
            data_script: None,
            log_level: default_log_level().to_string(),
            log_directory: None,
        }
    }
}

impl AppConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies `ROSTER_*` environment overrides.
    ///
    /// Unparseable values are ignored and the current value is kept.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("DATA_DIRECTORY") {
            self.data_directory = PathBuf::from(value);
        }
        if let Some(value) = lookup("CACHE_CAPACITY").and_then(|v| v.trim().parse().ok()) {
            self.cache_capacity = value;
        }
        if let Some(value) = lookup("CACHE_TTL_SECS").and_then(|v| v.trim().parse().ok()) {
            self.cache_ttl_secs = value;
        }
        if let Some(value) = lookup("OUTPUT_FORMATS").and_then(|v| parse_format_list(&v)) {
            self.output_formats = value;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = value;
        }
        if let Some(value) = lookup("DATABASE_INIT_TABLES").and_then(|v| parse_bool(&v)) {
            self.database_init_tables = value;
        }
        if let Some(value) = lookup("DATABASE_INIT_DATA").and_then(|v| parse_bool(&v)) {
            self.database_init_data = value;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("LOG_DIRECTORY") {
            self.log_directory = Some(PathBuf::from(value));
        }
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache_capacity must be positive".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache_ttl_secs must be positive".to_string(),
            ));
        }
        if self.output_formats.is_empty() {
            return Err(ConfigError::Invalid(
                "output_formats must name at least one format".to_string(),
            ));
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Builds the cache described by this configuration.
    pub fn cache(&self) -> Result<PersonalCache, ConfigError> {
        let capacity = NonZeroUsize::new(self.cache_capacity).ok_or_else(|| {
            ConfigError::Invalid("cache_capacity must be positive".to_string())
        })?;
        Ok(PersonalCache::new(capacity, self.cache_ttl()))
    }

    /// Builds the lifecycle manager settings.
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            init_tables: self.database_init_tables,
            init_data: self.database_init_data,
            schema_script: self
                .schema_script
                .as_ref()
                .map_or_else(ScriptSource::default_schema, ScriptSource::file),
            data_script: self
                .data_script
                .as_ref()
                .map_or_else(ScriptSource::default_data, ScriptSource::file),
            bootstrap_policy: self.bootstrap_policy,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_format_list(value: &str) -> Option<Vec<FileFormat>> {
    let formats = value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| item.parse::<FileFormat>().ok())
        .collect::<Option<Vec<_>>>()?;
    (!formats.is_empty()).then_some(formats)
}
