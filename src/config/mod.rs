//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod ingest;
mod storage;

pub use ingest::IngestConfig;
pub use storage::{DynamoConfig, StorageConfig, StorageType};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "ORDERING_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "ORDERING";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "ORDERING_LOG";
/// Environment variable selecting the log output format (`json` or text).
pub const LOG_FORMAT_ENV_VAR: &str = "ORDERING_LOG_FORMAT";

/// Deployment variable naming the order table.
pub const TABLE_NAME_ENV_VAR: &str = "DYNAMODB_TABLE_NAME";
/// Deployment variable naming the partition key attribute.
pub const PRIMARY_KEY_ENV_VAR: &str = "PRIMARY_KEY";
/// Deployment variable naming the sort key attribute.
pub const SORT_KEY_ENV_VAR: &str = "SORT_KEY";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store configuration.
    pub storage: StorageConfig,
    /// Queue ingestion configuration.
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. Deployment variables `DYNAMODB_TABLE_NAME`, `PRIMARY_KEY`, `SORT_KEY`
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            // Variables injected by the function's deployment definition
            .set_override_option("storage.table_name", std::env::var(TABLE_NAME_ENV_VAR).ok())?
            .set_override_option("storage.partition_key", std::env::var(PRIMARY_KEY_ENV_VAR).ok())?
            .set_override_option("storage.sort_key", std::env::var(SORT_KEY_ENV_VAR).ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Create config for testing: in-memory storage, default key names.
    pub fn for_test() -> Self {
        Self {
            storage: StorageConfig {
                storage_type: StorageType::Memory,
                ..StorageConfig::default()
            },
            ingest: IngestConfig::default(),
        }
    }
}
