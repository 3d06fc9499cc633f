//! Chain Configuration
//!
//! Supports config files and `FANTICKET__*` environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Chain configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Execution settings
    #[serde(default)]
    pub chain: ChainSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Chain id bound into every signing domain
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Pin the block clock to this unix time (seconds)
    #[serde(default)]
    pub fixed_timestamp: Option<u64>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            fixed_timestamp: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_chain_id() -> u64 {
    31337
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ChainConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        builder = builder.add_source(
            config::Environment::with_prefix("FANTICKET")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("failed to read chain configuration")?
            .try_deserialize()
            .context("invalid chain configuration")
    }

    /// Configuration for tests: pinned clock, verbose logs
    pub fn development() -> Self {
        Self {
            chain: ChainSettings {
                chain_id: default_chain_id(),
                fixed_timestamp: Some(1_700_000_000),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
