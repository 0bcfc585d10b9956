//! Builder configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `BUILDER__`-prefixed environment variables.
//! Every field carries a serde default, so an empty source set yields a
//! usable configuration.

pub mod ipc;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};

use self::ipc::IpcConfig;
use self::logging::LoggingConfig;
use self::plugin::PluginConfig;

use crate::error::AppError;

/// Root builder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Compiler plugin settings.
    #[serde(default)]
    pub plugin: PluginConfig,
    /// Inter-process channel settings.
    #[serde(default)]
    pub ipc: IpcConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BuilderConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay and environment
    /// variables prefixed with `BUILDER__` (e.g. `BUILDER__IPC__ENABLED`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUILDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(
            env,
            plugin = %config.plugin.name,
            ipc = config.ipc.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string, applying defaults for
    /// missing sections.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
