//! Compiler plugin configuration.

use serde::{Deserialize, Serialize};

/// Settings for the compiler event plugin registered by the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Identity the compiler service registers its listeners under.
    #[serde(default = "default_plugin_name")]
    pub name: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: default_plugin_name(),
        }
    }
}

fn default_plugin_name() -> String {
    "BuilderCompilerEvent".to_string()
}
