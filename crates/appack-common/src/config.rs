//! Global configuration model for appack commands.

use serde::{Deserialize, Serialize};

use crate::types::OutputFormat;

/// Root configuration shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output format used by `render` when none is requested.
    pub default_format: OutputFormat,
    /// Default seeded for parameters that have no discoverable value.
    pub fill_placeholder: String,
    /// Name of the environment file `init` looks for next to the compose file.
    pub env_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Yaml,
            fill_placeholder: crate::constants::FILL_ME_PLACEHOLDER.to_string(),
            env_file_name: crate::constants::ENV_FILE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renders_yaml_and_fills_me() {
        let config = AppConfig::default();
        assert_eq!(config.default_format, OutputFormat::Yaml);
        assert_eq!(config.fill_placeholder, "FILL ME");
        assert_eq!(config.env_file_name, ".env");
    }

    #[test]
    fn config_json_roundtrip() {
        let config = AppConfig {
            default_format: OutputFormat::Json,
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
        assert!(json.contains("\"json\""), "got: {json}");
    }
}
