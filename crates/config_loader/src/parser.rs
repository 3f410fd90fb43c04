//! Configuration parsing
//!
//! TOML (primary) and JSON.

use contracts::{ContractError, EngineConfig};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<EngineConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<EngineConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<EngineConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PermissionMode, SensorKind};

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[sensor]
frequency_hz = 30
min_frequency_hz = 10
max_frequency_hz = 60
prefer = "gyroscope"

[detector]
threshold = 12.5

[signal]
shaking_window_ms = 500

[permission]
mode = "always_open"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.sensor.frequency_hz, 30);
        assert_eq!(config.sensor.prefer, SensorKind::Gyroscope);
        assert_eq!(config.detector.threshold, 12.5);
        assert_eq!(config.signal.shaking_window_ms, 500);
        assert_eq!(config.permission.mode, PermissionMode::AlwaysOpen);
    }

    #[test]
    fn test_parse_toml_partial_uses_defaults() {
        let config = parse_toml("[sensor]\nfrequency_hz = 40\n").unwrap();
        assert_eq!(config.sensor.frequency_hz, 40);
        assert_eq!(config.sensor.max_frequency_hz, 60);
        assert_eq!(config.detector.threshold, 25.0);
        assert_eq!(config.permission.mode, PermissionMode::Query);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{ "detector": { "threshold": 18.0 } }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.detector.threshold, 18.0);
        assert_eq!(config.sensor.frequency_hz, 20);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_unknown_permission_mode() {
        let result = parse_toml("[permission]\nmode = \"maybe\"\n");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("JSON"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
