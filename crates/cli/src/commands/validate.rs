//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{EngineConfig, PermissionMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    frequency_hz: u32,
    frequency_range: [u32; 2],
    prefer: String,
    threshold: f64,
    shaking_window_ms: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    frequency_hz: config.sensor.frequency_hz,
                    frequency_range: [
                        config.sensor.min_frequency_hz,
                        config.sensor.max_frequency_hz,
                    ],
                    prefer: config.sensor.prefer.to_string(),
                    threshold: config.detector.threshold,
                    shaking_window_ms: config.signal.shaking_window_ms,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &EngineConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.detector.threshold < 5.0 {
        warnings.push(format!(
            "detector.threshold {} is very low - sensor noise may count as shakes",
            config.detector.threshold
        ));
    }

    if config.signal.shaking_window_ms < 1000 / u64::from(config.sensor.min_frequency_hz.max(1)) {
        warnings.push(
            "signal.shaking_window_ms is shorter than one sample at the lowest frequency"
                .to_string(),
        );
    }

    if config.permission.mode == PermissionMode::AlwaysOpen {
        warnings.push("permission.mode = always_open - the permission query is skipped".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Frequency: {} Hz", summary.frequency_hz);
            println!(
                "  Range: {}..={} Hz",
                summary.frequency_range[0], summary.frequency_range[1]
            );
            println!("  Preferred sensor: {}", summary.prefer);
            println!("  Threshold: {}", summary.threshold);
            println!("  Shaking window: {} ms", summary.shaking_window_ms);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config() {
        let (_file, args) = args_for("[sensor]\nfrequency_hz = 30\n");
        let result = validate_config(&args);
        assert!(result.valid);
        assert_eq!(result.summary.unwrap().frequency_hz, 30);
        assert!(result.warnings.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let (_file, args) = args_for("[sensor]\nfrequency_hz = 5\n");
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.is_some());
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/shake.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_warnings() {
        let (_file, args) = args_for("[detector]\nthreshold = 2.0\n\n[permission]\nmode = \"always_open\"\n");
        let result = validate_config(&args);
        assert!(result.valid);
        assert_eq!(result.warnings.unwrap().len(), 2);
    }
}
