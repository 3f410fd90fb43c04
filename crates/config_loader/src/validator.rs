//! Configuration validation
//!
//! Rules:
//! - field ranges declared on the contract types (`validator` derive)
//! - min_frequency_hz <= max_frequency_hz
//! - frequency_hz within [min_frequency_hz, max_frequency_hz]
//! - threshold is finite

use contracts::{ContractError, EngineConfig};
use ::validator::Validate;

/// Validate an EngineConfig
///
/// Returns the first error encountered.
pub fn validate(config: &EngineConfig) -> Result<(), ContractError> {
    validate_field_ranges(config)?;
    validate_frequency_bounds(config)?;
    validate_threshold(config)?;
    Ok(())
}

fn validate_field_ranges(config: &EngineConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("engine", e.to_string()))
}

/// Validate sampling frequency bounds
fn validate_frequency_bounds(config: &EngineConfig) -> Result<(), ContractError> {
    let sensor = &config.sensor;

    if sensor.min_frequency_hz > sensor.max_frequency_hz {
        return Err(ContractError::config_validation(
            "sensor.min_frequency_hz / sensor.max_frequency_hz",
            format!(
                "min_frequency_hz ({}) must be <= max_frequency_hz ({})",
                sensor.min_frequency_hz, sensor.max_frequency_hz
            ),
        ));
    }

    if !(sensor.min_frequency_hz..=sensor.max_frequency_hz).contains(&sensor.frequency_hz) {
        return Err(ContractError::config_validation(
            "sensor.frequency_hz",
            format!(
                "frequency_hz ({}) must be within [{}, {}]",
                sensor.frequency_hz, sensor.min_frequency_hz, sensor.max_frequency_hz
            ),
        ));
    }

    Ok(())
}

fn validate_threshold(config: &EngineConfig) -> Result<(), ContractError> {
    if !config.detector.threshold.is_finite() {
        return Err(ContractError::config_validation(
            "detector.threshold",
            "threshold must be finite",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_inverted_bounds() {
        let mut config = EngineConfig::default();
        config.sensor.min_frequency_hz = 50;
        config.sensor.max_frequency_hz = 20;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be <= max_frequency_hz"), "got: {err}");
    }

    #[test]
    fn test_frequency_out_of_bounds() {
        let mut config = EngineConfig::default();
        config.sensor.frequency_hz = 90;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be within [10, 60]"), "got: {err}");
    }

    #[test]
    fn test_zero_frequency_rejected_by_ranges() {
        let mut config = EngineConfig::default();
        config.sensor.frequency_hz = 0;
        config.sensor.min_frequency_hz = 0;
        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ContractError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = EngineConfig::default();
        config.detector.threshold = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_shaking_window_rejected() {
        let mut config = EngineConfig::default();
        config.signal.shaking_window_ms = 0;
        assert!(validate(&config).is_err());
    }
}
