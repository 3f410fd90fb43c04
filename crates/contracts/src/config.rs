//! EngineConfig - Config Loader output
//!
//! Sampling, detector, debounce and permission settings of one engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::SensorKind;

/// Default sampling frequency (Hz)
pub const DEFAULT_FREQUENCY_HZ: u32 = 20;

/// Slider lower bound (Hz)
pub const MIN_FREQUENCY_HZ: u32 = 10;

/// Slider upper bound (Hz)
pub const MAX_FREQUENCY_HZ: u32 = 60;

/// Delta magnitude above which a sample counts as sudden motion
pub const DEFAULT_SHAKE_THRESHOLD: f64 = 25.0;

/// How long the shaking indicator stays on after the last trigger
pub const DEFAULT_SHAKING_WINDOW_MS: u64 = 300;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    #[serde(default)]
    #[validate(nested)]
    pub sensor: SensorSettings,

    #[serde(default)]
    #[validate(nested)]
    pub detector: DetectorSettings,

    #[serde(default)]
    #[validate(nested)]
    pub signal: SignalSettings,

    #[serde(default)]
    pub permission: PermissionSettings,
}

/// Sensor acquisition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SensorSettings {
    /// Initial sampling frequency
    #[serde(default = "default_frequency_hz")]
    #[validate(range(min = 1))]
    pub frequency_hz: u32,

    #[serde(default = "default_min_frequency_hz")]
    #[validate(range(min = 1))]
    pub min_frequency_hz: u32,

    #[serde(default = "default_max_frequency_hz")]
    #[validate(range(min = 1))]
    pub max_frequency_hz: u32,

    /// Sensor kind tried first
    #[serde(default)]
    pub prefer: SensorKind,
}

impl SensorSettings {
    /// Clamp a requested frequency into the configured bounds
    pub fn clamp(&self, frequency_hz: u32) -> u32 {
        frequency_hz.clamp(self.min_frequency_hz, self.max_frequency_hz)
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            min_frequency_hz: MIN_FREQUENCY_HZ,
            max_frequency_hz: MAX_FREQUENCY_HZ,
            prefer: SensorKind::Accelerometer,
        }
    }
}

fn default_frequency_hz() -> u32 {
    DEFAULT_FREQUENCY_HZ
}

fn default_min_frequency_hz() -> u32 {
    MIN_FREQUENCY_HZ
}

fn default_max_frequency_hz() -> u32 {
    MAX_FREQUENCY_HZ
}

/// Shake detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetectorSettings {
    /// Per-axis delta threshold, in sensor units
    #[serde(default = "default_threshold")]
    #[validate(range(exclusive_min = 0.0))]
    pub threshold: f64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SHAKE_THRESHOLD,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_SHAKE_THRESHOLD
}

/// Shaking indicator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SignalSettings {
    #[serde(default = "default_shaking_window_ms")]
    #[validate(range(min = 1))]
    pub shaking_window_ms: u64,
}

impl SignalSettings {
    pub fn shaking_window(&self) -> Duration {
        Duration::from_millis(self.shaking_window_ms)
    }
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            shaking_window_ms: DEFAULT_SHAKING_WINDOW_MS,
        }
    }
}

fn default_shaking_window_ms() -> u64 {
    DEFAULT_SHAKING_WINDOW_MS
}

/// Permission negotiation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionSettings {
    #[serde(default)]
    pub mode: PermissionMode,
}

/// How the target platform negotiates sensor permission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    /// Query the platform and gate on the answer
    #[default]
    Query,
    /// No query API; open directly
    AlwaysOpen,
}
