//! Reading - raw motion sample
//!
//! One 3-axis sample as delivered by the sensor callback.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 3-axis motion sample
///
/// Ephemeral: the detector only keeps the previous reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Reading {
    /// Create a reading from its three axes
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The all-zero reading a fresh detector starts from
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<[f64; 3]> for Reading {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Motion sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    #[default]
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    /// Human readable name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::Gyroscope => "Gyroscope",
        }
    }

    /// The other sensor kind
    pub fn fallback(&self) -> Self {
        match self {
            SensorKind::Accelerometer => SensorKind::Gyroscope,
            SensorKind::Gyroscope => SensorKind::Accelerometer,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of the platform capability probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub accelerometer: bool,
    pub gyroscope: bool,
}

impl Capabilities {
    /// Both sensor kinds available
    pub const fn all() -> Self {
        Self {
            accelerometer: true,
            gyroscope: true,
        }
    }

    /// No motion sensing at all
    pub const fn none() -> Self {
        Self {
            accelerometer: false,
            gyroscope: false,
        }
    }

    /// Whether the given kind is available
    pub fn supports(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Accelerometer => self.accelerometer,
            SensorKind::Gyroscope => self.gyroscope,
        }
    }

    /// Pick a sensor kind, `preferred` first
    ///
    /// Returns `None` when neither kind is available.
    pub fn choose(&self, preferred: SensorKind) -> Option<SensorKind> {
        [preferred, preferred.fallback()]
            .into_iter()
            .find(|kind| self.supports(*kind))
    }
}
