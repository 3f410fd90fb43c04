//! SensorSource trait - motion sensor abstraction
//!
//! Decouples the lifecycle controller from the concrete platform sensor API.
//! Simulated, replayed and scripted sensors all implement the same interface.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::{Capabilities, Reading, SensorKind};

/// Reading callback type
///
/// Sensors push every sample through this callback.
pub type ReadingCallback = Arc<dyn Fn(Reading) + Send + Sync>;

/// Category of a native acquisition failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// Platform security policy refused the sensor
    Security,
    /// The user agent or OS did not allow the access
    NotAllowed,
    /// Sensor present but no data can be read
    NotReadable,
    /// Anything else, carrying the native error name
    Other(String),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Security => f.write_str("SecurityError"),
            FaultKind::NotAllowed => f.write_str("NotAllowedError"),
            FaultKind::NotReadable => f.write_str("NotReadableError"),
            FaultKind::Other(name) => f.write_str(name),
        }
    }
}

/// Native failure raised while constructing or starting a sensor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SensorFault {
    pub kind: FaultKind,
    pub message: String,
}

impl SensorFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Security, message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotAllowed, message)
    }

    pub fn not_readable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotReadable, message)
    }

    pub fn other(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Other(name.into()), message)
    }
}

/// One open motion sensor
///
/// # Example
///
/// ```ignore
/// let sensor = platform.open(SensorKind::Accelerometer, 20).await?;
/// sensor.listen(Arc::new(|reading| println!("{reading:?}")));
/// sensor.start()?;
/// // ...
/// sensor.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// Sensor kind
    fn kind(&self) -> SensorKind;

    /// Sampling frequency the sensor was constructed with
    fn frequency_hz(&self) -> u32;

    /// Register the reading callback
    ///
    /// A second registration replaces the first.
    fn listen(&self, callback: ReadingCallback);

    /// Start producing readings
    fn start(&self) -> Result<(), SensorFault>;

    /// Stop producing readings
    ///
    /// Idempotent.
    fn stop(&self);

    /// Whether the sensor is currently producing readings
    fn is_listening(&self) -> bool;
}

/// Platform sensor API
#[trait_variant::make(SensorPlatform: Send)]
pub trait LocalSensorPlatform {
    /// Probe which sensor kinds exist
    fn capabilities(&self) -> Capabilities;

    /// Construct a sensor of the given kind at the given frequency
    ///
    /// The sensor is returned stopped; the caller registers a callback and starts it.
    async fn open(
        &self,
        kind: SensorKind,
        frequency_hz: u32,
    ) -> Result<Box<dyn SensorSource>, SensorFault>;
}
