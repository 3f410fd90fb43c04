//! # Sensor Lifecycle
//!
//! Acquires a motion sensor, feeds its readings through the shake detector
//! and publishes shake events, the debounced shaking indicator, state
//! changes and classified errors.
//!
//! Responsibilities:
//! - Capability probe with accelerometer/gyroscope fallback
//! - Injected permission strategy
//! - Sensor open, frequency reconfiguration and release
//! - Stale transition and reading suppression after stop/reconfigure
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{EngineConfig, EngineEvent};
//! use sensor_lifecycle::{AlwaysOpen, ShakeEngine, SimulatedPlatform};
//!
//! let engine = ShakeEngine::spawn(SimulatedPlatform::default(), AlwaysOpen, &EngineConfig::default());
//! let mut events = engine.subscribe();
//! engine.start(20)?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let EngineEvent::Shake(shake) = event {
//!         println!("shake on {}", shake.sensor_kind);
//!     }
//! }
//! ```

mod controller;
mod engine;
mod error;
mod permission;
mod replay_sensor;
mod scripted_platform;
mod shaking_signal;
mod simulated_sensor;

pub use engine::{ShakeEngine, EVENT_CHANNEL_CAPACITY};
pub use error::{ControlError, ReplayError, Result};
pub use permission::{
    AlwaysOpen, LocalPermissionStrategy, PermissionStrategy, QueryThenGate, StaticPermission,
};
pub use replay_sensor::{Recording, ReplayConfig, ReplayPlatform, ReplaySensor};
pub use scripted_platform::{ScriptConfig, ScriptedPlatform, SensorProbe};
pub use shaking_signal::ShakingSignal;
pub use simulated_sensor::{SimulatedConfig, SimulatedPlatform, SimulatedSensor};
