//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the shake counter.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Units
//! - Readings are in the native unit of the sensor that produced them
//!   (m/s² for accelerometers, rad/s for gyroscopes)
//! - Frequencies are whole Hertz

mod config;
mod engine;
mod engine_error;
mod error;
mod permission;
mod reading;
mod sensor_source;

pub use config::*;
pub use engine::*;
pub use engine_error::*;
pub use error::*;
pub use permission::*;
pub use reading::*;
pub use sensor_source::{
    FaultKind, LocalSensorPlatform, ReadingCallback, SensorFault, SensorPlatform, SensorSource,
};
