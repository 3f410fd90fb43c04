//! Sensor lifecycle error types
//!
//! Engine failures themselves are `contracts::EngineError` and travel as
//! events; these errors only cover misuse of the control handle and replay
//! file loading.

use thiserror::Error;

/// Control handle error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// `stop` was already called; the engine accepts no further commands
    #[error("engine is stopped")]
    EngineStopped,

    /// Requested frequency outside the configured bounds
    #[error("invalid frequency {frequency_hz} Hz, expected {min_hz}..={max_hz} Hz")]
    InvalidFrequency {
        frequency_hz: u32,
        min_hz: u32,
        max_hz: u32,
    },
}

/// Replay recording error
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Recording could not be read
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the recording is not a valid reading
    #[error("invalid reading at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Recording contains no readings
    #[error("recording contains no readings")]
    Empty,
}

impl ReplayError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ControlError>;
