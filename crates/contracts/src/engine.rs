//! Engine state and events - lifecycle controller output

use std::fmt;

use crate::{EngineError, Reading, SensorKind};

/// Lifecycle controller state
#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    /// Created, not started
    Idle,

    /// Probing for a motion sensor
    CheckingCapability,

    /// Waiting for the permission query
    CheckingPermission { kind: SensorKind },

    /// Sensor construction in flight
    Opening { kind: SensorKind, frequency_hz: u32 },

    /// Session open and producing readings
    Running { kind: SensorKind, frequency_hz: u32 },

    /// Old session released, new one about to open
    Reconfiguring {
        kind: SensorKind,
        from_hz: u32,
        to_hz: u32,
    },

    /// Disposed; no further events
    Stopped,

    /// Current attempt failed
    Failed(EngineError),
}

impl EngineState {
    /// Stable label (used for metrics and logs)
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::CheckingCapability => "checking_capability",
            EngineState::CheckingPermission { .. } => "checking_permission",
            EngineState::Opening { .. } => "opening",
            EngineState::Running { .. } => "running",
            EngineState::Reconfiguring { .. } => "reconfiguring",
            EngineState::Stopped => "stopped",
            EngineState::Failed(_) => "failed",
        }
    }

    /// A permission query or sensor open is outstanding
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            EngineState::CheckingCapability
                | EngineState::CheckingPermission { .. }
                | EngineState::Opening { .. }
                | EngineState::Reconfiguring { .. }
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EngineState::Failed(_))
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::CheckingPermission { kind } => {
                write!(f, "checking permission for {kind}")
            }
            EngineState::Opening { kind, frequency_hz } => {
                write!(f, "opening {kind} at {frequency_hz} Hz")
            }
            EngineState::Running { kind, frequency_hz } => {
                write!(f, "running {kind} at {frequency_hz} Hz")
            }
            EngineState::Reconfiguring {
                kind,
                from_hz,
                to_hz,
            } => write!(f, "reconfiguring {kind} {from_hz} Hz -> {to_hz} Hz"),
            EngineState::Failed(err) => write!(f, "failed: {err}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One detected shake (rising edge)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeEvent {
    /// Reading that produced the edge
    pub reading: Reading,
    pub sensor_kind: SensorKind,
    pub frequency_hz: u32,
}

/// Engine event, delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Rising edge detected; the caller's count should increment
    Shake(ShakeEvent),

    /// Debounced shaking indicator switched on
    ShakingStarted,

    /// Debounced shaking indicator switched off
    ShakingEnded,

    /// Lifecycle state changed
    StateChanged(EngineState),

    /// Failure, reported once per attempt
    Error(EngineError),
}

/// Caller-owned shake count
///
/// Incremented once per `EngineEvent::Shake`; reset only by explicit caller
/// action, independently of the detector state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShakeCounter {
    count: u64,
}

impl ShakeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one shake, returning the new count
    pub fn record(&mut self) -> u64 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Apply an engine event; only `Shake` counts
    pub fn observe(&mut self, event: &EngineEvent) -> Option<u64> {
        matches!(event, EngineEvent::Shake(_)).then(|| self.record())
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn get(&self) -> u64 {
        self.count
    }
}
