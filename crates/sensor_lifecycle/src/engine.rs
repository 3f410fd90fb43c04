//! ShakeEngine - public handle on the lifecycle controller

use std::sync::atomic::{AtomicBool, Ordering};

use contracts::{EngineConfig, EngineEvent, EngineState, SensorPlatform};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::controller::{Command, Controller, ControllerSettings};
use crate::error::{ControlError, Result};
use crate::permission::PermissionStrategy;

/// Event channel capacity; slow subscribers observe `Lagged`
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shake engine handle
///
/// Owns the controller task; dropping the handle closes the command channel,
/// which stops the engine. Every method is non-blocking; results of a
/// command are observed through [`subscribe`](Self::subscribe) and
/// [`state`](Self::state).
pub struct ShakeEngine {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<EngineEvent>,
    state: watch::Receiver<EngineState>,
    stopped: AtomicBool,
    min_frequency_hz: u32,
    max_frequency_hz: u32,
    default_frequency_hz: u32,
    task: JoinHandle<()>,
}

impl ShakeEngine {
    /// Spawn the controller on the current tokio runtime
    ///
    /// The engine starts `Idle`; nothing is probed until [`start`](Self::start).
    pub fn spawn<P, S>(platform: P, strategy: S, config: &EngineConfig) -> Self
    where
        P: SensorPlatform + Send + Sync + 'static,
        S: PermissionStrategy + Send + Sync + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state) = watch::channel(EngineState::Idle);

        let settings = ControllerSettings {
            prefer: config.sensor.prefer,
            threshold: config.detector.threshold,
            shaking_window: config.signal.shaking_window(),
            frequency_hz: config.sensor.frequency_hz,
        };
        let task = Controller::spawn(
            platform,
            strategy,
            settings,
            events.clone(),
            state_tx,
            command_rx,
        );

        debug!(
            min_frequency_hz = config.sensor.min_frequency_hz,
            max_frequency_hz = config.sensor.max_frequency_hz,
            "shake engine spawned"
        );

        Self {
            commands,
            events,
            state,
            stopped: AtomicBool::new(false),
            min_frequency_hz: config.sensor.min_frequency_hz,
            max_frequency_hz: config.sensor.max_frequency_hz,
            default_frequency_hz: config.sensor.frequency_hz,
            task,
        }
    }

    /// Begin (or retry) sensor acquisition at `frequency_hz`
    ///
    /// While running this is a frequency change; during an in-flight
    /// transition the frequency is coalesced and applied once it settles.
    #[instrument(name = "engine_start", skip(self))]
    pub fn start(&self, frequency_hz: u32) -> Result<()> {
        self.check_frequency(frequency_hz)?;
        self.send(Command::Start { frequency_hz })
    }

    /// Start at the configured default frequency
    pub fn start_default(&self) -> Result<()> {
        self.start(self.default_frequency_hz)
    }

    /// Change the sampling frequency
    #[instrument(name = "engine_set_frequency", skip(self))]
    pub fn set_frequency(&self, frequency_hz: u32) -> Result<()> {
        self.check_frequency(frequency_hz)?;
        self.send(Command::SetFrequency { frequency_hz })
    }

    /// Release everything and enter `Stopped`
    ///
    /// Idempotent; later commands fail with [`ControlError::EngineStopped`].
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.send(Command::Stop);
    }

    /// Stop and wait for the controller task to exit
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            error!(error = %e, "lifecycle controller panicked");
        }
    }

    /// Subscribe to engine events
    ///
    /// Only events emitted after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Watch the engine state
    pub fn state(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    /// Snapshot of the engine state
    pub fn current_state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Accepted frequency range (inclusive)
    pub fn frequency_bounds(&self) -> (u32, u32) {
        (self.min_frequency_hz, self.max_frequency_hz)
    }

    fn check_frequency(&self, frequency_hz: u32) -> Result<()> {
        if frequency_hz == 0
            || frequency_hz < self.min_frequency_hz
            || frequency_hz > self.max_frequency_hz
        {
            return Err(ControlError::InvalidFrequency {
                frequency_hz,
                min_hz: self.min_frequency_hz,
                max_hz: self.max_frequency_hz,
            });
        }
        Ok(())
    }

    fn send(&self, command: Command) -> Result<()> {
        if self.is_stopped() {
            return Err(ControlError::EngineStopped);
        }
        self.commands
            .send(command)
            .map_err(|_| ControlError::EngineStopped)
    }
}
