//! Sensor lifecycle controller
//!
//! Single task owning the detector, the open sensor session, the shaking
//! signal and the generation counter. Commands, transition outcomes, the
//! shaking deadline and readings are handled one at a time in one
//! `select!` loop, so none of that state is shared.
//!
//! Permission queries and sensor opens run as spawned tasks. Each carries
//! the generation it was started under; anything arriving for an older
//! generation is stale and gets discarded (an already-built sensor is
//! stopped right away).

use std::sync::Arc;

use contracts::{
    EngineError, EngineEvent, EngineState, PermissionQueryError, PermissionStatus, Reading,
    SensorFault, SensorKind, SensorPlatform, SensorSource, ShakeEvent,
};
use observability::metrics;
use shake_detector::ShakeDetector;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, trace, warn};

use crate::permission::PermissionStrategy;
use crate::shaking_signal::ShakingSignal;

/// Control command sent by the engine handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Start { frequency_hz: u32 },
    SetFrequency { frequency_hz: u32 },
    Stop,
}

/// Result of an asynchronous transition step
enum Outcome {
    PermissionResolved {
        generation: u64,
        kind: SensorKind,
        result: Result<PermissionStatus, PermissionQueryError>,
    },
    Opened {
        generation: u64,
        kind: SensorKind,
        frequency_hz: u32,
        requested_at: Instant,
        result: Result<Box<dyn SensorSource>, SensorFault>,
    },
}

/// Open sensor plus what it was opened with
struct Session {
    source: Box<dyn SensorSource>,
    kind: SensorKind,
    frequency_hz: u32,
}

/// Static controller settings
#[derive(Debug, Clone)]
pub(crate) struct ControllerSettings {
    pub prefer: SensorKind,
    pub threshold: f64,
    pub shaking_window: std::time::Duration,
    pub frequency_hz: u32,
}

pub(crate) struct Controller<P, S> {
    platform: Arc<P>,
    strategy: Arc<S>,
    prefer: SensorKind,
    detector: ShakeDetector,
    signal: ShakingSignal,
    session: Option<Session>,
    generation: u64,
    state: EngineState,
    /// Frequency of the current (or next) attempt
    frequency_hz: u32,
    /// Latest frequency requested while a transition was in flight
    pending_hz: Option<u32>,
    events: broadcast::Sender<EngineEvent>,
    state_tx: watch::Sender<EngineState>,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    reading_tx: mpsc::UnboundedSender<(u64, Reading)>,
}

impl<P, S> Controller<P, S>
where
    P: SensorPlatform + Send + Sync + 'static,
    S: PermissionStrategy + Send + Sync + 'static,
{
    /// Build the controller and run it on the current runtime
    pub(crate) fn spawn(
        platform: P,
        strategy: S,
        settings: ControllerSettings,
        events: broadcast::Sender<EngineEvent>,
        state_tx: watch::Sender<EngineState>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> tokio::task::JoinHandle<()> {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (reading_tx, reading_rx) = mpsc::unbounded_channel();

        let controller = Self {
            platform: Arc::new(platform),
            strategy: Arc::new(strategy),
            prefer: settings.prefer,
            detector: ShakeDetector::new(settings.threshold),
            signal: ShakingSignal::new(settings.shaking_window),
            session: None,
            generation: 0,
            state: EngineState::Idle,
            frequency_hz: settings.frequency_hz,
            pending_hz: None,
            events,
            state_tx,
            outcome_tx,
            reading_tx,
        };

        tokio::spawn(controller.run(commands, outcome_rx, reading_rx))
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut outcomes: mpsc::UnboundedReceiver<Outcome>,
        mut readings: mpsc::UnboundedReceiver<(u64, Reading)>,
    ) {
        debug!("lifecycle controller started");

        loop {
            let deadline = self.signal.deadline();

            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Stop) | None => {
                        self.stop();
                        break;
                    }
                    Some(Command::Start { frequency_hz }) => self.start(frequency_hz),
                    Some(Command::SetFrequency { frequency_hz }) => self.set_frequency(frequency_hz),
                },

                Some(outcome) = outcomes.recv() => self.handle_outcome(outcome),

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.signal.expire(Instant::now()) {
                        debug!("shaking ended");
                        self.emit(EngineEvent::ShakingEnded);
                    }
                }

                Some((generation, reading)) = readings.recv() => self.handle_reading(generation, reading),
            }
        }

        debug!("lifecycle controller exited");
    }

    // ========================================================================
    // Commands
    // ========================================================================

    fn start(&mut self, frequency_hz: u32) {
        match &self.state {
            EngineState::Idle | EngineState::Failed(_) => self.begin_attempt(frequency_hz),
            EngineState::Running { .. } => self.set_frequency(frequency_hz),
            EngineState::Stopped => {}
            state => {
                debug_assert!(state.is_transitioning());
                self.coalesce(frequency_hz);
            }
        }
    }

    fn set_frequency(&mut self, frequency_hz: u32) {
        match &self.state {
            EngineState::Idle | EngineState::Failed(_) => {
                debug!(frequency_hz, "frequency stored for next start");
                self.frequency_hz = frequency_hz;
            }
            EngineState::Running {
                kind,
                frequency_hz: current,
            } => {
                let (kind, current) = (*kind, *current);
                if current == frequency_hz {
                    debug!(frequency_hz, "frequency unchanged");
                } else {
                    self.reconfigure(kind, current, frequency_hz);
                }
            }
            EngineState::Stopped => {}
            state => {
                debug_assert!(state.is_transitioning());
                self.coalesce(frequency_hz);
            }
        }
    }

    fn coalesce(&mut self, frequency_hz: u32) {
        debug!(
            frequency_hz,
            state = self.state.label(),
            "transition in flight, frequency coalesced"
        );
        self.pending_hz = Some(frequency_hz);
    }

    #[instrument(name = "lifecycle_begin_attempt", skip(self), fields(generation))]
    fn begin_attempt(&mut self, frequency_hz: u32) {
        self.generation += 1;
        tracing::Span::current().record("generation", self.generation);

        self.frequency_hz = frequency_hz;
        self.pending_hz = None;
        self.detector.reset();
        self.set_state(EngineState::CheckingCapability);

        let capabilities = self.platform.capabilities();
        let Some(kind) = capabilities.choose(self.prefer) else {
            self.fail(EngineError::Unsupported);
            return;
        };
        debug!(sensor_kind = %kind, ?capabilities, "sensor kind chosen");

        if !self.strategy.queries() {
            self.open(kind, self.frequency_hz);
            return;
        }

        self.set_state(EngineState::CheckingPermission { kind });

        let strategy = self.strategy.clone();
        let tx = self.outcome_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = strategy.check(kind).await;
            let _ = tx.send(Outcome::PermissionResolved {
                generation,
                kind,
                result,
            });
        });
    }

    #[instrument(name = "lifecycle_reconfigure", skip(self), fields(sensor_kind = %kind, generation))]
    fn reconfigure(&mut self, kind: SensorKind, from_hz: u32, to_hz: u32) {
        self.end_shaking();
        self.set_state(EngineState::Reconfiguring {
            kind,
            from_hz,
            to_hz,
        });

        self.release_session();
        self.detector.reset();
        self.generation += 1;
        tracing::Span::current().record("generation", self.generation);
        self.frequency_hz = to_hz;

        info!(from_hz, to_hz, "reconfiguring sensor");
        self.open(kind, to_hz);
    }

    #[instrument(name = "lifecycle_stop", skip(self), fields(generation = self.generation))]
    fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        // Outstanding transitions become stale
        self.generation += 1;
        self.pending_hz = None;
        self.signal.cancel();
        self.release_session();
        self.set_state(EngineState::Stopped);
        info!("engine stopped");
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn open(&mut self, kind: SensorKind, frequency_hz: u32) {
        self.set_state(EngineState::Opening { kind, frequency_hz });

        let platform = self.platform.clone();
        let tx = self.outcome_tx.clone();
        let generation = self.generation;
        let requested_at = Instant::now();
        tokio::spawn(async move {
            let result = platform.open(kind, frequency_hz).await;
            let outcome = Outcome::Opened {
                generation,
                kind,
                frequency_hz,
                requested_at,
                result,
            };
            // Controller gone: nobody will ever release this sensor
            if let Err(mpsc::error::SendError(Outcome::Opened {
                result: Ok(source), ..
            })) = tx.send(outcome)
            {
                source.stop();
                metrics::record_stale_session();
                debug!(generation, "sensor delivered after shutdown, stopped");
            }
        });
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PermissionResolved {
                generation,
                kind,
                result,
            } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        "stale permission answer dropped"
                    );
                    return;
                }
                match result {
                    Ok(PermissionStatus::Denied) => {
                        self.fail(EngineError::PermissionDenied { kind });
                    }
                    Err(e) => self.fail(EngineError::from(e)),
                    Ok(status) => {
                        debug!(sensor_kind = %kind, ?status, "permission resolved");
                        if let Some(frequency_hz) = self.pending_hz.take() {
                            self.frequency_hz = frequency_hz;
                        }
                        self.open(kind, self.frequency_hz);
                    }
                }
            }
            Outcome::Opened {
                generation,
                kind,
                frequency_hz,
                requested_at,
                result,
            } => {
                if generation != self.generation {
                    if let Ok(source) = result {
                        source.stop();
                        metrics::record_stale_session();
                    }
                    debug!(
                        generation,
                        current = self.generation,
                        "stale sensor open dropped"
                    );
                    return;
                }
                match result {
                    Ok(source) => {
                        metrics::record_open_latency(requested_at.elapsed());
                        self.install(source, kind, frequency_hz);
                    }
                    Err(fault) => {
                        warn!(sensor_kind = %kind, %fault, "sensor open failed");
                        self.fail(EngineError::from_fault(kind, fault));
                    }
                }
            }
        }
    }

    fn install(&mut self, source: Box<dyn SensorSource>, kind: SensorKind, frequency_hz: u32) {
        let tx = self.reading_tx.clone();
        let generation = self.generation;
        source.listen(Arc::new(move |reading| {
            let _ = tx.send((generation, reading));
        }));

        if let Err(fault) = source.start() {
            warn!(sensor_kind = %kind, %fault, "sensor start failed");
            source.stop();
            self.fail(EngineError::from_fault(kind, fault));
            return;
        }

        self.session = Some(Session {
            source,
            kind,
            frequency_hz,
        });
        metrics::record_session_opened(kind, frequency_hz);
        info!(sensor_kind = %kind, frequency_hz, generation, "sensor running");
        self.set_state(EngineState::Running { kind, frequency_hz });

        if let Some(next) = self.pending_hz.take() {
            self.set_frequency(next);
        }
    }

    fn fail(&mut self, error: EngineError) {
        warn!(error = %error, kind = error.label(), "engine attempt failed");
        self.end_shaking();
        self.release_session();
        self.pending_hz = None;
        metrics::record_engine_error(&error);
        self.set_state(EngineState::Failed(error.clone()));
        self.emit(EngineEvent::Error(error));
    }

    // ========================================================================
    // Readings
    // ========================================================================

    fn handle_reading(&mut self, generation: u64, reading: Reading) {
        let Some(session) = &self.session else {
            trace!(generation, "reading without session dropped");
            return;
        };
        if generation != self.generation {
            trace!(generation, current = self.generation, "stale reading dropped");
            return;
        }

        let (kind, frequency_hz) = (session.kind, session.frequency_hz);
        metrics::record_reading(kind);

        if !self.detector.process(reading) {
            return;
        }

        metrics::record_shake(kind);
        debug!(sensor_kind = %kind, ?reading, "shake detected");
        self.emit(EngineEvent::Shake(ShakeEvent {
            reading,
            sensor_kind: kind,
            frequency_hz,
        }));

        if self.signal.trigger(Instant::now()) {
            debug!("shaking started");
            self.emit(EngineEvent::ShakingStarted);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn end_shaking(&mut self) {
        if self.signal.cancel() {
            self.emit(EngineEvent::ShakingEnded);
        }
    }

    fn release_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.source.stop();
            debug!(
                sensor_kind = %session.kind,
                frequency_hz = session.frequency_hz,
                "sensor session released"
            );
        }
    }

    fn set_state(&mut self, state: EngineState) {
        debug!(from = self.state.label(), to = state.label(), "state transition");
        self.state = state.clone();
        self.state_tx.send_replace(state.clone());
        metrics::record_state_transition(&state);
        self.emit(EngineEvent::StateChanged(state));
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
