//! Scripted sensor platform
//!
//! Test double for `SensorPlatform`: readings are pushed by the test through
//! a [`SensorProbe`], and capability gaps, open delays and faults can be injected.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use contracts::{
    Capabilities, Reading, ReadingCallback, SensorFault, SensorKind, SensorPlatform, SensorSource,
};
use tracing::{instrument, trace};

/// Scripted platform configuration
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Capability probe answer
    pub capabilities: Capabilities,
    /// Delay before `open` resolves
    pub open_delay: Duration,
    /// Faults returned by successive `open` calls; empty = succeed
    pub open_faults: VecDeque<SensorFault>,
    /// Fault returned by `start` of every constructed sensor
    pub start_fault: Option<SensorFault>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::all(),
            open_delay: Duration::ZERO,
            open_faults: VecDeque::new(),
            start_fault: None,
        }
    }
}

/// Scripted platform
///
/// Clones share the same script and sensor list, so a test keeps one clone
/// while the engine owns another.
#[derive(Clone, Default)]
pub struct ScriptedPlatform {
    inner: Arc<ScriptedInner>,
}

#[derive(Default)]
struct ScriptedInner {
    config: Mutex<ScriptConfig>,
    open_calls: AtomicUsize,
    sensors: Mutex<Vec<SensorProbe>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScriptConfig) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                config: Mutex::new(config),
                ..Default::default()
            }),
        }
    }

    /// Number of `open` calls so far (including failed ones)
    pub fn open_calls(&self) -> usize {
        self.inner.open_calls.load(Ordering::SeqCst)
    }

    /// Probes of every successfully constructed sensor, in order
    pub fn sensors(&self) -> Vec<SensorProbe> {
        lock(&self.inner.sensors).clone()
    }

    /// Probe of the most recently constructed sensor
    pub fn latest(&self) -> Option<SensorProbe> {
        lock(&self.inner.sensors).last().cloned()
    }

    /// Queue a fault for the next `open` call
    pub fn fail_next_open(&self, fault: SensorFault) {
        lock(&self.inner.config).open_faults.push_back(fault);
    }
}

impl SensorPlatform for ScriptedPlatform {
    fn capabilities(&self) -> Capabilities {
        lock(&self.inner.config).capabilities
    }

    #[instrument(name = "scripted_platform_open", skip(self), fields(sensor_kind = %kind, frequency_hz))]
    async fn open(
        &self,
        kind: SensorKind,
        frequency_hz: u32,
    ) -> Result<Box<dyn SensorSource>, SensorFault> {
        self.inner.open_calls.fetch_add(1, Ordering::SeqCst);

        let (delay, fault, start_fault) = {
            let mut config = lock(&self.inner.config);
            (
                config.open_delay,
                config.open_faults.pop_front(),
                config.start_fault.clone(),
            )
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(fault) = fault {
            return Err(fault);
        }

        let probe = SensorProbe {
            inner: Arc::new(ProbeInner {
                kind,
                frequency_hz,
                start_fault,
                callback: Mutex::new(None),
                listening: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
        };
        lock(&self.inner.sensors).push(probe.clone());

        Ok(Box::new(ScriptedSensor { probe }))
    }
}

struct ProbeInner {
    kind: SensorKind,
    frequency_hz: u32,
    start_fault: Option<SensorFault>,
    callback: Mutex<Option<ReadingCallback>>,
    listening: AtomicBool,
    stopped: AtomicBool,
}

/// Test-side handle on one scripted sensor
#[derive(Clone)]
pub struct SensorProbe {
    inner: Arc<ProbeInner>,
}

impl SensorProbe {
    /// Deliver a reading, as the hardware would
    ///
    /// Returns `false` if the sensor is not listening (nothing delivered).
    pub fn emit(&self, reading: Reading) -> bool {
        if !self.inner.listening.load(Ordering::SeqCst) {
            return false;
        }
        let callback = lock(&self.inner.callback).clone();
        match callback {
            Some(callback) => {
                trace!(?reading, "scripted reading");
                callback(reading);
                true
            }
            None => false,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.inner.kind
    }

    pub fn frequency_hz(&self) -> u32 {
        self.inner.frequency_hz
    }

    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::SeqCst)
    }

    /// Whether `stop` has been called at least once
    pub fn was_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }
}

struct ScriptedSensor {
    probe: SensorProbe,
}

impl SensorSource for ScriptedSensor {
    fn kind(&self) -> SensorKind {
        self.probe.inner.kind
    }

    fn frequency_hz(&self) -> u32 {
        self.probe.inner.frequency_hz
    }

    fn listen(&self, callback: ReadingCallback) {
        *lock(&self.probe.inner.callback) = Some(callback);
    }

    fn start(&self) -> Result<(), SensorFault> {
        if let Some(fault) = &self.probe.inner.start_fault {
            return Err(fault.clone());
        }
        self.probe.inner.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.probe.inner.listening.store(false, Ordering::SeqCst);
        self.probe.inner.stopped.store(true, Ordering::SeqCst);
        lock(&self.probe.inner.callback).take();
    }

    fn is_listening(&self) -> bool {
        self.probe.is_listening()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
