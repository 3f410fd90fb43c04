//! Simulated motion sensor platform
//!
//! Generates a synthetic waveform in a background thread at the session
//! frequency: a resting device (gravity on z) with periodic shake bursts
//! where x swings between +35 and -35 in blocks of two samples.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{
    Capabilities, Reading, ReadingCallback, SensorFault, SensorKind, SensorPlatform, SensorSource,
};
use tracing::{debug, instrument, trace};

const GRAVITY: f64 = 9.81;
const BURST_AMPLITUDE: f64 = 35.0;
const RESTING_JITTER: f64 = 0.3;

/// Simulated platform configuration
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Capability probe answer
    pub capabilities: Capabilities,
    /// Delay before `open` resolves
    pub open_delay: Duration,
    /// Fault returned by `open`
    pub open_fault: Option<SensorFault>,
    /// Fault returned by `start`
    pub start_fault: Option<SensorFault>,
    /// Time between the starts of two shake bursts
    pub burst_period: Duration,
    /// Length of one shake burst
    pub burst_length: Duration,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::all(),
            open_delay: Duration::from_millis(50),
            open_fault: None,
            start_fault: None,
            burst_period: Duration::from_secs(3),
            burst_length: Duration::from_millis(600),
        }
    }
}

/// Simulated platform
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlatform {
    config: SimulatedConfig,
}

impl SimulatedPlatform {
    pub fn new(config: SimulatedConfig) -> Self {
        Self { config }
    }
}

impl SensorPlatform for SimulatedPlatform {
    fn capabilities(&self) -> Capabilities {
        self.config.capabilities
    }

    #[instrument(name = "simulated_platform_open", skip(self), fields(sensor_kind = %kind, frequency_hz))]
    async fn open(
        &self,
        kind: SensorKind,
        frequency_hz: u32,
    ) -> Result<Box<dyn SensorSource>, SensorFault> {
        if !self.config.open_delay.is_zero() {
            tokio::time::sleep(self.config.open_delay).await;
        }
        if let Some(fault) = &self.config.open_fault {
            return Err(fault.clone());
        }
        Ok(Box::new(SimulatedSensor::new(
            kind,
            frequency_hz,
            self.config.clone(),
        )))
    }
}

/// Simulated sensor
///
/// Readings are produced on a dedicated thread between `start` and `stop`.
pub struct SimulatedSensor {
    kind: SensorKind,
    frequency_hz: u32,
    config: SimulatedConfig,
    callback: Arc<Mutex<Option<ReadingCallback>>>,
    listening: Arc<AtomicBool>,
}

impl SimulatedSensor {
    pub fn new(kind: SensorKind, frequency_hz: u32, config: SimulatedConfig) -> Self {
        Self {
            kind,
            frequency_hz: frequency_hz.max(1),
            config,
            callback: Arc::new(Mutex::new(None)),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sample `index` of the waveform
    pub fn sample(
        kind: SensorKind,
        frequency_hz: u32,
        config: &SimulatedConfig,
        index: u64,
    ) -> Reading {
        let per_sample = 1.0 / f64::from(frequency_hz.max(1));
        let period = samples(config.burst_period, per_sample).max(1);
        let burst = samples(config.burst_length, per_sample).min(period);
        let phase = index % period;

        let rest_z = match kind {
            SensorKind::Accelerometer => GRAVITY,
            SensorKind::Gyroscope => 0.0,
        };

        if phase < burst {
            let x = if (phase / 2) % 2 == 0 {
                BURST_AMPLITUDE
            } else {
                -BURST_AMPLITUDE
            };
            Reading::new(x, 0.0, rest_z)
        } else {
            let t = index as f64 * per_sample;
            Reading::new(
                RESTING_JITTER * (t * 5.0).sin(),
                RESTING_JITTER * (t * 3.0).cos(),
                rest_z,
            )
        }
    }
}

fn samples(duration: Duration, per_sample: f64) -> u64 {
    (duration.as_secs_f64() / per_sample).round() as u64
}

impl SensorSource for SimulatedSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    fn listen(&self, callback: ReadingCallback) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = Some(callback);
        }
    }

    fn start(&self) -> Result<(), SensorFault> {
        if let Some(fault) = &self.config.start_fault {
            return Err(fault.clone());
        }
        // Already producing
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let kind = self.kind;
        let frequency_hz = self.frequency_hz;
        let config = self.config.clone();
        let callback = self.callback.clone();
        let listening = self.listening.clone();
        let interval = Duration::from_secs_f64(1.0 / f64::from(frequency_hz));

        thread::spawn(move || {
            let mut index: u64 = 0;
            debug!(sensor_kind = %kind, frequency_hz, "simulated sensor started");

            while listening.load(Ordering::Relaxed) {
                let reading = Self::sample(kind, frequency_hz, &config, index);
                let current = callback.lock().ok().and_then(|slot| slot.clone());
                if let Some(callback) = current {
                    callback(reading);
                }
                trace!(index, ?reading, "simulated reading");
                index += 1;
                thread::sleep(interval);
            }

            debug!(sensor_kind = %kind, "simulated sensor stopped");
        });

        Ok(())
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.callback.lock() {
            slot.take();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        self.stop();
    }
}
