//! Replay sensor platform
//!
//! Plays back a JSONL recording of readings, one object per line:
//!
//! ```text
//! {"t": 0.00, "x": 0.1, "y": 0.0, "z": 9.81}
//! {"t": 0.05, "x": 34.2, "y": 1.3, "z": 9.75}
//! ```
//!
//! `t` (seconds) is optional and informational; playback is paced by the
//! session frequency so reconfiguration behaves as on a live sensor.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{
    Capabilities, Reading, ReadingCallback, SensorFault, SensorKind, SensorPlatform, SensorSource,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::ReplayError;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Playback speed multiplier (1.0 = session frequency)
    pub speed: f64,
    /// Restart from the first reading after the last
    pub loop_playback: bool,
    /// Sensor kind the recording was captured with
    pub kind: SensorKind,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            loop_playback: false,
            kind: SensorKind::Accelerometer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadingRecord {
    #[serde(default)]
    t: Option<f64>,
    x: f64,
    y: f64,
    z: f64,
}

/// Loaded recording
#[derive(Debug, Clone, Default)]
pub struct Recording {
    readings: Vec<Reading>,
    duration_secs: Option<f64>,
}

impl Recording {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings,
            duration_secs: None,
        }
    }

    /// Load a JSONL recording from disk
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        let recording = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            readings = recording.len(),
            duration_secs = ?recording.duration_secs,
            "recording loaded"
        );
        Ok(recording)
    }

    /// Parse a JSONL recording; blank lines are skipped
    pub fn from_reader(reader: impl BufRead) -> Result<Self, ReplayError> {
        let mut readings = Vec::new();
        let mut first_t = None;
        let mut last_t = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: ReadingRecord = serde_json::from_str(trimmed)
                .map_err(|e| ReplayError::parse(index + 1, e.to_string()))?;
            if let Some(t) = record.t {
                first_t.get_or_insert(t);
                last_t = Some(t);
            }
            readings.push(Reading::new(record.x, record.y, record.z));
        }

        if readings.is_empty() {
            return Err(ReplayError::Empty);
        }

        Ok(Self {
            readings,
            duration_secs: first_t.zip(last_t).map(|(first, last)| last - first),
        })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Span of the recorded timestamps, if the recording carries them
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

/// Replay platform
///
/// Exposes only the recorded sensor kind.
#[derive(Debug, Clone)]
pub struct ReplayPlatform {
    recording: Arc<Recording>,
    config: ReplayConfig,
}

impl ReplayPlatform {
    pub fn new(recording: Recording, config: ReplayConfig) -> Self {
        Self {
            recording: Arc::new(recording),
            config,
        }
    }

    pub fn load(path: &Path, config: ReplayConfig) -> Result<Self, ReplayError> {
        Ok(Self::new(Recording::load(path)?, config))
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }
}

impl SensorPlatform for ReplayPlatform {
    fn capabilities(&self) -> Capabilities {
        match self.config.kind {
            SensorKind::Accelerometer => Capabilities {
                accelerometer: true,
                gyroscope: false,
            },
            SensorKind::Gyroscope => Capabilities {
                accelerometer: false,
                gyroscope: true,
            },
        }
    }

    #[instrument(name = "replay_platform_open", skip(self), fields(sensor_kind = %kind, frequency_hz))]
    async fn open(
        &self,
        kind: SensorKind,
        frequency_hz: u32,
    ) -> Result<Box<dyn SensorSource>, SensorFault> {
        if kind != self.config.kind {
            return Err(SensorFault::not_readable(format!(
                "recording holds {} data",
                self.config.kind
            )));
        }
        if self.recording.is_empty() {
            return Err(SensorFault::not_readable("recording contains no readings"));
        }
        Ok(Box::new(ReplaySensor {
            kind,
            frequency_hz: frequency_hz.max(1),
            recording: self.recording.clone(),
            config: self.config.clone(),
            callback: Arc::new(Mutex::new(None)),
            listening: Arc::new(AtomicBool::new(false)),
        }))
    }
}

/// Replay sensor
pub struct ReplaySensor {
    kind: SensorKind,
    frequency_hz: u32,
    recording: Arc<Recording>,
    config: ReplayConfig,
    callback: Arc<Mutex<Option<ReadingCallback>>>,
    listening: Arc<AtomicBool>,
}

impl SensorSource for ReplaySensor {
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
        let speed = if self.config.speed > 0.0 {
            self.config.speed
        } else {
            1.0
        };
        let interval = Duration::try_from_secs_f64(1.0 / (f64::from(self.frequency_hz) * speed))
            .map_err(|err| {
                SensorFault::other("RangeError", format!("replay interval at speed {speed}: {err}"))
            })?;

        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let recording = self.recording.clone();
        let callback = self.callback.clone();
        let listening = self.listening.clone();
        let loop_playback = self.config.loop_playback;

        thread::spawn(move || {
            debug!(readings = recording.len(), "replay started");

            'playback: loop {
                for reading in recording.readings() {
                    if !listening.load(Ordering::Relaxed) {
                        break 'playback;
                    }
                    let current = callback.lock().ok().and_then(|slot| slot.clone());
                    if let Some(callback) = current {
                        callback(*reading);
                    }
                    thread::sleep(interval);
                }
                if !loop_playback {
                    break;
                }
            }

            listening.store(false, Ordering::SeqCst);
            debug!("replay finished");
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

impl Drop for ReplaySensor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const RECORDING: &str = r#"{"t": 0.0, "x": 0.0, "y": 0.0, "z": 9.81}
{"t": 0.05, "x": 30.0, "y": 0.0, "z": 9.81}

{"t": 0.10, "x": -30.0, "y": 0.0, "z": 9.81}
{"x": 0.0, "y": 0.0, "z": 9.81}
"#;

    #[test]
    fn test_parse_recording() {
        let recording = Recording::from_reader(Cursor::new(RECORDING)).unwrap();
        assert_eq!(recording.len(), 4);
        assert_eq!(recording.readings()[1], Reading::new(30.0, 0.0, 9.81));
        let duration = recording.duration_secs().unwrap();
        assert!((duration - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"x\": 1, \"y\": 2, \"z\": 3}\n{\"x\": 1}\n";
        let err = Recording::from_reader(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_recording() {
        let err = Recording::from_reader(Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(err, ReplayError::Empty));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RECORDING.as_bytes()).unwrap();
        let platform = ReplayPlatform::load(file.path(), ReplayConfig::default()).unwrap();
        assert_eq!(platform.recording().len(), 4);
        assert!(platform.capabilities().accelerometer);
        assert!(!platform.capabilities().gyroscope);
    }

    #[test]
    fn test_missing_file() {
        let err = Recording::load(Path::new("/nonexistent/recording.jsonl")).unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }

    #[tokio::test]
    async fn test_playback_delivers_every_reading() {
        let recording = Recording::from_reader(Cursor::new(RECORDING)).unwrap();
        let platform = ReplayPlatform::new(recording, ReplayConfig::default());
        let sensor = platform.open(SensorKind::Accelerometer, 200).await.unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        sensor.listen(Arc::new(move |reading| {
            sink.lock().unwrap().push(reading);
        }));
        sensor.start().unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!sensor.is_listening(), "playback should have finished");
        assert_eq!(received.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unrepresentable_interval_is_a_fault() {
        let recording = Recording::from_reader(Cursor::new(RECORDING)).unwrap();
        let config = ReplayConfig {
            speed: 1e-300,
            ..ReplayConfig::default()
        };
        let platform = ReplayPlatform::new(recording, config);
        let sensor = platform.open(SensorKind::Accelerometer, 20).await.unwrap();

        let err = sensor.start().unwrap_err();
        assert_eq!(err.kind, contracts::FaultKind::Other("RangeError".into()));
        assert!(!sensor.is_listening());
    }

    #[tokio::test]
    async fn test_wrong_kind_is_not_readable() {
        let recording = Recording::from_reader(Cursor::new(RECORDING)).unwrap();
        let platform = ReplayPlatform::new(recording, ReplayConfig::default());
        let err = platform.open(SensorKind::Gyroscope, 20).await.err().unwrap();
        assert_eq!(err.kind, contracts::FaultKind::NotReadable);
    }
}
