//! Stateful shake detector.

use contracts::{Reading, DEFAULT_SHAKE_THRESHOLD};
use tracing::{instrument, trace};

use crate::state::{step, DetectorState};

/// Diagnostic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorStats {
    /// Readings processed since the last reset
    pub readings: u64,
    /// Rising edges emitted since the last reset
    pub shakes: u64,
}

/// Shake detector
///
/// One instance per engine. Owns a `DetectorState` and feeds it through
/// [`step`] on every reading.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    threshold: f64,
    state: DetectorState,
    stats: DetectorStats,
}

impl ShakeDetector {
    /// Create a detector with the given per-axis threshold
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: DetectorState::new(),
            stats: DetectorStats::default(),
        }
    }

    /// Process one reading
    ///
    /// Returns `true` exactly on a new rising edge.
    #[instrument(
        level = "trace",
        name = "shake_detector_process",
        skip(self),
        fields(x = reading.x, y = reading.y, z = reading.z)
    )]
    pub fn process(&mut self, reading: Reading) -> bool {
        let (next, rising_edge) = step(self.state, reading, self.threshold);
        self.state = next;
        self.stats.readings += 1;

        if rising_edge {
            self.stats.shakes += 1;
            trace!(shakes = self.stats.shakes, "rising edge");
        }

        rising_edge
    }

    /// Zero the previous reading and the trigger flag
    pub fn reset(&mut self) {
        self.state = DetectorState::new();
        self.stats = DetectorStats::default();
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SHAKE_THRESHOLD)
    }
}
