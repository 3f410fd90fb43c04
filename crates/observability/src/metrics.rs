//! Engine metrics
//!
//! Prometheus counters/gauges fed by the lifecycle controller, plus an
//! in-memory aggregator for end-of-run summaries.

use std::collections::HashMap;
use std::time::Duration;

use contracts::{EngineError, EngineState, SensorKind};
use metrics::{counter, gauge, histogram};

/// Record one reading delivered by the sensor
pub fn record_reading(kind: SensorKind) {
    counter!(
        "shake_counter_readings_total",
        "sensor_kind" => kind.name()
    )
    .increment(1);
}

/// Record one detected shake (rising edge)
pub fn record_shake(kind: SensorKind) {
    counter!(
        "shake_counter_shakes_total",
        "sensor_kind" => kind.name()
    )
    .increment(1);
}

/// Record a lifecycle state transition
pub fn record_state_transition(state: &EngineState) {
    counter!(
        "shake_counter_state_transitions_total",
        "state" => state.label()
    )
    .increment(1);
}

/// Record a surfaced engine error
pub fn record_engine_error(error: &EngineError) {
    counter!(
        "shake_counter_errors_total",
        "kind" => error.label()
    )
    .increment(1);
}

/// Record a newly installed sensor session
pub fn record_session_opened(kind: SensorKind, frequency_hz: u32) {
    counter!(
        "shake_counter_sessions_opened_total",
        "sensor_kind" => kind.name()
    )
    .increment(1);
    gauge!("shake_counter_frequency_hz").set(frequency_hz as f64);
}

/// Record a sensor that arrived after its attempt was abandoned
pub fn record_stale_session() {
    counter!("shake_counter_stale_sessions_total").increment(1);
}

/// Record how long an open (permission + construction) took
pub fn record_open_latency(latency: Duration) {
    histogram!("shake_counter_open_latency_ms").record(latency.as_secs_f64() * 1000.0);
}

/// In-memory session aggregator
///
/// Tracks totals and the interval between consecutive shakes.
#[derive(Debug, Clone, Default)]
pub struct ShakeMetricsAggregator {
    /// Shakes observed
    pub total_shakes: u64,

    /// Errors observed, by label
    pub errors: HashMap<&'static str, u64>,

    /// Sessions opened (including reconfigurations)
    pub sessions: u64,

    /// Interval between consecutive shakes (ms)
    pub interval_stats: RunningStats,

    last_shake_at: Option<Duration>,
}

impl ShakeMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shake observed at `elapsed` since the run started
    pub fn record_shake(&mut self, elapsed: Duration) {
        self.total_shakes += 1;
        if let Some(previous) = self.last_shake_at {
            let interval = elapsed.saturating_sub(previous);
            self.interval_stats.push(interval.as_secs_f64() * 1000.0);
        }
        self.last_shake_at = Some(elapsed);
    }

    pub fn record_error(&mut self, error: &EngineError) {
        *self.errors.entry(error.label()).or_insert(0) += 1;
    }

    pub fn record_session(&mut self) {
        self.sessions += 1;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_shakes: self.total_shakes,
            sessions: self.sessions,
            shake_interval_ms: StatsSummary::from(&self.interval_stats),
            errors: self.errors.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_shakes: u64,
    pub sessions: u64,
    pub shake_interval_ms: StatsSummary,
    pub errors: HashMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Shake Metrics Summary ===")?;
        writeln!(f, "Total shakes: {}", self.total_shakes)?;
        writeln!(f, "Sensor sessions: {}", self.sessions)?;
        writeln!(f, "Shake interval (ms): {}", self.shake_interval_ms)?;

        if !self.errors.is_empty() {
            writeln!(f, "Errors:")?;
            for (kind, count) in &self.errors {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_shake_intervals() {
        let mut aggregator = ShakeMetricsAggregator::new();
        aggregator.record_shake(Duration::from_millis(100));
        aggregator.record_shake(Duration::from_millis(400));
        aggregator.record_shake(Duration::from_millis(900));

        let summary = aggregator.summary();
        assert_eq!(summary.total_shakes, 3);
        assert_eq!(summary.shake_interval_ms.count, 2);
        assert!((summary.shake_interval_ms.min - 300.0).abs() < 1e-6);
        assert!((summary.shake_interval_ms.max - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregator_errors() {
        let mut aggregator = ShakeMetricsAggregator::new();
        aggregator.record_error(&EngineError::Unsupported);
        aggregator.record_error(&EngineError::Unsupported);
        assert_eq!(aggregator.errors.get("unsupported"), Some(&2));

        aggregator.reset();
        assert!(aggregator.errors.is_empty());
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = ShakeMetricsAggregator::new();
        aggregator.record_session();
        aggregator.record_shake(Duration::ZERO);
        aggregator.record_error(&EngineError::NotReadable {
            kind: SensorKind::Gyroscope,
        });

        let output = aggregator.summary().to_string();
        assert!(output.contains("Total shakes: 1"));
        assert!(output.contains("Sensor sessions: 1"));
        assert!(output.contains("not_readable: 1"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_reading(SensorKind::Accelerometer);
        record_shake(SensorKind::Accelerometer);
        record_state_transition(&EngineState::Idle);
        record_engine_error(&EngineError::Unsupported);
        record_session_opened(SensorKind::Gyroscope, 20);
        record_stale_session();
        record_open_latency(Duration::from_millis(3));
    }
}
