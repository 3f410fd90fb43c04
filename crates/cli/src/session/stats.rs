//! Session statistics.

use std::time::Duration;

use contracts::{EngineEvent, EngineState, ShakeCounter};
use observability::ShakeMetricsAggregator;

/// Statistics from one session
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Caller-owned count (reset by the `reset` console command)
    pub counter: ShakeCounter,

    /// Shakes over the whole session, regardless of resets
    pub metrics: ShakeMetricsAggregator,

    /// Times the shaking indicator switched on
    pub shaking_episodes: u64,

    /// Total duration of the session
    pub duration: Duration,

    /// Engine state when the session ended
    pub final_state: EngineState,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            counter: ShakeCounter::new(),
            metrics: ShakeMetricsAggregator::new(),
            shaking_episodes: 0,
            duration: Duration::ZERO,
            final_state: EngineState::Idle,
        }
    }
}

impl SessionStats {
    /// Fold one engine event into the statistics
    ///
    /// Returns the new count when the event was a shake.
    pub fn observe(&mut self, event: &EngineEvent, elapsed: Duration) -> Option<u64> {
        match event {
            EngineEvent::Shake(_) => self.metrics.record_shake(elapsed),
            EngineEvent::ShakingStarted => self.shaking_episodes += 1,
            EngineEvent::StateChanged(state) => {
                if state.is_running() {
                    self.metrics.record_session();
                }
                self.final_state = state.clone();
            }
            EngineEvent::Error(error) => self.metrics.record_error(error),
            EngineEvent::ShakingEnded => {}
        }
        self.counter.observe(event)
    }

    /// Shakes per minute over the session
    pub fn shakes_per_minute(&self) -> f64 {
        let minutes = self.duration.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.metrics.total_shakes as f64 / minutes
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Shake Counter Summary                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Count: {}", self.counter.get());
        println!("   ├─ Total shakes: {}", self.metrics.total_shakes);
        println!("   ├─ Shakes/min: {:.1}", self.shakes_per_minute());
        println!("   ├─ Shaking episodes: {}", self.shaking_episodes);
        println!("   └─ Final state: {}", self.final_state);

        println!("\n{}", self.metrics.summary());
    }
}
