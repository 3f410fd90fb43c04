//! Debounced "shaking" indicator
//!
//! A cancellable deadline owned by the controller. Every trigger re-arms the
//! deadline; the indicator drops only after a full window without a trigger.

use std::time::Duration;

use tokio::time::Instant;

/// Shaking indicator state
#[derive(Debug, Clone)]
pub struct ShakingSignal {
    window: Duration,
    deadline: Option<Instant>,
}

impl ShakingSignal {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Register a trigger at `now`
    ///
    /// Returns `true` if the indicator was off and just switched on.
    pub fn trigger(&mut self, now: Instant) -> bool {
        let started = self.deadline.is_none();
        self.deadline = Some(now + self.window);
        started
    }

    /// Switch off if the deadline has passed
    ///
    /// Returns `true` if the indicator was on and just switched off.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending deadline
    ///
    /// Returns `true` if the indicator was on.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_single_trigger() {
        let t0 = Instant::now();
        let mut signal = ShakingSignal::new(WINDOW);

        assert!(signal.trigger(t0));
        assert_eq!(signal.deadline(), Some(t0 + WINDOW));
        assert!(!signal.expire(t0 + Duration::from_millis(299)));
        assert!(signal.expire(t0 + WINDOW));
        assert!(signal.deadline().is_none());
    }

    #[test]
    fn test_retrigger_extends_window() {
        let t0 = Instant::now();
        let mut signal = ShakingSignal::new(WINDOW);

        assert!(signal.trigger(t0));
        assert!(!signal.trigger(t0 + Duration::from_millis(150)));
        assert!(!signal.expire(t0 + WINDOW));
        assert_eq!(signal.deadline(), Some(t0 + Duration::from_millis(450)));
        assert!(signal.expire(t0 + Duration::from_millis(450)));
    }

    #[test]
    fn test_cancel() {
        let mut signal = ShakingSignal::new(WINDOW);
        assert!(!signal.cancel());
        signal.trigger(Instant::now());
        assert!(signal.cancel());
        assert!(signal.deadline().is_none());
    }
}
