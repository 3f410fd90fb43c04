//! Permission strategies
//!
//! Injected per target platform instead of sniffing the platform inside the
//! state machine.

use std::time::Duration;

use contracts::{PermissionQuery, PermissionQueryError, PermissionStatus, SensorKind};
use tracing::debug;

/// How the controller negotiates sensor permission
#[trait_variant::make(PermissionStrategy: Send)]
pub trait LocalPermissionStrategy {
    /// Whether the platform exposes a permission query at all
    ///
    /// When `false` the controller skips `CheckingPermission` and opens directly.
    fn queries(&self) -> bool;

    /// Resolve the permission for the given sensor kind
    async fn check(&self, kind: SensorKind) -> Result<PermissionStatus, PermissionQueryError>;
}

/// No permission API on this platform: open directly
///
/// Acquisition itself may still fail and is classified there.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOpen;

impl PermissionStrategy for AlwaysOpen {
    fn queries(&self) -> bool {
        false
    }

    async fn check(&self, kind: SensorKind) -> Result<PermissionStatus, PermissionQueryError> {
        debug!(sensor_kind = %kind, "no permission api, assuming granted");
        Ok(PermissionStatus::Granted)
    }
}

/// Query the platform, refuse to open on `Denied`
#[derive(Debug, Clone)]
pub struct QueryThenGate<Q> {
    query: Q,
}

impl<Q> QueryThenGate<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }
}

impl<Q: PermissionQuery + Sync> PermissionStrategy for QueryThenGate<Q> {
    fn queries(&self) -> bool {
        true
    }

    async fn check(&self, kind: SensorKind) -> Result<PermissionStatus, PermissionQueryError> {
        self.query.query(kind).await
    }
}

/// Permission query with a fixed answer
///
/// Stands in for the platform permission API in simulations and tests.
#[derive(Debug, Clone)]
pub struct StaticPermission {
    answer: Result<PermissionStatus, PermissionQueryError>,
    delay: Duration,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self::answering(PermissionStatus::Granted)
    }

    pub fn denied() -> Self {
        Self::answering(PermissionStatus::Denied)
    }

    pub fn answering(status: PermissionStatus) -> Self {
        Self {
            answer: Ok(status),
            delay: Duration::ZERO,
        }
    }

    /// A query that itself errors
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(PermissionQueryError::new(message)),
            delay: Duration::ZERO,
        }
    }

    /// Answer only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl PermissionQuery for StaticPermission {
    async fn query(&self, kind: SensorKind) -> Result<PermissionStatus, PermissionQueryError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(sensor_kind = %kind, answer = ?self.answer, "permission query answered");
        self.answer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{AlwaysOpen, PermissionStrategy, QueryThenGate, StaticPermission};
    use contracts::{PermissionQuery, PermissionStatus, SensorKind};
    use std::time::Duration;

    #[tokio::test]
    async fn test_always_open_never_queries() {
        let strategy = AlwaysOpen;
        assert!(!strategy.queries());
        assert_eq!(
            strategy.check(SensorKind::Accelerometer).await,
            Ok(PermissionStatus::Granted)
        );
    }

    #[tokio::test]
    async fn test_query_then_gate_forwards_answer() {
        let strategy = QueryThenGate::new(StaticPermission::denied());
        assert!(strategy.queries());
        assert_eq!(
            strategy.check(SensorKind::Gyroscope).await,
            Ok(PermissionStatus::Denied)
        );
    }

    #[tokio::test]
    async fn test_failing_query() {
        let strategy = QueryThenGate::new(StaticPermission::failing("not supported"));
        let err = strategy.check(SensorKind::Accelerometer).await.unwrap_err();
        assert_eq!(err.message, "not supported");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_answer() {
        let query = StaticPermission::granted().with_delay(Duration::from_millis(50));
        let started = tokio::time::Instant::now();
        let answer = query.query(SensorKind::Accelerometer).await;
        assert_eq!(answer, Ok(PermissionStatus::Granted));
        assert_eq!(started.elapsed(), Duration::from_millis(50));
    }
}
