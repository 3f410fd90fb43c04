//! Engine error taxonomy
//!
//! Every failure the lifecycle controller can report. All variants are
//! terminal for the current attempt; recovery is an explicit new `start`.

use thiserror::Error;

use crate::{FaultKind, PermissionQueryError, SensorFault, SensorKind};

/// Engine failure, as surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Neither accelerometer nor gyroscope exists
    #[error("your device does not support accelerometer and gyroscope")]
    Unsupported,

    /// Permission query answered `denied`
    #[error("usage of {kind} is not allowed, please allow access")]
    PermissionDenied { kind: SensorKind },

    /// Platform security restriction on acquisition
    #[error("access to the device's motion sensors is blocked, please allow access")]
    AccessBlocked { kind: SensorKind },

    /// Sensor present but its data cannot be read
    #[error("unable to access {kind} sensor data, try restarting the device")]
    NotReadable { kind: SensorKind },

    /// Any other acquisition or subscription failure
    #[error("error accessing {kind}: {message}")]
    Other { kind: SensorKind, message: String },

    /// The permission query itself errored
    #[error("error checking permission: {message}")]
    PermissionQueryFailed { message: String },
}

impl EngineError {
    /// Classify a native sensor fault
    pub fn from_fault(kind: SensorKind, fault: SensorFault) -> Self {
        match fault.kind {
            FaultKind::Security | FaultKind::NotAllowed => Self::AccessBlocked { kind },
            FaultKind::NotReadable => Self::NotReadable { kind },
            FaultKind::Other(_) => Self::Other {
                kind,
                message: fault.message,
            },
        }
    }

    /// Stable label (used for metrics and logs)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::AccessBlocked { .. } => "access_blocked",
            Self::NotReadable { .. } => "not_readable",
            Self::Other { .. } => "other",
            Self::PermissionQueryFailed { .. } => "permission_query_failed",
        }
    }
}

impl From<PermissionQueryError> for EngineError {
    fn from(err: PermissionQueryError) -> Self {
        Self::PermissionQueryFailed {
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_and_not_allowed_are_access_blocked() {
        for fault in [
            SensorFault::security("blocked by policy"),
            SensorFault::not_allowed("user agent refused"),
        ] {
            assert_eq!(
                EngineError::from_fault(SensorKind::Accelerometer, fault),
                EngineError::AccessBlocked {
                    kind: SensorKind::Accelerometer
                }
            );
        }
    }

    #[test]
    fn test_not_readable() {
        let err = EngineError::from_fault(SensorKind::Gyroscope, SensorFault::not_readable("x"));
        assert_eq!(
            err,
            EngineError::NotReadable {
                kind: SensorKind::Gyroscope
            }
        );
        assert!(err.to_string().contains("Gyroscope"));
    }

    #[test]
    fn test_other_keeps_message_verbatim() {
        let err = EngineError::from_fault(
            SensorKind::Accelerometer,
            SensorFault::other("TypeError", "frequency out of range"),
        );
        assert_eq!(
            err.to_string(),
            "error accessing Accelerometer: frequency out of range"
        );
        assert_eq!(err.label(), "other");
    }

    #[test]
    fn test_permission_query_error_conversion() {
        let err: EngineError = PermissionQueryError::new("query rejected").into();
        assert_eq!(err.to_string(), "error checking permission: query rejected");
    }
}
