//! Permission query contract

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SensorKind;

/// Answer of a permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The platform has not decided yet (prompt pending)
    Unknown,
}

/// The permission query itself failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PermissionQueryError {
    pub message: String,
}

impl PermissionQueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Platform permission query API
///
/// Only some platforms expose one; where none exists the engine skips the
/// check and lets acquisition itself fail.
#[trait_variant::make(PermissionQuery: Send)]
pub trait LocalPermissionQuery {
    /// Query the permission state for the given sensor kind
    async fn query(&self, kind: SensorKind) -> Result<PermissionStatus, PermissionQueryError>;
}
