//! Sensor platform and permission strategy selection.

use std::path::PathBuf;

use contracts::{
    Capabilities, PermissionMode, PermissionQueryError, PermissionStatus, SensorFault, SensorKind,
    SensorPlatform, SensorSource,
};
use sensor_lifecycle::{
    AlwaysOpen, PermissionStrategy, QueryThenGate, ReplayConfig, ReplayPlatform,
    SimulatedConfig, SimulatedPlatform, StaticPermission,
};
use tracing::info;

use crate::cli::PermissionArg;
use crate::error::{CliError, Result};

/// Reading source of a session
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Simulated,
    Replay {
        path: Option<PathBuf>,
        speed: f64,
        loop_playback: bool,
    },
}

/// Platform chosen at startup
#[derive(Debug, Clone)]
pub enum SessionPlatform {
    Simulated(SimulatedPlatform),
    Replay(ReplayPlatform),
}

impl SensorPlatform for SessionPlatform {
    fn capabilities(&self) -> Capabilities {
        match self {
            Self::Simulated(platform) => platform.capabilities(),
            Self::Replay(platform) => platform.capabilities(),
        }
    }

    async fn open(
        &self,
        kind: SensorKind,
        frequency_hz: u32,
    ) -> std::result::Result<Box<dyn SensorSource>, SensorFault> {
        match self {
            Self::Simulated(platform) => platform.open(kind, frequency_hz).await,
            Self::Replay(platform) => platform.open(kind, frequency_hz).await,
        }
    }
}

/// Permission strategy chosen at startup
#[derive(Debug, Clone)]
pub enum SessionPermission {
    Open(AlwaysOpen),
    Query(QueryThenGate<StaticPermission>),
}

impl PermissionStrategy for SessionPermission {
    fn queries(&self) -> bool {
        match self {
            Self::Open(strategy) => strategy.queries(),
            Self::Query(strategy) => strategy.queries(),
        }
    }

    async fn check(
        &self,
        kind: SensorKind,
    ) -> std::result::Result<PermissionStatus, PermissionQueryError> {
        match self {
            Self::Open(strategy) => strategy.check(kind).await,
            Self::Query(strategy) => strategy.check(kind).await,
        }
    }
}

/// Build the sensor platform for a session
pub fn build_platform(source: &SourceConfig, prefer: SensorKind) -> Result<SessionPlatform> {
    match source {
        SourceConfig::Simulated => {
            info!("Using simulated motion sensor");
            Ok(SessionPlatform::Simulated(SimulatedPlatform::new(
                SimulatedConfig::default(),
            )))
        }
        SourceConfig::Replay {
            path,
            speed,
            loop_playback,
        } => {
            let path = path.as_ref().ok_or(CliError::ReplayPathMissing)?;
            info!(path = %path.display(), speed, loop_playback, "Using replayed recording");
            let platform = ReplayPlatform::load(
                path,
                ReplayConfig {
                    speed: *speed,
                    loop_playback: *loop_playback,
                    kind: prefer,
                },
            )?;
            Ok(SessionPlatform::Replay(platform))
        }
    }
}

/// Build the permission strategy
///
/// An explicit CLI answer wins over the configured mode.
pub fn build_permission(arg: Option<PermissionArg>, mode: PermissionMode) -> SessionPermission {
    let answer = match (arg, mode) {
        (Some(PermissionArg::Unavailable), _) | (None, PermissionMode::AlwaysOpen) => {
            return SessionPermission::Open(AlwaysOpen);
        }
        (None, PermissionMode::Query) | (Some(PermissionArg::Granted), _) => {
            StaticPermission::granted()
        }
        (Some(PermissionArg::Denied), _) => StaticPermission::denied(),
        (Some(PermissionArg::Unknown), _) => StaticPermission::answering(PermissionStatus::Unknown),
        (Some(PermissionArg::Error), _) => StaticPermission::failing("permission query failed"),
    };
    SessionPermission::Query(QueryThenGate::new(answer))
}
