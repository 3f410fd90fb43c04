//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::cli::{RunArgs, SourceKind};
use crate::error::CliError;
use crate::session::{Session, SessionConfig, SourceConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    let engine_config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            contracts::EngineConfig::default()
        }
    };

    let frequency_hz = match args.frequency {
        Some(hz) => {
            info!(frequency_hz = hz, "Overriding sampling frequency from CLI");
            hz
        }
        None => engine_config.sensor.frequency_hz,
    };

    info!(
        frequency_hz,
        prefer = %engine_config.sensor.prefer,
        threshold = engine_config.detector.threshold,
        shaking_window_ms = engine_config.signal.shaking_window_ms,
        permission_mode = ?engine_config.permission.mode,
        "Configuration loaded"
    );

    let source = match args.source {
        SourceKind::Simulated => SourceConfig::Simulated,
        SourceKind::Replay => SourceConfig::Replay {
            path: args.replay.clone(),
            speed: args.replay_speed,
            loop_playback: args.replay_loop,
        },
    };

    let session = Session::new(SessionConfig {
        engine: engine_config,
        frequency_hz,
        source,
        permission: args.permission,
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        interactive: true,
    });

    let stats = session
        .run(shutdown_signal())
        .await
        .context("Session failed")?;

    stats.print_summary();

    if let contracts::EngineState::Failed(error) = &stats.final_state {
        anyhow::bail!("Engine failed: {error}");
    }

    info!("Shake Counter finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that branch never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
