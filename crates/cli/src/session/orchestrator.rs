//! Session orchestrator - runs one engine until quit, timeout or shutdown.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{EngineConfig, EngineEvent};
use sensor_lifecycle::ShakeEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{build_permission, build_platform, ConsoleCommand, SessionStats, SourceConfig};
use crate::cli::PermissionArg;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Engine configuration (file or defaults)
    pub engine: EngineConfig,

    /// Initial sampling frequency
    pub frequency_hz: u32,

    /// Reading source
    pub source: SourceConfig,

    /// Explicit permission answer (None = configured mode)
    pub permission: Option<PermissionArg>,

    /// Session duration (None = until quit/shutdown)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Read console commands from stdin
    pub interactive: bool,
}

/// One shake counter session
pub struct Session {
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run until `quit`, the configured duration, an engine failure or `shutdown`
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<SessionStats> {
        let config = &self.config;

        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let platform = build_platform(&config.source, config.engine.sensor.prefer)
            .context("Failed to prepare sensor source")?;
        let permission = build_permission(config.permission, config.engine.permission.mode);

        let engine = ShakeEngine::spawn(platform, permission, &config.engine);
        let mut events = engine.subscribe();
        engine
            .start(config.frequency_hz)
            .context("Failed to start engine")?;

        info!(frequency_hz = config.frequency_hz, "Engine started");
        if config.interactive {
            println!("Commands: reset | freq <hz> | quit");
        }

        let started = Instant::now();
        let mut stats = SessionStats::default();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = config.interactive;

        let timeout = async {
            match config.duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping engine...");
                    break;
                }

                _ = &mut timeout => {
                    info!("Session duration elapsed");
                    break;
                }

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match ConsoleCommand::parse(&line) {
                        Ok(ConsoleCommand::Quit) => break,
                        Ok(ConsoleCommand::Reset) => {
                            stats.counter.reset();
                            println!("Count: 0");
                        }
                        Ok(ConsoleCommand::Frequency(hz)) => match engine.set_frequency(hz) {
                            Ok(()) => info!(frequency_hz = hz, "Frequency change requested"),
                            Err(e) => println!("{e}"),
                        },
                        Ok(ConsoleCommand::Empty) => {}
                        Err(e) => println!("{e}"),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!(error = %e, "Console input unavailable");
                        stdin_open = false;
                    }
                },

                event = events.recv() => match event {
                    Ok(event) => {
                        let failed = matches!(event, EngineEvent::Error(_));
                        report(&event, stats.observe(&event, started.elapsed()));
                        if failed {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        engine.shutdown().await;
        stats.duration = started.elapsed();

        info!(
            count = stats.counter.get(),
            total_shakes = stats.metrics.total_shakes,
            duration_secs = stats.duration.as_secs_f64(),
            "Session finished"
        );

        Ok(stats)
    }
}

fn report(event: &EngineEvent, count: Option<u64>) {
    match event {
        EngineEvent::Shake(_) => {
            if let Some(count) = count {
                println!("Count: {count}");
            }
        }
        EngineEvent::ShakingStarted => println!("Shaking..."),
        EngineEvent::ShakingEnded => println!("Still"),
        EngineEvent::StateChanged(state) => info!(state = %state, "Engine state"),
        EngineEvent::Error(error) => eprintln!("Error: {error}"),
    }
}
