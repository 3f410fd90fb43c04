//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::EngineConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    source: String,
    config: EngineConfig,
    engine: EngineInfo,
}

#[derive(Serialize)]
struct EngineInfo {
    version: &'static str,
    sensor_fallback: String,
    event_channel_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    if let Some(path) = &args.config {
        info!(config = %path.display(), "Loading configuration info");
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
    }

    let config = config_loader::ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let info = build_config_info(config, args);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info)?;
    }

    Ok(())
}

fn build_config_info(config: EngineConfig, args: &InfoArgs) -> ConfigInfo {
    let prefer = config.sensor.prefer;
    ConfigInfo {
        source: args
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string()),
        config,
        engine: EngineInfo {
            version: env!("CARGO_PKG_VERSION"),
            sensor_fallback: format!("{} -> {}", prefer, prefer.fallback()),
            event_channel_capacity: sensor_lifecycle::EVENT_CHANNEL_CAPACITY,
        },
    }
}

fn print_config_info(info: &ConfigInfo) -> Result<()> {
    println!("\n=== Shake Counter Configuration ===\n");
    println!("Source: {}", info.source);
    println!("Version: {}", info.engine.version);
    println!("Sensor order: {}", info.engine.sensor_fallback);
    println!(
        "Event channel capacity: {}\n",
        info.engine.event_channel_capacity
    );

    let toml = config_loader::ConfigLoader::to_toml(&info.config)
        .context("Failed to render configuration")?;
    println!("{}", toml);
    Ok(())
}
