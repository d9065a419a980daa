//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{SensorType, SessionConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    session: SessionInfo,
    mock_sensors: Vec<MockSensorInfo>,
}

#[derive(Serialize)]
struct SessionInfo {
    /// Empty means every available type
    sensors: Vec<SensorType>,
    sampling_rate: String,
    interval_ms: u128,
    eager_batches: bool,
    duration_secs: f64,
}

#[derive(Serialize)]
struct MockSensorInfo {
    name: String,
    sensor_type: SensorType,
    code: i32,
    dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_hz: Option<f64>,
    refused: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &SessionConfig) -> ConfigInfo {
    let session = &config.session;
    ConfigInfo {
        session: SessionInfo {
            sensors: session.sensors.clone(),
            sampling_rate: format!("{:?}", session.sampling_rate),
            interval_ms: session.sampling_rate.interval().as_millis(),
            eager_batches: session.eager_batches,
            duration_secs: session.duration_secs,
        },
        mock_sensors: config
            .mock
            .sensors
            .iter()
            .map(|s| MockSensorInfo {
                name: s.name.clone(),
                sensor_type: s.sensor_type,
                code: s.sensor_type.code(),
                dimensions: s.dimensions,
                frequency_hz: s.frequency_hz,
                refused: config.mock.refuse.contains(&s.sensor_type),
            })
            .collect(),
    }
}

fn print_config_info(config: &SessionConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Sensor Logger Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let session = &config.session;
    println!("⚙️  Session");
    if session.sensors.is_empty() {
        println!("   ├─ Sensors: all available");
    } else {
        let names: Vec<String> = session.sensors.iter().map(|t| t.to_string()).collect();
        println!("   ├─ Sensors: {}", names.join(", "));
    }
    println!(
        "   ├─ Sampling rate: {:?} ({} ms)",
        session.sampling_rate,
        session.sampling_rate.interval().as_millis()
    );
    println!("   ├─ Eager batches: {}", session.eager_batches);
    println!("   └─ Duration: {}s", session.duration_secs);

    println!("\n📡 Mock Sensors ({})", config.mock.sensors.len());
    for (i, sensor) in config.mock.sensors.iter().enumerate() {
        let prefix = if i == config.mock.sensors.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        let rate = match sensor.frequency_hz {
            Some(hz) => format!("{hz} Hz"),
            None => "rate hint".to_string(),
        };
        let refused = if config.mock.refuse.contains(&sensor.sensor_type) {
            ", refused"
        } else {
            ""
        };
        println!(
            "   {} {} ({}, {} values, {}{})",
            prefix, sensor.name, sensor.sensor_type, sensor.dimensions, rate, refused
        );
    }

    println!();
}
