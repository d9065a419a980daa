//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SessionConfig;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::session::{SessionRunner, SessionRunnerConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args)?;

    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config)
        .context("Configuration is invalid after CLI overrides")?;

    info!(
        sensors = config.session.sensors.len(),
        mock_sensors = config.mock.sensors.len(),
        sampling_rate = ?config.session.sampling_rate,
        duration_secs = config.session.duration_secs,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let runner = SessionRunner::new(SessionRunnerConfig {
        session: config,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    info!("Starting collection session...");

    let report = runner
        .run(shutdown_signal())
        .await
        .context("Collection session failed")?;

    info!(
        readings_recorded = report.metrics.readings_recorded,
        readings_dropped = report.metrics.readings_dropped,
        duration_secs = report.duration.as_secs_f64(),
        rate = format!("{:.2}", report.readings_per_sec()),
        "Session completed"
    );

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }

    Ok(())
}

fn load_config(args: &RunArgs) -> Result<SessionConfig> {
    let Some(path) = &args.config else {
        info!("No configuration file given, using built-in mock sensor suite");
        return Ok(SessionConfig::default());
    };

    info!(config = %path.display(), "Loading configuration");
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut SessionConfig, args: &RunArgs) {
    if let Some(duration) = args.duration {
        info!(duration_secs = duration, "Overriding session duration from CLI");
        config.session.duration_secs = duration;
    }
    if let Some(ref sensors) = args.sensors {
        info!(sensors = ?sensors, "Overriding sensor selection from CLI");
        config.session.sensors = sensors.clone();
    }
    if let Some(rate) = args.sampling_rate {
        info!(sampling_rate = ?rate, "Overriding sampling rate from CLI");
        config.session.sampling_rate = rate.into();
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves, so the session then
/// runs for its configured duration.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &SessionConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    if config.session.sensors.is_empty() {
        println!("  Sensors: all available");
    } else {
        let names: Vec<String> = config.session.sensors.iter().map(|t| t.to_string()).collect();
        println!("  Sensors: {}", names.join(", "));
    }
    println!("  Sampling rate: {:?}", config.session.sampling_rate);
    println!("  Eager batches: {}", config.session.eager_batches);
    println!("  Duration: {}s", config.session.duration_secs);

    println!("\nMock sensors ({}):", config.mock.sensors.len());
    for sensor in &config.mock.sensors {
        println!(
            "  - {} ({}, {} values)",
            sensor.name, sensor.sensor_type, sensor.dimensions
        );
    }

    if !config.mock.refuse.is_empty() {
        println!("\nRefused types: {:?}", config.mock.refuse);
    }

    println!();
}
