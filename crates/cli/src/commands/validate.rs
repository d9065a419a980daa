//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::SessionConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    sensor_count: usize,
    sampling_rate: String,
    duration_secs: f64,
    mock_sensor_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    sensor_count: config.session.sensors.len(),
                    sampling_rate: format!("{:?}", config.session.sampling_rate),
                    duration_secs: config.session.duration_secs,
                    mock_sensor_count: config.mock.sensors.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SessionConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.mock.sensors.is_empty() {
        warnings.push("mock.sensors is empty - no sensor type can be collected".to_string());
    }

    for sensor_type in &config.session.sensors {
        let exposed = config
            .mock
            .sensors
            .iter()
            .any(|s| s.sensor_type == *sensor_type);
        if !exposed {
            warnings.push(format!(
                "Sensor type '{}' has no mock source and will be skipped",
                sensor_type
            ));
        } else if config.mock.refuse.contains(sensor_type) {
            warnings.push(format!(
                "Sensor type '{}' is refused by the mock platform",
                sensor_type
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Sensors requested: {}", summary.sensor_count);
            println!("  Sampling rate: {}", summary.sampling_rate);
            println!("  Duration: {}s", summary.duration_secs);
            println!("  Mock sensors: {}", summary.mock_sensor_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
