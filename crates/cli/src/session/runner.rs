//! Session runner - wires the mock platform to the dispatcher and drives one
//! collection session to completion.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use collector::{DispatcherConfig, SensorDispatcher, StartOutcome};
use contracts::{SensorType, SessionConfig};
use mock_provider::{MockProviderConfig, MockSensorProvider};
use tracing::{info, warn};

use super::SessionReport;

/// Session runner configuration
#[derive(Debug, Clone)]
pub struct SessionRunnerConfig {
    /// Validated session configuration
    pub session: SessionConfig,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Drives one collection session
pub struct SessionRunner {
    config: SessionRunnerConfig,
}

impl SessionRunner {
    pub fn new(config: SessionRunnerConfig) -> Self {
        Self { config }
    }

    /// Collect for `duration_secs`, or until `shutdown` resolves.
    ///
    /// Every listener is stopped before the batches are snapshotted, so the
    /// report reflects a quiesced collector.
    pub async fn run<F>(self, shutdown: F) -> Result<SessionReport>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.session;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .with_context(|| format!("Failed to start metrics endpoint on port {port}"))?;
            info!("Metrics endpoint available on port {}", port);
        }

        let provider = Arc::new(MockSensorProvider::with_config(MockProviderConfig::from(
            &config.mock,
        )));
        let dispatcher = SensorDispatcher::new(provider, DispatcherConfig::from(&config.session));

        let registrations = start_sensors(&dispatcher, &config.session.sensors);
        let registered = registrations
            .iter()
            .filter(|(_, outcome)| outcome.is_registered())
            .count();
        info!(
            requested = registrations.len(),
            registered,
            sampling_rate = ?config.session.sampling_rate,
            "Collection started"
        );
        if registered == 0 {
            warn!("No sensor type registered, batches will stay empty");
        }

        let duration =
            Duration::try_from_secs_f64(config.session.duration_secs).unwrap_or(Duration::MAX);
        let interrupted = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = shutdown => {
                warn!("Received shutdown signal, stopping collection...");
                true
            }
        };

        // Unsubscribing joins provider threads
        let (dispatcher, stopped) = tokio::task::spawn_blocking(move || {
            let stopped = dispatcher.stop_all();
            (dispatcher, stopped)
        })
        .await
        .context("Failed to stop collection")?;
        info!(stopped, "Collection stopped");

        Ok(SessionReport {
            duration: start_time.elapsed(),
            interrupted,
            registrations,
            metrics: dispatcher.metrics().snapshot(),
            snapshots: dispatcher.snapshot_all(),
        })
    }
}

/// Start the requested types, or every available type when none are listed
fn start_sensors(
    dispatcher: &SensorDispatcher,
    requested: &[SensorType],
) -> Vec<(SensorType, StartOutcome)> {
    if requested.is_empty() {
        dispatcher.start_all()
    } else {
        requested
            .iter()
            .map(|&sensor_type| (sensor_type, dispatcher.start(sensor_type)))
            .collect()
    }
}
