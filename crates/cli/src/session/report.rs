//! Session report.

use std::time::Duration;

use anyhow::{Context, Result};
use collector::{BatchSnapshot, MetricsSnapshot, SensorType, StartOutcome};
use observability::BatchSummary;
use serde::Serialize;

/// Outcome of a collection session
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Wall time from setup to final snapshot
    pub duration: Duration,

    /// Ended by a shutdown signal rather than the configured duration
    pub interrupted: bool,

    /// Start outcome per requested type, in request order
    pub registrations: Vec<(SensorType, StartOutcome)>,

    /// Collector counters at the end of the session
    pub metrics: MetricsSnapshot,

    /// Every batch, ordered by sensor type
    pub snapshots: Vec<BatchSnapshot>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    duration_secs: f64,
    interrupted: bool,
    readings_recorded: u64,
    readings_dropped: u64,
    registrations: Vec<JsonRegistration>,
    batches: &'a [BatchSnapshot],
}

#[derive(Serialize)]
struct JsonRegistration {
    sensor_type: SensorType,
    outcome: &'static str,
}

impl SessionReport {
    /// Recorded readings per second of wall time
    pub fn readings_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.metrics.readings_recorded as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn summaries(&self) -> Vec<BatchSummary> {
        self.snapshots.iter().map(BatchSummary::from_snapshot).collect()
    }

    /// Full report, batch contents included
    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            duration_secs: self.duration.as_secs_f64(),
            interrupted: self.interrupted,
            readings_recorded: self.metrics.readings_recorded,
            readings_dropped: self.metrics.readings_dropped,
            registrations: self
                .registrations
                .iter()
                .map(|&(sensor_type, outcome)| JsonRegistration {
                    sensor_type,
                    outcome: outcome.as_str(),
                })
                .collect(),
            batches: &self.snapshots,
        };
        serde_json::to_string_pretty(&report).context("Failed to serialize session report")
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Session Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        if self.interrupted {
            println!("   ├─ Ended by: shutdown signal");
        }
        println!("   ├─ Readings recorded: {}", self.metrics.readings_recorded);
        println!("   ├─ Readings dropped: {}", self.metrics.readings_dropped);
        println!("   └─ Rate: {:.2} readings/s", self.readings_per_sec());

        println!("\n📡 Registrations ({})", self.registrations.len());
        for (i, (sensor_type, outcome)) in self.registrations.iter().enumerate() {
            let prefix = if i == self.registrations.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!("   {} {}: {}", prefix, sensor_type, outcome.as_str());
        }

        println!("\n📦 Batches ({})", self.snapshots.len());
        for summary in self.summaries() {
            print!("{summary}");
        }

        println!();
    }
}
