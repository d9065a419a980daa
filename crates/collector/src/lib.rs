//! # Collector
//!
//! Sensor registry and batching dispatcher.
//!
//! Responsibilities:
//! - Discover available sensor sources (`SensorCatalog`)
//! - Lazily wire one listener per sensor type and manage its registration
//! - Route every delivered reading into that type's `DataBatch`
//!
//! ## Usage Example
//!
//! ```ignore
//! use collector::{DispatcherConfig, SensorDispatcher};
//!
//! let dispatcher = SensorDispatcher::new(provider, DispatcherConfig::default());
//! dispatcher.start_all();
//! // ... provider delivers readings on its own threads ...
//! dispatcher.stop_all();
//! for snapshot in dispatcher.snapshot_all() {
//!     println!("{}: {} records", snapshot.sensor_type, snapshot.data.len());
//! }
//! ```

mod batch;
mod catalog;
mod dispatcher;
mod metrics;
mod registry;

pub use batch::DataBatch;
pub use catalog::SensorCatalog;
pub use contracts::{BatchSnapshot, Data, SensorType};
pub use dispatcher::{DispatcherConfig, SensorDispatcher, StartOutcome};
pub use metrics::{CollectorMetrics, MetricsSnapshot};
pub use registry::LazyRegistry;
