//! # Mock Provider
//!
//! In-process sensor platform.
//!
//! Implements `SensorProvider` without hardware, for tests and demos:
//! - Exposes a configurable sensor suite
//! - Streams readings from one background thread per subscription (optional)
//! - Delivers readings on demand via `emit`
//! - Reuses its value buffers, like a real platform does
//! - Can refuse subscriptions for selected types

mod provider;
mod source;

pub use provider::{MockProviderConfig, MockSensorProvider};
pub use source::MockSource;
