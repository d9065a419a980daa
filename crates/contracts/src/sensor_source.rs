//! Sensor provider abstraction
//!
//! Models the host platform's sensor API: enumeration, default-source lookup and
//! callback subscription. Real platform bindings and the in-process mock provider
//! both implement these traits, so the collector never knows which one it talks to.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ProviderError, SensorType, SourceName};

/// One delivery of values from a source.
///
/// Borrowed from the provider for the duration of the callback only; the
/// provider may overwrite `values` as soon as the callback returns.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading<'a> {
    /// Display name of the source that produced the reading
    pub source: &'a SourceName,

    /// Numeric components, length depends on the sensor type
    pub values: &'a [f32],

    /// Provider timestamp (nanoseconds, provider-defined epoch)
    pub timestamp_ns: u64,
}

/// Reading callback type
///
/// Invoked by the provider on a thread it owns.
pub type ReadingCallback = Arc<dyn Fn(&SensorReading<'_>) + Send + Sync>;

/// Identity of an installed listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Callback handle registered with a provider
///
/// A provider identifies subscriptions by `id`, so the same listener can be
/// subscribed, unsubscribed and subscribed again.
#[derive(Clone)]
pub struct SensorListener {
    id: ListenerId,
    sensor_type: SensorType,
    callback: ReadingCallback,
}

impl SensorListener {
    pub fn new(sensor_type: SensorType, callback: ReadingCallback) -> Self {
        Self {
            id: ListenerId::next(),
            sensor_type,
            callback,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Deliver one reading
    #[inline]
    pub fn deliver(&self, reading: &SensorReading<'_>) {
        (self.callback)(reading)
    }
}

impl fmt::Debug for SensorListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorListener")
            .field("id", &self.id)
            .field("sensor_type", &self.sensor_type)
            .finish_non_exhaustive()
    }
}

/// Sampling rate hint passed on subscription
///
/// Matches the platform's delay classes; providers are free to deliver faster or slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingRate {
    /// Suitable for screen orientation changes (200 ms)
    #[default]
    Normal,
    /// Suitable for UI (~66 ms)
    Ui,
    /// Suitable for games (20 ms)
    Game,
    /// As fast as the provider can deliver
    Fastest,
}

impl SamplingRate {
    /// Nominal delay between readings
    pub fn interval(self) -> Duration {
        match self {
            Self::Normal => Duration::from_micros(200_000),
            Self::Ui => Duration::from_micros(66_667),
            Self::Game => Duration::from_micros(20_000),
            Self::Fastest => Duration::ZERO,
        }
    }
}

/// One physical or virtual sensor instance exposed by the platform
pub trait SensorSource: Send + Sync {
    fn sensor_type(&self) -> SensorType;

    /// Human-readable name, e.g. "BMI160 Accelerometer"
    fn name(&self) -> &SourceName;
}

/// Host platform sensor API
///
/// # Contract
///
/// After a successful `subscribe`, the provider invokes the listener zero or more
/// times, from threads of its choosing, until `unsubscribe` for that listener
/// returns. `unsubscribe` on an unknown listener is a no-op.
pub trait SensorProvider: Send + Sync {
    /// Every source currently exposed, in provider order
    fn enumerate(&self) -> Vec<Arc<dyn SensorSource>>;

    /// Default source for a type, `None` if the platform has no such sensor
    fn default_source(&self, sensor_type: SensorType) -> Option<Arc<dyn SensorSource>>;

    /// Start delivering readings of `source` to `listener`
    ///
    /// # Errors
    /// Returns `ProviderError` if the platform refuses the subscription.
    fn subscribe(
        &self,
        source: &dyn SensorSource,
        listener: &SensorListener,
        rate: SamplingRate,
    ) -> Result<(), ProviderError>;

    /// Stop delivering to the listener
    fn unsubscribe(&self, listener: ListenerId);
}
