//! SensorDispatcher - listener registry, batch registry and reading routing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use contracts::{
    BatchSnapshot, Data, ReadingCallback, SamplingRate, SensorListener, SensorProvider,
    SensorReading, SensorType, SessionSettings, SourceName,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use crate::batch::DataBatch;
use crate::catalog::SensorCatalog;
use crate::metrics::CollectorMetrics;
use crate::registry::LazyRegistry;

/// Dispatcher configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherConfig {
    /// Rate hint passed to the provider on every subscription
    pub sampling_rate: SamplingRate,

    /// Create a labelled batch for every available type at construction
    pub eager_batches: bool,
}

impl From<&SessionSettings> for DispatcherConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            sampling_rate: settings.sampling_rate,
            eager_batches: settings.eager_batches,
        }
    }
}

/// Result of [`SensorDispatcher::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Listener subscribed by this call
    Registered,
    /// Listener was already subscribed; nothing changed
    AlreadyRegistered,
    /// Platform has no source for the type; nothing changed
    SourceAbsent,
    /// Provider refused the subscription
    Rejected,
}

impl StartOutcome {
    /// True if a listener for the type is live after the call
    pub fn is_registered(self) -> bool {
        matches!(self, Self::Registered | Self::AlreadyRegistered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::AlreadyRegistered => "already_registered",
            Self::SourceAbsent => "source_absent",
            Self::Rejected => "rejected",
        }
    }
}

/// Per-type listener and its registration state
struct ListenerSlot {
    listener: SensorListener,
    /// Serializes start/stop for this type
    lifecycle: Mutex<()>,
    /// Read by the reading path without taking `lifecycle`
    registered: AtomicBool,
}

impl ListenerSlot {
    fn new(listener: SensorListener) -> Self {
        Self {
            listener,
            lifecycle: Mutex::new(()),
            registered: AtomicBool::new(false),
        }
    }

    fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}

struct Inner {
    catalog: SensorCatalog,
    config: DispatcherConfig,
    listeners: LazyRegistry<SensorType, Arc<ListenerSlot>>,
    batches: LazyRegistry<SensorType, Arc<DataBatch>>,
    metrics: Arc<CollectorMetrics>,
}

impl Inner {
    /// Get or lazily create the listener for `sensor_type`.
    ///
    /// The installed callback only holds the type and a weak reference back to
    /// the dispatcher; all routing happens in `on_reading`.
    fn listener_slot(self: &Arc<Self>, sensor_type: SensorType) -> Arc<ListenerSlot> {
        self.listeners.get_or_create(sensor_type, |sensor_type| {
            let dispatcher: Weak<Inner> = Arc::downgrade(self);
            let callback: ReadingCallback = Arc::new(move |reading| {
                if let Some(inner) = dispatcher.upgrade() {
                    inner.on_reading(sensor_type, reading);
                }
            });
            debug!(sensor_type = %sensor_type, "created listener");
            Arc::new(ListenerSlot::new(SensorListener::new(sensor_type, callback)))
        })
    }

    fn batch(&self, sensor_type: SensorType) -> Arc<DataBatch> {
        self.batches.get_or_create(sensor_type, |sensor_type| {
            debug!(sensor_type = %sensor_type, "created unlabelled batch");
            Arc::new(DataBatch::new(sensor_type, None))
        })
    }

    /// Batch for a resolved source; labels an existing unlabelled batch
    fn labelled_batch(&self, sensor_type: SensorType, name: &SourceName) -> Arc<DataBatch> {
        let batch = self.batches.get_or_create(sensor_type, |sensor_type| {
            debug!(sensor_type = %sensor_type, source = %name, "created batch");
            Arc::new(DataBatch::new(sensor_type, Some(name.clone())))
        });
        if batch.label_if_unset(name) {
            debug!(sensor_type = %sensor_type, source = %name, "labelled batch");
        }
        batch
    }

    fn on_reading(&self, sensor_type: SensorType, reading: &SensorReading<'_>) -> bool {
        let registered = self
            .listeners
            .get(&sensor_type)
            .is_some_and(|slot| slot.is_registered());

        if !registered {
            trace!(sensor_type = %sensor_type, "dropping reading for unregistered type");
            self.metrics.record_dropped();
            observability::record_reading_dropped(sensor_type);
            return false;
        }

        let data = Data::copy_from(reading);
        let len = self.batch(sensor_type).push(data);

        trace!(
            sensor_type = %sensor_type,
            source = %reading.source,
            timestamp_ns = reading.timestamp_ns,
            batch_len = len,
            "reading recorded"
        );
        self.metrics.record_recorded();
        observability::record_reading(sensor_type, len);
        true
    }

    fn stop(&self, sensor_type: SensorType) -> bool {
        let Some(slot) = self.listeners.get(&sensor_type) else {
            return false;
        };

        let _lifecycle = slot.lifecycle.lock();
        if !slot.is_registered() {
            return false;
        }

        // Readings delivered while unsubscribe is in progress are still accepted
        self.catalog.provider().unsubscribe(slot.listener.id());
        slot.registered.store(false, Ordering::Release);

        debug!(sensor_type = %sensor_type, listener = %slot.listener.id(), "unregistered listener");
        true
    }

    fn stop_all(&self) -> usize {
        let mut types = self.listeners.keys();
        types.sort();
        types.into_iter().filter(|t| self.stop(*t)).count()
    }
}

/// Sensor registry and batching dispatcher
///
/// Owns one lazily created listener and one lazily created batch per sensor
/// type. Readings arrive on provider threads and are appended to the batch of
/// their type; `start`/`stop`/`batch` may be called concurrently from any thread.
///
/// Dropping the dispatcher unregisters every listener.
pub struct SensorDispatcher {
    inner: Arc<Inner>,
}

impl SensorDispatcher {
    pub fn new(provider: Arc<dyn SensorProvider>, config: DispatcherConfig) -> Self {
        let dispatcher = Self {
            inner: Arc::new(Inner {
                catalog: SensorCatalog::new(provider),
                config,
                listeners: LazyRegistry::new(),
                batches: LazyRegistry::new(),
                metrics: Arc::new(CollectorMetrics::new()),
            }),
        };

        if config.eager_batches {
            dispatcher.prepare_batches();
        }
        dispatcher
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> DispatcherConfig {
        self.inner.config
    }

    /// Start collecting readings of `sensor_type`.
    ///
    /// Idempotent: a type that is already registered is not subscribed twice.
    /// A type without a backing source is skipped without touching any batch.
    #[instrument(name = "dispatcher_start", skip(self), fields(sensor_type = %sensor_type))]
    pub fn start(&self, sensor_type: SensorType) -> StartOutcome {
        let Some(source) = self.inner.catalog.resolve(sensor_type) else {
            debug!("no source for sensor type, skipping");
            observability::record_registration(sensor_type, StartOutcome::SourceAbsent.as_str());
            return StartOutcome::SourceAbsent;
        };

        // The batch must exist before the first reading can arrive
        self.inner.labelled_batch(sensor_type, source.name());

        let slot = self.inner.listener_slot(sensor_type);
        let _lifecycle = slot.lifecycle.lock();
        if slot.is_registered() {
            debug!("listener already registered");
            return StartOutcome::AlreadyRegistered;
        }

        slot.registered.store(true, Ordering::Release);
        let outcome = match self.inner.catalog.provider().subscribe(
            source.as_ref(),
            &slot.listener,
            self.inner.config.sampling_rate,
        ) {
            Ok(()) => {
                debug!(
                    source = %source.name(),
                    listener = %slot.listener.id(),
                    rate = ?self.inner.config.sampling_rate,
                    "registered listener"
                );
                self.inner.metrics.record_registration();
                StartOutcome::Registered
            }
            Err(e) => {
                slot.registered.store(false, Ordering::Release);
                warn!(error = %e, source = %source.name(), "provider refused subscription");
                self.inner.metrics.record_rejection();
                StartOutcome::Rejected
            }
        };

        observability::record_registration(sensor_type, outcome.as_str());
        outcome
    }

    /// Start every type the platform currently exposes
    #[instrument(name = "dispatcher_start_all", skip(self))]
    pub fn start_all(&self) -> Vec<(SensorType, StartOutcome)> {
        let types = self.inner.catalog.list_available_sensor_types();
        if types.is_empty() {
            warn!("platform exposes no sensors");
        }

        let outcomes: Vec<_> = types.into_iter().map(|t| (t, self.start(t))).collect();
        info!(
            requested = outcomes.len(),
            registered = outcomes.iter().filter(|(_, o)| o.is_registered()).count(),
            "started sensor collection"
        );
        outcomes
    }

    /// Stop collecting readings of `sensor_type`.
    ///
    /// Returns `false` if no listener was registered. The batch is kept.
    #[instrument(name = "dispatcher_stop", skip(self), fields(sensor_type = %sensor_type))]
    pub fn stop(&self, sensor_type: SensorType) -> bool {
        self.inner.stop(sensor_type)
    }

    /// Stop every known type, returning how many listeners were unregistered
    #[instrument(name = "dispatcher_stop_all", skip(self))]
    pub fn stop_all(&self) -> usize {
        let stopped = self.inner.stop_all();
        info!(stopped, "stopped sensor collection");
        stopped
    }

    /// Batch for `sensor_type`, created empty and unlabelled if never touched
    pub fn batch(&self, sensor_type: SensorType) -> Arc<DataBatch> {
        self.inner.batch(sensor_type)
    }

    /// Route one reading into the batch of `sensor_type`.
    ///
    /// This is what installed listeners call. The reading's values are copied
    /// before returning. Readings for a type without a registered listener are
    /// dropped and `false` is returned.
    pub fn on_reading(&self, sensor_type: SensorType, reading: &SensorReading<'_>) -> bool {
        self.inner.on_reading(sensor_type, reading)
    }

    /// Whether a listener for `sensor_type` is currently subscribed
    pub fn is_registered(&self, sensor_type: SensorType) -> bool {
        self.inner
            .listeners
            .get(&sensor_type)
            .is_some_and(|slot| slot.is_registered())
    }

    /// Types that currently have a batch, sorted
    pub fn known_types(&self) -> Vec<SensorType> {
        let mut types = self.inner.batches.keys();
        types.sort();
        types
    }

    /// Create a labelled batch for every available type.
    ///
    /// Returns the number of batches that did not exist before.
    pub fn prepare_batches(&self) -> usize {
        let mut created = 0;
        for sensor_type in self.inner.catalog.list_available_sensor_types() {
            if self.inner.batches.contains(&sensor_type) {
                continue;
            }
            if let Some(source) = self.inner.catalog.resolve(sensor_type) {
                self.inner.labelled_batch(sensor_type, source.name());
                created += 1;
            }
        }
        debug!(created, "prepared batches");
        created
    }

    /// Consistent snapshot of every batch, sorted by type
    pub fn snapshot_all(&self) -> Vec<BatchSnapshot> {
        let mut batches = self.inner.batches.entries();
        batches.sort_by_key(|(t, _)| *t);
        batches.iter().map(|(_, batch)| batch.snapshot()).collect()
    }

    pub fn metrics(&self) -> Arc<CollectorMetrics> {
        self.inner.metrics.clone()
    }
}

impl Drop for SensorDispatcher {
    fn drop(&mut self) {
        self.inner.stop_all();
        self.inner.listeners.clear();
    }
}
