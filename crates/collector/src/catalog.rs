//! SensorCatalog - query layer over the sensor provider

use std::collections::HashSet;
use std::sync::Arc;

use contracts::{SensorProvider, SensorSource, SensorType};
use tracing::trace;

/// Enumerates and resolves sensor sources exposed by the platform
#[derive(Clone)]
pub struct SensorCatalog {
    provider: Arc<dyn SensorProvider>,
}

impl SensorCatalog {
    pub fn new(provider: Arc<dyn SensorProvider>) -> Self {
        Self { provider }
    }

    /// Every sensor type currently exposed, in provider order.
    ///
    /// A type backed by several sources is listed once. May be empty.
    pub fn list_available_sensor_types(&self) -> Vec<SensorType> {
        let mut seen = HashSet::new();
        let types: Vec<SensorType> = self
            .provider
            .enumerate()
            .iter()
            .map(|source| source.sensor_type())
            .filter(|t| seen.insert(*t))
            .collect();

        trace!(count = types.len(), "enumerated sensor types");
        types
    }

    /// Default source for `sensor_type`.
    ///
    /// `None` means the platform has no such sensor; callers treat it as a
    /// normal outcome.
    pub fn resolve(&self, sensor_type: SensorType) -> Option<Arc<dyn SensorSource>> {
        self.provider.default_source(sensor_type)
    }

    pub(crate) fn provider(&self) -> &dyn SensorProvider {
        self.provider.as_ref()
    }
}
