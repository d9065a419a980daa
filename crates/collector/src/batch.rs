//! DataBatch - append-only per-type record sequence

use std::sync::OnceLock;

use contracts::{BatchSnapshot, Data, SensorType, SourceName};
use parking_lot::Mutex;

/// Ordered, append-only collection of the readings recorded for one sensor type.
///
/// Appends and snapshots are serialized by one lock, so a snapshot always
/// observes a complete prefix of the delivery order.
#[derive(Debug)]
pub struct DataBatch {
    sensor_type: SensorType,
    source_name: OnceLock<SourceName>,
    records: Mutex<Vec<Data>>,
}

impl DataBatch {
    /// Create an empty batch, optionally labelled with its source name
    pub fn new(sensor_type: SensorType, source_name: Option<SourceName>) -> Self {
        let label = OnceLock::new();
        if let Some(name) = source_name {
            let _ = label.set(name);
        }

        Self {
            sensor_type,
            source_name: label,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Display name of the aggregated source, if it was ever resolved
    pub fn source_name(&self) -> Option<&SourceName> {
        self.source_name.get()
    }

    /// Set the label unless one is already present.
    ///
    /// Returns `true` if this call set it.
    pub fn label_if_unset(&self, name: &SourceName) -> bool {
        self.source_name.set(name.clone()).is_ok()
    }

    /// Append one record, returning the new length
    pub fn push(&self, data: Data) -> usize {
        let mut records = self.records.lock();
        records.push(data);
        records.len()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of every record recorded so far
    pub fn snapshot(&self) -> BatchSnapshot {
        self.snapshot_since(0)
    }

    /// Copy of the records from `offset` onward.
    ///
    /// An offset past the end yields an empty snapshot positioned at the end,
    /// so consumers can export incrementally by feeding back `snapshot.end()`.
    pub fn snapshot_since(&self, offset: usize) -> BatchSnapshot {
        let records = self.records.lock();
        let start = offset.min(records.len());
        let data = records[start..].to_vec();
        drop(records);

        BatchSnapshot {
            sensor_type: self.sensor_type,
            source_name: self.source_name().cloned(),
            offset: start,
            data,
        }
    }
}
