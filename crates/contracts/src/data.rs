//! Data - one recorded reading, and batch snapshots for export

use serde::{Deserialize, Serialize};

use crate::{SensorReading, SensorType, SourceName};

/// One recorded reading
///
/// Immutable after construction. Values are owned, never borrowed from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    label: SourceName,
    values: Box<[f32]>,
}

impl Data {
    pub fn new(label: SourceName, values: impl Into<Box<[f32]>>) -> Self {
        Self {
            label,
            values: values.into(),
        }
    }

    /// Copy a borrowed reading into an owned record
    pub fn copy_from(reading: &SensorReading<'_>) -> Self {
        Self {
            label: reading.source.clone(),
            values: Box::from(reading.values),
        }
    }

    /// Name of the source that produced the reading
    pub fn label(&self) -> &SourceName {
        &self.label
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Consistent copy of a batch prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    /// Sensor type the batch aggregates
    pub sensor_type: SensorType,

    /// Source display name, absent if the type was never resolved
    pub source_name: Option<SourceName>,

    /// Index of `data[0]` within the full batch
    pub offset: usize,

    /// Records in delivery order
    pub data: Vec<Data>,
}

impl BatchSnapshot {
    /// Batch length at the moment the snapshot was taken
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}
