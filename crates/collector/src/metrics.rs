//! In-process collector counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Collector metrics
///
/// Shared between caller threads and provider callback threads.
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    /// Readings appended to a batch
    pub readings_recorded: AtomicU64,

    /// Readings dropped because no listener was registered for their type
    pub readings_dropped: AtomicU64,

    /// Successful subscriptions
    pub registrations: AtomicU64,

    /// Subscriptions refused by the provider
    pub rejections: AtomicU64,
}

impl CollectorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_recorded(&self) {
        self.readings_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.readings_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_recorded: self.readings_recorded.load(Ordering::Relaxed),
            readings_dropped: self.readings_dropped.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings_recorded: u64,
    pub readings_dropped: u64,
    pub registrations: u64,
    pub rejections: u64,
}
