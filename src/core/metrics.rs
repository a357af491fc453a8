//! Writer metrics for observability
//!
//! Counters describing how a bounded writer is coping with its load:
//! accepted and dropped entries, batches written, and sink failures.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a [`BoundedWriter`](crate::BoundedWriter)
///
/// # Example
///
/// ```
/// use rust_log_pipeline::WriterMetrics;
///
/// let metrics = WriterMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_accepted();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.accepted_count(), 1);
/// ```
#[derive(Debug)]
pub struct WriterMetrics {
    /// Entries accepted into the queue
    accepted: AtomicU64,

    /// Entries dropped because the queue was full
    dropped: AtomicU64,

    /// Entries larger than the batch buffer
    oversized: AtomicU64,

    /// Entries discarded by the reject policy or a swallowed write failure
    discarded: AtomicU64,

    /// Batch writes issued to the sink
    batches_written: AtomicU64,

    /// Bytes handed to the sink
    bytes_written: AtomicU64,

    /// Sink write or flush failures seen by the consumer
    write_failures: AtomicU64,
}

impl WriterMetrics {
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            oversized: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn oversized_count(&self) -> u64 {
        self.oversized.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Record an accepted entry, returning the previous count
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped entry, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_oversized(&self) -> u64 {
        self.oversized.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded(&self, entries: u64) -> u64 {
        self.discarded.fetch_add(entries, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_batch(&self, bytes: usize) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been submitted.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.accepted_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for WriterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WriterMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted_count()),
            dropped: AtomicU64::new(self.dropped_count()),
            oversized: AtomicU64::new(self.oversized_count()),
            discarded: AtomicU64::new(self.discarded_count()),
            batches_written: AtomicU64::new(self.batches_written()),
            bytes_written: AtomicU64::new(self.bytes_written()),
            write_failures: AtomicU64::new(self.write_failures()),
        }
    }
}
