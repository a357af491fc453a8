//! Recycled byte buffers for encoded log entries
//!
//! An [`EncodedRecord`] owns its buffer outright. Whoever holds the record
//! owns the bytes, and dropping the record is what hands the buffer back, so a
//! buffer returns to the pool exactly once and cannot be touched after the
//! hand-off.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;

struct PoolInner {
    free_tx: Sender<Vec<u8>>,
    free_rx: Receiver<Vec<u8>>,
    /// Buffers that grew beyond this are released to the allocator instead
    max_buffer_capacity: usize,
}

/// Bounded free-list of byte buffers shared by producers and the consumer
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    /// A pool retaining at most `max_pooled` idle buffers of up to
    /// `max_buffer_capacity` bytes each.
    pub fn new(max_pooled: usize, max_buffer_capacity: usize) -> Self {
        let (free_tx, free_rx) = bounded(max_pooled.max(1));
        Self {
            inner: Arc::new(PoolInner {
                free_tx,
                free_rx,
                max_buffer_capacity,
            }),
        }
    }

    /// Take an empty buffer with room for at least `min_capacity` bytes
    pub fn acquire(&self, min_capacity: usize) -> EncodedRecord {
        let mut bytes = self.inner.free_rx.try_recv().unwrap_or_default();
        bytes.clear();
        bytes.reserve(min_capacity);
        EncodedRecord {
            bytes,
            pool: self.clone(),
        }
    }

    /// Idle buffers currently held by the pool
    pub fn available(&self) -> usize {
        self.inner.free_rx.len()
    }

    fn release(&self, mut bytes: Vec<u8>) {
        if bytes.capacity() == 0 || bytes.capacity() > self.inner.max_buffer_capacity {
            return;
        }
        bytes.clear();
        // A full free-list simply lets the buffer go
        let _ = self.inner.free_tx.try_send(bytes);
    }
}

/// An encoded log line, terminator included
pub struct EncodedRecord {
    bytes: Vec<u8>,
    pool: BufferPool,
}

impl EncodedRecord {
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}

impl Drop for EncodedRecord {
    fn drop(&mut self) {
        let bytes = std::mem::take(&mut self.bytes);
        self.pool.release(bytes);
    }
}

impl std::fmt::Debug for EncodedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedRecord")
            .field("length", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returns_on_drop() {
        let pool = BufferPool::new(4, 1024);
        assert_eq!(pool.available(), 0);

        let mut record = pool.acquire(16);
        record.bytes_mut().extend_from_slice(b"hello\n");
        assert_eq!(record.len(), 6);
        drop(record);

        assert_eq!(pool.available(), 1);
        let reused = pool.acquire(4);
        assert!(reused.is_empty());
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_oversized_buffers_not_retained() {
        let pool = BufferPool::new(4, 32);
        let record = pool.acquire(1024);
        drop(record);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_free_list_is_bounded() {
        let pool = BufferPool::new(2, 1024);
        let records: Vec<_> = (0..5).map(|_| pool.acquire(8)).collect();
        drop(records);
        assert_eq!(pool.available(), 2);
    }
}
