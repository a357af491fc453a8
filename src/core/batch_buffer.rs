//! Accumulation region for one sink write

/// Bytes collected from several entries, written to the sink in one call.
///
/// The consumer flushes when the next entry would not fit, once the buffer is
/// three quarters full, and whenever the queue has been drained.
#[derive(Debug)]
pub(crate) struct BatchBuffer {
    buf: Vec<u8>,
    capacity: usize,
    flush_threshold: usize,
    entries: usize,
}

impl BatchBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            flush_threshold: (capacity * 3 / 4).max(1),
            entries: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn fits(&self, len: usize) -> bool {
        self.buf.len() + len <= self.capacity
    }

    /// Callers check `fits` first
    #[inline]
    pub(crate) fn append(&mut self, bytes: &[u8]) {
        debug_assert!(self.fits(bytes.len()));
        self.buf.extend_from_slice(bytes);
        self.entries += 1;
    }

    #[inline]
    pub(crate) fn should_flush(&self) -> bool {
        self.buf.len() >= self.flush_threshold
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub(crate) fn entries(&self) -> usize {
        self.entries
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn clear(&mut self) {
        self.buf.clear();
        self.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_at_three_quarters() {
        let mut batch = BatchBuffer::new(100);
        batch.append(&[b'x'; 74]);
        assert!(!batch.should_flush());
        batch.append(&[b'x'; 1]);
        assert!(batch.should_flush());
        assert_eq!(batch.entries(), 2);
    }

    #[test]
    fn test_fits_respects_remaining_capacity() {
        let mut batch = BatchBuffer::new(10);
        batch.append(b"123456");
        assert!(batch.fits(4));
        assert!(!batch.fits(5));
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.entries(), 0);
        assert!(batch.fits(10));
    }
}
