//! Non-blocking batching writer
//!
//! Producers encode entries into pooled buffers and `try_send` them into a
//! fixed-capacity channel. A single background thread drains the channel into
//! a batch buffer and writes whole batches to the sink. When the channel is
//! full the incoming entry is dropped: producers never wait on I/O.

use super::{
    batch_buffer::BatchBuffer,
    buffer_pool::{BufferPool, EncodedRecord},
    config::WriterConfig,
    error::{LoggerError, Result},
    metrics::WriterMetrics,
    overflow_policy::{OverflowCallback, OversizePolicy, WriteFailurePolicy},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

type SharedSink = Arc<Mutex<Option<Box<dyn Write + Send>>>>;

/// Lifecycle of a [`BoundedWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Accepting entries
    Open,
    /// Producer side closed, consumer finishing the queue
    Draining,
    /// Queue drained and sink released
    Closed,
}

const STATE_OPEN: u8 = 0;
const STATE_DRAINING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Batching writer with a bounded drop-newest queue
///
/// # Example
///
/// ```
/// use rust_log_pipeline::{BoundedWriter, WriterConfig};
///
/// let writer = BoundedWriter::new(std::io::sink(), WriterConfig::default()).unwrap();
/// assert!(writer.add_entry("12:00:00 [I] [App] started").unwrap());
///
/// // Blocks until everything accepted so far has reached the sink
/// writer.close().unwrap();
/// assert!(writer.add_entry("too late").is_err());
/// ```
pub struct BoundedWriter {
    sender: RwLock<Option<Sender<EncodedRecord>>>,
    sink: SharedSink,
    worker: Mutex<Option<thread::JoinHandle<Result<()>>>>,
    state: AtomicU8,
    /// Set by the consumer when it stops on a sink failure
    failure: Arc<Mutex<Option<String>>>,
    pool: BufferPool,
    metrics: Arc<WriterMetrics>,
    on_overflow: Option<OverflowCallback>,
    channel_capacity: usize,
}

impl BoundedWriter {
    /// Start a writer and its background consumer over `sink`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero capacities, or an IO error if
    /// the consumer thread cannot be spawned.
    pub fn new(sink: impl Write + Send + 'static, config: WriterConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = bounded(config.channel_capacity);
        let sink: SharedSink = Arc::new(Mutex::new(Some(Box::new(sink))));
        let metrics = Arc::new(WriterMetrics::new());
        let failure = Arc::new(Mutex::new(None));
        // Idle buffers are capped so a burst of long lines does not pin memory
        let pool = BufferPool::new(config.channel_capacity, config.buffer_capacity);

        let consumer = Consumer {
            receiver,
            batch: BatchBuffer::new(config.buffer_capacity),
            sink: Arc::clone(&sink),
            metrics: Arc::clone(&metrics),
            oversize_policy: config.oversize_policy,
            write_failure_policy: config.write_failure_policy,
        };
        let consumer_failure = Arc::clone(&failure);

        let handle = thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut consumer = consumer;
                let result = consumer.run();
                if let Err(ref e) = result {
                    eprintln!("[LOGGER ERROR] Writer consumer terminated: {}", e);
                    *consumer_failure.lock() = Some(e.to_string());
                }
                // The receiver goes away only after the failure is visible to producers
                drop(consumer);
                result
            })
            .map_err(|e| {
                LoggerError::io_operation("starting writer", "failed to spawn consumer thread", e)
            })?;

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            sink,
            worker: Mutex::new(Some(handle)),
            state: AtomicU8::new(STATE_OPEN),
            failure,
            pool,
            metrics,
            on_overflow: None,
            channel_capacity: config.channel_capacity,
        })
    }

    /// Set a callback invoked when entries are dropped on overflow
    #[must_use]
    pub fn with_overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Queue `text` plus a newline terminator.
    ///
    /// Returns `Ok(true)` when the entry was accepted and `Ok(false)` when it
    /// was dropped because the queue was full. Never waits for the consumer.
    ///
    /// # Errors
    ///
    /// `WriterClosed` after [`close`](Self::close), `WriterFailed` if the
    /// consumer stopped on a sink failure.
    pub fn add_entry(&self, text: &str) -> Result<bool> {
        self.add_formatted(text.len(), |buf| {
            buf.copy_from_slice(text.as_bytes());
            Ok(text.len())
        })
    }

    /// Queue an entry rendered directly into a pooled buffer of `len` bytes.
    ///
    /// `render` returns how many bytes it wrote; a newline is appended after
    /// them. A render error discards the buffer and is returned as is.
    pub fn add_formatted<F>(&self, len: usize, render: F) -> Result<bool>
    where
        F: FnOnce(&mut [u8]) -> Result<usize>,
    {
        let guard = self.sender.read();
        let sender = match guard.as_ref() {
            Some(sender) => sender,
            None => return Err(self.closed_error()),
        };

        let mut record = self.pool.acquire(len + 1);
        {
            let bytes = record.bytes_mut();
            bytes.resize(len, 0);
            let written = render(&mut bytes[..])?;
            bytes.truncate(written.min(len));
            bytes.push(b'\n');
        }

        match sender.try_send(record) {
            Ok(()) => {
                self.metrics.record_accepted();
                Ok(true)
            }
            Err(TrySendError::Full(record)) => {
                drop(record);
                self.alert_dropped();
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(self.closed_error()),
        }
    }

    /// Flush the sink's own buffers.
    ///
    /// Serialized with consumer writes; entries still queued or batched are
    /// not included.
    pub fn flush(&self) -> Result<()> {
        let mut sink = self.sink.lock();
        match sink.as_mut() {
            Some(writer) => writer.flush().map_err(|e| {
                LoggerError::io_operation("flushing log sink", "sink flush failed", e)
            }),
            None => Err(LoggerError::WriterClosed),
        }
    }

    /// Stop accepting entries, drain everything already accepted, flush and
    /// release the sink.
    ///
    /// Idempotent; a concurrent caller waits for the first to finish. A fatal
    /// consumer error is returned by the first call only.
    pub fn close(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        let handle = match worker.take() {
            Some(handle) => handle,
            None => return Ok(()),
        };

        self.state.store(STATE_DRAINING, Ordering::Release);
        drop(self.sender.write().take());

        let outcome = match handle.join() {
            Ok(result) => result,
            Err(_) => Err(LoggerError::WriterFailed(
                "background consumer panicked".to_string(),
            )),
        };

        let released = self.sink.lock().take();
        let flushed = match released {
            Some(mut writer) => writer.flush().map_err(|e| {
                LoggerError::io_operation("closing log sink", "final flush failed", e)
            }),
            None => Ok(()),
        };

        self.state.store(STATE_CLOSED, Ordering::Release);
        outcome.and(flushed)
    }

    pub fn state(&self) -> WriterState {
        match self.state.load(Ordering::Acquire) {
            STATE_OPEN => WriterState::Open,
            STATE_DRAINING => WriterState::Draining,
            _ => WriterState::Closed,
        }
    }

    /// Entries waiting in the queue
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn metrics(&self) -> &WriterMetrics {
        &self.metrics
    }

    fn closed_error(&self) -> LoggerError {
        match self.failure.lock().as_ref() {
            Some(message) => LoggerError::WriterFailed(message.clone()),
            None => LoggerError::WriterClosed,
        }
    }

    /// Count a dropped entry and alert on the first and every 1000th drop
    fn alert_dropped(&self) {
        let dropped = self.metrics.record_dropped() + 1;

        if dropped == 1 || dropped % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Writer queue full, {} entries dropped. \
                 Consider increasing the channel capacity.",
                dropped
            );

            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
        }
    }
}

impl Drop for BoundedWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close writer: {}", e);
        }
    }
}

/// Background half of the writer; owns the receiver and the batch buffer.
struct Consumer {
    receiver: Receiver<EncodedRecord>,
    batch: BatchBuffer,
    sink: SharedSink,
    metrics: Arc<WriterMetrics>,
    oversize_policy: OversizePolicy,
    write_failure_policy: WriteFailurePolicy,
}

impl Consumer {
    fn run(&mut self) -> Result<()> {
        // recv only fails once the channel is disconnected and empty, so
        // leaving this loop means every accepted entry has been taken.
        while let Ok(record) = self.receiver.recv() {
            self.accept(record)?;
            while let Ok(record) = self.receiver.try_recv() {
                self.accept(record)?;
            }
            self.write_batch()?;
            self.flush_sink()?;
        }

        self.write_batch()?;
        self.flush_sink()
    }

    fn accept(&mut self, record: EncodedRecord) -> Result<()> {
        let len = record.len();

        if len > self.batch.capacity() {
            let oversized = self.metrics.record_oversized() + 1;
            return match self.oversize_policy {
                OversizePolicy::Reject => {
                    self.metrics.record_discarded(1);
                    if oversized == 1 || oversized % 1000 == 0 {
                        let err = LoggerError::EntryTooLarge {
                            size: len,
                            max: self.batch.capacity(),
                        };
                        eprintln!("[LOGGER WARNING] {} ({} rejected so far)", err, oversized);
                    }
                    Ok(())
                }
                OversizePolicy::WriteThrough => {
                    self.write_batch()?;
                    let result = self.write_to_sink(record.as_bytes());
                    self.settle(result, 1)
                }
            };
        }

        if !self.batch.fits(len) {
            self.write_batch()?;
        }
        self.batch.append(record.as_bytes());
        drop(record);

        if self.batch.should_flush() {
            self.write_batch()?;
        }
        Ok(())
    }

    fn write_batch(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let entries = self.batch.entries() as u64;
        let result = {
            let mut sink = self.sink.lock();
            match sink.as_mut() {
                Some(writer) => writer.write_all(self.batch.as_bytes()),
                None => Ok(()),
            }
        };
        if result.is_ok() {
            self.metrics.record_batch(self.batch.as_bytes().len());
        }
        self.batch.clear();
        self.settle(result, entries)
    }

    fn write_to_sink(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut sink = self.sink.lock();
        match sink.as_mut() {
            Some(writer) => {
                writer.write_all(bytes)?;
                self.metrics.record_batch(bytes.len());
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn flush_sink(&mut self) -> Result<()> {
        let result = {
            let mut sink = self.sink.lock();
            match sink.as_mut() {
                Some(writer) => writer.flush(),
                None => Ok(()),
            }
        };
        self.settle(result, 0)
    }

    /// Apply the write failure policy to a sink result
    fn settle(&self, result: std::io::Result<()>, entries: u64) -> Result<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        let failures = self.metrics.record_write_failure() + 1;
        self.metrics.record_discarded(entries);

        match self.write_failure_policy {
            WriteFailurePolicy::Terminate => Err(LoggerError::io_operation(
                "writing log batch",
                format!("sink write failed, {} entries lost", entries),
                err,
            )),
            WriteFailurePolicy::Swallow => {
                if failures == 1 || failures % 1000 == 0 {
                    eprintln!(
                        "[LOGGER ERROR] Sink write failed ({} failures so far): {}",
                        failures, err
                    );
                }
                Ok(())
            }
        }
    }
}
