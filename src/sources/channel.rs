//! Channel-fed log source
//!
//! Forwards [`SourceEvent`]s received on a crossbeam channel to a logger's
//! processors from a dedicated thread. Useful for routing events from
//! subsystems that should not hold a [`Logger`](crate::Logger) themselves.

use crate::core::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    processor::{LogSource, ProcessorList, SourceFactory},
};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// An externally produced log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvent {
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
}

impl SourceEvent {
    pub fn new(level: LogLevel, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// Log source draining a [`Receiver<SourceEvent>`] on its own thread
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::{ChannelSource, LogLevel, Logger, MemoryProcessor, SourceEvent};
/// use std::sync::Arc;
///
/// let (tx, rx) = crossbeam_channel::bounded(64);
/// let memory = Arc::new(MemoryProcessor::new());
/// let logger = Logger::builder()
///     .add_log_processor(memory.clone())
///     .add_log_source(ChannelSource::factory(rx, LogLevel::Debug))
///     .build()
///     .unwrap();
///
/// tx.send(SourceEvent::new(LogLevel::Warning, "Net", "retrying")).unwrap();
///
/// // Disposing closes the source, which forwards what is already queued
/// logger.dispose().unwrap();
/// assert_eq!(memory.len(), 1);
/// ```
pub struct ChannelSource {
    shutdown: Mutex<Option<Sender<()>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    forwarded: Arc<AtomicU64>,
}

impl ChannelSource {
    /// Start forwarding events at or above `min_level` to `processors`
    pub fn spawn(
        events: Receiver<SourceEvent>,
        processors: ProcessorList,
        min_level: LogLevel,
    ) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let forwarded = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&forwarded);

        let handle = thread::Builder::new()
            .name("log-source".to_string())
            .spawn(move || {
                let forward = |event: SourceEvent| {
                    if event.level >= min_level {
                        dispatch(&processors, &event);
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                };

                loop {
                    let running = select! {
                        recv(events) -> event => match event {
                            Ok(event) => {
                                forward(event);
                                true
                            }
                            // All producers gone
                            Err(_) => false,
                        },
                        recv(shutdown_rx) -> _ => {
                            // Forward what was queued before shutdown
                            while let Ok(event) = events.try_recv() {
                                forward(event);
                            }
                            false
                        }
                    };
                    if !running {
                        break;
                    }
                }
            })
            .map_err(|e| {
                LoggerError::source_failed(format!("failed to spawn source thread: {}", e))
            })?;

        Ok(Self {
            shutdown: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(handle)),
            forwarded,
        })
    }

    /// Factory for [`LoggerBuilder::add_log_source`](crate::LoggerBuilder::add_log_source).
    ///
    /// The receiver is shared, so every logger built from the same builder
    /// competes for the same events.
    pub fn factory(events: Receiver<SourceEvent>, min_level: LogLevel) -> SourceFactory {
        Arc::new(move |processors: ProcessorList| -> Result<Box<dyn LogSource>> {
            let source = ChannelSource::spawn(events.clone(), processors, min_level)?;
            Ok(Box::new(source) as Box<dyn LogSource>)
        })
    }

    /// Number of events handed to the processors
    pub fn forwarded_count(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn dispatch(processors: &ProcessorList, event: &SourceEvent) {
    for (idx, processor) in processors.iter().enumerate() {
        // Per-processor panic isolation: there is no caller to unwind into
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            processor.process_log(event.level, &event.tag, &event.message)
        }));

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Processor #{} failed (source): {}", idx, e);
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Processor #{} panicked (source): {}. \
                     Other processors continue to function.",
                    idx, panic_msg
                );
            }
        }
    }
}

impl LogSource for ChannelSource {
    /// Stop the worker after it forwards everything already queued.
    /// Idempotent; later calls return `Ok(())`.
    fn close(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        let handle = match worker.take() {
            Some(handle) => handle,
            None => return Ok(()),
        };

        if let Some(shutdown) = self.shutdown.lock().take() {
            // The worker may already have exited on disconnect
            let _ = shutdown.send(());
        }

        handle
            .join()
            .map_err(|_| LoggerError::source_failed("source thread panicked"))
    }
}

impl Drop for ChannelSource {
    fn drop(&mut self) {
        if let Err(e) = LogSource::close(self) {
            eprintln!("[LOGGER ERROR] Failed to close log source: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::LogProcessor;
    use crate::processors::MemoryProcessor;
    use crossbeam_channel::unbounded;

    fn processors(memory: &Arc<MemoryProcessor>) -> ProcessorList {
        let list: Vec<Arc<dyn LogProcessor>> = vec![memory.clone()];
        list.into()
    }

    #[test]
    fn test_forwards_events_above_min_level() {
        let memory = Arc::new(MemoryProcessor::new());
        let (tx, rx) = unbounded();
        let source = ChannelSource::spawn(rx, processors(&memory), LogLevel::Warning).unwrap();

        tx.send(SourceEvent::new(LogLevel::Debug, "S", "skip")).unwrap();
        tx.send(SourceEvent::new(LogLevel::Warning, "S", "keep")).unwrap();
        tx.send(SourceEvent::new(LogLevel::Error, "S", "keep too")).unwrap();
        source.close().unwrap();

        let lines = memory.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[W] [S] keep"));
        assert!(lines[1].ends_with("[E] [S] keep too"));
        assert_eq!(source.forwarded_count(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let memory = Arc::new(MemoryProcessor::new());
        let (_tx, rx) = unbounded();
        let source = ChannelSource::spawn(rx, processors(&memory), LogLevel::Debug).unwrap();

        assert!(source.is_running());
        source.close().unwrap();
        source.close().unwrap();
        assert!(!source.is_running());
    }

    #[test]
    fn test_exits_when_producers_disconnect() {
        let memory = Arc::new(MemoryProcessor::new());
        let (tx, rx) = unbounded();
        let source = ChannelSource::spawn(rx, processors(&memory), LogLevel::Debug).unwrap();

        tx.send(SourceEvent::new(LogLevel::Information, "S", "last")).unwrap();
        drop(tx);
        source.close().unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_processor_errors_do_not_stop_source() {
        let memory = Arc::new(MemoryProcessor::new());
        let (tx, rx) = unbounded();
        let source = ChannelSource::spawn(rx, processors(&memory), LogLevel::Debug).unwrap();

        crate::core::processor::Close::close(&*memory).unwrap();
        tx.send(SourceEvent::new(LogLevel::Error, "S", "rejected")).unwrap();
        tx.send(SourceEvent::new(LogLevel::Error, "S", "rejected too")).unwrap();
        source.close().unwrap();

        assert_eq!(source.forwarded_count(), 2);
        assert!(memory.is_empty());
    }
}
