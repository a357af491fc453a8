//! Main logger implementation

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    processor::{Close, LogProcessor, LogSource, ProcessorList, SourceFactory},
};
use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scratch strings above this capacity are shrunk after use
const MAX_RETAINED_SCRATCH: usize = 64 * 1024;

thread_local! {
    static SCRATCH: RefCell<String> = RefCell::new(String::with_capacity(256));
}

/// Level gate in front of an immutable list of processors.
///
/// Dispatch is synchronous and lock-free: every record that passes the gate
/// is handed to each processor in registration order on the calling thread.
/// Processors that need to do I/O off the hot path (such as
/// [`FileProcessor`](crate::FileProcessor)) queue internally.
///
/// Share a logger across threads with `Arc<Logger>`.
pub struct Logger {
    processors: ProcessorList,
    closers: Vec<Arc<dyn Close>>,
    sources: Vec<Box<dyn LogSource>>,
    min_level: LogLevel,
    disposed: AtomicBool,
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_log_pipeline::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let logger = Logger::builder()
    ///     .set_minimum_level(LogLevel::Debug)
    ///     .add_log_processor(Arc::new(ConsoleProcessor::new()))
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether a record at `level` would reach the processors
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Dispatch one record.
    ///
    /// Records below the minimum level are ignored. Otherwise every processor
    /// receives the record; the first processor error stops dispatch and is
    /// returned.
    ///
    /// # Errors
    ///
    /// `Disposed` once [`dispose`](Self::dispose) has been called.
    pub fn log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        if self.is_disposed() {
            return Err(LoggerError::Disposed);
        }
        if !self.is_enabled(level) {
            return Ok(());
        }
        self.dispatch(level, tag, message)
    }

    /// Like [`log`](Self::log), but the message is only rendered when the
    /// level passes. Used by the logging macros.
    pub fn log_args(&self, level: LogLevel, tag: &str, args: fmt::Arguments<'_>) -> Result<()> {
        // Literal messages need no rendering
        if let Some(message) = args.as_str() {
            return self.log(level, tag, message);
        }
        self.log_with(level, tag, |buf| {
            // Writing to a String only fails if a Display impl does
            let _ = buf.write_fmt(args);
        })
    }

    /// Render the message with `render` into a reused per-thread buffer,
    /// only if the level passes.
    pub fn log_with<F>(&self, level: LogLevel, tag: &str, render: F) -> Result<()>
    where
        F: FnOnce(&mut String),
    {
        if self.is_disposed() {
            return Err(LoggerError::Disposed);
        }
        if !self.is_enabled(level) {
            return Ok(());
        }

        SCRATCH.with(|cell| match cell.try_borrow_mut() {
            Ok(mut scratch) => {
                scratch.clear();
                render(&mut scratch);
                let result = self.dispatch(level, tag, &scratch);
                if scratch.capacity() > MAX_RETAINED_SCRATCH {
                    scratch.clear();
                    scratch.shrink_to(MAX_RETAINED_SCRATCH);
                }
                result
            }
            // A processor is logging from inside a dispatch on this thread
            Err(_) => {
                let mut owned = String::new();
                render(&mut owned);
                self.dispatch(level, tag, &owned)
            }
        })
    }

    fn dispatch(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        for processor in self.processors.iter() {
            processor.process_log(level, tag, message)?;
        }
        Ok(())
    }

    #[inline]
    pub fn debug(&self, tag: &str, message: &str) -> Result<()> {
        self.log(LogLevel::Debug, tag, message)
    }

    #[inline]
    pub fn information(&self, tag: &str, message: &str) -> Result<()> {
        self.log(LogLevel::Information, tag, message)
    }

    #[inline]
    pub fn warning(&self, tag: &str, message: &str) -> Result<()> {
        self.log(LogLevel::Warning, tag, message)
    }

    #[inline]
    pub fn error(&self, tag: &str, message: &str) -> Result<()> {
        self.log(LogLevel::Error, tag, message)
    }

    /// Close every source, then every closeable processor, in registration
    /// order.
    ///
    /// Only the first call does any work. Closing continues past failures;
    /// the first failure is returned after everything has been attempted.
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut first_error = None;
        for (idx, source) in self.sources.iter().enumerate() {
            if let Err(e) = source.close() {
                eprintln!("[LOGGER ERROR] Log source #{} failed to close: {}", idx, e);
                first_error.get_or_insert(e);
            }
        }
        for (idx, closer) in self.closers.iter().enumerate() {
            if let Err(e) = closer.close() {
                eprintln!("[LOGGER ERROR] Processor #{} failed to close: {}", idx, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if !self.is_disposed() {
            // Failures were already reported per component
            let _ = self.dispose();
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// The builder can be reused: each [`build`](Self::build) snapshots the
/// current registrations into a new, independent logger. Processor instances
/// are shared by every logger built from them.
///
/// # Example
/// ```
/// use rust_log_pipeline::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryProcessor::new());
/// let builder = Logger::builder()
///     .set_minimum_level(LogLevel::Warning)
///     .add_closeable_processor(memory.clone());
///
/// let logger = builder.build().unwrap();
/// logger.information("App", "filtered").unwrap();
/// logger.warning("App", "kept").unwrap();
/// assert_eq!(memory.len(), 1);
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    processors: Vec<Arc<dyn LogProcessor>>,
    closers: Vec<Arc<dyn Close>>,
    sources: Vec<SourceFactory>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::default(),
            processors: Vec::new(),
            closers: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Add a processor that owns nothing to release
    #[must_use = "builder methods return a new value"]
    pub fn add_log_processor<P>(mut self, processor: Arc<P>) -> Self
    where
        P: LogProcessor + 'static,
    {
        self.processors.push(processor);
        self
    }

    /// Add a processor that is closed when the logger is disposed
    #[must_use = "builder methods return a new value"]
    pub fn add_closeable_processor<P>(mut self, processor: Arc<P>) -> Self
    where
        P: LogProcessor + Close + 'static,
    {
        self.processors.push(processor.clone());
        self.closers.push(processor);
        self
    }

    /// Set minimum log level
    ///
    /// With `LogLevel::None` only records at `None` itself pass.
    #[must_use = "builder methods return a new value"]
    pub fn set_minimum_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Register a source created from the final processor array at build time
    #[must_use = "builder methods return a new value"]
    pub fn add_log_source(mut self, factory: SourceFactory) -> Self {
        self.sources.push(factory);
        self
    }

    /// Build a Logger from the current registrations
    ///
    /// # Errors
    ///
    /// Returns the first source factory error. Sources already created for
    /// this build are closed before returning.
    pub fn build(&self) -> Result<Logger> {
        let processors: ProcessorList = self.processors.iter().cloned().collect();

        let mut sources: Vec<Box<dyn LogSource>> = Vec::with_capacity(self.sources.len());
        for factory in &self.sources {
            match factory(Arc::clone(&processors)) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    for source in &sources {
                        if let Err(close_err) = source.close() {
                            eprintln!(
                                "[LOGGER ERROR] Failed to close log source after build error: {}",
                                close_err
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(Logger {
            processors,
            closers: self.closers.clone(),
            sources,
            min_level: self.min_level,
            disposed: AtomicBool::new(false),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
