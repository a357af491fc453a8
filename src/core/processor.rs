//! Processor and source traits

use super::{error::Result, log_level::LogLevel};
use std::sync::Arc;

/// Destination for records that passed the level gate.
pub trait LogProcessor: Send + Sync {
    fn process_log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()>;
}

/// Release capability for processors that own resources.
///
/// Declared when the processor is registered (see
/// [`LoggerBuilder::add_closeable_processor`](crate::LoggerBuilder::add_closeable_processor)),
/// so the logger never inspects processors at dispatch time.
pub trait Close: Send + Sync {
    fn close(&self) -> Result<()>;
}

/// Long-lived object that feeds external events into a built logger's processors.
pub trait LogSource: Send + Sync {
    fn close(&self) -> Result<()>;
}

/// The immutable processor array shared by a logger and its sources.
pub type ProcessorList = Arc<[Arc<dyn LogProcessor>]>;

/// Creates a source from the final processor array of a logger being built.
pub type SourceFactory = Arc<dyn Fn(ProcessorList) -> Result<Box<dyn LogSource>> + Send + Sync>;

impl<T: LogProcessor + ?Sized> LogProcessor for Arc<T> {
    #[inline]
    fn process_log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        (**self).process_log(level, tag, message)
    }
}

impl<T: Close + ?Sized> Close for Arc<T> {
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}
