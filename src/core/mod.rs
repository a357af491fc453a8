//! Core pipeline types and traits

pub(crate) mod batch_buffer;
pub mod bounded_writer;
pub mod buffer_pool;
pub mod config;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod processor;

pub use bounded_writer::{BoundedWriter, WriterState};
pub use buffer_pool::{BufferPool, EncodedRecord};
pub use config::{FileSinkConfig, WriterConfig};
pub use error::{LoggerError, Result};
pub use formatter::{Clock, ConsoleFormatter, FileFormatter, LogFormatter};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::WriterMetrics;
pub use overflow_policy::{OverflowCallback, OversizePolicy, WriteFailurePolicy};
pub use processor::{Close, LogProcessor, LogSource, ProcessorList, SourceFactory};
