//! # Rust Log Pipeline
//!
//! A structured logging pipeline: a level gate in front of pluggable
//! processors, size-exact line formatters, and a non-blocking batching writer
//! that feeds timestamped, count-retained log files.
//!
//! ## Features
//!
//! - **Non-blocking producers**: file records go through a bounded
//!   drop-newest queue drained by a background thread
//! - **Size-exact formatting**: lines are rendered straight into pooled buffers
//! - **File retention**: `yyyyMMdd_HHmmss_fff.log` files, oldest deleted first
//! - **Log sources**: external event streams forwarded into a built logger
//!
//! ## Example
//!
//! ```no_run
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::info;
//! use std::sync::Arc;
//!
//! let file = Arc::new(FileProcessor::new(&FileSinkConfig::new("logs", "app")).unwrap());
//! let logger = Logger::builder()
//!     .add_log_processor(Arc::new(ConsoleProcessor::new()))
//!     .add_closeable_processor(file)
//!     .set_minimum_level(LogLevel::Information)
//!     .build()
//!     .unwrap();
//!
//! info!(logger, "App", "started with {} workers", 4).unwrap();
//! logger.dispose().unwrap();
//! ```

pub mod core;
pub mod macros;
pub mod processors;
pub mod sources;

pub mod prelude {
    pub use crate::core::{
        BoundedWriter, Close, FileSinkConfig, LogLevel, LogProcessor, LogSource, Logger,
        LoggerBuilder, LoggerError, Result, WriterConfig,
    };
    pub use crate::processors::{ConsoleProcessor, FileProcessor, MemoryProcessor};
    pub use crate::sources::{ChannelSource, SourceEvent};
}

pub use crate::core::{
    BoundedWriter, BufferPool, Clock, Close, ConsoleFormatter, EncodedRecord, FileFormatter,
    FileSinkConfig, LogFormatter, LogLevel, LogProcessor, LogRecord, LogSource, Logger,
    LoggerBuilder, LoggerError, OverflowCallback, OversizePolicy, ProcessorList, Result,
    SourceFactory, WriteFailurePolicy, WriterConfig, WriterMetrics, WriterState,
};
pub use processors::{
    ConsoleProcessor, FileProcessor, LogFile, LogFileFactory, MemoryProcessor, RotatingFileSink,
    RotationStrategy,
};
pub use sources::{ChannelSource, SourceEvent};
