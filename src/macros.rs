//! Logging macros for ergonomic log message formatting.
//!
//! These macros take a logger, a tag and `format!`-style arguments. The
//! arguments are captured with `format_args!` and only rendered when the
//! level passes the logger's gate, so a filtered call costs one comparison.
//!
//! Each macro evaluates to the logger's `Result<()>`.
//!
//! # Examples
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::info;
//! use std::sync::Arc;
//!
//! let logger = Logger::builder()
//!     .add_log_processor(Arc::new(MemoryProcessor::new()))
//!     .build()
//!     .unwrap();
//!
//! // Basic logging
//! info!(logger, "Server", "started").unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server", "listening on port {}", port).unwrap();
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_log_pipeline::log;
/// log!(logger, LogLevel::Information, "Http", "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Http", "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $tag:expr, $($arg:tt)+) => {
        $logger.log_args($level, $tag, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().set_minimum_level(LogLevel::Debug).build().unwrap();
/// use rust_log_pipeline::debug;
/// debug!(logger, "Cache", "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $tag, $($arg)+)
    };
}

/// Log an information-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Information, $tag, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_pipeline::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_log_pipeline::warning;
/// warning!(logger, "Disk", "Usage at {}%", 85).unwrap();
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $tag, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $tag, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::sync::Arc;

    fn logger_with(memory: &Arc<MemoryProcessor>, level: LogLevel) -> Logger {
        Logger::builder()
            .add_log_processor(memory.clone())
            .set_minimum_level(level)
            .build()
            .unwrap()
    }

    #[test]
    fn test_macros_format_arguments() {
        let memory = Arc::new(MemoryProcessor::with_formatter(
            crate::ConsoleFormatter::with_colors(false),
        ));
        let logger = logger_with(&memory, LogLevel::Debug);

        crate::debug!(logger, "T", "value {}", 1).unwrap();
        crate::info!(logger, "T", "plain").unwrap();
        crate::warning!(logger, "T", "{} and {}", "a", "b").unwrap();
        crate::error!(logger, "T", "code {code}", code = 7).unwrap();
        crate::log!(logger, LogLevel::Information, "T", "{:>4}", 42).unwrap();

        assert_eq!(
            memory.lines(),
            vec!["[T] value 1", "[T] plain", "! [T] a and b", "! [T] code 7", "[T]   42"]
        );
    }

    #[test]
    fn test_filtered_macro_does_not_evaluate_display() {
        use std::fmt;
        use std::sync::atomic::{AtomicUsize, Ordering};

        static RENDERS: AtomicUsize = AtomicUsize::new(0);

        struct Expensive;

        impl fmt::Display for Expensive {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                RENDERS.fetch_add(1, Ordering::SeqCst);
                f.write_str("expensive")
            }
        }

        let memory = Arc::new(MemoryProcessor::new());
        let logger = logger_with(&memory, LogLevel::Error);

        crate::debug!(logger, "T", "{}", Expensive).unwrap();
        assert_eq!(RENDERS.load(Ordering::SeqCst), 0);
        assert!(memory.is_empty());

        crate::error!(logger, "T", "{}", Expensive).unwrap();
        assert_eq!(RENDERS.load(Ordering::SeqCst), 1);
        assert_eq!(memory.len(), 1);
    }
}
