//! Borrowed log record passed through formatters

use super::log_level::LogLevel;

/// A single log call, alive only for the duration of formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub tag: &'a str,
    pub message: &'a str,
}

impl<'a> LogRecord<'a> {
    #[inline]
    pub fn new(level: LogLevel, tag: &'a str, message: &'a str) -> Self {
        Self { level, tag, message }
    }
}
