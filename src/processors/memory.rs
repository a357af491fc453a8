//! In-memory processor, mostly useful in tests and for in-app log views

use crate::core::{
    formatter::{FileFormatter, LogFormatter},
    log_record::LogRecord,
    Close, LogLevel, LogProcessor, LoggerError, Result,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps every rendered line. Closing it makes later records fail with
/// [`LoggerError::Disposed`].
pub struct MemoryProcessor {
    formatter: Box<dyn LogFormatter>,
    lines: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MemoryProcessor {
    pub fn new() -> Self {
        Self::with_formatter(FileFormatter::new())
    }

    pub fn with_formatter(formatter: impl LogFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            lines: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Snapshot of the lines received so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for MemoryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl LogProcessor for MemoryProcessor {
    fn process_log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::Disposed);
        }

        let record = LogRecord::new(level, tag, message);
        let mut buf = vec![0u8; self.formatter.buffer_size(&record)];
        let written = self.formatter.format(&mut buf, &record)?;
        buf.truncate(written);

        let line = String::from_utf8(buf).map_err(|e| {
            LoggerError::formatter(self.formatter.format_type(), e.to_string())
        })?;
        self.lines.lock().push(line);
        Ok(())
    }
}

impl Close for MemoryProcessor {
    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatter::ConsoleFormatter;

    #[test]
    fn test_collects_rendered_lines() {
        let processor = MemoryProcessor::with_formatter(ConsoleFormatter::with_colors(false));
        processor.process_log(LogLevel::Information, "A", "one").unwrap();
        processor.process_log(LogLevel::Warning, "B", "two").unwrap();

        assert_eq!(processor.lines(), vec!["[A] one", "! [B] two"]);
        processor.clear();
        assert!(processor.is_empty());
    }

    #[test]
    fn test_closed_processor_rejects_records() {
        let processor = MemoryProcessor::new();
        processor.close().unwrap();
        assert!(processor.is_closed());
        assert!(matches!(
            processor.process_log(LogLevel::Error, "A", "late"),
            Err(LoggerError::Disposed)
        ));
        assert_eq!(processor.len(), 0);
    }
}
