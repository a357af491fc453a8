//! Console processor implementation

use crate::core::{
    formatter::{ConsoleFormatter, LogFormatter},
    log_record::LogRecord,
    LogLevel, LogProcessor, Result,
};
use parking_lot::Mutex;
use std::io::Write;

pub struct ConsoleProcessor {
    formatter: ConsoleFormatter,
    scratch: Mutex<Vec<u8>>,
}

impl ConsoleProcessor {
    pub fn new() -> Self {
        Self::with_formatter(ConsoleFormatter::new())
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self::with_formatter(ConsoleFormatter::with_colors(use_colors))
    }

    pub fn with_formatter(formatter: ConsoleFormatter) -> Self {
        Self {
            formatter,
            scratch: Mutex::new(Vec::with_capacity(256)),
        }
    }
}

impl Default for ConsoleProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl LogProcessor for ConsoleProcessor {
    fn process_log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        let record = LogRecord::new(level, tag, message);
        let len = self.formatter.buffer_size(&record);

        let mut scratch = self.scratch.lock();
        scratch.clear();
        scratch.resize(len + 1, 0);
        let written = self.formatter.format(&mut scratch[..len], &record)?;
        scratch.truncate(written);
        scratch.push(b'\n');

        // Route errors to stderr, others to stdout
        match level {
            LogLevel::Error => std::io::stderr().lock().write_all(&scratch)?,
            _ => std::io::stdout().lock().write_all(&scratch)?,
        }
        Ok(())
    }
}
