//! File processor implementation
//!
//! Records are rendered by a [`FileFormatter`] straight into the pooled
//! buffers of a [`BoundedWriter`], whose consumer thread writes batches to a
//! [`RotatingFileSink`].

use super::file_factory::LogFileFactory;
use super::rotating_file::RotatingFileSink;
use crate::core::{
    bounded_writer::BoundedWriter,
    config::FileSinkConfig,
    formatter::{FileFormatter, LogFormatter},
    log_record::LogRecord,
    Close, LogLevel, LogProcessor, Result,
};

/// Closeable processor writing `HH:mm:ss [L] [tag] message` lines to
/// timestamped log files.
///
/// Register it with
/// [`add_closeable_processor`](crate::LoggerBuilder::add_closeable_processor)
/// so that disposing the logger drains and releases the file.
///
/// # Examples
///
/// ```no_run
/// use rust_log_pipeline::{FileProcessor, FileSinkConfig, Logger, LogLevel};
/// use std::sync::Arc;
///
/// let file = Arc::new(FileProcessor::new(&FileSinkConfig::new("logs", "app")).unwrap());
/// let logger = Logger::builder()
///     .add_closeable_processor(file)
///     .set_minimum_level(LogLevel::Information)
///     .build()
///     .unwrap();
///
/// logger.information("App", "started").unwrap();
/// logger.dispose().unwrap();
/// ```
pub struct FileProcessor {
    writer: BoundedWriter,
    formatter: FileFormatter,
}

impl FileProcessor {
    /// Open the first log file and start the background writer
    pub fn new(config: &FileSinkConfig) -> Result<Self> {
        config.validate()?;

        let factory = LogFileFactory::from_config(config)?;
        let sink = RotatingFileSink::new(factory, config.rotation.clone())?;
        let writer = BoundedWriter::new(sink, config.writer_config())?;

        Ok(Self::with_writer(writer))
    }

    /// Use an already configured writer, e.g. one with an overflow callback
    pub fn with_writer(writer: BoundedWriter) -> Self {
        Self {
            writer,
            formatter: FileFormatter::new(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: FileFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn writer(&self) -> &BoundedWriter {
        &self.writer
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.flush()
    }
}

impl LogProcessor for FileProcessor {
    fn process_log(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        let record = LogRecord::new(level, tag, message);
        let len = self.formatter.buffer_size(&record);
        // A dropped entry is already counted and reported by the writer
        self.writer
            .add_formatted(len, |buf| self.formatter.format(buf, &record))?;
        Ok(())
    }
}

impl Close for FileProcessor {
    fn close(&self) -> Result<()> {
        self.writer.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatter::Clock;
    use crate::core::LoggerError;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_processor_writes_lines() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig::new(dir.path(), "logs");
        let clock = Clock::Fixed(Utc.with_ymd_and_hms(2024, 5, 1, 13, 14, 15).unwrap());
        let processor = FileProcessor::new(&config)
            .unwrap()
            .with_formatter(FileFormatter::new().with_clock(clock));

        processor.process_log(LogLevel::Information, "Tag", "Msg").unwrap();
        processor.process_log(LogLevel::Error, "Net", "down").unwrap();
        processor.close().unwrap();

        let files = LogFileFactory::from_config(&config).unwrap().log_files().unwrap();
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(&files[0].path).unwrap();
        assert_eq!(content, "13:14:15 [I] [Tag] Msg\n13:14:15 [E] [Net] down\n");
    }

    #[test]
    fn test_process_after_close_fails() {
        let dir = tempdir().unwrap();
        let processor = FileProcessor::new(&FileSinkConfig::new(dir.path(), "logs")).unwrap();
        processor.close().unwrap();
        processor.close().unwrap();

        let err = processor
            .process_log(LogLevel::Information, "Tag", "late")
            .unwrap_err();
        assert!(matches!(err, LoggerError::WriterClosed));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FileSinkConfig::new("", "logs");
        assert!(matches!(
            FileProcessor::new(&config),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}
