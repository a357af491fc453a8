//! Rotating file sink
//!
//! A [`Write`] implementation over files produced by a [`LogFileFactory`].
//! When the rotation strategy triggers, the current file is flushed and a
//! fresh one is requested from the factory, which also applies retention.

use super::file_factory::{LogFile, LogFileFactory};
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Rotation strategy defining when to start a new log file
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::RotationStrategy;
/// use std::time::Duration;
///
/// // Rotate when file exceeds 100 MB
/// let size_strategy = RotationStrategy::Size { max_bytes: 100 * 1024 * 1024 };
///
/// // Rotate every hour
/// let time_strategy = RotationStrategy::Time { interval: Duration::from_secs(3600) };
///
/// // Rotate on size OR time, whichever comes first
/// let hybrid_strategy = RotationStrategy::Hybrid {
///     max_bytes: 50 * 1024 * 1024,
///     interval: Duration::from_secs(24 * 3600),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStrategy {
    /// Rotate when file exceeds size in bytes
    Size { max_bytes: u64 },

    /// Rotate at time interval
    Time { interval: Duration },

    /// Rotate on size OR time, whichever comes first
    Hybrid { max_bytes: u64, interval: Duration },

    /// One file per sink
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn time(interval: Duration) -> Self {
        RotationStrategy::Time { interval }
    }

    #[must_use]
    pub fn hybrid(max_bytes: u64, interval: Duration) -> Self {
        RotationStrategy::Hybrid { max_bytes, interval }
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }
}

/// File sink that rotates between factory-created files
pub struct RotatingFileSink {
    factory: LogFileFactory,
    strategy: RotationStrategy,
    writer: Option<BufWriter<File>>,
    current: LogFile,
    current_size: u64,
    opened_at: SystemTime,
    /// Rotation only happens between lines, never inside one
    at_line_start: bool,
    rotations: u64,
}

impl RotatingFileSink {
    /// Open the first file through `factory`
    pub fn new(factory: LogFileFactory, strategy: RotationStrategy) -> Result<Self> {
        let (current, writer) = factory.create_file()?;
        Ok(Self {
            factory,
            strategy,
            writer: Some(writer),
            current,
            current_size: 0,
            opened_at: SystemTime::now(),
            at_line_start: true,
            rotations: 0,
        })
    }

    fn should_rotate(&self) -> bool {
        if !self.at_line_start || self.current_size == 0 {
            return false;
        }

        let elapsed = || {
            SystemTime::now()
                .duration_since(self.opened_at)
                .unwrap_or(Duration::ZERO)
        };

        match &self.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => self.current_size >= *max_bytes,
            RotationStrategy::Time { interval } => elapsed() >= *interval,
            RotationStrategy::Hybrid { max_bytes, interval } => {
                self.current_size >= *max_bytes || elapsed() >= *interval
            }
        }
    }

    /// Switch to a fresh file. On failure the current file stays in use.
    fn rotate(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }

        let (next, writer) = self.factory.create_file()?;
        // The old handle (and its lock) is released here
        self.writer = Some(writer);
        self.current = next;
        self.current_size = 0;
        self.opened_at = SystemTime::now();
        self.rotations += 1;
        Ok(())
    }

    pub fn current_file(&self) -> &LogFile {
        &self.current
    }

    pub fn current_path(&self) -> &Path {
        &self.current.path
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn rotation_count(&self) -> u64 {
        self.rotations
    }

    pub fn strategy(&self) -> &RotationStrategy {
        &self.strategy
    }

    pub fn factory(&self) -> &LogFileFactory {
        &self.factory
    }
}

impl Write for RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate() {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with {}.",
                    e,
                    self.current.path.display()
                );
                // Restart the trigger so a broken rotation is not retried on every write
                self.current_size = 0;
                self.opened_at = SystemTime::now();
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "log file is not open"))?;
        let written = writer.write(buf)?;
        if written > 0 {
            self.current_size += written as u64;
            self.at_line_start = buf[written - 1] == b'\n';
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    fn factory(dir: &Path, max_files: usize) -> LogFileFactory {
        LogFileFactory::new(dir, "logs", max_files, 4096).unwrap()
    }

    #[test]
    fn test_rotation_strategy_constructors() {
        assert_eq!(RotationStrategy::size(1024), RotationStrategy::Size { max_bytes: 1024 });
        assert_eq!(
            RotationStrategy::time(Duration::from_secs(3600)),
            RotationStrategy::Time {
                interval: Duration::from_secs(3600)
            }
        );
        assert_eq!(RotationStrategy::never(), RotationStrategy::Never);
        assert_eq!(
            RotationStrategy::default(),
            RotationStrategy::Size {
                max_bytes: 10 * 1024 * 1024
            }
        );
    }

    #[test]
    fn test_size_rotation_respects_retention() {
        let dir = tempdir().unwrap();
        let mut sink =
            RotatingFileSink::new(factory(dir.path(), 3), RotationStrategy::size(64)).unwrap();

        for i in 0..40 {
            sink.write_all(format!("entry number {:03}\n", i).as_bytes()).unwrap();
            if i % 4 == 0 {
                // Distinct millisecond timestamps keep creation order obvious
                thread::sleep(Duration::from_millis(2));
            }
        }
        sink.flush().unwrap();

        assert!(sink.rotation_count() > 0);
        let files = sink.factory().log_files().unwrap();
        assert!(files.len() <= 3);
        assert_eq!(files.last().unwrap().path, sink.current_path());
    }

    #[test]
    fn test_never_strategy_keeps_single_file() {
        let dir = tempdir().unwrap();
        let mut sink =
            RotatingFileSink::new(factory(dir.path(), 3), RotationStrategy::never()).unwrap();

        for i in 0..100 {
            sink.write_all(format!("entry {}\n", i).as_bytes()).unwrap();
        }
        sink.flush().unwrap();

        assert_eq!(sink.rotation_count(), 0);
        let content = fs::read_to_string(sink.current_path()).unwrap();
        assert_eq!(content.lines().count(), 100);
    }

    #[test]
    fn test_time_rotation() {
        let dir = tempdir().unwrap();
        let mut sink = RotatingFileSink::new(
            factory(dir.path(), 5),
            RotationStrategy::time(Duration::from_millis(30)),
        )
        .unwrap();

        sink.write_all(b"before\n").unwrap();
        thread::sleep(Duration::from_millis(40));
        sink.write_all(b"after\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(sink.rotation_count(), 1);
        assert_eq!(fs::read_to_string(sink.current_path()).unwrap(), "after\n");
    }

    #[test]
    fn test_no_rotation_inside_a_line() {
        let dir = tempdir().unwrap();
        let mut sink =
            RotatingFileSink::new(factory(dir.path(), 5), RotationStrategy::size(4)).unwrap();

        sink.write_all(b"partial").unwrap();
        sink.write_all(b" line\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(sink.rotation_count(), 0);
        assert_eq!(
            fs::read_to_string(sink.current_path()).unwrap(),
            "partial line\n"
        );
    }
}
