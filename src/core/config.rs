//! Construction-time configuration for writers and file sinks

use super::error::{LoggerError, Result};
use super::overflow_policy::{OversizePolicy, WriteFailurePolicy};
use crate::processors::rotating_file::RotationStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a [`BoundedWriter`](crate::BoundedWriter)
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::{OversizePolicy, WriterConfig};
///
/// let config = WriterConfig::new()
///     .with_buffer_capacity(16 * 1024)
///     .with_channel_capacity(256)
///     .with_oversize_policy(OversizePolicy::Reject);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Batch buffer size in bytes
    pub buffer_capacity: usize,
    /// Queue capacity in entries
    pub channel_capacity: usize,
    pub oversize_policy: OversizePolicy,
    pub write_failure_policy: WriteFailurePolicy,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 64 * 1024,
            channel_capacity: 1024,
            oversize_policy: OversizePolicy::default(),
            write_failure_policy: WriteFailurePolicy::default(),
        }
    }
}

impl WriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_channel_capacity(mut self, entries: usize) -> Self {
        self.channel_capacity = entries;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(LoggerError::config(
                "BoundedWriter",
                "buffer capacity must be positive",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(LoggerError::config(
                "BoundedWriter",
                "channel capacity must be positive",
            ));
        }
        Ok(())
    }
}

/// Retention and buffering settings for a file processor
///
/// Files are written to `root/folder` and named after their creation time.
///
/// # Examples
///
/// ```
/// use rust_log_pipeline::{FileSinkConfig, RotationStrategy};
///
/// let config = FileSinkConfig::new("/var/log/myapp", "session")
///     .with_max_file_count(5)
///     .with_rotation(RotationStrategy::size(1024 * 1024));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSinkConfig {
    pub root: PathBuf,
    pub folder: String,
    /// Maximum retained `*.log` files in the folder
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,
    /// Batch buffer and file buffer size in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Queue capacity in entries
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default)]
    pub rotation: RotationStrategy,
    #[serde(default)]
    pub oversize_policy: OversizePolicy,
    #[serde(default)]
    pub write_failure_policy: WriteFailurePolicy,
}

fn default_max_file_count() -> usize {
    10
}

fn default_buffer_size() -> usize {
    64 * 1024
}

fn default_channel_capacity() -> usize {
    1024
}

impl FileSinkConfig {
    pub fn new(root: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            folder: folder.into(),
            max_file_count: default_max_file_count(),
            buffer_size: default_buffer_size(),
            channel_capacity: default_channel_capacity(),
            rotation: RotationStrategy::default(),
            oversize_policy: OversizePolicy::default(),
            write_failure_policy: WriteFailurePolicy::default(),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_count(mut self, count: usize) -> Self {
        self.max_file_count = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_channel_capacity(mut self, entries: usize) -> Self {
        self.channel_capacity = entries;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rotation(mut self, rotation: RotationStrategy) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Writer settings derived from this sink configuration
    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            buffer_capacity: self.buffer_size,
            channel_capacity: self.channel_capacity,
            oversize_policy: self.oversize_policy,
            write_failure_policy: self.write_failure_policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(LoggerError::config("LogFileFactory", "root path is empty"));
        }
        if self.folder.is_empty() {
            return Err(LoggerError::config("LogFileFactory", "folder name is empty"));
        }
        if self.max_file_count == 0 {
            return Err(LoggerError::config(
                "LogFileFactory",
                "max file count must be positive",
            ));
        }
        if self.buffer_size == 0 {
            return Err(LoggerError::config(
                "LogFileFactory",
                "buffer size must be positive",
            ));
        }
        self.writer_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_config_validation() {
        assert!(WriterConfig::default().validate().is_ok());
        assert!(WriterConfig::new().with_buffer_capacity(0).validate().is_err());
        assert!(WriterConfig::new().with_channel_capacity(0).validate().is_err());
    }

    #[test]
    fn test_file_sink_config_validation() {
        assert!(FileSinkConfig::new("logs", "app").validate().is_ok());
        assert!(FileSinkConfig::new("", "app").validate().is_err());
        assert!(FileSinkConfig::new("logs", "").validate().is_err());
        assert!(FileSinkConfig::new("logs", "app")
            .with_max_file_count(0)
            .validate()
            .is_err());
        assert!(FileSinkConfig::new("logs", "app")
            .with_channel_capacity(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_writer_config_from_sink() {
        let config = FileSinkConfig::new("logs", "app")
            .with_buffer_size(4096)
            .with_channel_capacity(32)
            .with_oversize_policy(OversizePolicy::Reject);
        let writer = config.writer_config();
        assert_eq!(writer.buffer_capacity, 4096);
        assert_eq!(writer.channel_capacity, 32);
        assert_eq!(writer.oversize_policy, OversizePolicy::Reject);
    }
}
