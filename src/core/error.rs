//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Logger used after `dispose()`
    #[error("Logger has been disposed")]
    Disposed,

    /// Bounded writer used after `close()`
    #[error("Writer has been closed")]
    WriterClosed,

    /// Background consumer terminated on a sink failure
    #[error("Writer background consumer failed: {0}")]
    WriterFailed(String),

    /// Encoded entry larger than the batch buffer under the reject policy
    #[error("Log entry of {size} bytes exceeds batch capacity of {max} bytes")]
    EntryTooLarge { size: usize, max: usize },

    /// Retention cleanup failed
    #[error("File retention failed for '{path}': {message}")]
    FileRetention { path: String, message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// A log source failed to start or stop
    #[error("Log source error: {0}")]
    SourceFailed(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file retention error
    pub fn file_retention(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRetention {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a source error
    pub fn source_failed<S: Into<String>>(msg: S) -> Self {
        LoggerError::SourceFailed(msg.into())
    }

    /// True for errors caused by using a component after shutdown
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            LoggerError::Disposed | LoggerError::WriterClosed | LoggerError::WriterFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("BoundedWriter", "channel capacity must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_retention("/var/log/app", "Permission denied");
        assert!(matches!(err, LoggerError::FileRetention { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::EntryTooLarge { size: 100, max: 64 };
        assert_eq!(
            err.to_string(),
            "Log entry of 100 bytes exceeds batch capacity of 64 bytes"
        );

        let err = LoggerError::file_retention("/var/log/app", "Disk full");
        assert_eq!(
            err.to_string(),
            "File retention failed for '/var/log/app': Disk full"
        );

        let err = LoggerError::formatter("file", "buffer too small");
        assert_eq!(err.to_string(), "Formatter error (file): buffer too small");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log batch", "cannot write to sink", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log batch"));
        assert!(err.to_string().contains("cannot write to sink"));
    }

    #[test]
    fn test_invalid_state_classification() {
        assert!(LoggerError::Disposed.is_invalid_state());
        assert!(LoggerError::WriterClosed.is_invalid_state());
        assert!(LoggerError::WriterFailed("boom".into()).is_invalid_state());
        assert!(!LoggerError::config("x", "y").is_invalid_state());
    }
}
