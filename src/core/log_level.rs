//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// `None` sorts above every other severity. As a minimum level it only lets
/// records logged at `None` through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Information = 1,
    Warning = 2,
    Error = 3,
    None = 4,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::None,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Information => "INFORMATION",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::None => "NONE",
        }
    }

    /// One-letter code used in the file line format
    pub fn letter(&self) -> u8 {
        match self {
            LogLevel::Debug => b'D',
            LogLevel::Information => b'I',
            LogLevel::Warning => b'W',
            LogLevel::Error => b'E',
            LogLevel::None => b'N',
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> Option<colored::Color> {
        use colored::Color::*;
        match self {
            LogLevel::Warning => Some(Yellow),
            LogLevel::Error => Some(Red),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "D" | "DEBUG" => Ok(LogLevel::Debug),
            "I" | "INFO" | "INFORMATION" => Ok(LogLevel::Information),
            "W" | "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "E" | "ERROR" => Ok(LogLevel::Error),
            "N" | "NONE" | "OFF" => Ok(LogLevel::None),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
