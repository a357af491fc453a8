//! Size-exact log line formatters
//!
//! Every formatter answers two questions for a record: how many bytes the
//! rendered line needs, and what those bytes are. The two answers must agree
//! exactly, so callers can size a buffer once and render into it without
//! reallocating.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::log_record::LogRecord;
use chrono::{DateTime, Timelike, Utc};
use std::borrow::Cow;

/// Renders a record into a caller-provided buffer.
pub trait LogFormatter: Send + Sync {
    /// Exact number of bytes `format` writes for this record
    fn buffer_size(&self, record: &LogRecord<'_>) -> usize;

    /// Render into `buf[..buffer_size(record)]` and return the byte count.
    ///
    /// Fails if `buf` is shorter than `buffer_size(record)`; nothing past that
    /// length is ever touched.
    fn format(&self, buf: &mut [u8], record: &LogRecord<'_>) -> Result<usize>;

    fn format_type(&self) -> &'static str;
}

/// Cursor over a pre-sized output slice
struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> SliceWriter<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    #[inline]
    fn put_byte(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
    }

    #[inline]
    fn put_two_digits(&mut self, value: u32) {
        self.put_byte(b'0' + (value / 10 % 10) as u8);
        self.put_byte(b'0' + (value % 10) as u8);
    }
}

fn ensure_capacity(format_type: &str, buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(LoggerError::formatter(
            format_type,
            format!("buffer of {} bytes is smaller than the {} bytes required", buf.len(), needed),
        ));
    }
    Ok(())
}

/// Time source for the file formatter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// `HH:mm:ss [L] [tag] message`, timestamp in UTC
#[derive(Debug, Clone, Default)]
pub struct FileFormatter {
    clock: Clock,
}

impl FileFormatter {
    /// `HH:mm:ss` plus the fixed separators and brackets
    const FIXED_LEN: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl LogFormatter for FileFormatter {
    #[inline]
    fn buffer_size(&self, record: &LogRecord<'_>) -> usize {
        Self::FIXED_LEN + record.tag.len() + record.message.len()
    }

    fn format(&self, buf: &mut [u8], record: &LogRecord<'_>) -> Result<usize> {
        let len = self.buffer_size(record);
        ensure_capacity(self.format_type(), buf, len)?;

        let now = self.clock.now();
        let mut out = SliceWriter::new(&mut buf[..len]);
        out.put_two_digits(now.hour());
        out.put_byte(b':');
        out.put_two_digits(now.minute());
        out.put_byte(b':');
        out.put_two_digits(now.second());
        out.put(b" [");
        out.put_byte(record.level.letter());
        out.put(b"] [");
        out.put(record.tag.as_bytes());
        out.put(b"] ");
        out.put(record.message.as_bytes());

        debug_assert_eq!(out.pos, len);
        Ok(out.pos)
    }

    fn format_type(&self) -> &'static str {
        "file"
    }
}

/// `[tag] message`, with a color preamble or a `! ` marker for warnings and errors
#[derive(Debug, Clone)]
pub struct ConsoleFormatter {
    use_colors: bool,
}

const PLAIN_MARKER: &[u8] = b"! ";
const COLOR_RESET: &[u8] = b"\x1b[0m";

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::with_colors(cfg!(feature = "console"))
    }

    /// Colors are only available with the `console` feature; without it the
    /// plain marker is used regardless of `use_colors`.
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: use_colors && cfg!(feature = "console"),
        }
    }

    fn is_highlighted(level: LogLevel) -> bool {
        matches!(level, LogLevel::Warning | LogLevel::Error)
    }

    /// ANSI foreground code for the level, e.g. `33` for yellow
    #[cfg(feature = "console")]
    fn color_code(level: LogLevel) -> Option<Cow<'static, str>> {
        level.color_code().map(|color| color.to_fg_str())
    }

    #[cfg(not(feature = "console"))]
    fn color_code(_level: LogLevel) -> Option<Cow<'static, str>> {
        None
    }

    /// (preamble parts, suffix) surrounding the body for this level
    fn decoration(
        &self,
        level: LogLevel,
    ) -> (Option<Cow<'static, str>>, &'static [u8], &'static [u8]) {
        if !Self::is_highlighted(level) {
            return (None, b"", b"");
        }
        if self.use_colors {
            if let Some(code) = Self::color_code(level) {
                return (Some(code), b"", COLOR_RESET);
            }
        }
        (None, PLAIN_MARKER, b"")
    }
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFormatter for ConsoleFormatter {
    fn buffer_size(&self, record: &LogRecord<'_>) -> usize {
        let (code, marker, suffix) = self.decoration(record.level);
        // "\x1b[" + code + "m"
        let preamble = code.map_or(0, |c| c.len() + 3);
        preamble + marker.len() + 3 + record.tag.len() + record.message.len() + suffix.len()
    }

    fn format(&self, buf: &mut [u8], record: &LogRecord<'_>) -> Result<usize> {
        let len = self.buffer_size(record);
        ensure_capacity(self.format_type(), buf, len)?;

        let (code, marker, suffix) = self.decoration(record.level);
        let mut out = SliceWriter::new(&mut buf[..len]);
        if let Some(code) = code {
            out.put(b"\x1b[");
            out.put(code.as_bytes());
            out.put_byte(b'm');
        }
        out.put(marker);
        out.put_byte(b'[');
        out.put(record.tag.as_bytes());
        out.put(b"] ");
        out.put(record.message.as_bytes());
        out.put(suffix);

        debug_assert_eq!(out.pos, len);
        Ok(out.pos)
    }

    fn format_type(&self) -> &'static str {
        "console"
    }
}
