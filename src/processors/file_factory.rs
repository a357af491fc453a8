//! Timestamped log file creation with count-based retention

use crate::core::config::FileSinkConfig;
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Suffixes tried when several files are created within the same millisecond
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Length of the `yyyyMMdd_HHmmss_fff` part of a file name
const STAMP_LEN: usize = 19;

/// A log file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub created: SystemTime,
}

/// Creates log files under `root/folder` and keeps at most `max_file_count`
/// of them.
///
/// The factory holds no open handles; every call to
/// [`create_file`](Self::create_file) hands ownership of the new file to the
/// caller.
///
/// # Examples
///
/// ```no_run
/// use rust_log_pipeline::LogFileFactory;
///
/// let factory = LogFileFactory::new("/var/log/myapp", "sessions", 7, 64 * 1024).unwrap();
/// let (file, writer) = factory.create_file().unwrap();
/// println!("logging to {}", file.path.display());
/// ```
#[derive(Debug, Clone)]
pub struct LogFileFactory {
    root: PathBuf,
    folder: String,
    max_file_count: usize,
    buffer_size: usize,
}

impl LogFileFactory {
    pub const EXTENSION: &'static str = "log";

    /// # Errors
    ///
    /// `InvalidConfiguration` when `root` or `folder` is empty, or when
    /// `max_file_count` or `buffer_size` is zero.
    pub fn new(
        root: impl Into<PathBuf>,
        folder: impl Into<String>,
        max_file_count: usize,
        buffer_size: usize,
    ) -> Result<Self> {
        let root = root.into();
        let folder = folder.into();

        if root.as_os_str().is_empty() {
            return Err(LoggerError::config("LogFileFactory", "root path is empty"));
        }
        if folder.is_empty() {
            return Err(LoggerError::config("LogFileFactory", "folder name is empty"));
        }
        if max_file_count == 0 {
            return Err(LoggerError::config(
                "LogFileFactory",
                "max file count must be positive",
            ));
        }
        if buffer_size == 0 {
            return Err(LoggerError::config(
                "LogFileFactory",
                "buffer size must be positive",
            ));
        }

        Ok(Self {
            root,
            folder,
            max_file_count,
            buffer_size,
        })
    }

    pub fn from_config(config: &FileSinkConfig) -> Result<Self> {
        Self::new(
            config.root.clone(),
            config.folder.clone(),
            config.max_file_count,
            config.buffer_size,
        )
    }

    /// Directory the files are created in
    pub fn directory(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    pub fn max_file_count(&self) -> usize {
        self.max_file_count
    }

    /// Create and open a new log file, then trim the folder to
    /// `max_file_count` files.
    ///
    /// The file is opened with `create_new`, so an existing file is never
    /// truncated. With the `file` feature the handle also holds an exclusive
    /// advisory lock for as long as it stays open.
    pub fn create_file(&self) -> Result<(LogFile, BufWriter<File>)> {
        let dir = self.directory();
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", dir.display()),
                e,
            )
        })?;

        let (path, file) = Self::open_unique(&dir, Utc::now())?;

        #[cfg(feature = "file")]
        {
            use fs2::FileExt;
            file.try_lock_exclusive().map_err(|e| {
                LoggerError::io_operation(
                    "lock log file",
                    format!("Failed to lock '{}'", path.display()),
                    e,
                )
            })?;
        }

        let created = file
            .metadata()
            .map(|m| creation_time(&m))
            .unwrap_or_else(|_| SystemTime::now());

        self.enforce_retention(&path)?;

        Ok((
            LogFile { path, created },
            BufWriter::with_capacity(self.buffer_size, file),
        ))
    }

    /// Log files in the folder, oldest first
    pub fn log_files(&self) -> Result<Vec<LogFile>> {
        let dir = self.directory();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LoggerError::file_retention(
                    dir.display().to_string(),
                    format!("Failed to list directory: {}", e),
                ))
            }
        };

        let mut files: Vec<LogFile> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str()) == Some(Self::EXTENSION)
            })
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                metadata.is_file().then(|| LogFile {
                    path: entry.path(),
                    created: creation_time(&metadata),
                })
            })
            .collect();

        // Names carry the creation timestamp, so they break creation-time ties
        files.sort_by(|a, b| {
            a.created
                .cmp(&b.created)
                .then_with(|| name_order(&a.path).cmp(&name_order(&b.path)))
        });
        Ok(files)
    }

    /// Delete the oldest files until at most `max_file_count` remain.
    /// `keep` is never deleted. Returns the number of files removed.
    fn enforce_retention(&self, keep: &Path) -> Result<usize> {
        let files = self.log_files()?;
        if files.len() <= self.max_file_count {
            return Ok(0);
        }

        let excess = files.len() - self.max_file_count;
        let mut removed = 0;
        for file in files.iter().filter(|f| f.path != keep).take(excess) {
            match fs::remove_file(&file.path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!(
                    "[LOGGER WARNING] Failed to remove old log file {}: {}",
                    file.path.display(),
                    e
                ),
            }
        }
        Ok(removed)
    }

    fn open_unique(dir: &Path, at: DateTime<Utc>) -> Result<(PathBuf, File)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(file_name_for(at, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(LoggerError::io_operation(
                        "create log file",
                        format!("Failed to open '{}'", path.display()),
                        e,
                    ))
                }
            }
        }
        Err(LoggerError::file_retention(
            dir.display().to_string(),
            "no free file name for the current millisecond",
        ))
    }
}

/// `yyyyMMdd_HHmmss_fff.log`, with `_N` before the extension on collisions
pub(crate) fn file_name_for(at: DateTime<Utc>, attempt: u32) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S_%3f");
    if attempt == 0 {
        format!("{}.{}", stamp, LogFileFactory::EXTENSION)
    } else {
        format!("{}_{}.{}", stamp, attempt, LogFileFactory::EXTENSION)
    }
}

/// Sort key for file names: the timestamp, then the numeric collision suffix,
/// so `_10` sorts after `_2`. Other names sort by their whole stem.
fn name_order(path: &Path) -> (&str, u32) {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    match stem.get(STAMP_LEN..) {
        Some(rest) if rest.starts_with('_') => match rest[1..].parse() {
            Ok(suffix) => (&stem[..STAMP_LEN], suffix),
            Err(_) => (stem, 0),
        },
        _ => (stem, 0),
    }
}

fn creation_time(metadata: &fs::Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
