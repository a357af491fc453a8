//! Stress tests for the bounded writer
//!
//! These tests verify:
//! - Accepted entries are written in order even when the queue overflows
//! - Entries are only dropped when the queue is full
//! - Close drains everything that was accepted
//! - Per-thread order holds under concurrent producers

use parking_lot::Mutex;
use rust_log_pipeline::prelude::*;
use rust_log_pipeline::WriterState;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Sink that sleeps on every write to keep the queue full
#[derive(Clone)]
struct SlowSink {
    bytes: Arc<Mutex<Vec<u8>>>,
    delay: Duration,
}

impl SlowSink {
    fn new(delay: Duration) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(Vec::new())),
            delay,
        }
    }

    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.bytes.lock().clone())
            .expect("Sink received invalid UTF-8")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SlowSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        thread::sleep(self.delay);
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Indices parsed from `entry N` lines
fn indices(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .map(|line| {
            line.strip_prefix("entry ")
                .and_then(|n| n.parse().ok())
                .expect("Unexpected line in sink")
        })
        .collect()
}

#[test]
fn test_overflow_keeps_fifo_subsequence() {
    let sink = SlowSink::new(Duration::from_millis(2));
    let config = WriterConfig::new()
        .with_channel_capacity(8)
        .with_buffer_capacity(64);
    let overflow_alerts = Arc::new(AtomicU64::new(0));
    let alerts = Arc::clone(&overflow_alerts);
    let writer = BoundedWriter::new(sink.clone(), config)
        .expect("Failed to create writer")
        .with_overflow_callback(Arc::new(move |_dropped| {
            alerts.fetch_add(1, Ordering::SeqCst);
        }));

    let mut accepted = Vec::new();
    for i in 0..2000 {
        if writer.add_entry(&format!("entry {}", i)).unwrap() {
            accepted.push(i);
        }
    }
    writer.close().unwrap();

    let written = indices(&sink.lines());
    assert_eq!(written, accepted, "output must be exactly the accepted entries, in order");

    let metrics = writer.metrics();
    assert_eq!(metrics.accepted_count() as usize, accepted.len());
    assert_eq!(metrics.dropped_count() as usize, 2000 - accepted.len());
    assert!(metrics.dropped_count() > 0, "slow sink should have forced drops");
    assert!(overflow_alerts.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_no_drops_without_overflow() {
    let sink = SlowSink::new(Duration::ZERO);
    let config = WriterConfig::new().with_channel_capacity(4096);
    let writer = BoundedWriter::new(sink.clone(), config).unwrap();

    for i in 0..1000 {
        assert!(writer.add_entry(&format!("entry {}", i)).unwrap());
    }
    writer.close().unwrap();

    assert_eq!(indices(&sink.lines()), (0..1000).collect::<Vec<_>>());
    assert_eq!(writer.metrics().dropped_count(), 0);
}

#[test]
fn test_close_drains_all_accepted_entries() {
    // Slow sink keeps entries queued at the moment close is called
    let sink = SlowSink::new(Duration::from_millis(5));
    let capacity = 32;
    let config = WriterConfig::new()
        .with_channel_capacity(capacity)
        .with_buffer_capacity(16);
    let writer = BoundedWriter::new(sink.clone(), config).unwrap();

    for i in 0..capacity {
        assert!(writer.add_entry(&format!("entry {}", i)).unwrap());
    }
    writer.close().unwrap();

    assert_eq!(writer.state(), WriterState::Closed);
    assert_eq!(sink.lines().len(), capacity);
    assert!(writer.add_entry("after close").is_err());
}

#[test]
fn test_concurrent_producers_keep_per_thread_order() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let sink = SlowSink::new(Duration::ZERO);
    let config = WriterConfig::new().with_channel_capacity(256);
    let writer = Arc::new(BoundedWriter::new(sink.clone(), config).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let writer = Arc::clone(&writer);
            thread::spawn(move || {
                let mut accepted = 0;
                for i in 0..PER_THREAD {
                    if writer.add_entry(&format!("{} {}", t, i)).unwrap() {
                        accepted += 1;
                    }
                }
                accepted
            })
        })
        .collect();

    let accepted: usize = handles
        .into_iter()
        .map(|h| h.join().expect("Producer thread panicked"))
        .sum();
    writer.close().unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), accepted);

    let mut last_seen: HashMap<usize, usize> = HashMap::new();
    for line in &lines {
        let mut parts = line.split(' ');
        let t: usize = parts.next().unwrap().parse().unwrap();
        let i: usize = parts.next().unwrap().parse().unwrap();
        if let Some(prev) = last_seen.insert(t, i) {
            assert!(i > prev, "thread {} wrote {} after {}", t, i, prev);
        }
    }
}

#[test]
fn test_concurrent_logging_through_file_processor() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = FileSinkConfig::new(temp_dir.path(), "stress").with_channel_capacity(8192);
    let file = Arc::new(FileProcessor::new(&config).unwrap());
    let logger = Arc::new(
        Logger::builder()
            .add_closeable_processor(file.clone())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..1000 {
                    rust_log_pipeline::info!(logger, "Worker", "{} {}", t, i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }
    logger.dispose().unwrap();

    let metrics = file.writer().metrics();
    let files = rust_log_pipeline::LogFileFactory::from_config(&config)
        .unwrap()
        .log_files()
        .unwrap();
    let total_lines: usize = files
        .iter()
        .map(|f| std::fs::read_to_string(&f.path).unwrap().lines().count())
        .sum();

    assert_eq!(metrics.accepted_count() + metrics.dropped_count(), 4000);
    assert_eq!(total_lines as u64, metrics.accepted_count());
}
