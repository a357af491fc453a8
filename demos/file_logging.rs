//! File logging example
//!
//! Demonstrates logging to console and rotating log files simultaneously,
//! plus forwarding events from a background subsystem through a log source.
//!
//! Run with: cargo run --example file_logging

use rust_log_pipeline::prelude::*;
use rust_log_pipeline::{info, LogFileFactory, RotationStrategy};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - File Logging Example ===\n");

    let config = FileSinkConfig::new("demo_logs", "session")
        .with_max_file_count(5)
        .with_rotation(RotationStrategy::size(4 * 1024));
    let file = Arc::new(FileProcessor::new(&config)?);

    let (events_tx, events_rx) = crossbeam_channel::bounded(128);

    let logger = Logger::builder()
        .add_log_processor(Arc::new(ConsoleProcessor::new()))
        .add_closeable_processor(file.clone())
        .add_log_source(ChannelSource::factory(events_rx, LogLevel::Information))
        .set_minimum_level(LogLevel::Information)
        .build()?;

    println!("1. Logging to both console and file:");
    logger.information("App", "Application started")?;
    logger.debug("App", "Loading configuration...")?;
    logger.warning("App", "Using default settings for some options")?;
    logger.error("App", "Failed to load optional plugin")?;

    println!("\n2. Events from a background subsystem:");
    let subsystem = thread::spawn(move || {
        for i in 1..=3 {
            let event =
                SourceEvent::new(LogLevel::Information, "Worker", format!("job {} done", i));
            if events_tx.send(event).is_err() {
                break;
            }
        }
    });
    let _ = subsystem.join();

    println!("\n3. Enough output to rotate files:");
    for i in 1..=200 {
        info!(logger, "Batch", "Processing item {}/200", i)?;
    }

    // Drains the queue and releases the current file
    logger.dispose()?;

    let metrics = file.writer().metrics();
    println!("\n=== Example completed successfully! ===");
    println!(
        "Accepted {} entries, dropped {}, {} batches written",
        metrics.accepted_count(),
        metrics.dropped_count(),
        metrics.batches_written()
    );
    for log_file in LogFileFactory::from_config(&config)?.log_files()? {
        println!("  {}", log_file.path.display());
    }

    Ok(())
}
